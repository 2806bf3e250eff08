//! `lumen list` - enumerate audio input devices and MIDI output ports
//! (§6: "enumerate audio and MIDI devices").

use clap::Args;

#[derive(Args)]
pub struct ListArgs {}

pub fn run(_args: ListArgs) -> anyhow::Result<()> {
    let devices = lumen_io::list_devices()?;
    let inputs: Vec<_> = devices.iter().filter(|d| d.is_input).collect();

    println!("Audio input devices");
    println!("===================\n");
    if inputs.is_empty() {
        println!("  (none found)");
    } else {
        for (idx, device) in inputs.iter().enumerate() {
            println!("  [{}] {} ({} Hz)", idx, device.name, device.default_sample_rate);
        }
    }

    println!("\nMIDI output ports");
    println!("=================\n");
    let ports = lumen_midi::list_output_ports()?;
    if ports.is_empty() {
        println!("  (none found)");
    } else {
        for (idx, name) in ports.iter().enumerate() {
            println!("  [{idx}] {name}");
        }
    }

    println!("\nRun with: lumen run <midi_port_index> [--input-device N]");
    Ok(())
}
