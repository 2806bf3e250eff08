//! CLI surface tests: both subcommands exist and respond to `--help`
//! without touching real audio/MIDI hardware.

use std::process::Command;

fn lumen() -> Command {
    Command::new(env!("CARGO_BIN_EXE_lumen"))
}

#[test]
fn top_level_help_lists_both_subcommands() {
    let output = lumen().arg("--help").output().expect("failed to run lumen --help");
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("list"));
    assert!(text.contains("run"));
}

#[test]
fn run_help_documents_midi_port_index_and_flags() {
    let output = lumen().args(["run", "--help"]).output().expect("failed to run lumen run --help");
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("midi-port-index") || text.contains("MIDI_PORT_INDEX"));
    assert!(text.contains("--input-device"));
    assert!(text.contains("--no-os2l"));
}

#[test]
fn missing_required_midi_port_index_is_a_usage_error() {
    let output = lumen().arg("run").output().expect("failed to run lumen run");
    assert!(!output.status.success());
}
