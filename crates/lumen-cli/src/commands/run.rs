//! `lumen run` - start the light-show engine (§5, §6).

use std::sync::atomic::Ordering;

use clap::Args;
use lumen_engine::{Engine, EngineOptions};
use lumen_track::NullTrackSource;

#[derive(Args)]
pub struct RunArgs {
    /// Index of the MIDI output port to dispatch lighting notes/CCs on,
    /// as listed by `lumen list`.
    midi_port_index: usize,

    /// Audio input device index, as listed by `lumen list`. Defaults to the
    /// system default input device.
    #[arg(long = "input-device")]
    input_device: Option<usize>,

    /// Accepted for CLI-contract compatibility; this build has no audio
    /// output path (the debug spectrogram GUI is out of scope), so the
    /// value is logged but otherwise unused.
    #[arg(long = "output-device")]
    output_device: Option<usize>,

    /// Log onset/beat/note events at trace level.
    #[arg(long)]
    debug: bool,

    /// Reserved for a future visualizer frontend.
    #[arg(long)]
    visualizer: bool,

    /// Skip OS2L discovery/connection.
    #[arg(long = "no-os2l")]
    no_os2l: bool,
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let input_device = args
        .input_device
        .map(lumen_io::find_device_by_index)
        .transpose()?
        .map(|d| d.name);

    if let Some(index) = args.output_device {
        tracing::warn!(index, "--output-device has no effect: this build has no audio playback path");
    }

    match lumen_config::StreamingCredentials::load_default() {
        Ok(Some(_)) => tracing::warn!(
            "streaming credentials found, but the streaming-service HTTP client is out of scope \
             for this build; continuing with streaming analysis disabled"
        ),
        Ok(None) => tracing::info!("no streaming credentials configured, streaming analysis disabled"),
        Err(e) => tracing::warn!(error = %e, "failed to read streaming credentials, continuing without them"),
    }

    let options = EngineOptions {
        midi_port_index: args.midi_port_index,
        input_device,
        debug: args.debug,
        visualizer: args.visualizer,
        enable_os2l: !args.no_os2l,
        ..EngineOptions::default()
    };

    let mut engine = Engine::start(options, NullTrackSource)?;
    let shutdown = engine.shutdown_handle();
    ctrlc::set_handler(move || {
        tracing::info!("shutdown requested");
        shutdown.store(true, Ordering::Relaxed);
    })?;

    engine.run()?;
    Ok(())
}
