//! Lumen CLI - command-line entry point for the real-time light-show engine.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lumen")]
#[command(author, version, about = "Real-time audio-driven light-show director", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate audio input devices and MIDI output ports
    List(commands::list::ListArgs),

    /// Start the light-show engine
    Run(commands::run::RunArgs),
}

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List(args) => commands::list::run(args),
        Commands::Run(args) => commands::run::run(args),
    }
}
