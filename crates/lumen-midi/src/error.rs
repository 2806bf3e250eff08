use thiserror::Error;

/// Errors surfaced by the MIDI dispatcher.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested output port index does not exist. Fatal on startup
    /// (§7: configuration/precondition).
    #[error("MIDI output port index {0} is out of range")]
    InvalidPortIndex(usize),

    /// The port failed to open. Fatal (§7: external I/O permanent).
    #[error("failed to open MIDI output port: {0}")]
    PortOpenFailed(String),

    /// A send to an already-open connection failed.
    #[error("failed to send MIDI message: {0}")]
    SendFailed(String),

    /// An intensity value outside `[0, 1]` was requested. Fatal on startup.
    #[error("intensity value {0} is out of range [0, 1]")]
    InvalidIntensity(f32),
}

pub type Result<T> = std::result::Result<T, Error>;
