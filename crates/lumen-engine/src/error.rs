//! Errors surfaced by the engine's construction and run loop (§7).

use thiserror::Error;

/// Fatal errors that stop the engine. Transient failures from any
/// component never reach this type — they are logged and swallowed at the
/// component that produced them (§7).
#[derive(Debug, Error)]
pub enum Error {
    /// Audio device/stream construction failed.
    #[error("audio I/O error: {0}")]
    Audio(#[from] lumen_io::Error),

    /// The MIDI output port failed to open.
    #[error("MIDI error: {0}")]
    Midi(#[from] lumen_midi::Error),

    /// OS2L discovery or connection failed.
    #[error("OS2L error: {0}")]
    Os2l(#[from] lumen_os2l::Error),

    /// The DMX overlay socket failed to bind or send.
    #[error("DMX error: {0}")]
    Dmx(#[from] lumen_dmx::Error),

    /// The track-analysis poller hit a permanent error (e.g. invalid
    /// credentials) and stopped itself; the engine tears down in response.
    #[error("track-analysis source failed permanently, stopping")]
    TrackSourceFailed,
}

/// Convenience result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
