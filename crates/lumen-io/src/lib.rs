//! Audio capture layer for the light-show engine.
//!
//! - [`backend`] / [`cpal_backend`] - the [`backend::AudioBackend`] trait and
//!   its default [`cpal_backend::CpalBackend`] implementation, decoupling
//!   the rest of the system from any one platform audio API.
//! - [`stream`] - device enumeration helpers used by `lumen-cli`'s `list`
//!   subcommand.
//! - [`capture`] - [`capture::AudioCapture`], bridging the backend's
//!   callback-driven input stream into the blocking `read_frame` the
//!   engine's cooperative main loop expects.

pub mod backend;
pub mod capture;
pub mod cpal_backend;
mod stream;

pub use backend::{AudioBackend, BackendStreamConfig, ErrorCallback, InputCallback, OutputCallback, StreamHandle};
pub use capture::AudioCapture;
pub use cpal_backend::CpalBackend;
pub use stream::{default_device, find_device_by_index, find_device_fuzzy, list_devices, AudioDevice};

/// Errors from audio device enumeration and stream construction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Audio stream setup or runtime error.
    #[error("audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("no audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("device not found: {0}")]
    DeviceNotFound(String),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
