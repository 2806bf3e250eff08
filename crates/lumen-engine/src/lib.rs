//! Lumen Engine - the cooperative scheduler tying the audio analyser,
//! structural change detector, and effect controller to the MIDI, OS2L, and
//! DMX outputs (§5).
//!
//! [`Engine::start`] opens every external resource; [`Engine::run`] drives
//! the main loop until [`Engine::shutdown_handle`]'s flag is set or a
//! permanent error occurs, then tears every component down in order.

mod engine;
mod error;
mod handler;

pub use engine::{Engine, EngineOptions};
pub use error::{Error, Result};
