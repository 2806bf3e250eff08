//! Lumen MIDI - serialises semantic lighting intents to MIDI messages.
//!
//! The fixed channel vocabulary lives in [`channel`]; raw message encoding
//! in [`message`]; the output-port abstraction in [`port`]; the
//! time-delayed deactivation queue in [`delayed`]; and the dispatcher that
//! ties them together in [`dispatcher`].

pub mod channel;
pub mod delayed;
pub mod dispatcher;
pub mod error;
pub mod message;
pub mod port;

pub use delayed::{DelayedAction, DelayedEffects};
pub use dispatcher::{MidiDispatcher, SPECIAL_EFFECT_DURATION};
pub use error::{Error, Result};
pub use port::{list_output_ports, MidiPort, MidirPort};
