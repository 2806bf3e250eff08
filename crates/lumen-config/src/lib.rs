//! Lumen Config - persisted configuration for the light-show pipeline (§6, §1A).
//!
//! Two concerns live here:
//!
//! - [`credentials::StreamingCredentials`] - the streaming-service OAuth
//!   client id/secret (and an optionally cached refresh token), loaded from
//!   a TOML file at a platform config directory. An absent file means
//!   streaming analysis is disabled, not an error.
//! - [`channel_map::ChannelMap`] - the TOML-shaped mirror of
//!   `lumen-effects`'/`lumen-midi`'s compiled-in effect-pool and MIDI
//!   channel assignments, so operators can inspect or retarget channel
//!   numbers without recompiling.

mod channel_map;
mod credentials;
mod error;
pub mod paths;

pub use channel_map::{AutoloopBank, ChannelMap};
pub use credentials::StreamingCredentials;
pub use error::{ConfigError, Result};
