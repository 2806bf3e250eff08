//! Lumen DMX - raw DMX overlay UDP client.
//!
//! Encodes a bounded array of overlay windows plus a 512-byte universe
//! frame into the little-endian wire format described in §6, and sends
//! one datagram per mutation over UDP.

pub mod client;
pub mod error;
pub mod overlay;
pub mod universe;

pub use client::{DmxClient, DEFAULT_HOST, DEFAULT_PORT};
pub use error::{Error, Result};
pub use overlay::{DmxOverlay, UNIVERSE_SIZE};
pub use universe::{encoded_len, DmxUniverse};
