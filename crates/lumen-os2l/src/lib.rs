//! OS2L (Open Sound to Light) sender: mDNS discovery, the subscribe/logon
//! handshake, and the background session that streams beat and progress
//! updates to a lighting console over TCP.

mod discovery;
mod error;
mod message;
mod session;

pub use discovery::{discover, discover_with_timeout, DISCOVERY_TIMEOUT};
pub use error::{Error, Result};
pub use message::{
    beat_message, logon_message, parse_inbound_line, play_start_message, play_stop_message,
    shutdown_message, song_loaded_message, update_message, SubscribeRequest,
};
pub use session::Os2lSession;
