use thiserror::Error;

/// Errors surfaced by the DMX overlay client.
#[derive(Debug, Error)]
pub enum Error {
    /// An overlay descriptor's window runs past the 512-byte universe.
    /// Fatal on startup (§7: configuration/precondition).
    #[error("overlay window start={start_offset} length={length} runs past the 512-byte universe")]
    OverlayOutOfRange { start_offset: u16, length: u16 },

    /// More overlays were registered than the universe's device capacity.
    #[error("overlay capacity {capacity} exceeded")]
    CapacityExceeded { capacity: usize },

    /// The requested overlay index does not exist.
    #[error("overlay index {0} does not exist")]
    UnknownOverlay(usize),

    /// The UDP socket could not be bound or written to.
    #[error("DMX socket error: {0}")]
    Socket(#[from] std::io::Error),

    /// A decoded datagram was too short to hold a full universe frame, or
    /// its header count didn't divide evenly into whole overlay entries.
    #[error("DMX datagram truncated: {len} bytes")]
    Truncated { len: usize },

    /// A decoded datagram's leading magic number didn't match the protocol.
    #[error("DMX datagram has wrong magic: {0:#010x}")]
    BadMagic(u32),
}

pub type Result<T> = std::result::Result<T, Error>;
