use thiserror::Error;

/// Errors surfaced by OS2L discovery and the sender session.
#[derive(Debug, Error)]
pub enum Error {
    /// No `_os2l._tcp.local.` service answered within the discovery window.
    /// Fatal (§7: external I/O permanent).
    #[error("OS2L service not discovered within {0:?}")]
    NotDiscovered(std::time::Duration),

    /// The TCP connection to the discovered host could not be established.
    #[error("failed to connect to OS2L host {0}: {1}")]
    ConnectFailed(std::net::SocketAddr, std::io::Error),

    /// A blocking write to the session socket failed. Fatal for this
    /// session (§5).
    #[error("OS2L write failed: {0}")]
    WriteFailed(std::io::Error),

    /// A raw socket/discovery I/O error not covered above.
    #[error("OS2L I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
