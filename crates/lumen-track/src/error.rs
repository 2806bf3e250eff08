use thiserror::Error;

/// Errors surfaced by track-analysis fetching.
#[derive(Debug, Error)]
pub enum Error {
    #[error("track-analysis credentials file at {path} could not be read: {source}")]
    ReadCredentials {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("track-analysis credentials were present but rejected by the upstream API: {0}")]
    InvalidCredentials(String),

    #[error("track-analysis request timed out")]
    Timeout,

    #[error("track-analysis request failed: {0}")]
    Request(String),
}

pub type Result<T> = std::result::Result<T, Error>;
