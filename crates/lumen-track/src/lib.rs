//! Lumen Track - the track-analysis data model and its background fetcher.
//!
//! Owns the parsed, read-only [`TrackAnalysis`] record that the engine
//! injects into the audio analyser and the effect controller. The streaming
//! service's OAuth/HTTP client itself is out of scope here: only the
//! [`TrackSource`] trait boundary is — a real implementation lives outside
//! this crate and is handed to [`TrackPoller::start`].

pub mod data;
pub mod error;
pub mod fetcher;
pub mod normalize;

pub use data::{AudioSection, LightShowType, TrackAnalysis};
pub use error::{Error, Result};
pub use fetcher::{NullTrackSource, TrackPoller, TrackSource, QUERY_INTERVAL};
pub use normalize::quantile_normalize;
