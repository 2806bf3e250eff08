//! Background polling of the external track-analysis source.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;

use crate::data::TrackAnalysis;
use crate::error::{Error, Result};

/// How often the query thread asks the external source for an update.
pub const QUERY_INTERVAL: Duration = Duration::from_secs(20);

/// A source of track-analysis records. Implementations own whatever OAuth/
/// HTTP client is needed to talk to the streaming service; only the parsed
/// record crosses this boundary.
pub trait TrackSource: Send + 'static {
    /// Fetch the currently-playing track's analysis, or `None` if nothing is
    /// playing. A `Timeout`/`Request` error is transient and retried next
    /// cycle; `InvalidCredentials` is permanent and stops the poller.
    fn fetch_current(&mut self) -> Result<Option<TrackAnalysis>>;
}

/// A [`TrackSource`] that never produces a track, used when no credentials
/// file is configured — streaming analysis is then simply disabled.
pub struct NullTrackSource;

impl TrackSource for NullTrackSource {
    fn fetch_current(&mut self) -> Result<Option<TrackAnalysis>> {
        Ok(None)
    }
}

/// Publishes the latest [`TrackAnalysis`] from a background thread via a
/// single-writer/multi-reader atomic cell.
pub struct TrackPoller {
    cell: Arc<ArcSwapOption<TrackAnalysis>>,
    running: Arc<AtomicBool>,
    failed: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TrackPoller {
    /// Start polling `source` at [`QUERY_INTERVAL`] on a dedicated thread.
    pub fn start(mut source: impl TrackSource) -> Self {
        let cell = Arc::new(ArcSwapOption::from(None));
        let running = Arc::new(AtomicBool::new(true));
        let failed = Arc::new(AtomicBool::new(false));

        let thread_cell = Arc::clone(&cell);
        let thread_running = Arc::clone(&running);
        let thread_failed = Arc::clone(&failed);

        let handle = thread::spawn(move || {
            tracing::info!("track-analysis poller started");
            let mut last_query = Instant::now() - QUERY_INTERVAL;
            while thread_running.load(Ordering::Relaxed) {
                let now = Instant::now();
                if now.duration_since(last_query) >= QUERY_INTERVAL {
                    last_query = now;
                    match source.fetch_current() {
                        Ok(Some(track)) => {
                            tracing::info!(track = %track.track_name, "track analysis updated");
                            thread_cell.store(Some(Arc::new(track)));
                        }
                        Ok(None) => {}
                        Err(Error::InvalidCredentials(msg)) => {
                            tracing::error!(error = %msg, "track-analysis credentials rejected, stopping poller");
                            thread_failed.store(true, Ordering::Relaxed);
                            break;
                        }
                        Err(e) => {
                            tracing::info!(error = %e, "track-analysis query failed, will retry");
                        }
                    }
                }
                thread::sleep(Duration::from_millis(1));
            }
            tracing::info!("track-analysis poller stopped");
        });

        Self {
            cell,
            running,
            failed,
            handle: Some(handle),
        }
    }

    /// Read the most recently published track analysis.
    pub fn current(&self) -> Option<Arc<TrackAnalysis>> {
        self.cell.load_full()
    }

    /// True if the poller hit a permanent error and stopped itself.
    pub fn failed(&self) -> bool {
        self.failed.load(Ordering::Relaxed)
    }

    /// Stop the poller and join its thread.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TrackPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct CountingSource {
        calls: Arc<Mutex<u32>>,
    }

    impl TrackSource for CountingSource {
        fn fetch_current(&mut self) -> Result<Option<TrackAnalysis>> {
            *self.calls.lock().unwrap() += 1;
            Ok(None)
        }
    }

    #[test]
    fn null_source_always_returns_none() {
        let mut s = NullTrackSource;
        assert!(s.fetch_current().unwrap().is_none());
    }

    #[test]
    fn poller_starts_and_stops_cleanly() {
        let calls = Arc::new(Mutex::new(0));
        let source = CountingSource { calls: Arc::clone(&calls) };
        let mut poller = TrackPoller::start(source);
        thread::sleep(Duration::from_millis(10));
        assert!(poller.current().is_none());
        assert!(!poller.failed());
        poller.stop();
    }
}
