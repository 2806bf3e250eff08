//! The background sender thread and subscribe/logon state machine (§4.7, §5).

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::message::{self, SubscribeRequest};

const POLL_SLEEP: Duration = Duration::from_millis(1);
/// Used until the host's `subscribe` sets a real cadence.
const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Connecting,
    AwaitingSubscribe,
    LoggedOn,
    Stopped,
}

/// Current beat-position snapshot the sender thread reads to build
/// periodic `update` messages (§4.7). Written by the engine, read by the
/// sender thread; a `parking_lot::Mutex` is fine since it's touched at most
/// once per 100 ms hook cadence, never from the audio thread.
#[derive(Default)]
struct Progress {
    beat_pos: f64,
    time_elapsed_ms: u64,
}

/// Background TCP session to the lighting host: subscribe/logon handshake
/// then continuous JSON-line beat/update streaming.
pub struct Os2lSession {
    outbound: Sender<String>,
    running: Arc<AtomicBool>,
    logged_on: Arc<AtomicBool>,
    progress: Arc<Mutex<Progress>>,
    handle: Option<JoinHandle<()>>,
}

impl Os2lSession {
    /// Connect to `addr` and start the background sender thread.
    pub fn connect(addr: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(addr).map_err(|e| Error::ConnectFailed(addr, e))?;
        stream.set_nonblocking(true)?;

        let (tx, rx) = crossbeam_channel::unbounded();
        let running = Arc::new(AtomicBool::new(true));
        let logged_on = Arc::new(AtomicBool::new(false));
        let progress = Arc::new(Mutex::new(Progress::default()));

        let thread_running = Arc::clone(&running);
        let thread_logged_on = Arc::clone(&logged_on);
        let thread_progress = Arc::clone(&progress);

        let handle = thread::spawn(move || {
            run_session(stream, rx, thread_running, thread_logged_on, thread_progress);
        });

        Ok(Self {
            outbound: tx,
            running,
            logged_on,
            progress,
            handle: Some(handle),
        })
    }

    /// Enqueue a beat message; dropped silently if the session already
    /// stopped.
    pub fn send_beat(&self, change: bool, pos: i64, bpm: i64, strength: f64) {
        let _ = self.outbound.send(message::beat_message(change, pos, bpm, strength));
    }

    /// Update the progress snapshot used for periodic `update` messages.
    pub fn set_progress(&self, beat_pos: f64, time_elapsed_ms: u64) {
        let mut progress = self.progress.lock();
        progress.beat_pos = beat_pos;
        progress.time_elapsed_ms = time_elapsed_ms;
    }

    /// Enqueue the `play` transport message for "deck 1" (§4.7).
    pub fn send_play_start(&self) {
        let _ = self.outbound.send(message::play_start_message());
    }

    /// Enqueue the `pause` transport message for "deck 1" (§4.7).
    pub fn send_play_stop(&self) {
        let _ = self.outbound.send(message::play_stop_message());
    }

    /// Enqueue the deck-1 state burst sent when a new track loads (§4.7).
    pub fn send_song_loaded(&self, time_elapsed_ms: u64, beat_pos: f64, first_beat_ms: u64, bpm: f64) {
        let _ = self
            .outbound
            .send(message::song_loaded_message(time_elapsed_ms, beat_pos, first_beat_ms, bpm));
    }

    pub fn is_logged_on(&self) -> bool {
        self.logged_on.load(Ordering::Relaxed)
    }

    /// Flag the sender thread to exit, join it, then send a shutdown
    /// message and close the socket (§4.7 `stop`).
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Os2lSession {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_session(
    mut stream: TcpStream,
    outbound: Receiver<String>,
    running: Arc<AtomicBool>,
    logged_on: Arc<AtomicBool>,
    progress: Arc<Mutex<Progress>>,
) {
    let mut state = SessionState::Connecting;
    let mut update_interval = DEFAULT_UPDATE_INTERVAL;
    let mut last_update = Instant::now();
    let mut read_buf = [0u8; 4096];
    let mut pending = String::new();

    state = SessionState::AwaitingSubscribe;
    tracing::info!("OS2L session awaiting subscribe");

    while running.load(Ordering::Relaxed) {
        match stream.read(&mut read_buf) {
            Ok(0) => {
                tracing::warn!("OS2L host closed the connection");
                break;
            }
            Ok(n) => {
                pending.push_str(&String::from_utf8_lossy(&read_buf[..n]));
                while let Some(newline) = pending.find('\n') {
                    let line: String = pending.drain(..=newline).collect();
                    if let Some(SubscribeRequest { frequency, .. }) = message::parse_inbound_line(&line) {
                        update_interval = Duration::from_millis(frequency.max(1));
                        if write_all(&mut stream, message::logon_message().as_bytes()).is_err() {
                            tracing::error!("OS2L write failed during logon burst");
                            return;
                        }
                        state = SessionState::LoggedOn;
                        logged_on.store(true, Ordering::Relaxed);
                        last_update = Instant::now();
                        tracing::info!(frequency_ms = frequency, "OS2L logged on");
                    }
                }
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => {
                tracing::warn!(error = %e, "OS2L socket read error, treating as transient");
            }
        }

        if let Ok(message) = outbound.try_recv()
            && write_all(&mut stream, message.as_bytes()).is_err()
        {
            tracing::error!("OS2L write failed, ending session");
            break;
        }

        if state == SessionState::LoggedOn && last_update.elapsed() >= update_interval {
            last_update = Instant::now();
            let snapshot = {
                let p = progress.lock();
                (p.beat_pos, p.time_elapsed_ms)
            };
            let update = message::update_message(snapshot.0, snapshot.1);
            if write_all(&mut stream, update.as_bytes()).is_err() {
                tracing::error!("OS2L write failed sending update, ending session");
                break;
            }
        }

        thread::sleep(POLL_SLEEP);
    }

    state = SessionState::Stopped;
    let _ = write_all(&mut stream, message::shutdown_message().as_bytes());
    logged_on.store(false, Ordering::Relaxed);
    tracing::info!(?state, "OS2L session stopped");
}

fn write_all(stream: &mut TcpStream, bytes: &[u8]) -> std::io::Result<()> {
    stream.write_all(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn logon_burst_follows_subscribe_and_updates_follow_cadence() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            conn.write_all(b"{\"evt\":\"subscribe\",\"frequency\":25}\n").unwrap();
            conn.set_read_timeout(Some(Duration::from_millis(500))).unwrap();

            let mut buf = vec![0u8; 65536];
            let mut total = Vec::new();
            let start = Instant::now();
            while start.elapsed() < Duration::from_millis(300) {
                if let Ok(n) = conn.read(&mut buf)
                    && n > 0
                {
                    total.extend_from_slice(&buf[..n]);
                }
            }
            total
        });

        let mut session = Os2lSession::connect(addr).unwrap();
        thread::sleep(Duration::from_millis(50));
        assert!(session.is_logged_on());
        session.set_progress(4.5, 12_000);

        let received = server.join().unwrap();
        let text = String::from_utf8_lossy(&received);
        assert!(text.contains("\"evt\":\"subscribed\""));
        session.stop();
    }
}
