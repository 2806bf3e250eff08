//! The cooperative scheduler tying every subsystem together (§5).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lumen_analysis::handler::AnalyserHandler;
use lumen_analysis::AudioAnalyser;
use lumen_change::{ChangeDetector, CoarseEnergyEmbedding, EmbeddingModel};
use lumen_dmx::{DmxClient, DmxUniverse, DEFAULT_HOST, DEFAULT_PORT};
use lumen_effects::EffectController;
use lumen_io::{AudioCapture, CpalBackend};
use lumen_midi::{MidiDispatcher, MidirPort};
use lumen_os2l::Os2lSession;
use lumen_track::{TrackAnalysis, TrackPoller, TrackSource};

use crate::error::{Error, Result};
use crate::handler::{EngineAnalyserHandler, EngineChangeHandler, EngineEffectSink, EngineTrackSyncHandler};

/// `_os2l._tcp.local.` per §4.7/§6.
const OS2L_SERVICE: &str = "_os2l._tcp.local.";
/// Bins for the built-in [`CoarseEnergyEmbedding`] stand-in model (§9: a real
/// deployment swaps this for an external neural embedding model).
const EMBEDDING_BINS: usize = 32;
const EMBEDDING_FRAME_LEN: usize = 1024;

const HOOK_100MS: Duration = Duration::from_millis(100);
const HOOK_1S: Duration = Duration::from_secs(1);
const HOOK_10S: Duration = Duration::from_secs(10);

/// Reported track progress tolerated before a same-track poll result is
/// treated as a seek/resync rather than ordinary playback drift (matches
/// `original_source/lib/clients/spotify_client.py`'s `check_for_track_changes`).
const PROGRESS_DISCONTINUITY_MS: f64 = 1000.0;

/// Construction-time parameters for [`Engine::start`], mirroring the `run`
/// CLI subcommand's arguments (§6).
pub struct EngineOptions {
    pub midi_port_index: usize,
    pub input_device: Option<String>,
    pub sample_rate: u32,
    pub buffer_size: u32,
    /// Logs onset/beat/note events at trace level; does not enable the
    /// debug spectrogram GUI, which is out of scope (§1, out-of-scope list).
    pub debug: bool,
    /// Reserved hook for a future visualizer frontend; currently only
    /// raises a log line confirming the flag was set.
    pub visualizer: bool,
    pub enable_os2l: bool,
    pub dmx_host: String,
    pub dmx_port: u16,
    pub dmx_max_devices: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            midi_port_index: 0,
            input_device: None,
            sample_rate: 44_100,
            buffer_size: 512,
            debug: false,
            visualizer: false,
            enable_os2l: true,
            dmx_host: DEFAULT_HOST.to_string(),
            dmx_port: DEFAULT_PORT,
            dmx_max_devices: 20,
        }
    }
}

/// Owns every subsystem and drives the cooperative main loop described in
/// §5: one audio buffer in, analyser + change detector out, periodic
/// 100 ms/1 s/10 s hooks dispatched alongside.
pub struct Engine {
    capture: Option<AudioCapture>,
    analyser: AudioAnalyser,
    change_detector: ChangeDetector,
    effect_controller: EffectController,
    midi: MidiDispatcher,
    os2l: Option<Os2lSession>,
    dmx_client: DmxClient,
    dmx_universe: DmxUniverse,
    track_poller: TrackPoller,
    current_track: Option<Arc<TrackAnalysis>>,
    shutdown: Arc<AtomicBool>,
    debug: bool,
    last_100ms: Instant,
    last_1s: Instant,
    last_10s: Instant,
}

impl Engine {
    /// Open every external resource (audio input, MIDI output, OS2L session,
    /// DMX socket) and start the background track-analysis poller. Any
    /// failure here is an external-I/O-permanent error (§7) and is returned
    /// directly; nothing partially constructed is leaked since `Self` is
    /// only returned once every component is up.
    pub fn start(options: EngineOptions, track_source: impl TrackSource) -> Result<Self> {
        let backend = CpalBackend::new();
        let capture = AudioCapture::open(&backend, options.sample_rate, options.buffer_size, options.input_device)?;

        let midi_port = MidirPort::open(options.midi_port_index)?;
        let midi = MidiDispatcher::new(Box::new(midi_port));

        let analyser = AudioAnalyser::new(options.buffer_size as usize, options.sample_rate as f32);

        let model: Box<dyn EmbeddingModel> = Box::new(CoarseEnergyEmbedding::new(EMBEDDING_BINS, EMBEDDING_FRAME_LEN));
        let change_detector = ChangeDetector::new(options.sample_rate as usize, options.buffer_size as usize, model);

        let effect_controller = EffectController::new();

        let os2l = if options.enable_os2l {
            let addr = lumen_os2l::discover(OS2L_SERVICE)?;
            Some(Os2lSession::connect(addr)?)
        } else {
            tracing::info!("OS2L disabled by request");
            None
        };

        let dmx_client = DmxClient::connect(&options.dmx_host, options.dmx_port, options.dmx_max_devices)?;
        let mut dmx_universe = DmxUniverse::new(options.dmx_max_devices);
        // The single chase-style light-bar overlay `pools::overlays` addresses
        // by index 0 (§4.5.4); `client.start` below sends it out deactivated.
        dmx_universe.register(0, 24)?;
        dmx_client.start(&mut dmx_universe)?;

        let track_poller = TrackPoller::start(track_source);

        if options.visualizer {
            tracing::info!("visualizer hook enabled (no frontend attached)");
        }

        let now = Instant::now();
        Ok(Self {
            capture: Some(capture),
            analyser,
            change_detector,
            effect_controller,
            midi,
            os2l,
            dmx_client,
            dmx_universe,
            track_poller,
            current_track: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            debug: options.debug,
            last_100ms: now,
            last_1s: now,
            last_10s: now,
        })
    }

    /// A shared flag the caller can flip (e.g. from a `ctrlc` handler) to
    /// request a graceful stop; the main loop checks it once per iteration.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Run the cooperative main loop until shutdown is requested or a
    /// permanent error occurs, then tear down every component in order
    /// (audio → OS2L → MIDI → overlay → analysis, per §5).
    pub fn run(&mut self) -> Result<()> {
        tracing::info!("engine started");
        let result = self.run_until_shutdown();
        self.teardown();
        match &result {
            Ok(()) => tracing::info!("clean shutdown"),
            Err(e) => tracing::error!(error = %e, "engine stopped on error"),
        }
        result
    }

    fn run_until_shutdown(&mut self) -> Result<()> {
        while !self.shutdown.load(Ordering::Relaxed) {
            let frame = self
                .capture
                .as_ref()
                .expect("capture present while running")
                .read_frame();

            self.sync_track();

            let now = Instant::now();
            let current_sec = self.analyser.song_elapsed_sec(now);

            {
                let mut handler = EngineAnalyserHandler {
                    sink: EngineEffectSink {
                        midi: &mut self.midi,
                        dmx_universe: &mut self.dmx_universe,
                        dmx_client: &self.dmx_client,
                    },
                    os2l: self.os2l.as_mut(),
                    effect_controller: &mut self.effect_controller,
                    track: self.current_track.clone(),
                    current_sec,
                    debug: self.debug,
                };
                self.analyser.analyse(&frame, &mut handler);
            }

            {
                let mut handler = EngineChangeHandler {
                    effect_controller: &mut self.effect_controller,
                    sink: EngineEffectSink {
                        midi: &mut self.midi,
                        dmx_universe: &mut self.dmx_universe,
                        dmx_client: &self.dmx_client,
                    },
                    track: self.current_track.clone(),
                };
                self.change_detector
                    .process(&frame, current_sec, self.current_track.as_deref(), &mut handler);
            }

            self.dispatch_periodic(now)?;
        }
        Ok(())
    }

    /// Pull the latest published track analysis. A new track name dispatches
    /// [`AnalyserHandler::on_spotify_track_changed`]; the same track whose
    /// reported progress jumped past [`PROGRESS_DISCONTINUITY_MS`] dispatches
    /// [`AnalyserHandler::on_spotify_track_progress_changed`] instead (§4.5.5,
    /// per `original_source/lib/clients/spotify_client.py`'s
    /// `check_for_track_changes`). Either way the handler re-aligns the
    /// analyser's local beat count/song clock and recomputes the current
    /// section; only a track change additionally announces OS2L playback
    /// start.
    fn sync_track(&mut self) {
        let Some(latest) = self.track_poller.current() else {
            return;
        };

        let current_sec = self.analyser.song_elapsed_sec(Instant::now());
        let mut handler = EngineTrackSyncHandler {
            analyser: &mut self.analyser,
            os2l: self.os2l.as_mut(),
            effect_controller: &mut self.effect_controller,
        };

        match self.current_track.as_deref() {
            Some(current) if current.track_name == latest.track_name => {
                if (latest.progress_ms as f64 - current_sec * 1000.0).abs() > PROGRESS_DISCONTINUITY_MS {
                    handler.on_spotify_track_progress_changed(&latest);
                }
            }
            _ => handler.on_spotify_track_changed(&latest),
        }

        self.current_track = Some(latest);
    }

    /// Run the 100 ms/1 s/10 s hooks described in §5 whose deadlines have
    /// elapsed as of `now`.
    fn dispatch_periodic(&mut self, now: Instant) -> Result<()> {
        if now.duration_since(self.last_100ms) >= HOOK_100MS {
            self.last_100ms = now;
            self.midi.tick(now);
            if let Some(os2l) = &self.os2l {
                let current_sec = self.analyser.song_elapsed_sec(now);
                let beat_pos = self.analyser.fractional_beat_position(now);
                os2l.set_progress(beat_pos, (current_sec * 1000.0).max(0.0) as u64);
            }
        }

        if now.duration_since(self.last_1s) >= HOOK_1S {
            self.last_1s = now;
            tracing::debug!(
                song_elapsed_sec = self.analyser.song_elapsed_sec(now),
                beat_count = self.analyser.beat_count(),
                section_index = ?self.effect_controller.current_section_index(),
                "engine cycle"
            );
        }

        if now.duration_since(self.last_10s) >= HOOK_10S {
            self.last_10s = now;
            if self.track_poller.failed() {
                return Err(Error::TrackSourceFailed);
            }
            match self.track_poller.current() {
                Some(track) => {
                    tracing::info!(track = %track.track_name, light_show_type = ?track.light_show_type, "current track status")
                }
                None => tracing::info!("no track analysis available"),
            }
        }

        Ok(())
    }

    /// Ordered teardown: audio → OS2L → MIDI → overlay → analysis (§5).
    fn teardown(&mut self) {
        self.capture = None;
        if let Some(mut os2l) = self.os2l.take() {
            os2l.stop();
        }
        self.midi.stop();
        self.dmx_universe.deactivate_all();
        if let Err(e) = self.dmx_client.stop() {
            tracing::warn!(error = %e, "failed to send DMX clear frame on shutdown");
        }
        self.track_poller.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_documented_external_interfaces() {
        let options = EngineOptions::default();
        assert_eq!(options.sample_rate, 44_100);
        assert_eq!(options.dmx_host, DEFAULT_HOST);
        assert_eq!(options.dmx_port, DEFAULT_PORT);
        assert!(options.enable_os2l);
        assert!(!options.debug);
    }
}
