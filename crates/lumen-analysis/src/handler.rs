//! Callbacks the [`crate::analyser::AudioAnalyser`] invokes as it observes
//! transport and musical events.
//!
//! Structural-change and per-cycle callbacks live elsewhere: section-change
//! notifications belong to the change detector's own handler trait, and the
//! engine's periodic tick is driven by its own loop rather than a callback
//! from this crate.

use lumen_track::TrackAnalysis;

/// Receives transport and musical-event notifications from an
/// [`crate::analyser::AudioAnalyser`], plus the two track-identity
/// notifications the track-analysis polling side of the engine raises
/// (`original_source/lib/engine/light_engine.py`'s `on_spotify_track_changed`/
/// `on_spotify_track_progress_changed`).
pub trait AnalyserHandler {
    fn on_sound_start(&mut self) {}
    fn on_sound_stop(&mut self) {}
    fn on_onset(&mut self) {}
    fn on_beat(&mut self, beat_count: u64, bpm: f64, bpm_changed: bool) {
        let _ = (beat_count, bpm, bpm_changed);
    }
    fn on_note(&mut self, midi_note: u8) {
        let _ = midi_note;
    }

    /// A newly polled track differs from the one currently loaded.
    fn on_spotify_track_changed(&mut self, track: &TrackAnalysis) {
        let _ = track;
    }

    /// The currently loaded track's reported progress jumped by more than
    /// the polling tolerance without a track change - a seek or an external
    /// resync, not a new song.
    fn on_spotify_track_progress_changed(&mut self, track: &TrackAnalysis) {
        let _ = track;
    }
}

/// A handler that does nothing; useful in tests or as a placeholder.
#[derive(Default)]
pub struct NullAnalyserHandler;

impl AnalyserHandler for NullAnalyserHandler {}
