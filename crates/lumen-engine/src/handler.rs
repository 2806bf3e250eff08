//! Short-lived wrapper types that borrow disjoint fields of [`crate::Engine`]
//! to satisfy the `AnalyserHandler`/`ChangeHandler` callback contracts
//! without aliasing `&mut Engine` itself. Constructed fresh on each main-loop
//! iteration (§9: "a single trait/interface bound at construction").

use std::sync::Arc;
use std::time::{Duration, Instant};

use lumen_analysis::handler::AnalyserHandler;
use lumen_analysis::AudioAnalyser;
use lumen_change::handler::ChangeHandler;
use lumen_dmx::{DmxClient, DmxUniverse};
use lumen_effects::{EffectController, EffectSink};
use lumen_midi::channel::NoteChannel;
use lumen_midi::MidiDispatcher;
use lumen_os2l::Os2lSession;
use lumen_track::TrackAnalysis;

/// Applies picked effects to both the MIDI dispatcher and the DMX overlay
/// universe/client (§4.6 step 5, §4.9). `MidiDispatcher` alone only knows
/// how to ignore `Effect::Overlay` (the `EffectSink` trait's default
/// no-op); this combinator is what actually reaches the DMX socket.
pub(crate) struct EngineEffectSink<'a> {
    pub midi: &'a mut MidiDispatcher,
    pub dmx_universe: &'a mut DmxUniverse,
    pub dmx_client: &'a DmxClient,
}

impl EffectSink for EngineEffectSink<'_> {
    fn pulse_autoloop(&mut self, channel: NoteChannel) {
        self.midi.pulse_autoloop(channel);
    }

    fn fire_special_effect(&mut self, channel: NoteChannel, duration: Duration) {
        self.midi.fire_special_effect(channel, duration);
    }

    fn set_color_override(&mut self, channel: NoteChannel) {
        self.midi.set_color_override(channel);
    }

    fn clear_color_overrides(&mut self) {
        self.midi.clear_color_overrides();
    }

    fn activate_overlay(&mut self, overlay_index: usize) {
        if let Err(e) = self.dmx_universe.activate(overlay_index) {
            tracing::warn!(overlay_index, error = %e, "failed to activate DMX overlay");
            return;
        }
        if let Err(e) = self.dmx_client.send_universe(self.dmx_universe) {
            tracing::warn!(overlay_index, error = %e, "failed to send DMX overlay frame");
        }
    }
}

/// Feeds the analyser's transport/musical-event callbacks to the MIDI
/// dispatcher, DMX overlay, and OS2L session (§4.5, §4.8, §4.7, §4.5.4).
pub(crate) struct EngineAnalyserHandler<'a> {
    pub sink: EngineEffectSink<'a>,
    pub os2l: Option<&'a mut Os2lSession>,
    pub effect_controller: &'a mut EffectController,
    pub track: Option<Arc<TrackAnalysis>>,
    /// Song-elapsed seconds at the top of this loop iteration, used to look
    /// up the track's per-second beat strength for outbound beat messages.
    pub current_sec: f64,
    pub debug: bool,
}

impl AnalyserHandler for EngineAnalyserHandler<'_> {
    fn on_sound_start(&mut self) {
        self.sink.midi.on_sound_start();
        if let Some(os2l) = self.os2l.as_deref_mut() {
            os2l.send_play_start();
        }
        tracing::info!("sound started");
    }

    fn on_sound_stop(&mut self) {
        self.sink.midi.on_sound_stop();
        if let Some(os2l) = self.os2l.as_deref_mut() {
            os2l.send_play_stop();
        }
        // §1A: last-effect memory resets on transport stop, not on a mere
        // track change.
        self.effect_controller.reset();
        tracing::info!("sound stopped");
    }

    fn on_onset(&mut self) {
        if self.debug {
            tracing::trace!("onset");
        }
    }

    fn on_beat(&mut self, beat_count: u64, bpm: f64, bpm_changed: bool) {
        if let Some(os2l) = self.os2l.as_deref_mut() {
            let strength = self
                .track
                .as_deref()
                .map(|t| t.beat_strength_at_sec(self.current_sec.max(0.0) as usize))
                .unwrap_or(0.0);
            os2l.send_beat(bpm_changed, beat_count as i64, bpm.round() as i64, strength);
        }
        if self.debug {
            tracing::trace!(beat_count, bpm, bpm_changed, "beat");
        }
    }

    fn on_note(&mut self, midi_note: u8) {
        self.effect_controller.pulse_overlay(&mut self.sink);
        if self.debug {
            tracing::trace!(midi_note, "note");
        }
    }
}

/// Feeds the track-analysis poller's track-identity notifications to the
/// analyser's re-alignment hook, the effect controller's section lookup,
/// and an OS2L `song_loaded` announcement (§4.5.5, §4.7). Constructed fresh
/// by `Engine::sync_track` each time it runs, never during `analyse`, so it
/// borrows the analyser directly rather than going through it.
pub(crate) struct EngineTrackSyncHandler<'a> {
    pub analyser: &'a mut AudioAnalyser,
    pub os2l: Option<&'a mut Os2lSession>,
    pub effect_controller: &'a mut EffectController,
}

impl EngineTrackSyncHandler<'_> {
    fn resync(&mut self, track: &TrackAnalysis) {
        self.analyser.inject(track.current_beat_count as u64, track.progress_ms);
        let current_sec = self.analyser.song_elapsed_sec(Instant::now());
        self.effect_controller.resync(current_sec, track);
    }
}

impl AnalyserHandler for EngineTrackSyncHandler<'_> {
    fn on_spotify_track_changed(&mut self, track: &TrackAnalysis) {
        self.resync(track);
        if let Some(os2l) = self.os2l.as_deref_mut() {
            let beat_pos = self.analyser.fractional_beat_position(Instant::now());
            os2l.send_song_loaded(track.progress_ms, beat_pos, track.first_downbeat_ms, track.bpm);
            os2l.send_play_start();
        }
        tracing::info!(
            track = %track.track_name,
            album = %track.album_name,
            artists = ?track.artists,
            light_show_type = ?track.light_show_type,
            release_date = %track.release_date,
            popularity = track.popularity,
            "track analysis loaded"
        );
    }

    fn on_spotify_track_progress_changed(&mut self, track: &TrackAnalysis) {
        self.resync(track);
        if let Some(os2l) = self.os2l.as_deref_mut() {
            let beat_pos = self.analyser.fractional_beat_position(Instant::now());
            os2l.send_song_loaded(track.progress_ms, beat_pos, track.first_downbeat_ms, track.bpm);
        }
        tracing::info!(
            track = %track.track_name,
            progress_ms = track.progress_ms,
            "track progress discontinuity detected, resyncing"
        );
    }
}

/// Feeds the change detector's section-change callback to the effect
/// controller, applying picked effects through the MIDI/DMX sink (§4.6).
pub(crate) struct EngineChangeHandler<'a> {
    pub effect_controller: &'a mut EffectController,
    pub sink: EngineEffectSink<'a>,
    pub track: Option<Arc<TrackAnalysis>>,
}

impl ChangeHandler for EngineChangeHandler<'_> {
    fn on_section_change(&mut self, current_sec: f64) {
        match self.track.as_deref() {
            Some(track) => self.effect_controller.change_effect(current_sec, track, &mut self.sink),
            None => tracing::debug!(current_sec, "section change with no track loaded, ignoring"),
        }
    }
}
