//! Maps section-change events to lighting effects and applies them (§4.6).

use std::time::{Duration, Instant};

use lumen_midi::channel::NoteChannel;
use lumen_midi::SPECIAL_EFFECT_DURATION;
use lumen_track::{AudioSection, LightShowType, TrackAnalysis};
use rand::seq::SliceRandom;

use crate::effect::Effect;
use crate::pools;
use crate::sink::EffectSink;

/// Host-processing-latency compensation applied before the section lookup.
const SECTION_LOOKBACK_SEC: f64 = 1.0;
/// Snap-forward window: within this many seconds of a section's end, the
/// lookup may round up to the next section.
const SECTION_SNAP_WINDOW_SEC: f64 = 5.0;
/// Colour-override reapplication cooldown.
const COLOR_OVERRIDE_COOLDOWN: Duration = Duration::from_secs(5 * 60);

const HIGH_ESCALATE_RATIO: f64 = 1.25;
const HIGH_DEESCALATE_RATIO: f64 = 0.7;

/// Owns the section-tracking and last-effect state driving effect
/// selection; stateless between tracks (reset whenever the lookup fails).
#[derive(Default)]
pub struct EffectController {
    current_section_index: Option<usize>,
    last_audio_section: Option<AudioSection>,
    last_effect: Option<Effect>,
    last_special_effect: Option<Effect>,
    last_color_override: Option<NoteChannel>,
    last_color_override_time: Option<Instant>,
}

impl EffectController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all section/effect memory. Called internally when a
    /// section-change arrives before a known section, and by the engine on
    /// `on_sound_stop` (last-effect memory resets on transport stop, not on
    /// a mere track change — see §1A).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn current_section_index(&self) -> Option<usize> {
        self.current_section_index
    }

    /// Recompute `current_section_index`/`last_audio_section` for a freshly
    /// loaded or resynced track, without touching last-effect/colour-override
    /// memory — that only resets on `on_sound_stop` (see §1A, and this
    /// crate's `reset`). Mirrors the Python original's `update_audio_section`,
    /// called on both a track change and a progress-discontinuity resync.
    pub fn resync(&mut self, current_sec: f64, track: &TrackAnalysis) {
        match track.section_at(current_sec) {
            Some(index) => {
                self.current_section_index = Some(index);
                self.last_audio_section = Some(track.audio_sections[index].clone());
            }
            None => {
                self.current_section_index = None;
                self.last_audio_section = None;
            }
        }
    }

    /// Handle a section-change event at `current_sec` into `track`,
    /// picking and applying a new effect via `sink`.
    pub fn change_effect(&mut self, current_sec: f64, track: &TrackAnalysis, sink: &mut dyn EffectSink) {
        let adjusted = current_sec - SECTION_LOOKBACK_SEC;
        let Some(mut index) = track.section_at(adjusted) else {
            self.reset();
            return;
        };

        if let Some(next) = track.audio_sections.get(index + 1) {
            let current = &track.audio_sections[index];
            let time_to_end = current.end_sec() - adjusted;
            if time_to_end <= SECTION_SNAP_WINDOW_SEC {
                let dist_to_next = (next.start_sec - adjusted).abs();
                let dist_to_current_start = (adjusted - current.start_sec).abs();
                if dist_to_next < dist_to_current_start {
                    index += 1;
                }
            }
        }

        let previous_section = self.last_audio_section.take();
        let current_section = track.audio_sections[index].clone();
        self.current_section_index = Some(index);
        self.last_audio_section = Some(current_section.clone());

        let mut rng = rand::thread_rng();
        let effect = self.pick_effect(track, previous_section.as_ref(), &current_section, &mut rng);
        self.apply(effect, sink, Instant::now());
    }

    fn pick_effect(
        &mut self,
        track: &TrackAnalysis,
        previous_section: Option<&AudioSection>,
        current_section: &AudioSection,
        rng: &mut impl rand::Rng,
    ) -> Effect {
        match track.light_show_type {
            LightShowType::Low => pick_excluding(&pools::low(), self.last_effect, rng),
            LightShowType::Medium => pick_excluding(&pools::medium(), self.last_effect, rng),
            LightShowType::HipHop => pick_excluding(&pools::hip_hop(), self.last_effect, rng),
            LightShowType::High => {
                self.pick_high_effect(track, previous_section, current_section, rng)
            }
        }
    }

    fn pick_high_effect(
        &mut self,
        track: &TrackAnalysis,
        previous_section: Option<&AudioSection>,
        current_section: &AudioSection,
        rng: &mut impl rand::Rng,
    ) -> Effect {
        let track_ratio = track.loudness / current_section.loudness;

        if let Some(previous) = previous_section {
            let r_prev = previous.loudness / current_section.loudness;
            if r_prev > HIGH_ESCALATE_RATIO {
                let special = pick_excluding(&pools::special_effects(), self.last_special_effect, rng);
                self.last_special_effect = Some(special);
                return special;
            }
            if r_prev < HIGH_DEESCALATE_RATIO || track_ratio < HIGH_DEESCALATE_RATIO {
                return pick_excluding(&pools::low(), self.last_effect, rng);
            }
        } else if track_ratio < HIGH_DEESCALATE_RATIO {
            return pick_excluding(&pools::low(), self.last_effect, rng);
        }

        pick_excluding(&pools::high(), self.last_effect, rng)
    }

    /// Pulse the chase-style DMX overlay on a detected note (§4.5.4),
    /// independent of the section-driven autoloop/special-effect picking
    /// above. Routed through [`pools::overlays`] rather than a bare
    /// `Effect::Overlay(0)` literal so the set of addressable overlays
    /// still lives in one place.
    pub fn pulse_overlay(&mut self, sink: &mut dyn EffectSink) {
        if let Some(&effect) = pools::overlays().first() {
            self.apply(effect, sink, Instant::now());
        }
    }

    fn apply(&mut self, effect: Effect, sink: &mut dyn EffectSink, now: Instant) {
        match effect {
            Effect::Autoloop(channel) => {
                sink.pulse_autoloop(channel);
                self.apply_color_override(sink, now);
            }
            Effect::SpecialEffect(channel) => {
                sink.fire_special_effect(channel, SPECIAL_EFFECT_DURATION);
            }
            Effect::ColorOverride(channel) => {
                sink.set_color_override(channel);
                self.last_color_override = Some(channel);
                self.last_color_override_time = Some(now);
            }
            Effect::Overlay(overlay_index) => sink.activate_overlay(overlay_index),
        }
        self.last_effect = Some(effect);
    }

    fn apply_color_override(&mut self, sink: &mut dyn EffectSink, now: Instant) {
        let cooled_down = self
            .last_color_override_time
            .is_none_or(|last| now.duration_since(last) >= COLOR_OVERRIDE_COOLDOWN);

        if !cooled_down {
            sink.clear_color_overrides();
            return;
        }

        let exclude = self.last_color_override.map(Effect::ColorOverride);
        let mut rng = rand::thread_rng();
        if let Effect::ColorOverride(channel) = pick_excluding(&pools::color_overrides(), exclude, &mut rng) {
            sink.set_color_override(channel);
            self.last_color_override = Some(channel);
            self.last_color_override_time = Some(now);
        }
    }
}

fn pick_excluding(pool: &[Effect], exclude: Option<Effect>, rng: &mut impl rand::Rng) -> Effect {
    let candidates: Vec<Effect> = match exclude {
        Some(excluded) if pool.len() > 1 => pool.iter().copied().filter(|&e| e != excluded).collect(),
        _ => pool.to_vec(),
    };
    *candidates.choose(rng).expect("effect pools are never empty")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::test_support::RecordingSink;
    use lumen_track::LightShowType;

    fn section(start: f64, dur: f64, loudness: f64) -> AudioSection {
        AudioSection { start_sec: start, duration_sec: dur, loudness, bpm: 120.0, key: 0, mode: 1, time_signature: 4 }
    }

    fn track(light_show_type: LightShowType, sections: Vec<AudioSection>) -> TrackAnalysis {
        TrackAnalysis {
            track_name: "t".into(),
            album_name: "a".into(),
            artists: vec![],
            progress_ms: 0,
            duration_ms: 1,
            first_downbeat_ms: 0,
            beats_to_first_downbeat: 0,
            current_beat_count: 0,
            bpm: 120.0,
            key: 0,
            mode: 1,
            time_signature: 4,
            acousticness: 0.0,
            danceability: 0.0,
            energy: 0.0,
            instrumentalness: 0.0,
            liveness: 0.0,
            loudness: -6.0,
            speechiness: 0.0,
            valence: 0.0,
            tempo: 120.0,
            release_date: String::new(),
            popularity: 0,
            genres: vec![],
            light_show_type,
            beat_strengths_by_sec: vec![],
            audio_sections: sections,
        }
    }

    #[test]
    fn unknown_timestamp_resets_state() {
        let mut controller = EffectController::new();
        let t = track(LightShowType::Low, vec![section(10.0, 10.0, -6.0)]);
        let mut sink = RecordingSink::default();
        controller.change_effect(2.0, &t, &mut sink);
        assert_eq!(controller.current_section_index(), None);
        assert!(sink.calls.is_empty());
    }

    #[test]
    fn low_pool_pulses_an_autoloop() {
        let mut controller = EffectController::new();
        let t = track(LightShowType::Low, vec![section(0.0, 30.0, -6.0)]);
        let mut sink = RecordingSink::default();
        controller.change_effect(5.0, &t, &mut sink);
        assert_eq!(controller.current_section_index(), Some(0));
        assert!(matches!(sink.calls[0], crate::sink::test_support::Call::Autoloop(_)));
    }

    #[test]
    fn high_escalation_fires_special_effect() {
        let mut controller = EffectController::new();
        let sections = vec![section(0.0, 10.0, -20.0), section(10.0, 30.0, -6.0)];
        let t = track(LightShowType::High, sections);
        let mut sink = RecordingSink::default();
        // First call seeds last_audio_section with the quiet section.
        controller.change_effect(6.0, &t, &mut sink);
        sink.calls.clear();
        // Second call lands in the loud section; r_prev = -20/-6 escalates.
        controller.change_effect(16.0, &t, &mut sink);
        assert!(matches!(
            sink.calls[0],
            crate::sink::test_support::Call::SpecialEffect(_, _)
        ));
    }

    #[test]
    fn resync_finds_section_without_touching_last_effect() {
        let mut controller = EffectController::new();
        controller.last_effect = Some(Effect::Autoloop(5));
        let t = track(LightShowType::Low, vec![section(0.0, 10.0, -6.0), section(10.0, 20.0, -6.0)]);
        controller.resync(12.0, &t);
        assert_eq!(controller.current_section_index(), Some(1));
        assert_eq!(controller.last_effect, Some(Effect::Autoloop(5)));
    }

    #[test]
    fn resync_with_unknown_timestamp_clears_section() {
        let mut controller = EffectController::new();
        let t = track(LightShowType::Low, vec![section(10.0, 10.0, -6.0)]);
        controller.resync(2.0, &t);
        assert_eq!(controller.current_section_index(), None);
    }

    #[test]
    fn pulse_overlay_activates_the_registered_overlay() {
        let mut controller = EffectController::new();
        let mut sink = RecordingSink::default();
        controller.pulse_overlay(&mut sink);
        assert_eq!(sink.calls, vec![crate::sink::test_support::Call::Overlay(0)]);
    }

    #[test]
    fn color_override_cleared_within_cooldown() {
        let mut controller = EffectController::new();
        controller.last_color_override_time = Some(Instant::now());
        controller.last_color_override = Some(50);
        let t = track(LightShowType::Low, vec![section(0.0, 30.0, -6.0)]);
        let mut sink = RecordingSink::default();
        controller.change_effect(5.0, &t, &mut sink);
        assert!(sink
            .calls
            .iter()
            .any(|c| matches!(c, crate::sink::test_support::Call::ClearColorOverrides)));
    }
}
