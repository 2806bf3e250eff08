//! The per-frame audio analysis pipeline: pitch, MFCC/mel energies, silence
//! tracking, onset/beat/note detection, and handler dispatch.

use std::time::Instant;

use crate::fft::{Fft, Window};
use crate::handler::AnalyserHandler;
use crate::mel::{mel_band_energies, mfcc, MelFilterbank};
use crate::onset::OnsetDetector;
use crate::pitch::{estimate_pitch, hz_to_midi_note};
use crate::state::AnalyserState;
use crate::tempo::BeatTracker;

const N_MEL_FILTERS: usize = 26;
const N_MFCC: usize = 13;
const PITCH_MIN_HZ: f32 = 60.0;
const PITCH_MAX_HZ: f32 = 1500.0;
const PITCH_CONFIDENCE_GATE: f32 = 0.6;

/// Ties the DSP primitives together into the stateful pipeline described for
/// one audio channel: one `analyse` call per incoming frame.
pub struct AudioAnalyser {
    fft: Fft,
    mel_bank: MelFilterbank,
    onset: OnsetDetector,
    tempo: BeatTracker,
    state: AnalyserState,
    sample_rate: f32,
}

impl AudioAnalyser {
    pub fn new(fft_size: usize, sample_rate: f32) -> Self {
        Self {
            fft: Fft::new(fft_size),
            mel_bank: MelFilterbank::new(N_MEL_FILTERS, fft_size, sample_rate, 20.0, sample_rate / 2.0),
            onset: OnsetDetector::new(),
            tempo: BeatTracker::new(),
            state: AnalyserState::new(Instant::now()),
            sample_rate,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn beat_count(&self) -> u64 {
        self.state.beat_count
    }

    /// Fractional beat position at time `t` (see §4.5.3).
    pub fn fractional_beat_position(&self, t: Instant) -> f64 {
        self.state.fractional_beat_position(t)
    }

    /// Seconds elapsed since the current song started (or was last reset
    /// or injected into), used by the engine to drive section lookups.
    pub fn song_elapsed_sec(&self, now: Instant) -> f64 {
        now.duration_since(self.state.song_start_time).as_secs_f64()
    }

    /// Re-align locally tracked beat count and song start time to an
    /// external authority (e.g. a freshly fetched track analysis).
    pub fn inject(&mut self, current_beat_count: u64, progress_ms: u64) {
        self.state.inject(current_beat_count, progress_ms, Instant::now());
    }

    /// Analyse one frame, dispatching callbacks on `handler`. Returns the
    /// frame unchanged; callers that want a debug click track mixed in may
    /// do so themselves.
    pub fn analyse(&mut self, frame: &[f32], handler: &mut impl AnalyserHandler) -> Vec<f32> {
        let now = Instant::now();

        let (pitch_hz, pitch_confidence) =
            estimate_pitch(frame, self.sample_rate, PITCH_MIN_HZ, PITCH_MAX_HZ);

        let mel_energies = mel_band_energies(frame, &self.fft, &self.mel_bank);
        let log_mel: Vec<f32> = mel_energies.iter().map(|&e| (e.max(1e-10)).ln()).collect();
        let _mfcc = mfcc(&log_mel, N_MFCC);

        let mut windowed = frame.to_vec();
        windowed.resize(self.fft.size(), 0.0);
        Window::Hann.apply(&mut windowed);
        let spectrum = self.fft.forward(&windowed);
        let magnitude: Vec<f32> = spectrum.iter().map(|c| c.norm()).collect();

        let (started, stopped) = self.state.update_silence(&mel_energies, now);
        if started {
            handler.on_sound_start();
        }
        if stopped {
            handler.on_sound_stop();
        }

        let onset_fired = self.onset.process(&magnitude);
        if onset_fired {
            handler.on_onset();
        }

        if let Some(bpm) = self.tempo.process(onset_fired, now) {
            let (beat_count, bpm, bpm_changed) = self.state.update_beat(bpm, now);
            handler.on_beat(beat_count, bpm, bpm_changed);
        }

        if pitch_hz > 0.0 && pitch_confidence > PITCH_CONFIDENCE_GATE && self.state.note_may_fire(now) {
            self.state.mark_note_fired(now);
            handler.on_note(hz_to_midi_note(pitch_hz));
        }

        if self.state.should_reset_for_duration(now) {
            self.state.reset(now);
            self.onset.reset();
            self.tempo.reset();
        }

        frame.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::NullAnalyserHandler;

    fn click_track(sample_rate: f32, bpm: f32, seconds: f32, frame_len: usize) -> Vec<Vec<f32>> {
        let samples_per_beat = (sample_rate * 60.0 / bpm) as usize;
        let total_samples = (sample_rate * seconds) as usize;
        let mut signal = vec![0.0f32; total_samples];
        let mut i = 0;
        while i < total_samples {
            for k in 0..32.min(total_samples - i) {
                signal[i + k] = 1.0 - (k as f32 / 32.0);
            }
            i += samples_per_beat;
        }
        signal.chunks(frame_len).map(|c| c.to_vec()).collect()
    }

    #[test]
    fn silence_never_starts_playing() {
        let mut analyser = AudioAnalyser::new(512, 44100.0);
        let mut handler = NullAnalyserHandler;
        let silence = vec![0.0f32; 512];
        for _ in 0..50 {
            analyser.analyse(&silence, &mut handler);
        }
        assert!(!analyser.is_playing());
    }

    #[test]
    fn click_track_accumulates_beats() {
        let mut analyser = AudioAnalyser::new(512, 44100.0);
        let mut handler = NullAnalyserHandler;
        for frame in click_track(44100.0, 120.0, 10.0, 512) {
            analyser.analyse(&frame, &mut handler);
        }
        // a real beat tracker would land near 20 beats for 120 BPM over 10s;
        // we only assert it produced a plausible positive count here.
        assert!(analyser.beat_count() > 0);
    }

    #[test]
    fn inject_overrides_local_beat_count() {
        let mut analyser = AudioAnalyser::new(512, 44100.0);
        analyser.inject(42, 5_000);
        assert_eq!(analyser.beat_count(), 42);
    }
}
