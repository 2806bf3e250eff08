//! Transport state shared by the silence/beat/note state machines in
//! [`crate::analyser::AudioAnalyser`].

use std::time::Instant;

const SILENCE_THRESHOLD: f32 = 1e-4;
const SILENCE_TO_STOP_SEC: f64 = 0.3;
const SILENCE_TO_START_SEC: f64 = 0.3;
const NOTE_REFRACTORY_SEC: f64 = 0.075;
const BPM_CHANGE_FRACTION: f64 = 0.05;
const SONG_RESET_SEC: f64 = 15.0 * 60.0;

/// A frame of mel-band energies is silent iff every element lies in
/// `(-SILENCE_THRESHOLD, SILENCE_THRESHOLD)`.
pub fn is_silent(mel_energies: &[f32]) -> bool {
    mel_energies.iter().all(|&e| e.abs() < SILENCE_THRESHOLD)
}

/// Transport/beat/note bookkeeping for one [`crate::analyser::AudioAnalyser`].
pub struct AnalyserState {
    pub is_playing: bool,
    pub song_start_time: Instant,
    pub silence_period_start: Instant,
    pub beat_count: u64,
    pub last_beat_instant: Option<Instant>,
    pub time_to_last_beat_sec: f64,
    pub last_bpm: f64,
    pub last_note_instant: Option<Instant>,
}

impl AnalyserState {
    pub fn new(now: Instant) -> Self {
        Self {
            is_playing: false,
            song_start_time: now,
            silence_period_start: now,
            beat_count: 0,
            last_beat_instant: None,
            time_to_last_beat_sec: 0.0,
            last_bpm: 0.0,
            last_note_instant: None,
        }
    }

    pub fn reset(&mut self, now: Instant) {
        *self = Self::new(now);
    }

    /// Advance the silence/play state machine for one frame. Returns
    /// `(fired_sound_start, fired_sound_stop)`.
    pub fn update_silence(&mut self, mel_energies: &[f32], now: Instant) -> (bool, bool) {
        let silent = is_silent(mel_energies);
        if !silent {
            self.silence_period_start = now;
        }

        let mut started = false;
        let mut stopped = false;

        if self.is_playing
            && now.duration_since(self.silence_period_start).as_secs_f64() > SILENCE_TO_STOP_SEC
        {
            self.is_playing = false;
            self.song_start_time = now;
            stopped = true;
        } else if !self.is_playing
            && now.duration_since(self.song_start_time).as_secs_f64() > SILENCE_TO_START_SEC
        {
            self.is_playing = true;
            started = true;
        }

        (started, stopped)
    }

    /// Register a beat firing. Returns `(beat_count, bpm, bpm_changed)`.
    pub fn update_beat(&mut self, bpm: f64, now: Instant) -> (u64, f64, bool) {
        self.beat_count += 1;
        let bpm_changed =
            self.is_playing && self.last_bpm > 0.0 && (bpm - self.last_bpm).abs() / bpm > BPM_CHANGE_FRACTION;

        if let Some(last) = self.last_beat_instant {
            self.time_to_last_beat_sec = now.duration_since(last).as_secs_f64();
        }
        self.last_beat_instant = Some(now);
        self.last_bpm = bpm;

        (self.beat_count, bpm, bpm_changed)
    }

    /// Fractional beat position at time `t`, interpolating between the last
    /// two beats.
    pub fn fractional_beat_position(&self, t: Instant) -> f64 {
        match self.last_beat_instant {
            Some(last) if self.time_to_last_beat_sec > 0.0 => {
                let elapsed = t.duration_since(last).as_secs_f64();
                self.beat_count as f64 + (elapsed / self.time_to_last_beat_sec).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    /// True if a note may fire (past the refractory period).
    pub fn note_may_fire(&self, now: Instant) -> bool {
        match self.last_note_instant {
            Some(last) => now.duration_since(last).as_secs_f64() >= NOTE_REFRACTORY_SEC,
            None => true,
        }
    }

    pub fn mark_note_fired(&mut self, now: Instant) {
        self.last_note_instant = Some(now);
    }

    /// True once the song has run long enough to warrant debouncing drift by
    /// resetting.
    pub fn should_reset_for_duration(&self, now: Instant) -> bool {
        now.duration_since(self.song_start_time).as_secs_f64() > SONG_RESET_SEC
    }

    /// Re-align locally tracked beat count and song start time to an
    /// external authority.
    pub fn inject(&mut self, current_beat_count: u64, progress_ms: u64, now: Instant) {
        self.beat_count = current_beat_count;
        self.song_start_time = now - std::time::Duration::from_millis(progress_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn silence_detection_respects_threshold() {
        assert!(is_silent(&[0.0, 1e-5, -1e-5]));
        assert!(!is_silent(&[0.0, 2e-4, 0.0]));
    }

    #[test]
    fn sound_start_fires_after_continuous_audio() {
        let start = Instant::now();
        let mut state = AnalyserState::new(start);
        let (started, _) = state.update_silence(&[1.0], start);
        assert!(!started);
        let (started, _) = state.update_silence(&[1.0], start + Duration::from_millis(400));
        assert!(started);
        assert!(state.is_playing);
    }

    #[test]
    fn sound_stop_fires_after_sustained_silence() {
        let start = Instant::now();
        let mut state = AnalyserState::new(start);
        state.update_silence(&[1.0], start + Duration::from_millis(400));
        assert!(state.is_playing);
        let (_, stopped) = state.update_silence(&[0.0], start + Duration::from_millis(800));
        assert!(stopped);
        assert!(!state.is_playing);
    }

    #[test]
    fn beat_count_increments_monotonically() {
        let start = Instant::now();
        let mut state = AnalyserState::new(start);
        let (c1, _, _) = state.update_beat(120.0, start);
        let (c2, _, _) = state.update_beat(120.0, start + Duration::from_millis(500));
        assert_eq!(c1, 1);
        assert_eq!(c2, 2);
    }

    #[test]
    fn note_refractory_period_blocks_rapid_fires() {
        let start = Instant::now();
        let mut state = AnalyserState::new(start);
        assert!(state.note_may_fire(start));
        state.mark_note_fired(start);
        assert!(!state.note_may_fire(start + Duration::from_millis(50)));
        assert!(state.note_may_fire(start + Duration::from_millis(80)));
    }

    #[test]
    fn inject_realigns_beat_count_and_start_time() {
        let start = Instant::now();
        let mut state = AnalyserState::new(start);
        state.inject(42, 5_000, start);
        assert_eq!(state.beat_count, 42);
        assert_eq!(state.song_start_time, start - Duration::from_secs(5));
    }
}
