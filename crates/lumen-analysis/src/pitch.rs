//! Time-domain autocorrelation pitch estimation.

/// Estimate the fundamental frequency of `frame` via normalized
/// autocorrelation over the given pitch search range.
///
/// Returns `(pitch_hz, confidence)`; confidence is the normalized
/// autocorrelation peak height in `[0, 1]`. A silent or unpitched frame
/// yields `(0.0, 0.0)`.
pub fn estimate_pitch(frame: &[f32], sample_rate: f32, min_hz: f32, max_hz: f32) -> (f32, f32) {
    let min_lag = (sample_rate / max_hz) as usize;
    let max_lag = ((sample_rate / min_hz) as usize).min(frame.len().saturating_sub(1));
    if min_lag == 0 || max_lag <= min_lag || frame.is_empty() {
        return (0.0, 0.0);
    }

    let energy: f32 = frame.iter().map(|&x| x * x).sum();
    if energy < 1e-8 {
        return (0.0, 0.0);
    }

    let mut best_lag = 0usize;
    let mut best_corr = 0.0f32;
    for lag in min_lag..=max_lag {
        let mut corr = 0.0f32;
        for i in 0..frame.len() - lag {
            corr += frame[i] * frame[i + lag];
        }
        let normalized = corr / energy;
        if normalized > best_corr {
            best_corr = normalized;
            best_lag = lag;
        }
    }

    if best_lag == 0 || best_corr < 0.1 {
        return (0.0, 0.0);
    }

    (sample_rate / best_lag as f32, best_corr.clamp(0.0, 1.0))
}

/// Convert a frequency in Hz to the nearest MIDI note number (A4 = 69 = 440 Hz).
pub fn hz_to_midi_note(hz: f32) -> u8 {
    if hz <= 0.0 {
        return 0;
    }
    let note = 69.0 + 12.0 * (hz / 440.0).log2();
    note.round().clamp(0.0, 127.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, sample_rate: f32, n: usize) -> Vec<f32> {
        (0..n).map(|i| (2.0 * PI * freq * i as f32 / sample_rate).sin()).collect()
    }

    #[test]
    fn silence_yields_zero_confidence() {
        let frame = vec![0.0f32; 1024];
        let (hz, conf) = estimate_pitch(&frame, 44100.0, 80.0, 1000.0);
        assert_eq!(hz, 0.0);
        assert_eq!(conf, 0.0);
    }

    #[test]
    fn pure_tone_recovers_approximate_frequency() {
        let frame = sine(220.0, 44100.0, 2048);
        let (hz, conf) = estimate_pitch(&frame, 44100.0, 80.0, 1000.0);
        assert!((hz - 220.0).abs() < 10.0, "got {hz}");
        assert!(conf > 0.5);
    }

    #[test]
    fn a4_maps_to_midi_69() {
        assert_eq!(hz_to_midi_note(440.0), 69);
    }
}
