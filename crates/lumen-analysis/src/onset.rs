//! Spectral-flux onset detection with an adaptive threshold.

use crate::spectrum::spectral_flux;

const HISTORY_LEN: usize = 43; // ~1 s of history at a 256-sample / 44.1 kHz hop
const THRESHOLD_MULTIPLIER: f32 = 1.5;

/// Detects onsets (new sonic energy) from successive magnitude spectra via
/// spectral flux against an adaptive, rolling-mean threshold.
pub struct OnsetDetector {
    prev_spectrum: Option<Vec<f32>>,
    flux_history: Vec<f32>,
}

impl OnsetDetector {
    pub fn new() -> Self {
        Self {
            prev_spectrum: None,
            flux_history: Vec::with_capacity(HISTORY_LEN),
        }
    }

    /// Feed the current frame's magnitude spectrum. Returns `true` if this
    /// frame's flux exceeds the adaptive threshold (an onset).
    pub fn process(&mut self, magnitude_spectrum: &[f32]) -> bool {
        let flux = match &self.prev_spectrum {
            Some(prev) => spectral_flux(prev, magnitude_spectrum),
            None => 0.0,
        };
        self.prev_spectrum = Some(magnitude_spectrum.to_vec());

        let mean: f32 = if self.flux_history.is_empty() {
            0.0
        } else {
            self.flux_history.iter().sum::<f32>() / self.flux_history.len() as f32
        };
        let threshold = mean * THRESHOLD_MULTIPLIER;
        let is_onset = flux > 0.0 && flux > threshold && flux > 1e-6;

        self.flux_history.push(flux);
        if self.flux_history.len() > HISTORY_LEN {
            self.flux_history.remove(0);
        }

        is_onset
    }

    pub fn reset(&mut self) {
        self.prev_spectrum = None;
        self.flux_history.clear();
    }
}

impl Default for OnsetDetector {
    fn default() -> Self {
        Self::new()
    }
}
