//! Mel-scale filterbank energies and MFCCs, built on top of [`crate::fft`].

use crate::fft::{Fft, Window};

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10f32.powf(mel / 2595.0) - 1.0)
}

/// A bank of triangular filters spaced evenly on the mel scale, applied to a
/// magnitude spectrum to produce band energies.
pub struct MelFilterbank {
    /// `(bin_start, bin_peak, bin_end)` per filter, as FFT bin indices.
    filters: Vec<(usize, usize, usize)>,
    fft_size: usize,
}

impl MelFilterbank {
    /// Build a filterbank with `n_filters` triangular bands spanning
    /// `[low_hz, high_hz]` for the given FFT size and sample rate.
    pub fn new(n_filters: usize, fft_size: usize, sample_rate: f32, low_hz: f32, high_hz: f32) -> Self {
        let low_mel = hz_to_mel(low_hz);
        let high_mel = hz_to_mel(high_hz);
        let n_bins = fft_size / 2 + 1;

        let mel_points: Vec<f32> = (0..n_filters + 2)
            .map(|i| low_mel + (high_mel - low_mel) * i as f32 / (n_filters + 1) as f32)
            .collect();
        let hz_points: Vec<f32> = mel_points.iter().map(|&m| mel_to_hz(m)).collect();
        let bin_points: Vec<usize> = hz_points
            .iter()
            .map(|&hz| {
                ((fft_size as f32 + 1.0) * hz / sample_rate)
                    .floor()
                    .clamp(0.0, (n_bins - 1) as f32) as usize
            })
            .collect();

        let filters = (0..n_filters)
            .map(|i| (bin_points[i], bin_points[i + 1], bin_points[i + 2]))
            .collect();

        Self { filters, fft_size }
    }

    /// Number of filters in the bank.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply the filterbank to a magnitude spectrum (length `fft_size/2 + 1`),
    /// returning one energy value per filter.
    pub fn energies(&self, magnitude_spectrum: &[f32]) -> Vec<f32> {
        self.filters
            .iter()
            .map(|&(start, peak, end)| {
                let mut energy = 0.0f32;
                for bin in start..=end.min(magnitude_spectrum.len().saturating_sub(1)) {
                    let weight = if bin <= peak {
                        if peak == start { 1.0 } else { (bin - start) as f32 / (peak - start) as f32 }
                    } else if end == peak {
                        1.0
                    } else {
                        (end - bin) as f32 / (end - peak) as f32
                    };
                    energy += weight * magnitude_spectrum[bin];
                }
                energy
            })
            .collect()
    }
}

/// Compute mel-band energies directly from a time-domain frame.
pub fn mel_band_energies(frame: &[f32], fft: &Fft, bank: &MelFilterbank) -> Vec<f32> {
    let mut windowed = frame.to_vec();
    windowed.resize(fft.size(), 0.0);
    Window::Hann.apply(&mut windowed);
    let spectrum = fft.forward(&windowed);
    let magnitudes: Vec<f32> = spectrum.iter().map(|c| c.norm()).collect();
    bank.energies(&magnitudes)
}

/// Discrete cosine transform (type II) of log mel-band energies, truncated
/// to `n_coeffs` — the standard MFCC computation.
pub fn mfcc(log_mel_energies: &[f32], n_coeffs: usize) -> Vec<f32> {
    let n = log_mel_energies.len();
    (0..n_coeffs)
        .map(|k| {
            let mut sum = 0.0f32;
            for (i, &e) in log_mel_energies.iter().enumerate() {
                sum += e * (std::f32::consts::PI * k as f32 * (i as f32 + 0.5) / n as f32).cos();
            }
            sum
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filterbank_produces_requested_band_count() {
        let bank = MelFilterbank::new(26, 1024, 44100.0, 20.0, 22050.0);
        assert_eq!(bank.len(), 26);
    }

    #[test]
    fn energies_are_nonnegative() {
        let bank = MelFilterbank::new(10, 512, 44100.0, 20.0, 20000.0);
        let spectrum = vec![1.0f32; 512 / 2 + 1];
        let energies = bank.energies(&spectrum);
        assert!(energies.iter().all(|&e| e >= 0.0));
    }

    #[test]
    fn silent_spectrum_yields_zero_energies() {
        let bank = MelFilterbank::new(10, 512, 44100.0, 20.0, 20000.0);
        let spectrum = vec![0.0f32; 512 / 2 + 1];
        let energies = bank.energies(&spectrum);
        assert!(energies.iter().all(|&e| e == 0.0));
    }

    #[test]
    fn mfcc_length_matches_requested_coeffs() {
        let log_mel = vec![1.0f32; 26];
        let coeffs = mfcc(&log_mel, 13);
        assert_eq!(coeffs.len(), 13);
    }
}
