//! Two-rate exponential smoothing for scalar and vector telemetry.
//!
//! Unlike a single-coefficient one-pole filter, this smoother uses a different
//! decay rate depending on whether the incoming sample is rising or falling
//! relative to the current state — useful for envelope-like quantities (mel
//! energies, onset strength) where attack and release should not track at the
//! same speed.
//!
//! ```text
//! state' = state + alpha * (x - state)
//! alpha  = alpha_rise  if x >= state
//!        = alpha_decay otherwise
//! ```

use crate::math::clamp;

#[cfg(feature = "std")]
use std::vec::Vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Exponential smoother over a single scalar value.
#[derive(Debug, Clone)]
pub struct ExponentialFilter {
    state: f32,
    alpha_rise: f32,
    alpha_decay: f32,
}

impl ExponentialFilter {
    /// Create a filter with the given rise/decay rates, each clamped to `[0, 1]`.
    ///
    /// A rate of `1.0` tracks the input instantly; `0.0` never updates.
    pub fn new(alpha_rise: f32, alpha_decay: f32) -> Self {
        Self {
            state: 0.0,
            alpha_rise: clamp(alpha_rise, 0.0, 1.0),
            alpha_decay: clamp(alpha_decay, 0.0, 1.0),
        }
    }

    /// Create a filter with a single rate used for both rise and decay.
    pub fn symmetric(alpha: f32) -> Self {
        Self::new(alpha, alpha)
    }

    /// Push a new sample through the filter, returning the updated state.
    pub fn update(&mut self, x: f32) -> f32 {
        let alpha = if x >= self.state {
            self.alpha_rise
        } else {
            self.alpha_decay
        };
        self.state += alpha * (x - self.state);
        self.state
    }

    /// Read the current smoothed value without updating it.
    pub fn value(&self) -> f32 {
        self.state
    }

    /// Reset the filter state to zero.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }

    /// Reset the filter state to a specific value.
    pub fn reset_to(&mut self, value: f32) {
        self.state = value;
    }
}

impl Default for ExponentialFilter {
    fn default() -> Self {
        Self::symmetric(0.1)
    }
}

/// Exponential smoother applied elementwise across a fixed-length vector.
///
/// Grows its internal state to match the first input it sees; subsequent
/// calls with a mismatched length are truncated/zero-extended rather than
/// panicking, since callers (mel-band energy vectors) have a stable length
/// in practice.
#[derive(Debug, Clone, Default)]
pub struct ExponentialFilterVec {
    state: Vec<f32>,
    alpha_rise: f32,
    alpha_decay: f32,
}

impl ExponentialFilterVec {
    /// Create a vector smoother with the given rise/decay rates.
    pub fn new(alpha_rise: f32, alpha_decay: f32) -> Self {
        Self {
            state: Vec::new(),
            alpha_rise: clamp(alpha_rise, 0.0, 1.0),
            alpha_decay: clamp(alpha_decay, 0.0, 1.0),
        }
    }

    /// Push a new sample vector through the filter, returning the updated state.
    pub fn update(&mut self, x: &[f32]) -> &[f32] {
        if self.state.len() != x.len() {
            self.state.resize(x.len(), 0.0);
        }
        for (s, &v) in self.state.iter_mut().zip(x.iter()) {
            let alpha = if v >= *s {
                self.alpha_rise
            } else {
                self.alpha_decay
            };
            *s += alpha * (v - *s);
        }
        &self.state
    }

    /// Read the current smoothed vector without updating it.
    pub fn value(&self) -> &[f32] {
        &self.state
    }

    /// Reset all elements to zero.
    pub fn reset(&mut self) {
        self.state.iter_mut().for_each(|s| *s = 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rises_faster_than_it_decays() {
        let mut f = ExponentialFilter::new(0.9, 0.1);
        let up = f.update(1.0);
        f.update(0.0);
        let down = f.update(0.0);
        assert!(up > 0.8, "fast rise should jump close to target, got {up}");
        assert!(down < up, "decay should move state back down");
    }

    #[test]
    fn value_does_not_mutate_state() {
        let mut f = ExponentialFilter::symmetric(0.5);
        f.update(1.0);
        let before = f.value();
        let after = f.value();
        assert_eq!(before, after);
    }

    #[test]
    fn reset_clears_state() {
        let mut f = ExponentialFilter::symmetric(0.5);
        f.update(1.0);
        f.reset();
        assert_eq!(f.value(), 0.0);
    }

    #[test]
    fn vector_smooths_elementwise() {
        let mut f = ExponentialFilterVec::new(1.0, 1.0);
        let out = f.update(&[1.0, 2.0, 3.0]).to_vec();
        assert_eq!(out, vec![1.0, 2.0, 3.0]);
    }
}
