//! Median-absolute-deviation outlier detection.

use std::collections::VecDeque;

const DEFAULT_THRESHOLD: f64 = 2.5;

fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// True iff `value` is a MAD-based outlier against `history`, using the
/// modified z-score `0.6745 * (value - median) / mad`. A zero MAD (fully
/// flat history) never flags an outlier.
pub fn is_outlier_mad(history: &VecDeque<f64>, value: f64, threshold: f64) -> bool {
    if history.is_empty() {
        return false;
    }
    let mut sorted: Vec<f64> = history.iter().copied().collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let med = median(&sorted);

    let mut deviations: Vec<f64> = sorted.iter().map(|&x| (x - med).abs()).collect();
    deviations.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mad = median(&deviations);

    if mad == 0.0 {
        return false;
    }

    let z = 0.6745 * (value - med) / mad;
    z.abs() > threshold
}

pub fn is_outlier(history: &VecDeque<f64>, value: f64) -> bool {
    is_outlier_mad(history, value, DEFAULT_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_history_never_flags_outliers() {
        let history: VecDeque<f64> = (0..10).map(|_| 0.5).collect();
        assert!(!is_outlier(&history, 0.9));
    }

    #[test]
    fn empty_history_never_flags_outliers() {
        let history: VecDeque<f64> = VecDeque::new();
        assert!(!is_outlier(&history, 1.0));
    }

    #[test]
    fn far_outlier_is_flagged() {
        let mut history: VecDeque<f64> = VecDeque::new();
        for i in 0..30 {
            history.push_back(0.5 + (i % 3) as f64 * 0.01);
        }
        assert!(is_outlier(&history, 10.0));
    }

    #[test]
    fn in_range_value_is_not_flagged() {
        let mut history: VecDeque<f64> = VecDeque::new();
        for i in 0..30 {
            history.push_back(0.5 + (i % 3) as f64 * 0.01);
        }
        assert!(!is_outlier(&history, 0.51));
    }
}
