//! Quantile normalization for per-second beat strength values.

/// Rescale `values` to `[0, 1]` by quantile rank (each value's fraction of
/// the sample that falls at or below it), rather than by min/max range.
///
/// Mirrors the streaming-service analysis pipeline's use of a quantile
/// transformer on raw `loudness_max * loudness_max_time` beat-strength
/// products, which is robust to the occasional very loud outlier segment
/// that a min/max rescale would compress everything else against.
pub fn quantile_normalize(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![0.5];
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap());

    let mut ranks = vec![0.0; n];
    for (rank, &idx) in order.iter().enumerate() {
        ranks[idx] = rank as f64 / (n - 1) as f64;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_value_maps_to_midpoint() {
        assert_eq!(quantile_normalize(&[5.0]), vec![0.5]);
    }

    #[test]
    fn preserves_rank_order() {
        let out = quantile_normalize(&[3.0, 1.0, 2.0]);
        assert_eq!(out[1], 0.0);
        assert_eq!(out[2], 0.5);
        assert_eq!(out[0], 1.0);
    }

    #[test]
    fn output_bounded_zero_one() {
        let out = quantile_normalize(&[10.0, -5.0, 0.0, 100.0, 3.0]);
        for v in out {
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
