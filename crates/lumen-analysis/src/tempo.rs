//! Inter-onset-interval beat tracking.
//!
//! A simplified tempo estimator: each onset that arrives within a plausible
//! beat-to-beat interval of the previous one is treated as a beat pulse, and
//! the tempo is the median of the last few such intervals. This keeps the
//! external contract from §4.5.3 (one `bpm` sample per beat, `bpm_changed`
//! comparison against the previous sample) without depending on an external
//! beat-tracking library.
use std::collections::VecDeque;
use std::time::Instant;

const MIN_IOI_SEC: f64 = 0.25; // 240 BPM upper bound
const MAX_IOI_SEC: f64 = 1.2; // 50 BPM lower bound
const HISTORY: usize = 8;

pub struct BeatTracker {
    last_onset: Option<Instant>,
    iois: VecDeque<f64>,
}

impl BeatTracker {
    pub fn new() -> Self {
        Self {
            last_onset: None,
            iois: VecDeque::with_capacity(HISTORY),
        }
    }

    /// Feed one frame's onset flag. Returns `Some(bpm)` if a beat fires this
    /// frame.
    pub fn process(&mut self, onset: bool, now: Instant) -> Option<f64> {
        if !onset {
            return None;
        }

        let fired = if let Some(last) = self.last_onset {
            let ioi = now.duration_since(last).as_secs_f64();
            if (MIN_IOI_SEC..=MAX_IOI_SEC).contains(&ioi) {
                self.iois.push_back(ioi);
                if self.iois.len() > HISTORY {
                    self.iois.pop_front();
                }
                true
            } else {
                false
            }
        } else {
            false
        };

        self.last_onset = Some(now);

        if fired {
            Some(60.0 / median(&self.iois))
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.last_onset = None;
        self.iois.clear();
    }
}

impl Default for BeatTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn median(values: &VecDeque<f64>) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = sorted.len();
    if n == 0 {
        return 0.5;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn no_onset_never_fires() {
        let mut t = BeatTracker::new();
        assert_eq!(t.process(false, Instant::now()), None);
    }

    #[test]
    fn first_onset_establishes_no_beat() {
        let mut t = BeatTracker::new();
        assert_eq!(t.process(true, Instant::now()), None);
    }

    #[test]
    fn steady_120_bpm_clicks_converge_to_120() {
        let mut t = BeatTracker::new();
        let start = Instant::now();
        let period = Duration::from_millis(500); // 120 BPM
        let mut bpm = None;
        for i in 0..10 {
            bpm = t.process(true, start + period * i);
        }
        assert!((bpm.unwrap() - 120.0).abs() < 1.0);
    }

    #[test]
    fn implausible_interval_does_not_fire() {
        let mut t = BeatTracker::new();
        let start = Instant::now();
        t.process(true, start);
        // 5 second gap — not a plausible beat interval
        assert_eq!(t.process(true, start + Duration::from_secs(5)), None);
    }
}
