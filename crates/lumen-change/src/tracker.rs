//! Tracks a rolling stream of similarity scores and classifies whether the
//! latest score represents a structural change.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::outliers::is_outlier;

const OUTLIER_WINDOW_SEC: f64 = 1.0;
const SIMILARITY_WINDOW_SEC: f64 = 3.0;
const COOLDOWN_SEC: f64 = 10.0;
const MIN_OUTLIERS_REQUIRED: u32 = 4;
const SIMILARITIES_CAPACITY: usize = 100;
const RECENT_CHANGES_CAPACITY: usize = 3;
const RECENT_CHANGES_SPAN_SEC: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeVerdict {
    No,
    Weak,
    Strong,
}

/// State for one stream of similarity observations.
pub struct ChangeTracker {
    similarities: VecDeque<f64>,
    outlier_count: u32,
    outlier_window_start: Instant,
    similarity_window_start: Instant,
    cooldown_start: Instant,
    recent_changes: VecDeque<Instant>,
}

impl ChangeTracker {
    pub fn new(now: Instant) -> Self {
        Self {
            similarities: VecDeque::with_capacity(SIMILARITIES_CAPACITY),
            outlier_count: 0,
            outlier_window_start: now,
            similarity_window_start: now,
            cooldown_start: now - Duration::from_secs_f64(COOLDOWN_SEC),
            recent_changes: VecDeque::with_capacity(RECENT_CHANGES_CAPACITY),
        }
    }

    /// Feed one observation (a block's change score in `[0, 1]`).
    pub fn observe(&mut self, similarity: f64, now: Instant) {
        if now.duration_since(self.outlier_window_start).as_secs_f64() > OUTLIER_WINDOW_SEC {
            self.outlier_count = 0;
            self.outlier_window_start = now;
        }
        if now.duration_since(self.similarity_window_start).as_secs_f64() > SIMILARITY_WINDOW_SEC {
            self.similarity_window_start = now;
        }

        if is_outlier(&self.similarities, similarity) {
            self.outlier_count += 1;
        }

        self.similarities.push_back(similarity);
        if self.similarities.len() > SIMILARITIES_CAPACITY {
            self.similarities.pop_front();
        }
    }

    fn cooldown_active(&self, now: Instant) -> bool {
        now.duration_since(self.cooldown_start).as_secs_f64() < COOLDOWN_SEC
    }

    pub fn start_cooldown(&mut self, now: Instant) {
        self.cooldown_start = now;
    }

    /// Classify whether the most recent observation indicates a change.
    pub fn is_change(&mut self, now: Instant) -> ChangeVerdict {
        if self.outlier_count <= MIN_OUTLIERS_REQUIRED {
            return ChangeVerdict::No;
        }

        self.outlier_count = 0;
        self.recent_changes.push_back(now);
        if self.recent_changes.len() > RECENT_CHANGES_CAPACITY {
            self.recent_changes.pop_front();
        }

        if self.cooldown_active(now) {
            return ChangeVerdict::No;
        }

        if self.recent_changes.len() == RECENT_CHANGES_CAPACITY {
            let span = now.duration_since(self.recent_changes[0]).as_secs_f64();
            if span < RECENT_CHANGES_SPAN_SEC {
                self.recent_changes.clear();
                return ChangeVerdict::Strong;
            }
        }

        ChangeVerdict::Weak
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn few_outliers_never_change() {
        let now = Instant::now();
        let mut tracker = ChangeTracker::new(now);
        for i in 0..3 {
            tracker.observe(0.9, now + Duration::from_millis(i * 10));
        }
        assert_eq!(tracker.is_change(now), ChangeVerdict::No);
    }

    #[test]
    fn cooldown_suppresses_change() {
        let now = Instant::now();
        let mut tracker = ChangeTracker::new(now);
        tracker.start_cooldown(now);
        for _ in 0..30 {
            tracker.observe(0.5, now);
        }
        tracker.observe(0.99, now);
        for _ in 0..6 {
            tracker.outlier_count_for_test_bump();
        }
        assert_eq!(tracker.is_change(now + Duration::from_millis(100)), ChangeVerdict::No);
    }

    #[test]
    fn sustained_changes_escalate_to_strong() {
        let now = Instant::now();
        let mut tracker = ChangeTracker::new(now - Duration::from_secs(20));
        for i in 0..3 {
            let t = now + Duration::from_millis(i * 500);
            for _ in 0..6 {
                tracker.outlier_count = tracker.outlier_count.saturating_add(1);
            }
            let verdict = tracker.is_change(t);
            if i < 2 {
                assert_eq!(verdict, ChangeVerdict::Weak);
            } else {
                assert_eq!(verdict, ChangeVerdict::Strong);
            }
        }
    }

    impl ChangeTracker {
        fn outlier_count_for_test_bump(&mut self) {
            self.outlier_count += 1;
        }
    }
}
