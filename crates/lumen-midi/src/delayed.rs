//! Scan-on-tick timers for effects that must deactivate after a fixed
//! duration (§4.8, §9: "implementations may substitute a binary heap ...
//! not done here since the vocabulary size never approaches that").

use std::time::{Duration, Instant};

use crate::channel::NoteChannel;

/// The action to take when a delayed effect's deadline passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayedAction {
    Deactivate,
}

/// One pending deactivation, scanned by [`DelayedEffects::tick`].
#[derive(Debug, Clone, Copy)]
struct DelayedEffect {
    start: Instant,
    duration: Duration,
    channel: NoteChannel,
    action: DelayedAction,
    done: bool,
}

/// An owned, unordered list of pending delayed effects.
#[derive(Default)]
pub struct DelayedEffects {
    entries: Vec<DelayedEffect>,
}

impl DelayedEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `channel` to receive `action` once `duration` has elapsed
    /// since `start`.
    pub fn schedule(&mut self, start: Instant, duration: Duration, channel: NoteChannel, action: DelayedAction) {
        self.entries.push(DelayedEffect {
            start,
            duration,
            channel,
            action,
            done: false,
        });
    }

    /// Scan for entries whose deadline has passed, returning their
    /// `(channel, action)` pairs in schedule order, then compact the list.
    pub fn tick(&mut self, now: Instant) -> Vec<(NoteChannel, DelayedAction)> {
        let mut fired = Vec::new();
        for entry in &mut self.entries {
            if !entry.done && entry.start + entry.duration <= now {
                entry.done = true;
                fired.push((entry.channel, entry.action));
            }
        }
        self.entries.retain(|e| !e.done);
        fired
    }

    /// Number of entries still pending.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_deadline_passes() {
        let mut list = DelayedEffects::new();
        let now = Instant::now();
        list.schedule(now, Duration::from_secs(30), 7, DelayedAction::Deactivate);
        assert!(list.tick(now + Duration::from_secs(10)).is_empty());
        let fired = list.tick(now + Duration::from_secs(31));
        assert_eq!(fired, vec![(7, DelayedAction::Deactivate)]);
        assert!(list.is_empty());
    }

    #[test]
    fn each_entry_fires_at_most_once() {
        let mut list = DelayedEffects::new();
        let now = Instant::now();
        list.schedule(now, Duration::from_secs(1), 3, DelayedAction::Deactivate);
        list.tick(now + Duration::from_secs(2));
        assert!(list.tick(now + Duration::from_secs(3)).is_empty());
    }
}
