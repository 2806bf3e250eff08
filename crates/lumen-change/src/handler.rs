//! Callback fired by the [`crate::detector::ChangeDetector`] when it
//! believes the track has moved into a new structural section.

pub trait ChangeHandler {
    fn on_section_change(&mut self, current_sec: f64);
}

/// A handler that does nothing; useful in tests or as a placeholder.
#[derive(Default)]
pub struct NullChangeHandler;

impl ChangeHandler for NullChangeHandler {
    fn on_section_change(&mut self, _current_sec: f64) {}
}
