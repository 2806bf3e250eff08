//! The output abstraction the controller applies picked effects through
//! (§4.6 step 5), kept separate from `lumen-midi`'s `MidiDispatcher` so
//! tests can substitute a recording stub without a real output port.

use std::time::Duration;

use lumen_midi::channel::NoteChannel;
use lumen_midi::MidiDispatcher;

/// Receives applied effects. Overlay activation defaults to a no-op log
/// line since not every sink (e.g. a MIDI-only dispatcher) has DMX behind
/// it; callers that do wire both MIDI and DMX override it.
pub trait EffectSink {
    fn pulse_autoloop(&mut self, channel: NoteChannel);
    fn fire_special_effect(&mut self, channel: NoteChannel, duration: Duration);
    fn set_color_override(&mut self, channel: NoteChannel);
    fn clear_color_overrides(&mut self);

    fn activate_overlay(&mut self, overlay_index: usize) {
        tracing::debug!(overlay_index, "effect sink has no DMX overlay backing, ignoring");
    }
}

impl EffectSink for MidiDispatcher {
    fn pulse_autoloop(&mut self, channel: NoteChannel) {
        self.set_autoloop(channel);
    }

    fn fire_special_effect(&mut self, channel: NoteChannel, duration: Duration) {
        self.set_special_effect(channel, duration);
    }

    fn set_color_override(&mut self, channel: NoteChannel) {
        MidiDispatcher::set_color_override(self, channel);
    }

    fn clear_color_overrides(&mut self) {
        MidiDispatcher::clear_color_overrides(self);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use lumen_midi::channel::NoteChannel;

    use super::EffectSink;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Autoloop(NoteChannel),
        SpecialEffect(NoteChannel, Duration),
        ColorOverride(NoteChannel),
        ClearColorOverrides,
        Overlay(usize),
    }

    #[derive(Default)]
    pub struct RecordingSink {
        pub calls: Vec<Call>,
    }

    impl EffectSink for RecordingSink {
        fn pulse_autoloop(&mut self, channel: NoteChannel) {
            self.calls.push(Call::Autoloop(channel));
        }

        fn fire_special_effect(&mut self, channel: NoteChannel, duration: Duration) {
            self.calls.push(Call::SpecialEffect(channel, duration));
        }

        fn set_color_override(&mut self, channel: NoteChannel) {
            self.calls.push(Call::ColorOverride(channel));
        }

        fn clear_color_overrides(&mut self) {
            self.calls.push(Call::ClearColorOverrides);
        }

        fn activate_overlay(&mut self, overlay_index: usize) {
            self.calls.push(Call::Overlay(overlay_index));
        }
    }
}
