//! The effect vocabulary (§4.6): opaque intents the controller picks from
//! configured pools and hands to an [`crate::sink::EffectSink`].

use lumen_midi::channel::NoteChannel;

/// One lighting intent. Pools are lists of these; the controller never
/// interprets the channel/overlay numbers themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Pulse a MIDI autoloop note on then off.
    Autoloop(NoteChannel),
    /// Fire a MIDI special-effect note, auto-deactivating after its duration.
    SpecialEffect(NoteChannel),
    /// Set one of the nine colour-override slots.
    ColorOverride(NoteChannel),
    /// Activate a DMX overlay by its registered index.
    Overlay(usize),
}
