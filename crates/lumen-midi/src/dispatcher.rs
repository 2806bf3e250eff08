//! Serialises semantic lighting intents to MIDI messages (§4.8).

use std::thread;
use std::time::{Duration, Instant};

use crate::channel::{cc, note, NoteChannel};
use crate::delayed::{DelayedAction, DelayedEffects};
use crate::error::{Error, Result};
use crate::message::{control_change, note_off, note_on};
use crate::port::MidiPort;

/// Gap between note-on and note-off in an autoloop pulse (§4.8).
const AUTOLOOP_PULSE_GAP: Duration = Duration::from_millis(10);
/// Lifetime of a special effect before its scheduled deactivation (§4.6).
pub const SPECIAL_EFFECT_DURATION: Duration = Duration::from_secs(30);

/// Dispatches semantic lighting intents to MIDI note/CC messages on a
/// chosen output port, and owns the queue of time-delayed deactivations.
pub struct MidiDispatcher {
    port: Box<dyn MidiPort>,
    paused: bool,
    delayed: DelayedEffects,
}

impl MidiDispatcher {
    /// Wrap an already-open port. `port.open()` variants live in [`crate::port`].
    pub fn new(port: Box<dyn MidiPort>) -> Self {
        Self {
            port,
            paused: false,
            delayed: DelayedEffects::new(),
        }
    }

    fn send(&mut self, message: [u8; 3]) {
        if let Err(e) = self.port.send(&message) {
            tracing::warn!(error = %e, "MIDI send failed");
        }
    }

    /// Stop: emit an intensity-zero sweep and a pause toggle, per §4.8.
    pub fn stop(&mut self) {
        for &channel in &cc::ALL {
            self.send(control_change(channel, 0.0));
        }
        self.send(control_change(cc::SCRIPTED_TRACK_INTENSITY, 0.0));
        if !self.paused {
            self.send(note_on(note::PLAY_PAUSE));
            self.send(note_off(note::PLAY_PAUSE));
            self.paused = true;
        }
        tracing::info!("MIDI dispatcher stopped");
    }

    fn set_intensity(&mut self, value: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidIntensity(value));
        }
        self.send(control_change(cc::AUTOLOOP_INTENSITY, value));
        self.send(control_change(cc::SCRIPTED_TRACK_INTENSITY, 0.0));
        self.send(control_change(cc::GROUP_1_INTENSITY, value));
        self.send(control_change(cc::GROUP_2_INTENSITY, value));
        self.send(control_change(cc::GROUP_3_INTENSITY, value));
        self.send(control_change(cc::GROUP_4_INTENSITY, value));
        Ok(())
    }

    /// §4.5.1: transport went from silent to playing.
    pub fn on_sound_start(&mut self) {
        let _ = self.set_intensity(1.0);
        if self.paused {
            self.send(note_on(note::PLAY_PAUSE));
            self.send(note_off(note::PLAY_PAUSE));
            self.paused = false;
        }
    }

    /// §4.5.1: transport went from playing to silent.
    pub fn on_sound_stop(&mut self) {
        let _ = self.set_intensity(0.0);
        if !self.paused {
            self.send(note_on(note::PLAY_PAUSE));
            self.send(note_off(note::PLAY_PAUSE));
            self.paused = true;
        }
    }

    /// Emit a note-on/note-off pulse on `channel`, 10 ms apart. Never call
    /// from the audio thread (§5: this sleep runs on the periodic-callback
    /// thread).
    pub fn set_autoloop(&mut self, channel: NoteChannel) {
        self.send(note_on(channel));
        thread::sleep(AUTOLOOP_PULSE_GAP);
        self.send(note_off(channel));
    }

    /// Emit a note-on for a special effect and schedule its note-off
    /// `duration` from now.
    pub fn set_special_effect(&mut self, channel: NoteChannel, duration: Duration) {
        self.send(note_on(channel));
        self.delayed
            .schedule(Instant::now(), duration, channel, DelayedAction::Deactivate);
    }

    /// Clear all colour overrides, then note-on the chosen one.
    pub fn set_color_override(&mut self, channel: NoteChannel) {
        self.clear_color_overrides();
        self.send(note_on(channel));
    }

    /// Note-off every colour-override slot.
    pub fn clear_color_overrides(&mut self) {
        for channel in note::color_overrides() {
            self.send(note_off(channel));
        }
    }

    /// Periodic scan of the delayed-effect list (§5: the 100 ms hook).
    pub fn tick(&mut self, now: Instant) {
        for (channel, action) in self.delayed.tick(now) {
            match action {
                DelayedAction::Deactivate => self.send(note_off(channel)),
            }
        }
    }

    /// Number of delayed effects still pending (diagnostics/tests).
    pub fn pending_delayed_effects(&self) -> usize {
        self.delayed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::test_support::RecordingPort;

    fn dispatcher() -> (MidiDispatcher, RecordingPort) {
        let port = RecordingPort::default();
        (MidiDispatcher::new(Box::new(port.clone())), port)
    }

    #[test]
    fn set_autoloop_pulses_note_on_then_off() {
        let (mut d, port) = dispatcher();
        let channel = note::autoloop(0, 0);
        d.set_autoloop(channel);
        assert_eq!(port.messages(), vec![note_on(channel), note_off(channel)]);
    }

    #[test]
    fn special_effect_schedules_deactivation() {
        let (mut d, port) = dispatcher();
        let channel = note::special_effect(0);
        d.set_special_effect(channel, SPECIAL_EFFECT_DURATION);
        assert_eq!(d.pending_delayed_effects(), 1);
        assert_eq!(port.messages(), vec![note_on(channel)]);

        d.tick(Instant::now() + SPECIAL_EFFECT_DURATION + Duration::from_millis(1));
        assert_eq!(d.pending_delayed_effects(), 0);
        assert_eq!(port.messages(), vec![note_on(channel), note_off(channel)]);
    }

    #[test]
    fn invalid_intensity_is_rejected() {
        let (mut d, _port) = dispatcher();
        assert!(matches!(d.set_intensity(1.5), Err(Error::InvalidIntensity(_))));
    }

    #[test]
    fn color_override_clears_before_setting() {
        let (mut d, port) = dispatcher();
        let channel = note::color_override(2);
        d.set_color_override(channel);
        let messages = port.messages();
        let mut expected: Vec<[u8; 3]> = note::color_overrides().iter().map(|&c| note_off(c)).collect();
        expected.push(note_on(channel));
        assert_eq!(messages, expected);
    }

    #[test]
    fn sound_start_then_stop_toggles_pause_once() {
        let (mut d, port) = dispatcher();
        d.on_sound_stop();
        assert!(port.messages().contains(&note_on(note::PLAY_PAUSE)));
        let before = port.messages().len();
        d.on_sound_stop();
        assert_eq!(port.messages().len(), before, "second stop must not toggle pause again");
    }
}
