//! Raw MIDI byte encoding for note-on/note-off/CC messages (§6).
//!
//! Velocity is always 1 (note-on) or 0 (note-off); CC values are
//! `round(127 * v)` for `v` in `[0, 1]`.

use crate::channel::{CcChannel, NoteChannel};

const NOTE_ON_STATUS: u8 = 0x90;
const NOTE_OFF_STATUS: u8 = 0x80;
const CC_STATUS: u8 = 0xB0;
const NOTE_ON_VELOCITY: u8 = 1;
const NOTE_OFF_VELOCITY: u8 = 0;

/// Build a note-on message with velocity 1.
pub fn note_on(channel: NoteChannel) -> [u8; 3] {
    [NOTE_ON_STATUS, channel, NOTE_ON_VELOCITY]
}

/// Build a note-off message with velocity 0.
pub fn note_off(channel: NoteChannel) -> [u8; 3] {
    [NOTE_OFF_STATUS, channel, NOTE_OFF_VELOCITY]
}

/// Build a CC message carrying `value` scaled from `[0, 1]` to `[0, 127]`.
pub fn control_change(cc: CcChannel, value: f32) -> [u8; 3] {
    let scaled = (value.clamp(0.0, 1.0) * 127.0).round() as u8;
    [CC_STATUS, cc, scaled]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intensity_full_scale_rounds_to_127() {
        assert_eq!(control_change(10, 1.0), [CC_STATUS, 10, 127]);
    }

    #[test]
    fn intensity_zero_rounds_to_zero() {
        assert_eq!(control_change(10, 0.0), [CC_STATUS, 10, 0]);
    }

    #[test]
    fn intensity_out_of_range_is_clamped() {
        assert_eq!(control_change(10, 2.0), [CC_STATUS, 10, 127]);
        assert_eq!(control_change(10, -1.0), [CC_STATUS, 10, 0]);
    }

    #[test]
    fn note_velocities_match_spec() {
        assert_eq!(note_on(5)[2], 1);
        assert_eq!(note_off(5)[2], 0);
    }
}
