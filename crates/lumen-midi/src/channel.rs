//! The fixed MIDI channel vocabulary (§4.8): every semantic intent the
//! lighting application understands is addressed by one note number or CC
//! number, assigned once here and never derived at runtime.
//!
//! The ordinals below cover link/bpm-tap, five intensity CCs, play/pause,
//! next-autoloop, eight special effects, nine colour overrides, four banks
//! of eight autoloops, and thirty-two static looks - the "enumerated
//! ordinals 1-90" the spec describes. Operators who want different note
//! numbers retarget `lumen-config`'s channel table; this module only
//! supplies the compiled-in default and the slot counts other crates size
//! their pools against.

/// A MIDI note number addressing one autoloop / effect / override slot.
pub type NoteChannel = u8;
/// A MIDI CC number addressing one continuous intensity control.
pub type CcChannel = u8;

/// Number of colour-override slots (§4.8: "clear all 9 overrides").
pub const COLOR_OVERRIDE_COUNT: usize = 9;
/// Number of special-effect slots.
pub const SPECIAL_EFFECT_COUNT: usize = 8;
/// Number of autoloop banks.
pub const AUTOLOOP_BANK_COUNT: usize = 4;
/// Autoloops per bank.
pub const AUTOLOOP_PER_BANK: usize = 8;
/// Number of static-look slots.
pub const STATIC_LOOK_COUNT: usize = 32;

/// Intensity CC numbers sent on sound start/stop (§4.5.1, §4.8).
pub mod cc {
    use super::CcChannel;

    pub const AUTOLOOP_INTENSITY: CcChannel = 20;
    pub const SCRIPTED_TRACK_INTENSITY: CcChannel = 21;
    pub const GROUP_1_INTENSITY: CcChannel = 22;
    pub const GROUP_2_INTENSITY: CcChannel = 23;
    pub const GROUP_3_INTENSITY: CcChannel = 24;
    pub const GROUP_4_INTENSITY: CcChannel = 25;

    /// All five intensity CCs driven by `on_sound_start`/`on_sound_stop`.
    pub const ALL: [CcChannel; 5] = [
        AUTOLOOP_INTENSITY,
        GROUP_1_INTENSITY,
        GROUP_2_INTENSITY,
        GROUP_3_INTENSITY,
        GROUP_4_INTENSITY,
    ];
}

/// Note numbers for link, transport, and note-addressed slots.
pub mod note {
    use super::{
        NoteChannel, AUTOLOOP_BANK_COUNT, AUTOLOOP_PER_BANK, COLOR_OVERRIDE_COUNT,
        SPECIAL_EFFECT_COUNT, STATIC_LOOK_COUNT,
    };

    pub const LINK: NoteChannel = 1;
    pub const BPM_TAP: NoteChannel = 2;
    pub const PLAY_PAUSE: NoteChannel = 3;
    pub const NEXT_AUTOLOOP: NoteChannel = 4;

    const SPECIAL_EFFECT_BASE: NoteChannel = 5;
    const COLOR_OVERRIDE_BASE: NoteChannel = SPECIAL_EFFECT_BASE + SPECIAL_EFFECT_COUNT as u8;
    const AUTOLOOP_BASE: NoteChannel = COLOR_OVERRIDE_BASE + COLOR_OVERRIDE_COUNT as u8;
    const STATIC_LOOK_BASE: NoteChannel =
        AUTOLOOP_BASE + (AUTOLOOP_BANK_COUNT * AUTOLOOP_PER_BANK) as u8;

    /// The `n`th special-effect note (0-indexed, wraps within
    /// [`SPECIAL_EFFECT_COUNT`]).
    pub fn special_effect(n: usize) -> NoteChannel {
        SPECIAL_EFFECT_BASE + (n % SPECIAL_EFFECT_COUNT) as u8
    }

    /// The `n`th colour-override note (0-indexed, wraps within
    /// [`COLOR_OVERRIDE_COUNT`]).
    pub fn color_override(n: usize) -> NoteChannel {
        COLOR_OVERRIDE_BASE + (n % COLOR_OVERRIDE_COUNT) as u8
    }

    /// All colour-override notes, in slot order.
    pub fn color_overrides() -> [NoteChannel; COLOR_OVERRIDE_COUNT] {
        std::array::from_fn(color_override)
    }

    /// The note for autoloop `slot` (0-7) in `bank` (0-3).
    pub fn autoloop(bank: usize, slot: usize) -> NoteChannel {
        let index = (bank % AUTOLOOP_BANK_COUNT) * AUTOLOOP_PER_BANK + (slot % AUTOLOOP_PER_BANK);
        AUTOLOOP_BASE + index as u8
    }

    /// The `n`th static-look note (0-indexed, wraps within
    /// [`STATIC_LOOK_COUNT`]).
    pub fn static_look(n: usize) -> NoteChannel {
        STATIC_LOOK_BASE + (n % STATIC_LOOK_COUNT) as u8
    }
}
