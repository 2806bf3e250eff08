//! Compiled-in default effect pools (§4.6).
//!
//! Per `original_source/lib/engine/effect_definitions.py`, the LOW and
//! MEDIUM pools share MIDI bank 2A-2H and the HIGH and HIP_HOP pools share
//! bank 1A-1H - carried forward as-is. They remain four distinct lists
//! selected by four distinct code paths; an operator repoints
//! `lumen-config`'s channel table to diverge them without touching this
//! module.

use lumen_midi::channel::note;

use crate::effect::Effect;

const LOW_MEDIUM_BANK: usize = 1;
const HIGH_HIP_HOP_BANK: usize = 0;

fn autoloop_bank(bank: usize) -> Vec<Effect> {
    (0..8).map(|slot| Effect::Autoloop(note::autoloop(bank, slot))).collect()
}

/// Pool for [`lumen_track::LightShowType::Low`].
pub fn low() -> Vec<Effect> {
    autoloop_bank(LOW_MEDIUM_BANK)
}

/// Pool for [`lumen_track::LightShowType::Medium`].
pub fn medium() -> Vec<Effect> {
    autoloop_bank(LOW_MEDIUM_BANK)
}

/// Pool for [`lumen_track::LightShowType::High`] sections that stay at a
/// steady intensity.
pub fn high() -> Vec<Effect> {
    autoloop_bank(HIGH_HIP_HOP_BANK)
}

/// Pool for [`lumen_track::LightShowType::HipHop`].
pub fn hip_hop() -> Vec<Effect> {
    autoloop_bank(HIGH_HIP_HOP_BANK)
}

/// Pool of special effects, picked from when a HIGH-type track escalates
/// into a noticeably louder section.
pub fn special_effects() -> Vec<Effect> {
    (0..8).map(|n| Effect::SpecialEffect(note::special_effect(n))).collect()
}

/// All nine colour-override slots, as candidates for the post-autoloop
/// override pick.
pub fn color_overrides() -> Vec<Effect> {
    note::color_overrides().into_iter().map(Effect::ColorOverride).collect()
}

/// DMX overlay slots, pulsed on each detected note (§4.5.4, per
/// `original_source/lib/engine/light_engine.py`'s `on_note` chase on
/// `OverlayEffect.LIGHT_BAR_24`). There is currently exactly one overlay
/// registered, at index 0, by `Engine::start`; a deployment that wires up
/// more DMX overlay windows only needs to grow this list in lockstep with
/// the registrations it makes.
pub fn overlays() -> Vec<Effect> {
    vec![Effect::Overlay(0)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_and_medium_share_the_same_bank() {
        assert_eq!(low(), medium());
    }

    #[test]
    fn high_and_hip_hop_share_the_same_bank() {
        assert_eq!(high(), hip_hop());
    }

    #[test]
    fn low_and_high_banks_do_not_overlap() {
        let low_channels: std::collections::HashSet<_> = low().into_iter().collect();
        let high_channels: std::collections::HashSet<_> = high().into_iter().collect();
        assert!(low_channels.is_disjoint(&high_channels));
    }

    #[test]
    fn special_effects_pool_has_eight_entries() {
        assert_eq!(special_effects().len(), 8);
    }
}
