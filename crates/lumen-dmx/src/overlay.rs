//! A single overlay window into the 512-byte DMX universe (§3, §4.9).

use crate::error::{Error, Result};

/// Size in bytes of a DMX universe frame.
pub const UNIVERSE_SIZE: usize = 512;

/// One overlay descriptor: a window of the universe that may be toggled
/// active/inactive without losing its configured length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmxOverlay {
    start_offset: u16,
    length: u16,
    active: bool,
    original_length: u16,
}

impl DmxOverlay {
    /// Register a new, initially inactive overlay spanning
    /// `[start, start + length)`. Fatal (§7) if the window runs past the
    /// end of the universe.
    pub fn new(start_offset: u16, length: u16) -> Result<Self> {
        if start_offset as usize + length as usize > UNIVERSE_SIZE {
            return Err(Error::OverlayOutOfRange { start_offset, length });
        }
        Ok(Self {
            start_offset,
            length: 0,
            active: false,
            original_length: length,
        })
    }

    pub fn start_offset(&self) -> u16 {
        self.start_offset
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Wire-visible length: 0 when inactive, `original_length` when active.
    pub fn wire_length(&self) -> u16 {
        self.length
    }

    /// Restore the overlay to its configured length.
    pub fn activate(&mut self) {
        self.active = true;
        self.length = self.original_length;
    }

    /// Zero the wire-visible length without forgetting `original_length`.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.length = 0;
    }

    /// Reconstruct an overlay from its on-wire `(start_offset, wire_length)`
    /// header, as read back by [`crate::universe::DmxUniverse::decode`]. A
    /// wire length of 0 means the overlay was inactive when encoded; the
    /// deactivated `original_length` it may have had is not recoverable from
    /// the wire (by design, §3) and is set to 0 rather than guessed, so
    /// re-encoding the result reproduces the same bytes.
    pub(crate) fn from_wire(start_offset: u16, wire_length: u16) -> Self {
        Self {
            start_offset,
            length: wire_length,
            active: wire_length > 0,
            original_length: wire_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_overlay_starts_inactive_with_zero_wire_length() {
        let overlay = DmxOverlay::new(10, 50).unwrap();
        assert!(!overlay.is_active());
        assert_eq!(overlay.wire_length(), 0);
    }

    #[test]
    fn activate_then_deactivate_restores_original_length() {
        let mut overlay = DmxOverlay::new(10, 50).unwrap();
        overlay.activate();
        assert_eq!(overlay.wire_length(), 50);
        overlay.deactivate();
        assert_eq!(overlay.wire_length(), 0);
        overlay.activate();
        assert_eq!(overlay.wire_length(), 50);
    }

    #[test]
    fn out_of_range_window_is_rejected() {
        assert!(matches!(
            DmxOverlay::new(500, 50),
            Err(Error::OverlayOutOfRange { .. })
        ));
    }

    #[test]
    fn window_exactly_at_boundary_is_accepted() {
        assert!(DmxOverlay::new(462, 50).is_ok());
    }
}
