//! The 512-byte DMX universe frame plus its bounded array of overlay
//! descriptors, and the little-endian wire codec described in §6.

use crate::error::{Error, Result};
use crate::overlay::{DmxOverlay, UNIVERSE_SIZE};

const PROTOCOL_MAGIC: u32 = 0x0000_7799;
const UNIVERSE_INDEX: u8 = 0;

/// A 512-byte universe frame with a bounded set of overlay descriptors.
/// Capacity (`MAX_DEVICES` in the spec) is a per-universe constant,
/// defaulting to 20-100 as configured by `lumen-config`.
pub struct DmxUniverse {
    max_devices: usize,
    overlays: Vec<DmxOverlay>,
    frame: [u8; UNIVERSE_SIZE],
}

impl DmxUniverse {
    /// Create an empty universe with room for `max_devices` overlays.
    pub fn new(max_devices: usize) -> Self {
        Self {
            max_devices,
            overlays: Vec::with_capacity(max_devices),
            frame: [0u8; UNIVERSE_SIZE],
        }
    }

    pub fn max_devices(&self) -> usize {
        self.max_devices
    }

    /// Register a new overlay (deactivated). Fatal (§7) once capacity is
    /// exhausted.
    pub fn register(&mut self, start_offset: u16, length: u16) -> Result<usize> {
        if self.overlays.len() >= self.max_devices {
            return Err(Error::CapacityExceeded { capacity: self.max_devices });
        }
        let overlay = DmxOverlay::new(start_offset, length)?;
        self.overlays.push(overlay);
        Ok(self.overlays.len() - 1)
    }

    pub fn activate(&mut self, index: usize) -> Result<()> {
        self.overlays.get_mut(index).ok_or(Error::UnknownOverlay(index))?.activate();
        Ok(())
    }

    pub fn deactivate(&mut self, index: usize) -> Result<()> {
        self.overlays.get_mut(index).ok_or(Error::UnknownOverlay(index))?.deactivate();
        Ok(())
    }

    /// Deactivate every registered overlay.
    pub fn deactivate_all(&mut self) {
        for overlay in &mut self.overlays {
            overlay.deactivate();
        }
    }

    pub fn frame_mut(&mut self) -> &mut [u8; UNIVERSE_SIZE] {
        &mut self.frame
    }

    pub fn overlays(&self) -> &[DmxOverlay] {
        &self.overlays
    }

    /// The exact byte length of one encoded datagram for this universe's
    /// `max_devices` (§8: `4 + 1 + 2 + 4*MAX_DEVICES + 512`).
    pub fn encoded_len(&self) -> usize {
        encoded_len(self.max_devices)
    }

    /// Pack this universe into the wire format described in §6.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.extend_from_slice(&PROTOCOL_MAGIC.to_le_bytes());
        buf.push(UNIVERSE_INDEX);
        buf.extend_from_slice(&(self.overlays.len() as u16).to_le_bytes());
        for i in 0..self.max_devices {
            if let Some(overlay) = self.overlays.get(i) {
                buf.extend_from_slice(&overlay.start_offset().to_le_bytes());
                buf.extend_from_slice(&overlay.wire_length().to_le_bytes());
            } else {
                buf.extend_from_slice(&0u16.to_le_bytes());
                buf.extend_from_slice(&0u16.to_le_bytes());
            }
        }
        buf.extend_from_slice(&self.frame);
        buf
    }

    /// Parse a datagram produced by [`Self::encode`] (or [`Self::clear_frame`]).
    /// `max_devices` is recovered from the datagram's length, since the
    /// header array is always sized to the encoding universe's capacity
    /// regardless of how many overlays are actually registered.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        const HEADER_LEN: usize = 4 + 1 + 2;
        if bytes.len() < HEADER_LEN + UNIVERSE_SIZE {
            return Err(Error::Truncated { len: bytes.len() });
        }
        let body_len = bytes.len() - HEADER_LEN - UNIVERSE_SIZE;
        if body_len % 4 != 0 {
            return Err(Error::Truncated { len: bytes.len() });
        }
        let max_devices = body_len / 4;

        let magic = u32::from_le_bytes(bytes[0..4].try_into().expect("4-byte slice"));
        if magic != PROTOCOL_MAGIC {
            return Err(Error::BadMagic(magic));
        }
        let overlay_count = u16::from_le_bytes([bytes[5], bytes[6]]) as usize;

        let mut overlays = Vec::with_capacity(max_devices);
        let mut offset = HEADER_LEN;
        for i in 0..max_devices {
            let start = u16::from_le_bytes([bytes[offset], bytes[offset + 1]]);
            let length = u16::from_le_bytes([bytes[offset + 2], bytes[offset + 3]]);
            offset += 4;
            if i < overlay_count {
                overlays.push(DmxOverlay::from_wire(start, length));
            }
        }

        let mut frame = [0u8; UNIVERSE_SIZE];
        frame.copy_from_slice(&bytes[offset..offset + UNIVERSE_SIZE]);

        Ok(Self { max_devices, overlays, frame })
    }

    /// A single "clear" datagram with one full-length overlay and an
    /// all-zero frame, blanking the universe on shutdown (§4.9 `stop`).
    pub fn clear_frame(max_devices: usize) -> Vec<u8> {
        let mut buf = Vec::with_capacity(encoded_len(max_devices));
        buf.extend_from_slice(&PROTOCOL_MAGIC.to_le_bytes());
        buf.push(UNIVERSE_INDEX);
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(&(UNIVERSE_SIZE as u16).to_le_bytes());
        for _ in 1..max_devices {
            buf.extend_from_slice(&0u16.to_le_bytes());
            buf.extend_from_slice(&0u16.to_le_bytes());
        }
        buf.extend_from_slice(&[0u8; UNIVERSE_SIZE]);
        buf
    }
}

/// The exact byte length of one encoded datagram for `max_devices`.
pub fn encoded_len(max_devices: usize) -> usize {
    4 + 1 + 2 + 4 * max_devices + UNIVERSE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_length_matches_formula() {
        let universe = DmxUniverse::new(20);
        assert_eq!(universe.encode().len(), 4 + 1 + 2 + 4 * 20 + UNIVERSE_SIZE);
        assert_eq!(universe.encode().len(), universe.encoded_len());
    }

    #[test]
    fn magic_and_universe_index_are_fixed() {
        let universe = DmxUniverse::new(20);
        let bytes = universe.encode();
        assert_eq!(&bytes[0..4], &PROTOCOL_MAGIC.to_le_bytes());
        assert_eq!(bytes[4], UNIVERSE_INDEX);
    }

    #[test]
    fn inactive_overlay_has_zero_wire_length() {
        let mut universe = DmxUniverse::new(20);
        let idx = universe.register(10, 50).unwrap();
        let bytes = universe.encode();
        // headers start at offset 7, 4 bytes each
        let header_offset = 7 + idx * 4;
        let length = u16::from_le_bytes([bytes[header_offset + 2], bytes[header_offset + 3]]);
        assert_eq!(length, 0);
    }

    #[test]
    fn activated_overlay_restores_length_on_wire() {
        let mut universe = DmxUniverse::new(20);
        let idx = universe.register(10, 50).unwrap();
        universe.activate(idx).unwrap();
        let bytes = universe.encode();
        let header_offset = 7 + idx * 4;
        let length = u16::from_le_bytes([bytes[header_offset + 2], bytes[header_offset + 3]]);
        assert_eq!(length, 50);
    }

    #[test]
    fn capacity_is_enforced() {
        let mut universe = DmxUniverse::new(1);
        universe.register(0, 10).unwrap();
        assert!(matches!(universe.register(20, 10), Err(Error::CapacityExceeded { .. })));
    }

    #[test]
    fn clear_frame_is_exact_length_and_all_zero_body() {
        let bytes = DmxUniverse::clear_frame(20);
        assert_eq!(bytes.len(), encoded_len(20));
        assert!(bytes[bytes.len() - UNIVERSE_SIZE..].iter().all(|&b| b == 0));
    }

    #[test]
    fn decode_then_encode_is_byte_identical() {
        let mut universe = DmxUniverse::new(20);
        let active_idx = universe.register(5, 30).unwrap();
        universe.activate(active_idx).unwrap();
        universe.register(100, 20).unwrap(); // left inactive
        universe.frame_mut()[0] = 0xAB;
        universe.frame_mut()[511] = 0xCD;

        let encoded = universe.encode();
        let decoded = DmxUniverse::decode(&encoded).unwrap();
        assert_eq!(decoded.encode(), encoded);
    }

    #[test]
    fn decode_recovers_max_devices_from_datagram_length() {
        let universe = DmxUniverse::new(37);
        let decoded = DmxUniverse::decode(&universe.encode()).unwrap();
        assert_eq!(decoded.max_devices(), 37);
    }

    #[test]
    fn decode_recovers_active_overlay_fields() {
        let mut universe = DmxUniverse::new(20);
        let idx = universe.register(5, 30).unwrap();
        universe.activate(idx).unwrap();

        let decoded = DmxUniverse::decode(&universe.encode()).unwrap();
        assert_eq!(decoded.overlays().len(), 1);
        assert_eq!(decoded.overlays()[0].start_offset(), 5);
        assert_eq!(decoded.overlays()[0].wire_length(), 30);
        assert!(decoded.overlays()[0].is_active());
    }

    #[test]
    fn decode_rejects_truncated_datagram() {
        assert!(matches!(
            DmxUniverse::decode(&[0u8; 10]),
            Err(Error::Truncated { .. })
        ));
    }

    #[test]
    fn decode_rejects_wrong_magic() {
        let mut bytes = DmxUniverse::new(20).encode();
        bytes[0] = 0xFF;
        assert!(matches!(DmxUniverse::decode(&bytes), Err(Error::BadMagic(_))));
    }

    #[test]
    fn clear_frame_round_trips_through_decode() {
        let bytes = DmxUniverse::clear_frame(20);
        let decoded = DmxUniverse::decode(&bytes).unwrap();
        assert_eq!(decoded.encode(), bytes);
    }
}
