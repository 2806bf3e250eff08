//! Effect-pool / MIDI-channel-assignment configuration (§1A, §4.6, §4.8).
//!
//! `lumen-effects`/`lumen-midi` compile in the channel map described by
//! `original_source/lib/engine/effect_definitions.py` (see
//! `lumen_effects::pools` and `lumen_midi::channel`); this type is the
//! TOML-shaped mirror of that same layout so operators can inspect or
//! retarget it without recompiling, following the same `Preset`-style
//! `load`/`save` pair as [`crate::credentials::StreamingCredentials`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::paths::default_channel_map_path;

/// One autoloop bank: eight note numbers, slot-indexed.
pub type AutoloopBank = [u8; 8];

/// The full channel map an operator may retarget. Defaults mirror the
/// compiled-in constants in `lumen_midi::channel` and the bank pairing in
/// `lumen_effects::pools` (LOW/MEDIUM share one bank, HIGH/HIP_HOP share
/// another).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMap {
    /// Autoloop notes for the LOW and MEDIUM light-show types.
    pub low_medium_autoloops: AutoloopBank,
    /// Autoloop notes for the HIGH and HIP_HOP light-show types.
    pub high_hip_hop_autoloops: AutoloopBank,
    /// Special-effect notes, picked from on HIGH-type loudness escalation.
    pub special_effects: [u8; 8],
    /// Colour-override notes.
    pub color_overrides: [u8; 9],
}

impl Default for ChannelMap {
    fn default() -> Self {
        use lumen_midi::channel::note;

        let bank = |bank: usize| -> AutoloopBank {
            let mut notes = [0u8; 8];
            for (slot, n) in notes.iter_mut().enumerate() {
                *n = note::autoloop(bank, slot);
            }
            notes
        };

        let mut special_effects = [0u8; 8];
        for (n, slot) in special_effects.iter_mut().enumerate() {
            *slot = note::special_effect(n);
        }

        let overrides = note::color_overrides();
        let mut color_overrides = [0u8; 9];
        color_overrides.copy_from_slice(&overrides);

        Self {
            low_medium_autoloops: bank(1),
            high_hip_hop_autoloops: bank(0),
            special_effects,
            color_overrides,
        }
    }
}

impl ChannelMap {
    /// Load the channel map from the default platform config path, falling
    /// back to the compiled-in default if the file does not exist.
    pub fn load_default() -> Result<Self> {
        Self::load(&default_channel_map_path())
    }

    /// Load the channel map from `path`, falling back to the compiled-in
    /// default if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| crate::error::ConfigError::read_file(path, e))?;
        toml::from_str(&contents).map_err(|e| crate::error::ConfigError::toml_parse(path, e))
    }

    /// Save the channel map to `path`, creating parent directories as
    /// needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| crate::error::ConfigError::create_dir(parent, e))?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(|e| crate::error::ConfigError::write_file(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_falls_back_to_compiled_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("channels.toml");
        assert_eq!(ChannelMap::load(&path).unwrap(), ChannelMap::default());
    }

    #[test]
    fn low_medium_and_high_hip_hop_banks_do_not_overlap() {
        let map = ChannelMap::default();
        let low: std::collections::HashSet<_> = map.low_medium_autoloops.iter().collect();
        let high: std::collections::HashSet<_> = map.high_hip_hop_autoloops.iter().collect();
        assert!(low.is_disjoint(&high));
    }

    #[test]
    fn round_trips_through_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("channels.toml");
        let mut map = ChannelMap::default();
        map.special_effects[0] = 99;
        map.save(&path).unwrap();
        let loaded = ChannelMap::load(&path).unwrap();
        assert_eq!(loaded, map);
    }
}
