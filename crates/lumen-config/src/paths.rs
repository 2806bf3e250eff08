//! Platform-specific paths for the credentials file and the effect/channel
//! configuration file (§6: "Persisted configuration").
//!
//! # Directory Structure
//!
//! - **User config**: `~/.config/lumen/` (Linux), `~/Library/Application
//!   Support/lumen/` (macOS), `%APPDATA%\lumen\` (Windows)

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "lumen";

/// Filename of the streaming-service credentials file.
const CREDENTIALS_FILE: &str = "credentials.toml";

/// Filename of the effect-pool/MIDI-channel configuration file.
const CHANNEL_MAP_FILE: &str = "channels.toml";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the platform config directory cannot be
/// determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join(APP_NAME)
}

/// Default path of the streaming-service credentials file.
pub fn default_credentials_path() -> PathBuf {
    user_config_dir().join(CREDENTIALS_FILE)
}

/// Default path of the effect-pool/channel configuration file.
pub fn default_channel_map_path() -> PathBuf {
    user_config_dir().join(CHANNEL_MAP_FILE)
}

/// Ensure the user configuration directory exists.
pub fn ensure_user_config_dir() -> crate::error::Result<PathBuf> {
    let dir = user_config_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| crate::error::ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_credentials_path_lands_under_the_app_dir() {
        let path = default_credentials_path();
        assert!(path.to_string_lossy().contains("lumen"));
        assert_eq!(path.file_name().unwrap(), "credentials.toml");
    }

    #[test]
    fn default_channel_map_path_lands_under_the_app_dir() {
        let path = default_channel_map_path();
        assert_eq!(path.file_name().unwrap(), "channels.toml");
    }
}
