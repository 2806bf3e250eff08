//! Persisted streaming-service client credentials (§6).
//!
//! An absent credentials file means streaming analysis is disabled, not an
//! error: callers ask [`StreamingCredentials::load`] for an `Option` and
//! treat `None` as "run with `lumen-track`'s `NullTrackSource`".

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::paths::default_credentials_path;

/// OAuth client credentials for the streaming-service analysis API, plus
/// an optionally cached refresh token so the fetcher doesn't need an
/// interactive re-auth on every process start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamingCredentials {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl StreamingCredentials {
    /// Load credentials from the default platform config path. Returns
    /// `Ok(None)` if the file does not exist (§6, §7: absent credentials
    /// disable streaming analysis, they are not a startup error).
    pub fn load_default() -> Result<Option<Self>> {
        Self::load(&default_credentials_path())
    }

    /// Load credentials from `path`. Returns `Ok(None)` if the file is
    /// absent; returns an error if it exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no streaming credentials file, streaming analysis disabled");
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path).map_err(|e| crate::error::ConfigError::read_file(path, e))?;
        let parsed: Self = toml::from_str(&contents).map_err(|e| crate::error::ConfigError::toml_parse(path, e))?;
        Ok(Some(parsed))
    }

    /// Save credentials to `path`, creating parent directories as needed.
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
    fn missing_file_yields_none_not_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.toml");
        assert_eq!(StreamingCredentials::load(&path).unwrap(), None);
    }

    #[test]
    fn round_trips_through_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("credentials.toml");
        let creds = StreamingCredentials {
            client_id: "abc123".into(),
            client_secret: "shh".into(),
            refresh_token: Some("rt".into()),
        };
        creds.save(&path).unwrap();
        let loaded = StreamingCredentials::load(&path).unwrap().unwrap();
        assert_eq!(loaded, creds);
    }

    #[test]
    fn refresh_token_is_optional() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.toml");
        std::fs::write(&path, "client_id = \"a\"\nclient_secret = \"b\"\n").unwrap();
        let loaded = StreamingCredentials::load(&path).unwrap().unwrap();
        assert_eq!(loaded.refresh_token, None);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.toml");
        std::fs::write(&path, "not valid toml {{{").unwrap();
        assert!(StreamingCredentials::load(&path).is_err());
    }
}
