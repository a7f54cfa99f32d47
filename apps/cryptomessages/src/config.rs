//! Runtime configuration

use std::path::{Path, PathBuf};

use crypto_channel::{KeySetNames, KeyStore, RECEIVER_KEY_NAME, SENDER_KEY_NAME};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding the key directory
pub const KEY_DIR_ENV: &str = "CRYPTOMESSAGES_KEY_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Application configuration
///
/// Every field has a default, so a config file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding `.sym`, `.pem` and `.pub.pem` files
    pub key_dir: PathBuf,
    /// Sender key set name (also the shared symmetric key)
    pub sender_key: String,
    /// Receiver key set name
    pub receiver_key: String,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            key_dir: PathBuf::from("."),
            sender_key: SENDER_KEY_NAME.to_string(),
            receiver_key: RECEIVER_KEY_NAME.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load a JSON config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(KEY_DIR_ENV).filter(|d| !d.is_empty()) {
            self.key_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn key_store(&self) -> KeyStore {
        KeyStore::new(&self.key_dir)
    }

    pub fn key_names(&self) -> KeySetNames {
        KeySetNames {
            sender: self.sender_key.clone(),
            receiver: self.receiver_key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_key_names() {
        let config = AppConfig::default();
        assert_eq!(config.key_names(), KeySetNames::default());
        assert_eq!(config.key_store().dir(), Path::new("."));
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "key_dir": "/tmp/keys", "receiver_key": "B" }"#).unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.key_dir, PathBuf::from("/tmp/keys"));
        assert_eq!(config.receiver_key, "B");
        assert_eq!(config.sender_key, SENDER_KEY_NAME);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ConfigError::Read { .. })
        ));

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_env_override() {
        let config = AppConfig::default().with_env_overrides(|name| {
            (name == KEY_DIR_ENV).then(|| "/var/lib/cryptomessages".to_string())
        });
        assert_eq!(config.key_dir, PathBuf::from("/var/lib/cryptomessages"));

        let config = AppConfig::default().with_env_overrides(|_| Some(String::new()));
        assert_eq!(config.key_dir, PathBuf::from("."));
    }
}
