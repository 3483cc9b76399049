//! Configuration for the syndication bridge
//!
//! The host platform owns credential entry and category selection; this
//! struct is the typed snapshot it hands the bridge. Validation happens at
//! construction rather than in scattered sanitize callbacks.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Default XRPC endpoint base for the public Bluesky PDS
pub const DEFAULT_API_BASE: &str = "https://bsky.social/xrpc";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Account handle used to authenticate (e.g., "user.bsky.social")
    #[serde(default)]
    pub identifier: String,

    /// App password, encrypted at rest by [`CredentialStore`](crate::crypto::CredentialStore)
    #[serde(default)]
    pub encrypted_app_password: String,

    /// Category ids whose posts are syndicated; empty disables the bridge
    #[serde(default)]
    pub allowed_category_ids: HashSet<u64>,

    /// XRPC base URL, overridable for self-hosted PDS instances and tests
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl BridgeConfig {
    pub fn new(
        identifier: String,
        encrypted_app_password: String,
        allowed_category_ids: HashSet<u64>,
    ) -> Self {
        Self {
            identifier,
            encrypted_app_password,
            allowed_category_ids,
            api_base: default_api_base(),
        }
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: BridgeConfig = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Whether the bridge has everything it needs to post.
    ///
    /// Takes the already-decrypted app password; an empty identifier, empty
    /// secret, or empty category allow-list all disable the bridge.
    pub fn is_complete(&self, decrypted_secret: &str) -> bool {
        !self.identifier.is_empty()
            && !decrypted_secret.is_empty()
            && !self.allowed_category_ids.is_empty()
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("SKYPOST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("skypost").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn complete_config() -> BridgeConfig {
        BridgeConfig::new(
            "user.bsky.social".to_string(),
            "encrypted-blob".to_string(),
            HashSet::from([5]),
        )
    }

    #[test]
    fn test_complete_config() {
        assert!(complete_config().is_complete("app-password"));
    }

    #[test]
    fn test_empty_identifier_is_incomplete() {
        let mut config = complete_config();
        config.identifier.clear();
        assert!(!config.is_complete("app-password"));
    }

    #[test]
    fn test_empty_secret_is_incomplete() {
        assert!(!complete_config().is_complete(""));
    }

    #[test]
    fn test_empty_category_set_disables_bridge() {
        let mut config = complete_config();
        config.allowed_category_ids.clear();
        assert!(!config.is_complete("app-password"));
    }

    #[test]
    fn test_default_api_base() {
        let config = complete_config();
        assert_eq!(config.api_base, "https://bsky.social/xrpc");
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
identifier = "user.bsky.social"
encrypted_app_password = "YWJjZA=="
allowed_category_ids = [5, 9]
"#
        )
        .unwrap();

        let config = BridgeConfig::load_from_path(&file.path().to_path_buf()).unwrap();
        assert_eq!(config.identifier, "user.bsky.social");
        assert_eq!(config.allowed_category_ids, HashSet::from([5, 9]));
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_load_from_missing_path() {
        let result = BridgeConfig::load_from_path(&PathBuf::from("/nonexistent/config.toml"));
        assert!(result.is_err());
    }
}
