//! Application configuration management.
//!
//! This module handles loading the directory configuration: the document
//! database connection, collection ids, the storage bucket for product
//! images, and cache tuning.
//!
//! Configuration is stored at `~/.config/bizdir/config.json`; environment
//! variables (`BIZDIR_*`) override file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::VerificationFields;
use crate::store::{Collection, CollectionIds};

/// Application name used for config directory paths
const APP_NAME: &str = "bizdir";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Document database endpoint used when none is configured
pub const DEFAULT_ENDPOINT: &str = "https://cloud.appwrite.io/v1";

/// Bucket holding product images for deployments that never configured one
pub const DEFAULT_BUCKET_ID: &str = "product_images";

/// Cached data is served without re-querying the store for 5 minutes.
const DEFAULT_FRESHNESS_WINDOW_SECS: u64 = 300;

/// Largest whole-second span chrono can represent.
const MAX_WINDOW_SECS: i64 = i64::MAX / 1_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    pub project_id: String,
    pub api_key: Option<String>,
    pub database_id: String,
    pub storage_bucket_id: Option<String>,
    pub collections: CollectionIds,
    pub freshness_window_secs: u64,
    /// Per-collection read timeout; unset means reads may take as long as the store does
    pub read_timeout_secs: Option<u64>,
    /// Seed for placeholder coordinates and travel times; random when unset
    pub placeholder_seed: Option<u64>,
    pub verification_fields: VerificationFields,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            project_id: String::new(),
            api_key: None,
            database_id: String::new(),
            storage_bucket_id: None,
            collections: CollectionIds::default(),
            freshness_window_secs: DEFAULT_FRESHNESS_WINDOW_SECS,
            read_timeout_secs: None,
            placeholder_seed: None,
            verification_fields: VerificationFields::default(),
        }
    }
}

impl Config {
    /// Load from the default config path, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load a config file, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply `BIZDIR_*` overrides from `lookup`. Unparseable numbers are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("BIZDIR_ENDPOINT") {
            self.endpoint = v;
        }
        if let Some(v) = lookup("BIZDIR_PROJECT_ID") {
            self.project_id = v;
        }
        if let Some(v) = lookup("BIZDIR_API_KEY") {
            self.api_key = Some(v).filter(|k| !k.is_empty());
        }
        if let Some(v) = lookup("BIZDIR_DATABASE_ID") {
            self.database_id = v;
        }
        if let Some(v) = lookup("BIZDIR_BUCKET_ID") {
            self.storage_bucket_id = Some(v).filter(|b| !b.is_empty());
        }

        for collection in Collection::ALL {
            let key = format!("BIZDIR_COLLECTION_{}", collection.name().to_uppercase());
            if let Some(v) = lookup(&key) {
                *self.collections.id_mut(collection) = v;
            }
        }

        if let Some(secs) = parse_override(&lookup, "BIZDIR_FRESHNESS_SECS") {
            self.freshness_window_secs = secs;
        }
        if let Some(secs) = parse_override(&lookup, "BIZDIR_READ_TIMEOUT_SECS") {
            self.read_timeout_secs = Some(secs).filter(|s| *s > 0);
        }
        if let Some(seed) = parse_override(&lookup, "BIZDIR_PLACEHOLDER_SEED") {
            self.placeholder_seed = Some(seed);
        }
    }

    /// Freshness window, saturating at the longest span chrono supports.
    pub fn freshness_window(&self) -> chrono::Duration {
        let secs = i64::try_from(self.freshness_window_secs)
            .unwrap_or(MAX_WINDOW_SECS)
            .min(MAX_WINDOW_SECS);
        chrono::Duration::seconds(secs)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_secs.map(Duration::from_secs)
    }

    /// Configured image bucket, or the deployment default.
    pub fn bucket_id(&self) -> &str {
        self.storage_bucket_id
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_BUCKET_ID)
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}

fn parse_override(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key = key, value = %raw, error = %e, "Ignoring invalid numeric override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.freshness_window(), chrono::Duration::minutes(5));
        assert!(config.read_timeout().is_none());
        assert_eq!(config.bucket_id(), DEFAULT_BUCKET_ID);
        assert_eq!(config.collections.id(Collection::SocialMedia), "social_media");
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load_from(&dir.path().join("absent.json")).expect("defaults load");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"project_id": "directory", "collections": {"branches": "branches_v2"}, "read_timeout_secs": 10}"#,
        )
        .expect("write config");

        let config = Config::load_from(&path).expect("config loads");
        assert_eq!(config.project_id, "directory");
        assert_eq!(config.collections.branches, "branches_v2");
        assert_eq!(config.collections.companies, "companies");
        assert_eq!(config.read_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.freshness_window_secs, DEFAULT_FRESHNESS_WINDOW_SECS);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            storage_bucket_id: Some("media".to_string()),
            ..Config::default()
        };
        config.save_to(&path).expect("config saves");

        let loaded = Config::load_from(&path).expect("config loads");
        assert_eq!(loaded.bucket_id(), "media");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("BIZDIR_PROJECT_ID", "from-env"),
            ("BIZDIR_BUCKET_ID", ""),
            ("BIZDIR_COLLECTION_WORKING_DAYS", "hours"),
            ("BIZDIR_FRESHNESS_SECS", "60"),
            ("BIZDIR_READ_TIMEOUT_SECS", "not-a-number"),
        ]);
        let mut config = Config {
            storage_bucket_id: Some("media".to_string()),
            ..Config::default()
        };
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.project_id, "from-env");
        assert!(config.storage_bucket_id.is_none());
        assert_eq!(config.collections.working_days, "hours");
        assert_eq!(config.freshness_window_secs, 60);
        assert!(config.read_timeout_secs.is_none());
    }

    #[test]
    fn test_huge_freshness_window_saturates() {
        let env: HashMap<&str, &str> = HashMap::from([("BIZDIR_FRESHNESS_SECS", "18446744073709551615")]);
        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.freshness_window_secs, u64::MAX);
        assert_eq!(config.freshness_window(), chrono::Duration::seconds(MAX_WINDOW_SECS));

        config.freshness_window_secs = MAX_WINDOW_SECS as u64 + 1;
        assert_eq!(config.freshness_window(), chrono::Duration::seconds(MAX_WINDOW_SECS));
    }
}
