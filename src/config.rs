//! Service configuration.
//!
//! Loaded once at startup from a TOML file (or defaults) and passed into the
//! pipeline by value. Nothing in request handling reads or writes it afterwards.

use crate::constants::{
    DEFAULT_COMPRESSED_DIR, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MANIFEST_DIR,
    DEFAULT_MAX_DOWNLOAD_MB, DEFAULT_QUALITY, DEFAULT_UPLOAD_DIR, MAX_IMAGE_DIMENSION,
    MAX_QUALITY,
};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub compression: CompressionConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Quality used when a request does not carry its own (0-100).
    pub default_quality: u8,

    /// Parallel workers for a single batch.
    pub workers: usize,

    /// Upper bound on one source download.
    pub fetch_timeout_secs: u64,

    pub max_download_mb: u64,

    pub max_image_dimension: u32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            default_quality: DEFAULT_QUALITY,
            workers: num_cpus::get(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            max_download_mb: DEFAULT_MAX_DOWNLOAD_MB,
            max_image_dimension: MAX_IMAGE_DIMENSION,
        }
    }
}

impl CompressionConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn max_download_bytes(&self) -> u64 {
        self.max_download_mb.saturating_mul(1024 * 1024)
    }
}

/// The three flat, append-only stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub compressed_dir: PathBuf,
    pub manifest_dir: PathBuf,
    pub upload_dir: PathBuf,

    /// Public prefix for compressed images; the local path is reported when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compressed_base_url: Option<String>,

    /// Public prefix for generated manifests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_base_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            compressed_dir: PathBuf::from(DEFAULT_COMPRESSED_DIR),
            manifest_dir: PathBuf::from(DEFAULT_MANIFEST_DIR),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            compressed_base_url: None,
            manifest_base_url: None,
        }
    }
}

impl ServiceConfig {
    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Same store layout, rooted under `root`. Handy for tests and one-off runs.
    pub fn rooted_at(root: &Path) -> Self {
        let mut config = Self::default();
        config.storage.compressed_dir = root.join("compressed");
        config.storage.manifest_dir = root.join("results");
        config.storage.upload_dir = root.join("uploads");
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if i32::from(self.compression.default_quality) > MAX_QUALITY {
            return Err(ConfigError::Invalid(
                "compression.default_quality must be between 0 and 100".into(),
            ));
        }
        if self.compression.workers == 0 {
            return Err(ConfigError::Invalid(
                "compression.workers must be > 0".into(),
            ));
        }
        if self.compression.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "compression.fetch_timeout_secs must be > 0".into(),
            ));
        }
        if self.compression.max_download_mb == 0 {
            return Err(ConfigError::Invalid(
                "compression.max_download_mb must be > 0".into(),
            ));
        }
        if self.compression.max_image_dimension == 0 {
            return Err(ConfigError::Invalid(
                "compression.max_image_dimension must be > 0".into(),
            ));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
