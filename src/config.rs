//! YAML configuration file support.
//!
//! Lets a deployment define every pipeline stage (normalize, fingerprint,
//! store, detect) in one YAML file and build a ready [`DetectService`] from
//! it at startup.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "itembank production"
//!
//! normalize:
//!   version: 1
//!   normalize_unicode: true
//!   strip_punctuation: true
//!   unify_digits: true
//!   lowercase: true
//!
//! fingerprint:
//!   version: 1
//!   ngram_size: 3
//!   min_content_length: 10
//!   max_tokens: 1000
//!
//! store:
//!   backend: "redb"
//!   path: "/var/lib/itemdup/fingerprints.redb"
//!   compression: "zstd"
//!   level: 3
//!
//! detect:
//!   uniqueness_threshold: 0.3
//!   content_preview_chars: 100
//!   match_preview_chars: 50
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use detect::{DetectConfig, DetectError, DetectService};
use fingerprint::FingerprintConfig;
use normalize::NormalizeConfig;
use store::{
    BackendConfig, CompressionCodec, CompressionConfig, FingerprintStore, StoreConfig, StoreError,
};

/// Errors that can occur when loading configuration or building the service
/// it describes.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("store initialization failed: {0}")]
    Store(#[from] StoreError),

    #[error("service initialization failed: {0}")]
    Detect(#[from] DetectError),
}

/// Top-level YAML configuration for the whole dedup pipeline.
///
/// Every section is optional; an empty file (apart from `version`) yields
/// the same behavior as [`ItemdupConfig::default`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemdupConfig {
    /// Configuration format version.
    pub version: String,

    /// Optional configuration name/description.
    #[serde(default)]
    pub name: Option<String>,

    /// Text normalization configuration.
    #[serde(default)]
    pub normalize: NormalizeConfig,

    /// Fingerprint generation configuration.
    #[serde(default)]
    pub fingerprint: FingerprintConfig,

    /// Fingerprint store configuration.
    #[serde(default)]
    pub store: StoreYamlConfig,

    /// Detection service configuration.
    #[serde(default)]
    pub detect: DetectConfig,
}

impl ItemdupConfig {
    /// Load a YAML configuration file from the given path.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse YAML configuration from a string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: ItemdupConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.normalize
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.fingerprint
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.store.validate()?;
        self.detect
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;

        Ok(())
    }

    /// Open the configured store and build a [`DetectService`] around it.
    pub fn build_service(&self) -> Result<DetectService, ConfigLoadError> {
        let store = FingerprintStore::open(self.store.store_config()?)?;
        let service = DetectService::new(
            store,
            self.normalize.clone(),
            self.fingerprint.clone(),
            self.detect.clone(),
        )?;
        info!(
            backend = %self.store.backend,
            name = self.name.as_deref().unwrap_or("unnamed"),
            "dedup service configured"
        );
        Ok(service)
    }
}

impl Default for ItemdupConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            normalize: NormalizeConfig::default(),
            fingerprint: FingerprintConfig::default(),
            store: StoreYamlConfig::default(),
            detect: DetectConfig::default(),
        }
    }
}

/// Fingerprint store YAML configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreYamlConfig {
    /// Storage backend: `"memory"` or `"redb"`.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Database file path; required when the backend is `"redb"`.
    #[serde(default)]
    pub path: Option<String>,

    /// Record compression: `"zstd"` or `"none"`.
    #[serde(default = "default_compression")]
    pub compression: String,

    /// Zstd compression level (1-22).
    #[serde(default = "default_compression_level")]
    pub level: i32,
}

impl StoreYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        let valid_backends = ["memory", "redb"];
        if !valid_backends.contains(&self.backend.as_str()) {
            return Err(ConfigLoadError::Validation(format!(
                "store.backend must be one of: {valid_backends:?}"
            )));
        }
        if self.backend == "redb" && self.path.is_none() {
            return Err(ConfigLoadError::MissingField("store.path".to_string()));
        }

        let valid_compression = ["zstd", "none"];
        if !valid_compression.contains(&self.compression.as_str()) {
            return Err(ConfigLoadError::Validation(format!(
                "store.compression must be one of: {valid_compression:?}"
            )));
        }
        if self.compression == "zstd" && !(1..=22).contains(&self.level) {
            return Err(ConfigLoadError::Validation(
                "store.level must be between 1 and 22".to_string(),
            ));
        }
        Ok(())
    }

    /// Translate into the store's runtime configuration.
    pub fn store_config(&self) -> Result<StoreConfig, ConfigLoadError> {
        let backend = match self.backend.as_str() {
            "redb" => {
                let path = self
                    .path
                    .as_deref()
                    .ok_or_else(|| ConfigLoadError::MissingField("store.path".to_string()))?;
                BackendConfig::redb(path)
            }
            _ => BackendConfig::in_memory(),
        };
        let codec = match self.compression.as_str() {
            "none" => CompressionCodec::None,
            _ => CompressionCodec::Zstd,
        };
        Ok(StoreConfig::new()
            .with_backend(backend)
            .with_compression(CompressionConfig::new(codec, self.level)))
    }
}

impl Default for StoreYamlConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            path: None,
            compression: default_compression(),
            level: default_compression_level(),
        }
    }
}

// Helper functions for serde defaults
fn default_backend() -> String {
    "memory".to_string()
}
fn default_compression() -> String {
    "zstd".to_string()
}
fn default_compression_level() -> i32 {
    3
}
