//! Cache configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use govcache_utils::LogFormat;

use crate::CacheError;

/// Configuration for a governance cache node.
///
/// Can be loaded from a TOML file via [`CacheConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in bytes. Upper bound on the database size.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// Maximum number of named LMDB databases.
    #[serde(default = "default_max_dbs")]
    pub max_dbs: u32,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to print Prometheus metrics after each daemon command.
    #[serde(default)]
    pub enable_metrics: bool,

    /// Whether startup rebuilds the plugin tables from a supplied inventory
    /// when the version check fails.
    #[serde(default = "default_true")]
    pub auto_rebuild: bool,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./govcache_data")
}

fn default_map_size() -> usize {
    1024 * 1024 * 1024
}

fn default_max_dbs() -> u32 {
    16
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

// ── Impl ───────────────────────────────────────────────────────────────

impl CacheConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, CacheError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CacheError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, CacheError> {
        toml::from_str(s).map_err(|e| CacheError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("CacheConfig is always serializable to TOML")
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size: default_map_size(),
            max_dbs: default_max_dbs(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            enable_metrics: false,
            auto_rebuild: default_true(),
        }
    }
}
