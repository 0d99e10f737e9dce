//! Application configuration loaded from a TOML file.
//!
//! The default configuration matches the values shown in `config/default.toml`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::units::ByteSize;

/// Top-level application configuration.
///
/// All fields have sensible defaults so dclean works without a config file.
/// Call [`Config::load`] to read from a TOML path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub categories: CategoryConfig,
    #[serde(default)]
    pub delete: DeleteConfig,
}

impl Config {
    /// Loads configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if the file is not readable.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed or a size string is invalid.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
            _ => CoreError::Io(e),
        })?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }
}

/// Tree walk behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Follow directory symlinks whose target has not been visited yet.
    #[serde(default = "default_true")]
    pub follow_symlinks: bool,
    /// Run the (expensive) duplicate detector as part of every scan.
    #[serde(default)]
    pub include_duplicates: bool,
    /// Entries read from one directory between two cancellation checks.
    #[serde(default = "default_cancel_check_interval")]
    pub cancel_check_interval: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
            include_duplicates: false,
            cancel_check_interval: default_cancel_check_interval(),
        }
    }
}

/// Thresholds and name sets for the classification rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    #[serde(default = "default_large_threshold")]
    pub large_threshold: ByteSize,
    #[serde(default = "default_old_age_days")]
    pub old_age_days: u64,
    /// Report files not opened for this many days. Off when unset, because
    /// many volumes do not keep access times up to date.
    #[serde(default)]
    pub never_accessed_days: Option<u64>,
    /// File-name suffixes (with the leading dot) that mark temporary files.
    #[serde(default = "default_temp_suffixes")]
    pub temp_suffixes: Vec<String>,
    /// Exact file names that mark junk files.
    #[serde(default = "default_temp_file_names")]
    pub temp_file_names: Vec<String>,
    /// Directory names whose contents are all considered temporary.
    #[serde(default = "default_junk_dir_names")]
    pub junk_dir_names: Vec<String>,
}

impl CategoryConfig {
    pub fn large_threshold_bytes(&self) -> u64 {
        self.large_threshold.bytes()
    }

    pub fn old_age(&self) -> std::time::Duration {
        days(self.old_age_days)
    }

    /// Age for the not-accessed category, or `None` when it is disabled.
    pub fn never_accessed_age(&self) -> Option<std::time::Duration> {
        self.never_accessed_days.map(days)
    }
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            large_threshold: default_large_threshold(),
            old_age_days: default_old_age_days(),
            never_accessed_days: None,
            temp_suffixes: default_temp_suffixes(),
            temp_file_names: default_temp_file_names(),
            junk_dir_names: default_junk_dir_names(),
        }
    }
}

/// Deletion preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteConfig {
    /// Bypass the trash. Off unless explicitly enabled.
    #[serde(default)]
    pub permanent: bool,
}

fn days(n: u64) -> std::time::Duration {
    std::time::Duration::from_secs(n.saturating_mul(24 * 60 * 60))
}

fn default_true() -> bool {
    true
}

fn default_cancel_check_interval() -> usize {
    256
}

fn default_large_threshold() -> ByteSize {
    ByteSize(100 * 1024 * 1024)
}

fn default_old_age_days() -> u64 {
    365
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_temp_suffixes() -> Vec<String> {
    to_strings(&[
        ".tmp",
        ".temp",
        ".log",
        ".cache",
        ".bak",
        ".old",
        ".thumbcache",
        ".swp",
        ".swo",
        ".swn",
    ])
}

fn default_temp_file_names() -> Vec<String> {
    to_strings(&["thumbs.db", "desktop.ini", ".ds_store"])
}

fn default_junk_dir_names() -> Vec<String> {
    to_strings(&[
        "__pycache__",
        "node_modules",
        ".pytest_cache",
        ".cache",
        "pip_cache",
    ])
}
