//! Configuration file loading with precedence handling.

use crate::model::{GroupingRules, DEFAULT_GROUP_WINDOW, DEFAULT_MAX_GROUP_SIZE};
use crate::row::{MetricsError, RowMetrics, DEFAULT_FONT_SIZE};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "CHATROW_CONFIG";

/// Environment variable overriding the default font size.
pub const FONT_SIZE_ENV: &str = "CHATROW_FONT_SIZE";

/// Default simulated latency of attachment preview fetches.
pub const DEFAULT_PREVIEW_DELAY: Duration = Duration::from_millis(250);

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file, ...).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional; anything missing falls back to the defaults.
/// Corresponds to `~/.config/chatrow/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Font size used for row height estimation.
    #[serde(default)]
    pub default_font_size: Option<f32>,

    /// Maximum gap between two messages of one group, in seconds.
    #[serde(default)]
    pub group_window_secs: Option<u64>,

    /// Maximum messages per group, lead row included.
    #[serde(default)]
    pub max_group_size: Option<usize>,

    /// Simulated latency of preview fetches, in milliseconds.
    #[serde(default)]
    pub preview_delay_ms: Option<u64>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Font size used for row height estimation.
    pub default_font_size: f32,
    /// Maximum gap between grouped messages.
    pub group_window: Duration,
    /// Maximum messages per group.
    pub max_group_size: usize,
    /// Simulated preview fetch latency.
    pub preview_delay: Duration,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            default_font_size: DEFAULT_FONT_SIZE,
            group_window: DEFAULT_GROUP_WINDOW,
            max_group_size: DEFAULT_MAX_GROUP_SIZE,
            preview_delay: DEFAULT_PREVIEW_DELAY,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Build the row metrics this configuration describes.
    ///
    /// Only the font size is configurable; the minimum row height is fixed.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Invalid` for a non-positive or non-finite font size.
    pub fn row_metrics(&self) -> Result<RowMetrics, MetricsError> {
        RowMetrics::new(self.default_font_size)
    }

    /// Grouping rules for building the conversation.
    pub fn grouping_rules(&self) -> GroupingRules {
        GroupingRules {
            window: self.group_window,
            max_group_size: self.max_group_size.max(1),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/chatrow/chatrow.log` on Linux, or the platform
/// equivalent. Falls back to the current directory when no state directory
/// exists (macOS, Windows).
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("chatrow").join("chatrow.log")
    } else {
        PathBuf::from("chatrow.log")
    }
}

/// Resolve default config file path.
///
/// Returns `~/.config/chatrow/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chatrow").join("config.toml"))
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `CHATROW_CONFIG` environment variable
/// 3. Default path `~/.config/chatrow/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_PATH_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks `CHATROW_FONT_SIZE`. Values that are not positive numbers are
/// logged and ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(raw) = std::env::var(FONT_SIZE_ENV) {
        match raw.trim().parse::<f32>() {
            Ok(size) if size.is_finite() && size > 0.0 => config.default_font_size = size,
            _ => warn!(value = %raw, "Ignoring invalid {FONT_SIZE_ENV}"),
        }
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        default_font_size: config
            .default_font_size
            .unwrap_or(defaults.default_font_size),
        group_window: config
            .group_window_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.group_window),
        max_group_size: config.max_group_size.unwrap_or(defaults.max_group_size),
        preview_delay: config
            .preview_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.preview_delay),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only flags the user actually passed are applied.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    font_size_override: Option<f32>,
    group_window_override: Option<u64>,
) -> ResolvedConfig {
    if let Some(size) = font_size_override {
        config.default_font_size = size;
    }

    if let Some(secs) = group_window_override {
        config.group_window = Duration::from_secs(secs);
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
