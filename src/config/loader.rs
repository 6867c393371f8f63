//! Configuration loading and discovery for `bfill.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::BfillConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name searched for by [`find_config`].
pub const CONFIG_FILE_NAME: &str = "bfill.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse bfill.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override tolerance
    pub tolerance: Option<u8>,
    /// Override layer opacity
    pub opacity: Option<f32>,
    /// Override pixel cap
    pub max_pixels: Option<u64>,
    /// Override time budget
    pub timeout_ms: Option<u64>,
    /// Enable or disable error collection
    pub collect_errors: Option<bool>,
}

/// Find bfill.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for bfill.toml
/// 2. Check XDG_CONFIG_HOME/bucketfill/bfill.toml (or ~/.config/bucketfill/bfill.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find bfill.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("bucketfill").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find bfill.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration.
///
/// If a path is provided, loads from that file. Otherwise, uses
/// [`find_config`] to locate one. With no config file anywhere, returns the
/// defaults.
///
/// # Example
/// ```ignore
/// let config = load_config(None)?;
/// let config = load_config(Some(Path::new("project/bfill.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<BfillConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(BfillConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<BfillConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: BfillConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
///
/// # Errors
///
/// Overrides go through the same validation as the file, so
/// `--opacity 2` is rejected the same way `opacity = 2.0` is.
pub fn merge_cli_overrides(
    config: &mut BfillConfig,
    overrides: &CliOverrides,
) -> Result<(), ConfigError> {
    if let Some(tolerance) = overrides.tolerance {
        config.fill.tolerance = tolerance;
    }

    if let Some(opacity) = overrides.opacity {
        config.layer.opacity = opacity;
    }

    if let Some(max_pixels) = overrides.max_pixels {
        config.fill.max_pixels = Some(max_pixels);
    }

    if let Some(timeout_ms) = overrides.timeout_ms {
        config.fill.timeout_ms = Some(timeout_ms);
    }

    if let Some(collect_errors) = overrides.collect_errors {
        config.telemetry.collect_errors = collect_errors;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }
    Ok(())
}

/// Resolve a path relative to the directory holding the config file.
///
/// Absolute paths are returned unchanged.
pub fn resolve_path(config_path: Option<&Path>, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match config_path.and_then(Path::parent) {
        Some(root) if !root.as_os_str().is_empty() => root.join(path),
        _ => path.to_path_buf(),
    }
}
