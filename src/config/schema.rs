//! Configuration schema types for `bfill.toml`
//!
//! Defines the structure and validation rules for bucket fill configuration.
//! Every section is optional; an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::fill::{FillLimits, DEFAULT_TOLERANCE};

/// Fill engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillConfig {
    /// Per-channel tolerance (0-255)
    #[serde(default = "default_tolerance")]
    pub tolerance: u8,
    /// Abort fills whose region grows past this many pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pixels: Option<u64>,
    /// Abort fills that run longer than this many milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self { tolerance: default_tolerance(), max_pixels: None, timeout_ms: None }
    }
}

impl FillConfig {
    /// The caps as engine limits.
    pub fn limits(&self) -> FillLimits {
        FillLimits {
            max_pixels: self.max_pixels,
            timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }
}

fn default_tolerance() -> u8 {
    DEFAULT_TOLERANCE
}

/// Settings for the layer a fill produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Render-time opacity stored on the fill layer (0.0-1.0)
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self { opacity: default_opacity() }
    }
}

fn default_opacity() -> f32 {
    1.0
}

/// Local error telemetry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Append failed fills to `error_log`
    #[serde(default)]
    pub collect_errors: bool,
    /// JSONL file receiving error entries
    #[serde(default = "default_error_log")]
    pub error_log: PathBuf,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { collect_errors: false, error_log: default_error_log() }
    }
}

fn default_error_log() -> PathBuf {
    PathBuf::from(".bfill/errors.jsonl")
}

/// Complete `bfill.toml` configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BfillConfig {
    /// Fill engine settings
    #[serde(default)]
    pub fill: FillConfig,
    /// Fill layer settings
    #[serde(default)]
    pub layer: LayerConfig,
    /// Error telemetry settings
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "layer.opacity")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bfill.toml: '{}' {}", self.field, self.message)
    }
}

impl BfillConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.fill.max_pixels == Some(0) {
            errors.push(ConfigValidationError {
                field: "fill.max_pixels".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        if self.fill.timeout_ms == Some(0) {
            errors.push(ConfigValidationError {
                field: "fill.timeout_ms".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        let opacity = self.layer.opacity;
        if !(0.0..=1.0).contains(&opacity) {
            errors.push(ConfigValidationError {
                field: "layer.opacity".to_string(),
                message: format!("must be between 0.0 and 1.0, got {}", opacity),
            });
        }

        if self.telemetry.error_log.as_os_str().is_empty() {
            errors.push(ConfigValidationError {
                field: "telemetry.error_log".to_string(),
                message: "must be a non-empty path".to_string(),
            });
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
