//! # Converter Configuration
//!
//! Tunable constants of the conversion core. `ConverterConfig::default()`
//! reproduces the behaviour of the Dartfish/MyVA export tools; a YAML file can
//! override any subset of the fields.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = ConverterConfig::load("converter.yaml")?;
//! let table = flatten_json(&json, &config)?;
//! ```

use crate::error::{ConvertError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable naming an optional YAML config file.
pub const CONFIG_PATH_ENV: &str = "EVC_CONFIG_PATH";

/// Converter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Keys whose repeats within one segment accumulate (`new:old`) instead of
    /// overwriting.
    pub reserved_keys: Vec<String>,

    /// Substrings that mark a tag key as coordinate-like. Digit-only values of
    /// such keys are coerced to floats.
    pub coordinate_markers: Vec<String>,

    /// Column name produced by a bare line-separator tag (default U+2028)
    pub line_separator: String,
    /// Stable alias the line-separator column is renamed to
    pub line_separator_alias: String,

    /// Column holding the home team name
    pub home_column: String,
    /// Column holding the away team name
    pub away_column: String,
    /// Separator between team and action in a clip name (`"Reds - Shot"`)
    pub team_separator: String,

    /// Placeholder display color written for every XML row descriptor
    pub row_color: RowColor,

    /// CSV cell texts treated as empty on input
    pub missing_values: Vec<String>,
}

/// RGB triple of a MyVA row descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowColor {
    pub r: u32,
    pub g: u32,
    pub b: u32,
}

impl Default for RowColor {
    fn default() -> Self {
        Self {
            r: 65536,
            g: 65536,
            b: 65536,
        }
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            reserved_keys: ["Open", "Penetration", "Result", "SP"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            coordinate_markers: vec!["x".to_string(), "y".to_string()],
            line_separator: "\u{2028}".to_string(),
            line_separator_alias: "NL".to_string(),
            home_column: "Home".to_string(),
            away_column: "Away".to_string(),
            team_separator: " - ".to_string(),
            row_color: RowColor::default(),
            missing_values: ["NaN", "nan", "NA", "N/A", "NULL", "null", "#N/A"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ConverterConfig {
    /// Parse a YAML document; absent fields keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ConverterConfig =
            serde_yaml::from_str(yaml).map_err(|e| ConvertError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConvertError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_yaml(&content)?;
        log::debug!("Loaded converter config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.line_separator_alias.is_empty() {
            return Err(ConvertError::Config(
                "line_separator_alias must not be empty".to_string(),
            ));
        }
        if self.home_column.is_empty() || self.away_column.is_empty() {
            return Err(ConvertError::Config(
                "home_column and away_column must not be empty".to_string(),
            ));
        }
        if self.home_column == self.away_column {
            return Err(ConvertError::Config(format!(
                "home_column and away_column must differ (both '{}')",
                self.home_column
            )));
        }
        if self.team_separator.is_empty() {
            return Err(ConvertError::Config(
                "team_separator must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_reserved_key(&self, key: &str) -> bool {
        self.reserved_keys.iter().any(|k| k == key)
    }

    /// Coordinate-like key check. Plain substring match, so `Taxi` counts too.
    pub fn is_coordinate_key(&self, key: &str) -> bool {
        self.coordinate_markers
            .iter()
            .any(|m| !m.is_empty() && key.contains(m.as_str()))
    }

    pub fn is_missing_value(&self, cell: &str) -> bool {
        let trimmed = cell.trim();
        trimmed.is_empty() || self.missing_values.iter().any(|m| m == trimmed)
    }
}
