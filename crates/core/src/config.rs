//! Configuration structures for the options-flow system.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for the options job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cell parsing configuration.
    pub parse: ParseConfig,
    /// Activity / exposure filter configuration.
    pub filter: FilterConfig,
    /// Result file configuration.
    pub output: OutputConfig,
}

impl Config {
    /// Parse a configuration from JSON; missing sections take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Check that every section is usable.
    pub fn validate(&self) -> Result<()> {
        self.parse.validate()?;
        self.filter.validate()?;
        self.output.validate()
    }
}

/// Cell parsing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// `chrono` formats tried in order for the expiration date.
    pub date_formats: Vec<String>,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            date_formats: [
                "%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%Y/%m/%d", "%d-%b-%Y", "%b %d, %Y", "%Y%m%d",
            ]
            .iter()
            .map(|f| f.to_string())
            .collect(),
        }
    }
}

impl ParseConfig {
    fn validate(&self) -> Result<()> {
        if self.date_formats.is_empty() {
            return Err(Error::config("parse.date_formats must not be empty"));
        }
        Ok(())
    }
}

/// Activity / exposure filter thresholds.
///
/// A group is kept iff `total_volume >= min_total_volume` and
/// `delta_volume_diff > min_delta_volume_diff`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Inclusive lower bound on group volume.
    pub min_total_volume: f64,
    /// Exclusive lower bound on the signed delta-volume difference.
    pub min_delta_volume_diff: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_total_volume: 1000.0,
            min_delta_volume_diff: 0.0,
        }
    }
}

impl FilterConfig {
    fn validate(&self) -> Result<()> {
        if !self.min_total_volume.is_finite() {
            return Err(Error::config("filter.min_total_volume must be finite"));
        }
        if !self.min_delta_volume_diff.is_finite() {
            return Err(Error::config("filter.min_delta_volume_diff must be finite"));
        }
        Ok(())
    }
}

/// Result file configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Name of the persisted result file.
    pub file_name: String,
    /// Caption attached to the notification.
    pub caption: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_name: "processed_options.csv".to_string(),
            caption: "Processed options file".to_string(),
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<()> {
        let name = self.file_name.trim();
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err(Error::config(format!(
                "output.file_name must be a plain file name, got {:?}",
                self.file_name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.filter.min_total_volume, 1000.0);
        assert_eq!(config.filter.min_delta_volume_diff, 0.0);
        assert_eq!(config.output.file_name, "processed_options.csv");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = Config::from_json_str(r#"{"filter": {"min_total_volume": 500}}"#).unwrap();
        assert_eq!(config.filter.min_total_volume, 500.0);
        assert_eq!(config.filter.min_delta_volume_diff, 0.0);
        assert_eq!(config.parse, ParseConfig::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = Config::from_json_str(r#"{"parse": {"date_formats": []}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_json_str(r#"{"output": {"file_name": "a/b.csv"}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
