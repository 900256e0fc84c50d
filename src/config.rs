//! Report Configuration Module
//! Role mapping table, candidate skills and forecast settings loaded from TOML.

use crate::data::RoleMapper;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Built-in configuration shipped with the binary.
const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Kind of interval drawn around each forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalKind {
    /// Interval for the mean response at the forecast year.
    #[default]
    Confidence,
    /// Interval for a single new observation at the forecast year.
    Prediction,
}

/// Settings for the per-role trend forecaster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Fixed forecast years. When absent, years are relative to the latest
    /// observed year of each role.
    #[serde(default)]
    pub years: Option<Vec<i64>>,
    #[serde(default = "default_horizon")]
    pub horizon: u32,
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
    #[serde(default)]
    pub interval: IntervalKind,
    /// Minimum distinct years required to fit a line.
    #[serde(default = "default_min_points")]
    pub min_points: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            years: None,
            horizon: default_horizon(),
            confidence_level: default_confidence_level(),
            interval: IntervalKind::default(),
            min_points: default_min_points(),
        }
    }
}

impl ForecastConfig {
    /// Years to forecast given the latest observed year of a series.
    pub fn target_years(&self, latest_year: i64) -> Vec<i64> {
        match &self.years {
            Some(years) => years.clone(),
            None => (1..=i64::from(self.horizon))
                .map(|step| latest_year + step)
                .collect(),
        }
    }
}

fn default_horizon() -> u32 {
    2
}

fn default_confidence_level() -> f64 {
    0.95
}

fn default_min_points() -> usize {
    2
}

fn default_top_n() -> usize {
    5
}

/// Full configuration of one report run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Candidate skill columns, matched case-sensitively against the survey header.
    pub skills: Vec<String>,
    pub roles: RoleMapper,
    #[serde(default)]
    pub forecast: ForecastConfig,
}

impl ReportConfig {
    /// Configuration embedded from `config/default.toml`.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_toml_str(DEFAULT_CONFIG)
    }

    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ReportConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_n == 0 {
            return Err(ConfigError::Invalid("top_n must be at least 1".into()));
        }
        if self.roles.is_empty() {
            return Err(ConfigError::Invalid("roles table is empty".into()));
        }

        let forecast = &self.forecast;
        if !(forecast.confidence_level > 0.0 && forecast.confidence_level < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "confidence_level must be in (0, 1), got {}",
                forecast.confidence_level
            )));
        }
        if forecast.min_points < 2 {
            return Err(ConfigError::Invalid(
                "min_points must be at least 2 to define a slope".into(),
            ));
        }
        match &forecast.years {
            Some(years) if years.is_empty() => {
                return Err(ConfigError::Invalid("forecast.years is empty".into()));
            }
            None if forecast.horizon == 0 => {
                return Err(ConfigError::Invalid(
                    "forecast.horizon must be at least 1".into(),
                ));
            }
            _ => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Role;

    #[test]
    fn test_builtin_config_parses() {
        let config = ReportConfig::builtin().unwrap();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.roles.len(), 4);
        assert_eq!(config.roles.target_roles(), Role::ALL.to_vec());
        assert!(config.skills.iter().any(|s| s == "python"));
        assert_eq!(config.forecast.confidence_level, 0.95);
        assert_eq!(config.forecast.interval, IntervalKind::Confidence);
    }

    #[test]
    fn test_relative_target_years() {
        let forecast = ForecastConfig::default();
        assert_eq!(forecast.target_years(2024), vec![2025, 2026]);
    }

    #[test]
    fn test_fixed_target_years() {
        let config = ReportConfig::from_toml_str(
            r#"
            skills = ["python"]
            [roles]
            "DS" = "Data Scientist"
            [forecast]
            years = [2026, 2027]
            interval = "prediction"
            "#,
        )
        .unwrap();
        assert_eq!(config.forecast.target_years(2021), vec![2026, 2027]);
        assert_eq!(config.forecast.interval, IntervalKind::Prediction);
        assert_eq!(config.roles.map_label("DS"), Some(Role::DataScientist));
    }

    #[test]
    fn test_rejects_bad_confidence_level() {
        let err = ReportConfig::from_toml_str(
            r#"
            skills = []
            [roles]
            "DS" = "Data Scientist"
            [forecast]
            confidence_level = 1.5
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_single_point_minimum() {
        let err = ReportConfig::from_toml_str(
            r#"
            skills = []
            [roles]
            "DS" = "Data Scientist"
            [forecast]
            min_points = 1
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_unknown_canonical_role() {
        let err = ReportConfig::from_toml_str(
            r#"
            skills = []
            [roles]
            "DE" = "Data Engineer"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
