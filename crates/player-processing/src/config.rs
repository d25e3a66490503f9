//! Configuration types for the player cleaning pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use crate::cohort::{CohortBasis, CohortRange, CohortSelection};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

const MAX_MEAN_PRECISION: u32 = 10;

fn default_joined() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 1, 31).unwrap_or_default()
}

fn default_contract() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 12, 31).unwrap_or_default()
}

/// Configuration for the cleaning pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use player_processing::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .club_fill("Without Club")
///     .cohort(CohortRange::new(75.0, 90.0)?, CohortBasis::Selected)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fill for a missing Joined date.
    /// Default: 2019-01-31
    pub joined_default: NaiveDate,

    /// Fill for a missing Contract Valid Until date.
    /// Default: 2018-12-31
    pub contract_default: NaiveDate,

    /// Fill for a missing Nationality.
    /// Default: "Unknown"
    pub nationality_fill: String,

    /// Fill for a missing Club.
    /// Default: "Free Agent"
    pub club_fill: String,

    /// Fill for a missing Preferred Foot.
    /// Default: "Right"
    pub preferred_foot_fill: String,

    /// Decimal places kept by mean fills (Age, Height, Weight).
    /// Default: 2
    pub mean_precision: u32,

    /// Optional club cohort filter run as part of the pipeline.
    /// Default: None
    pub cohort: Option<CohortSelection>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            joined_default: default_joined(),
            contract_default: default_contract(),
            nationality_fill: "Unknown".to_string(),
            club_fill: "Free Agent".to_string(),
            preferred_foot_fill: "Right".to_string(),
            mean_precision: 2,
            cohort: None,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config
            .validate()
            .map_err(|e| crate::error::PipelineError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (field, value) in [
            ("nationality_fill", &self.nationality_fill),
            ("club_fill", &self.club_fill),
            ("preferred_foot_fill", &self.preferred_foot_fill),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigValidationError::EmptyFill(field.to_string()));
            }
        }

        if self.mean_precision > MAX_MEAN_PRECISION {
            return Err(ConfigValidationError::InvalidPrecision(self.mean_precision));
        }

        if let Some(selection) = &self.cohort {
            let CohortRange { min, max } = selection.range;
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(ConfigValidationError::InvalidCohortRange { min, max });
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Fill value for '{0}' must not be empty")]
    EmptyFill(String),

    #[error("Invalid mean precision: {0} (must be at most 10)")]
    InvalidPrecision(u32),

    #[error("Invalid cohort range [{min}, {max}) (bounds must be finite with min <= max)")]
    InvalidCohortRange { min: f64, max: f64 },
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    joined_default: Option<NaiveDate>,
    contract_default: Option<NaiveDate>,
    nationality_fill: Option<String>,
    club_fill: Option<String>,
    preferred_foot_fill: Option<String>,
    mean_precision: Option<u32>,
    cohort: Option<CohortSelection>,
}

impl PipelineConfigBuilder {
    /// Set the date used for players with no Joined date.
    pub fn joined_default(mut self, date: NaiveDate) -> Self {
        self.joined_default = Some(date);
        self
    }

    /// Set the date used for players with no contract end.
    pub fn contract_default(mut self, date: NaiveDate) -> Self {
        self.contract_default = Some(date);
        self
    }

    pub fn nationality_fill(mut self, value: impl Into<String>) -> Self {
        self.nationality_fill = Some(value.into());
        self
    }

    pub fn club_fill(mut self, value: impl Into<String>) -> Self {
        self.club_fill = Some(value.into());
        self
    }

    pub fn preferred_foot_fill(mut self, value: impl Into<String>) -> Self {
        self.preferred_foot_fill = Some(value.into());
        self
    }

    /// Set the decimal places kept by mean fills.
    pub fn mean_precision(mut self, decimals: u32) -> Self {
        self.mean_precision = Some(decimals);
        self
    }

    /// Run the cohort filter on the table at `basis`.
    pub fn cohort(mut self, range: CohortRange, basis: CohortBasis) -> Self {
        self.cohort = Some(CohortSelection { range, basis });
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            joined_default: self.joined_default.unwrap_or(defaults.joined_default),
            contract_default: self.contract_default.unwrap_or(defaults.contract_default),
            nationality_fill: self.nationality_fill.unwrap_or(defaults.nationality_fill),
            club_fill: self.club_fill.unwrap_or(defaults.club_fill),
            preferred_foot_fill: self
                .preferred_foot_fill
                .unwrap_or(defaults.preferred_foot_fill),
            mean_precision: self.mean_precision.unwrap_or(defaults.mean_precision),
            cohort: self.cohort,
        };

        config.validate()?;
        Ok(config)
    }
}
