//! Per-column missing-value policy.
//!
//! A policy is an ordered list of `(column, strategy)` rules evaluated one
//! after another. Drop rules come first so that the statistics used by later
//! fills only see surviving rows.

use crate::config::PipelineConfig;
use crate::schema::{
    AGE, CLUB, CONTRACT_VALID_UNTIL, HEIGHT, INTERNATIONAL_REPUTATION, JERSEY_NUMBER, JOINED,
    KEY_COLUMNS, NATIONALITY, PREFERRED_FOOT, RELEASE_CLAUSE, WAGE, WEAK_FOOT, WEIGHT,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Constant used by [`ImputationStrategy::ConstantFill`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for FillValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "'{}'", s),
        }
    }
}

/// How missing values in one column are resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "value", rename_all = "snake_case")]
pub enum ImputationStrategy {
    /// Remove every row where the column is missing
    DropRow,
    /// Fill with a fixed text or number
    ConstantFill(FillValue),
    /// Fill with the smallest observed value
    MinFill,
    /// Fill with the mean of observed values, rounded to the given decimals
    MeanFill(u32),
    /// Fill a date column with a fixed date
    DateConstantFill(NaiveDate),
}

impl ImputationStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DropRow => "drop_row",
            Self::ConstantFill(_) => "constant",
            Self::MinFill => "min",
            Self::MeanFill(_) => "mean",
            Self::DateConstantFill(_) => "date_constant",
        }
    }
}

/// A single `(column, strategy)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationRule {
    pub column: String,
    pub strategy: ImputationStrategy,
}

/// Ordered list of imputation rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImputationPolicy {
    rules: Vec<ImputationRule>,
}

impl ImputationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// The player dataset policy with default fill values.
    pub fn standard() -> Self {
        Self::from_config(&PipelineConfig::default())
    }

    /// The player dataset policy, taking constants from `config`.
    pub fn from_config(config: &PipelineConfig) -> Self {
        let mut policy = Self::new();
        for col in KEY_COLUMNS {
            policy = policy.drop_row(col);
        }
        policy
            .constant(NATIONALITY, FillValue::Text(config.nationality_fill.clone()))
            .constant(CLUB, FillValue::Text(config.club_fill.clone()))
            .constant(PREFERRED_FOOT, FillValue::Text(config.preferred_foot_fill.clone()))
            .constant(WAGE, FillValue::Number(0.0))
            .constant(RELEASE_CLAUSE, FillValue::Number(0.0))
            .constant(JERSEY_NUMBER, FillValue::Number(0.0))
            .min(WEAK_FOOT)
            .min(INTERNATIONAL_REPUTATION)
            .mean(AGE, config.mean_precision)
            .mean(HEIGHT, config.mean_precision)
            .mean(WEIGHT, config.mean_precision)
            .date(JOINED, config.joined_default)
            .date(CONTRACT_VALID_UNTIL, config.contract_default)
    }

    /// Append a rule.
    pub fn rule(mut self, column: impl Into<String>, strategy: ImputationStrategy) -> Self {
        self.rules.push(ImputationRule {
            column: column.into(),
            strategy,
        });
        self
    }

    pub fn drop_row(self, column: impl Into<String>) -> Self {
        self.rule(column, ImputationStrategy::DropRow)
    }

    pub fn constant(self, column: impl Into<String>, value: FillValue) -> Self {
        self.rule(column, ImputationStrategy::ConstantFill(value))
    }

    pub fn min(self, column: impl Into<String>) -> Self {
        self.rule(column, ImputationStrategy::MinFill)
    }

    pub fn mean(self, column: impl Into<String>, decimals: u32) -> Self {
        self.rule(column, ImputationStrategy::MeanFill(decimals))
    }

    pub fn date(self, column: impl Into<String>, date: NaiveDate) -> Self {
        self.rule(column, ImputationStrategy::DateConstantFill(date))
    }

    pub fn rules(&self) -> &[ImputationRule] {
        &self.rules
    }

    /// Strategy configured for `column`, if any.
    pub fn strategy_for(&self, column: &str) -> Option<&ImputationStrategy> {
        self.rules
            .iter()
            .find(|r| r.column == column)
            .map(|r| &r.strategy)
    }

    /// Distinct columns the policy touches, in rule order.
    pub fn columns(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for rule in &self.rules {
            if !seen.contains(&rule.column.as_str()) {
                seen.push(rule.column.as_str());
            }
        }
        seen
    }

    /// Whether every drop rule precedes every fill rule.
    pub fn drops_first(&self) -> bool {
        let first_fill = self
            .rules
            .iter()
            .position(|r| r.strategy != ImputationStrategy::DropRow);
        match first_fill {
            Some(idx) => self.rules[idx..]
                .iter()
                .all(|r| r.strategy != ImputationStrategy::DropRow),
            None => true,
        }
    }
}
