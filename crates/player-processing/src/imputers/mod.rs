//! Missing-value resolution.
//!
//! This module provides:
//! - [`ImputationPolicy`], the ordered per-column rule list
//! - [`StatisticalImputer`], the individual drop/fill operations
//! - [`MissingValueResolver`], which evaluates a policy against a table

mod policy;
mod statistical;

pub use policy::{FillValue, ImputationPolicy, ImputationRule, ImputationStrategy};
pub use statistical::StatisticalImputer;

use crate::error::{PipelineError, Result};
use crate::types::StageAction;
use crate::utils::require_columns;
use polars::prelude::*;
use tracing::{info, warn};

/// Applies an [`ImputationPolicy`] rule by rule.
#[derive(Debug, Clone)]
pub struct MissingValueResolver {
    policy: ImputationPolicy,
}

impl Default for MissingValueResolver {
    fn default() -> Self {
        Self::new(ImputationPolicy::standard())
    }
}

impl MissingValueResolver {
    pub fn new(policy: ImputationPolicy) -> Self {
        if !policy.drops_first() {
            warn!("Imputation policy fills before it drops; fill statistics will include dropped rows");
        }
        Self { policy }
    }

    pub fn policy(&self) -> &ImputationPolicy {
        &self.policy
    }

    /// Resolve missing values in `df` according to the policy.
    ///
    /// Every column the policy references must exist; this is checked before
    /// any rule runs so a schema mismatch never leaves a half-resolved table.
    pub fn resolve(&self, df: &DataFrame) -> Result<(DataFrame, Vec<StageAction>)> {
        require_columns(df, &self.policy.columns())?;

        info!(
            "Resolving missing values with {} rules...",
            self.policy.rules().len()
        );

        let mut df = df.clone();
        let mut actions = Vec::new();

        for rule in self.policy.rules() {
            let col = rule.column.as_str();
            let action = match &rule.strategy {
                ImputationStrategy::DropRow => {
                    Some(StatisticalImputer::drop_missing_rows(&mut df, col)?)
                }
                ImputationStrategy::ConstantFill(value) => {
                    StatisticalImputer::apply_constant(&mut df, col, value)?
                }
                ImputationStrategy::MinFill => StatisticalImputer::apply_min(&mut df, col)?,
                ImputationStrategy::MeanFill(decimals) => {
                    StatisticalImputer::apply_mean(&mut df, col, *decimals)?
                }
                ImputationStrategy::DateConstantFill(date) => {
                    StatisticalImputer::apply_date_constant(&mut df, col, *date)?
                }
            };
            actions.extend(action);
        }

        Ok((df, actions))
    }

    /// Fail if any policy column still has missing values.
    pub fn verify(&self, df: &DataFrame) -> Result<()> {
        for col in self.policy.columns() {
            let column = df
                .column(col)
                .map_err(|_| PipelineError::ColumnNotFound(col.to_string()))?;
            if column.null_count() > 0 {
                return Err(PipelineError::UnexpectedNulls {
                    column: col.to_string(),
                    stage: "missing-value resolution".to_string(),
                    count: column.null_count(),
                });
            }
        }
        Ok(())
    }
}
