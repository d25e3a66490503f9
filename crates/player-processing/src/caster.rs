//! Integral casting of count-like columns.

use crate::error::{PipelineError, Result};
use crate::schema::INTEGRAL_COLUMNS;
use crate::types::{ActionType, StageAction};
use crate::utils::{is_numeric_dtype, require_series};
use polars::prelude::*;
use tracing::{debug, info};

/// Truncates International Reputation, Weak Foot and Jersey Number to `Int64`.
#[derive(Debug, Default, Clone, Copy)]
pub struct IntegralCaster;

impl IntegralCaster {
    /// Cast every column in [`INTEGRAL_COLUMNS`].
    ///
    /// Missing values must already be resolved; a null here means the
    /// resolver was skipped and is reported as [`PipelineError::UnexpectedNulls`].
    pub fn cast(&self, df: &DataFrame) -> Result<(DataFrame, Vec<StageAction>)> {
        info!("Casting {} columns to integers...", INTEGRAL_COLUMNS.len());

        let mut df = df.clone();
        let mut actions = Vec::with_capacity(INTEGRAL_COLUMNS.len());

        for col_name in INTEGRAL_COLUMNS {
            actions.push(Self::cast_column(&mut df, col_name)?);
        }

        Ok((df, actions))
    }

    fn cast_column(df: &mut DataFrame, col_name: &str) -> Result<StageAction> {
        let series = require_series(df, col_name)?;

        let missing = series.null_count();
        if missing > 0 {
            return Err(PipelineError::UnexpectedNulls {
                column: col_name.to_string(),
                stage: "integral casting".to_string(),
                count: missing,
            });
        }
        if !is_numeric_dtype(series.dtype()) {
            return Err(PipelineError::ColumnTypeMismatch {
                column: col_name.to_string(),
                expected: "numeric".to_string(),
                found: series.dtype().to_string(),
            });
        }

        let from = series.dtype().to_string();
        // float to int casts truncate toward zero
        let casted = series.strict_cast(&DataType::Int64)?;
        df.replace(col_name, casted)?;
        debug!("Cast '{}' from {} to Int64", col_name, from);

        Ok(StageAction::new(
            ActionType::ColumnCast,
            col_name,
            format!("Cast '{}' from {} to Int64", col_name, from),
        ))
    }
}
