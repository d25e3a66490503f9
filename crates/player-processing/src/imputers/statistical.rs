//! Column fill and row drop operations used by the resolver.

use super::policy::FillValue;
use crate::error::{PipelineError, Result};
use crate::types::{ActionType, StageAction};
use crate::utils::{
    date_to_days, ensure_date, ensure_numeric, ensure_text, require_series, round_to,
};
use chrono::NaiveDate;
use polars::prelude::*;
use tracing::{debug, warn};

/// Statistical and constant imputation for a single column.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Remove rows where `col_name` is missing. Returns the number removed.
    pub fn drop_missing_rows(df: &mut DataFrame, col_name: &str) -> Result<StageAction> {
        let series = require_series(df, col_name)?;
        let missing = series.null_count();

        if missing > 0 {
            let mask = series.is_not_null();
            *df = df.filter(&mask)?;
            debug!("Dropped {} rows missing '{}'", missing, col_name);
        }

        Ok(StageAction::new(
            ActionType::RowsDropped,
            col_name,
            format!("Dropped {} rows with missing '{}'", missing, col_name),
        )
        .with_affected(missing))
    }

    /// Fill with a constant text or number.
    pub fn apply_constant(
        df: &mut DataFrame,
        col_name: &str,
        value: &FillValue,
    ) -> Result<Option<StageAction>> {
        match value {
            FillValue::Text(text) => Self::fill_text(df, col_name, text),
            FillValue::Number(number) => {
                Self::fill_numeric(df, col_name, "constant", |_| Ok(Some(*number)))
            }
        }
    }

    /// Fill with the smallest observed value.
    pub fn apply_min(df: &mut DataFrame, col_name: &str) -> Result<Option<StageAction>> {
        Self::fill_numeric(df, col_name, "min", |values| Ok(values.min::<f64>()?))
    }

    /// Fill with the mean of observed values, rounded to `decimals`.
    pub fn apply_mean(
        df: &mut DataFrame,
        col_name: &str,
        decimals: u32,
    ) -> Result<Option<StageAction>> {
        Self::fill_numeric(df, col_name, "mean", |values| {
            Ok(values.mean().map(|mean| round_to(mean, decimals)))
        })
    }

    /// Fill a `Date` column with a fixed date.
    pub fn apply_date_constant(
        df: &mut DataFrame,
        col_name: &str,
        date: NaiveDate,
    ) -> Result<Option<StageAction>> {
        let series = require_series(df, col_name)?;
        let missing = series.null_count();
        if missing == 0 {
            return Ok(None);
        }

        ensure_date(series)?;
        let fill = lit(date_to_days(date)).cast(DataType::Date);
        Self::fill_nulls(df, col_name, DataType::Date, fill)?;

        debug!("Filled {} missing '{}' with {}", missing, col_name, date);
        Ok(Some(
            StageAction::new(
                ActionType::ValuesFilled,
                col_name,
                format!("Filled '{}' with date {}", col_name, date),
            )
            .with_affected(missing),
        ))
    }

    fn fill_text(df: &mut DataFrame, col_name: &str, fill: &str) -> Result<Option<StageAction>> {
        let series = require_series(df, col_name)?;
        let missing = series.null_count();
        if missing == 0 {
            return Ok(None);
        }

        ensure_text(series)?;
        Self::fill_nulls(df, col_name, DataType::String, lit(fill))?;

        debug!("Filled {} missing '{}' with '{}'", missing, col_name, fill);
        Ok(Some(
            StageAction::new(
                ActionType::ValuesFilled,
                col_name,
                format!("Filled '{}' with constant '{}'", col_name, fill),
            )
            .with_affected(missing),
        ))
    }

    /// Fill a numeric column with a value derived from its observed values.
    ///
    /// The statistic is computed only when something is missing, so a column
    /// without gaps keeps its dtype.
    fn fill_numeric(
        df: &mut DataFrame,
        col_name: &str,
        method: &str,
        statistic: impl Fn(&Series) -> Result<Option<f64>>,
    ) -> Result<Option<StageAction>> {
        let series = require_series(df, col_name)?;
        let missing = series.null_count();
        if missing == 0 {
            return Ok(None);
        }

        ensure_numeric(series)?;
        let values = series.cast(&DataType::Float64)?;
        let Some(fill_value) = statistic(&values)? else {
            warn!("'{}' has no observed values to take the {} of", col_name, method);
            return Err(PipelineError::NoValidValues(col_name.to_string()));
        };

        Self::fill_nulls(df, col_name, DataType::Float64, lit(fill_value))?;

        debug!(
            "Filled {} missing '{}' with {}: {}",
            missing, col_name, method, fill_value
        );
        Ok(Some(
            StageAction::new(
                ActionType::ValuesFilled,
                col_name,
                format!("Filled '{}' with {}: {:.2}", col_name, method, fill_value),
            )
            .with_affected(missing),
        ))
    }

    /// Replace the nulls of `col_name` with `fill`, casting the column to `dtype`.
    fn fill_nulls(df: &mut DataFrame, col_name: &str, dtype: DataType, fill: Expr) -> Result<()> {
        *df = df
            .clone()
            .lazy()
            .with_column(col(col_name).cast(dtype).fill_null(fill))
            .collect()?;
        Ok(())
    }
}
