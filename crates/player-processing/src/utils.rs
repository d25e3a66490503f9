//! Shared utilities for the cleaning pipeline.
//!
//! Helpers for dtype checks, column lookup, rounding and the day-count
//! representation polars uses for `Date` columns.

use crate::error::{PipelineError, Result};
use chrono::NaiveDate;
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Columns read entirely as nulls come back with the `Null` dtype; they are
/// accepted wherever a typed column is expected.
#[inline]
fn is_untyped(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Null)
}

// =============================================================================
// Column Access
// =============================================================================

/// Look up a column as a series, mapping absence to [`PipelineError::ColumnNotFound`].
pub fn require_series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|col| col.as_materialized_series())
        .map_err(|_| PipelineError::ColumnNotFound(name.to_string()))
}

/// Fail unless every named column exists.
pub fn require_columns(df: &DataFrame, names: &[&str]) -> Result<()> {
    for name in names {
        require_series(df, name)?;
    }
    Ok(())
}

fn type_mismatch(series: &Series, expected: &str) -> PipelineError {
    PipelineError::ColumnTypeMismatch {
        column: series.name().to_string(),
        expected: expected.to_string(),
        found: series.dtype().to_string(),
    }
}

/// Fail unless `series` is numeric (or untyped).
pub fn ensure_numeric(series: &Series) -> Result<()> {
    let dtype = series.dtype();
    if !is_numeric_dtype(dtype) && !is_untyped(dtype) {
        return Err(type_mismatch(series, "numeric"));
    }
    Ok(())
}

/// Fail unless `series` holds text (or is untyped).
pub fn ensure_text(series: &Series) -> Result<()> {
    let dtype = series.dtype();
    if !matches!(dtype, DataType::String) && !is_untyped(dtype) {
        return Err(type_mismatch(series, "string"));
    }
    Ok(())
}

/// Fail unless `series` is a `Date` column (or untyped).
pub fn ensure_date(series: &Series) -> Result<()> {
    let dtype = series.dtype();
    if !matches!(dtype, DataType::Date) && !is_untyped(dtype) {
        return Err(type_mismatch(series, "date"));
    }
    Ok(())
}

/// View a numeric column as `Float64` values.
pub fn numeric_values(series: &Series) -> Result<Vec<Option<f64>>> {
    ensure_numeric(series)?;
    let casted = series.cast(&DataType::Float64)?;
    Ok(casted.f64()?.into_iter().collect())
}

/// View a text column as owned strings.
pub fn text_values(series: &Series) -> Result<Vec<Option<String>>> {
    ensure_text(series)?;
    if is_untyped(series.dtype()) {
        return Ok(vec![None; series.len()]);
    }
    Ok(series
        .str()?
        .into_iter()
        .map(|opt| opt.map(str::to_string))
        .collect())
}

/// View a `Date` column as calendar dates.
pub fn date_values(series: &Series) -> Result<Vec<Option<NaiveDate>>> {
    ensure_date(series)?;
    let days = series.cast(&DataType::Int32)?;
    Ok(days
        .i32()?
        .into_iter()
        .map(|opt| opt.and_then(days_to_date))
        .collect())
}

/// Build a `Date` series from optional calendar dates.
pub fn date_series(name: PlSmallStr, values: &[Option<NaiveDate>]) -> Result<Series> {
    let days: Vec<Option<i32>> = values.iter().map(|v| v.map(date_to_days)).collect();
    Ok(Series::new(name, days).cast(&DataType::Date)?)
}

// =============================================================================
// Numeric & Date Helpers
// =============================================================================

/// Round `value` to `decimals` places, half away from zero.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

fn unix_epoch() -> NaiveDate {
    NaiveDate::default()
}

/// Days since 1970-01-01, the physical representation of a polars `Date`.
pub fn date_to_days(date: NaiveDate) -> i32 {
    (date - unix_epoch()).num_days() as i32
}

/// Inverse of [`date_to_days`].
pub fn days_to_date(days: i32) -> Option<NaiveDate> {
    unix_epoch().checked_add_signed(chrono::Duration::days(days as i64))
}

/// Share of non-null cells in the table (1.0 for an empty table).
pub fn completeness(df: &DataFrame) -> f32 {
    let total_cells = df.height() * df.width();
    if total_cells == 0 {
        return 1.0;
    }
    let null_count: usize = df.get_columns().iter().map(|col| col.null_count()).sum();
    total_cells.saturating_sub(null_count) as f32 / total_cells as f32
}

// =============================================================================
// Tests
// =============================================================================
