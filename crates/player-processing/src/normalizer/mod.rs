//! Unit & format normalization.
//!
//! Turns the free-text encodings of the raw dataset into typed columns:
//! - Height (`5'11`) and Weight (`165lbs`) into metric floats
//! - Wage and Release Clause (`€10.5M`) into plain currency units
//! - Joined and Contract Valid Until into `Date`
//! - Position into the derived `Position_Group`, placed right after Position
//!
//! A column is only parsed while it is still text, so normalizing an already
//! normalized table changes nothing.

pub mod parsers;
mod positions;

pub use positions::PositionGroup;

use crate::error::{PipelineError, Result};
use crate::schema::{
    CONTRACT_VALID_UNTIL, CURRENCY_COLUMNS, HEIGHT, JOINED, POSITION, POSITION_GROUP, WEIGHT,
};
use crate::types::{ActionType, StageAction};
use crate::utils::{date_series, require_series, text_values};
use chrono::NaiveDate;
use polars::prelude::*;
use tracing::{debug, info};

/// Columns parsed into dates, with the parser each one uses.
const DATE_COLUMNS: [(&str, fn(Option<&str>) -> Option<NaiveDate>); 2] = [
    (JOINED, parsers::parse_date),
    (CONTRACT_VALID_UNTIL, parsers::parse_contract_end),
];

/// Normalizer for free-text unit and date encodings.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnitNormalizer;

impl UnitNormalizer {
    /// Normalize all unit, currency and date columns and derive `Position_Group`.
    pub fn normalize(&self, df: &DataFrame) -> Result<(DataFrame, Vec<StageAction>)> {
        let mut df = df.clone();
        let mut actions = Vec::new();

        info!("Normalizing units, currencies and dates...");

        if let Some(action) = Self::convert_numeric(&mut df, HEIGHT, parsers::parse_height_cm)? {
            actions.push(action);
        }
        if let Some(action) = Self::convert_numeric(&mut df, WEIGHT, parsers::parse_weight_kg)? {
            actions.push(action);
        }
        for col in CURRENCY_COLUMNS {
            let converted = Self::convert_numeric(&mut df, col, |raw| {
                Some(parsers::parse_currency(raw))
            })?;
            actions.extend(converted);
        }
        for (col, parse) in DATE_COLUMNS {
            if let Some(action) = Self::convert_date(&mut df, col, parse)? {
                actions.push(action);
            }
        }

        let (df, group_action) = Self::group_positions(df)?;
        actions.push(group_action);

        Ok((df, actions))
    }

    /// Whether a column still holds raw text (an all-null column counts).
    fn is_raw(series: &Series) -> bool {
        matches!(series.dtype(), DataType::String | DataType::Null)
    }

    fn convert_numeric(
        df: &mut DataFrame,
        col_name: &str,
        parse: impl Fn(Option<&str>) -> Option<f64>,
    ) -> Result<Option<StageAction>> {
        let series = require_series(df, col_name)?;
        if !Self::is_raw(series) {
            debug!("'{}' is already {}, skipping", col_name, series.dtype());
            return Ok(None);
        }

        let raw = text_values(series)?;
        let parsed: Vec<Option<f64>> = raw.iter().map(|v| parse(v.as_deref())).collect();

        let unparsed = raw
            .iter()
            .zip(&parsed)
            .filter(|(r, p)| r.is_some() && p.is_none())
            .count();

        df.replace(col_name, Series::new(col_name.into(), parsed))?;
        debug!("Converted '{}' to Float64 ({} unparsable)", col_name, unparsed);

        Ok(Some(
            StageAction::new(
                ActionType::ColumnConverted,
                col_name,
                format!("Parsed '{}' from text to Float64", col_name),
            )
            .with_affected(unparsed),
        ))
    }

    fn convert_date(
        df: &mut DataFrame,
        col_name: &str,
        parse: fn(Option<&str>) -> Option<NaiveDate>,
    ) -> Result<Option<StageAction>> {
        let series = require_series(df, col_name)?;

        if let DataType::Datetime(_, _) = series.dtype() {
            let dates = series.cast(&DataType::Date)?;
            df.replace(col_name, dates)?;
            return Ok(Some(StageAction::new(
                ActionType::ColumnConverted,
                col_name,
                format!("Truncated '{}' from datetime to date", col_name),
            )));
        }
        // CSV inference reads a column of bare years as integers
        let text = if series.dtype().is_integer() {
            series.cast(&DataType::String)?
        } else if Self::is_raw(series) {
            series.clone()
        } else {
            debug!("'{}' is already {}, skipping", col_name, series.dtype());
            return Ok(None);
        };

        let raw = text_values(&text)?;
        let parsed: Vec<Option<NaiveDate>> = raw.iter().map(|v| parse(v.as_deref())).collect();
        let unparsed = raw
            .iter()
            .zip(&parsed)
            .filter(|(r, p)| r.is_some() && p.is_none())
            .count();

        df.replace(col_name, date_series(col_name.into(), &parsed)?)?;
        debug!("Converted '{}' to Date ({} unparsable)", col_name, unparsed);

        Ok(Some(
            StageAction::new(
                ActionType::ColumnConverted,
                col_name,
                format!("Parsed '{}' from text to Date", col_name),
            )
            .with_affected(unparsed),
        ))
    }

    /// Derive `Position_Group` from `Position` and place it directly after it.
    pub fn group_positions(mut df: DataFrame) -> Result<(DataFrame, StageAction)> {
        let positions = text_values(require_series(&df, POSITION)?)?;
        let groups: Vec<&str> = positions
            .iter()
            .map(|code| PositionGroup::from_code(code.as_deref()).as_str())
            .collect();
        let others = groups
            .iter()
            .filter(|g| **g == PositionGroup::Other.as_str())
            .count();

        if df.get_column_index(POSITION_GROUP).is_some() {
            df.drop_in_place(POSITION_GROUP)?;
        }
        let position_idx = df
            .get_column_index(POSITION)
            .ok_or_else(|| PipelineError::ColumnNotFound(POSITION.to_string()))?;
        df.insert_column(position_idx + 1, Series::new(POSITION_GROUP.into(), groups))?;

        debug!("Derived '{}' ({} rows mapped to Other)", POSITION_GROUP, others);

        Ok((
            df,
            StageAction::new(
                ActionType::ColumnDerived,
                POSITION_GROUP,
                format!("Grouped '{}' codes into GK/DEF/MDF/ATT/Other", POSITION),
            )
            .with_affected(others),
        ))
    }
}
