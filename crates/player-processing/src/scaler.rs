//! Unit rescaling and presentation labels.

use crate::error::Result;
use crate::schema::{PRESENTATION_LABELS, RELEASE_CLAUSE, WAGE};
use crate::types::{ActionType, StageAction};
use crate::utils::ensure_numeric;
use polars::prelude::*;
use tracing::{debug, info};

/// Column divisors: Wage into thousands, Release Clause into millions.
const SCALES: [(&str, f64, &str); 2] = [
    (WAGE, 1_000.0, "thousands"),
    (RELEASE_CLAUSE, 1_000_000.0, "millions"),
];

/// Rescales currency columns and renames unit-bearing columns.
///
/// Works on partial schemas: columns that are absent are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnitScaler;

impl UnitScaler {
    pub fn scale_and_rename(&self, df: &DataFrame) -> Result<(DataFrame, Vec<StageAction>)> {
        info!("Scaling currency columns and applying unit labels...");

        let mut df = df.clone();
        let mut actions = Vec::new();

        for (col_name, divisor, unit) in SCALES {
            let Ok(column) = df.column(col_name) else {
                debug!("'{}' not present, skipping scale", col_name);
                continue;
            };
            let series = column.as_materialized_series();
            ensure_numeric(series)?;
            let scaled = &series.cast(&DataType::Float64)? / divisor;
            df.replace(col_name, scaled)?;

            actions.push(StageAction::new(
                ActionType::ColumnScaled,
                col_name,
                format!("Expressed '{}' in {}", col_name, unit),
            ));
        }

        for (from, to) in PRESENTATION_LABELS {
            if df.get_column_index(from).is_none() {
                continue;
            }
            df.rename(from, to.into())?;
            debug!("Renamed '{}' to '{}'", from, to);

            actions.push(StageAction::new(
                ActionType::ColumnRenamed,
                to,
                format!("Renamed '{}' to '{}'", from, to),
            ));
        }

        Ok((df, actions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{HEIGHT_LABEL, RELEASE_CLAUSE_LABEL, WAGE_LABEL, WEIGHT_LABEL};
    use pretty_assertions::assert_eq;

    fn value(df: &DataFrame, col: &str) -> Option<f64> {
        df.column(col)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .get(0)
    }

    #[test]
    fn test_scale_and_rename() {
        let df = df![
            "Name" => ["A"],
            "Wage" => [50_000.0],
            "Height" => [180.34],
            "Weight" => [74.84],
            "Release Clause" => [5_000_000.0],
        ]
        .unwrap();

        let (df, _) = UnitScaler.scale_and_rename(&df).unwrap();

        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(
            names,
            vec!["Name", WAGE_LABEL, HEIGHT_LABEL, WEIGHT_LABEL, RELEASE_CLAUSE_LABEL]
        );
        assert_eq!(value(&df, WAGE_LABEL), Some(50.0));
        assert_eq!(value(&df, RELEASE_CLAUSE_LABEL), Some(5.0));
        assert_eq!(value(&df, HEIGHT_LABEL), Some(180.34));
    }

    #[test]
    fn test_partial_schema_is_tolerated() {
        let df = df!["Name" => ["A"], "Height" => [170.18]].unwrap();

        let (df, actions) = UnitScaler.scale_and_rename(&df).unwrap();

        assert_eq!(actions.len(), 1);
        assert!(df.column(HEIGHT_LABEL).is_ok());
    }

    #[test]
    fn test_missing_wage_stays_missing() {
        let df = df!["Wage" => [Some(2_000.0), None]].unwrap();
        let (df, _) = UnitScaler.scale_and_rename(&df).unwrap();

        let wages = df.column(WAGE_LABEL).unwrap();
        assert_eq!(wages.null_count(), 1);
        assert_eq!(value(&df, WAGE_LABEL), Some(2.0));
    }

    #[test]
    fn test_text_wage_is_rejected() {
        let df = df!["Wage" => ["€100K"]].unwrap();
        let err = UnitScaler.scale_and_rename(&df).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_TYPE_MISMATCH");
    }

    #[test]
    fn test_integer_wage_is_scaled_as_float() {
        let df = df!["Wage" => [565_000i64]].unwrap();
        let (df, _) = UnitScaler.scale_and_rename(&df).unwrap();
        assert_eq!(value(&df, WAGE_LABEL), Some(565.0));
    }
}
