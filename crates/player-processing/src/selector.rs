//! Projection of the raw table onto the fixed player schema.

use crate::error::{PipelineError, Result};
use crate::schema::SELECTED_COLUMNS;
use crate::types::{ActionType, StageAction};
use polars::prelude::*;
use tracing::{debug, info};

/// Selects the 17 columns the pipeline works on, in canonical order.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColumnSelector;

impl ColumnSelector {
    /// Project `df` onto [`SELECTED_COLUMNS`].
    ///
    /// Every required column must be present; the first absent one is
    /// reported as [`PipelineError::ColumnNotFound`].
    pub fn select(&self, df: &DataFrame) -> Result<(DataFrame, StageAction)> {
        info!("Selecting {} player columns...", SELECTED_COLUMNS.len());

        if let Some(missing) = SELECTED_COLUMNS
            .iter()
            .find(|name| df.get_column_index(name).is_none())
        {
            return Err(PipelineError::ColumnNotFound(missing.to_string()));
        }

        let dropped = df.width() - SELECTED_COLUMNS.len();
        let selected = df.select(SELECTED_COLUMNS)?;
        debug!("Dropped {} columns outside the schema", dropped);

        Ok((
            selected,
            StageAction::new(
                ActionType::ColumnsSelected,
                "dataset",
                format!(
                    "Kept {} columns, dropped {}",
                    SELECTED_COLUMNS.len(),
                    dropped
                ),
            )
            .with_affected(dropped),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn full_frame() -> DataFrame {
        let mut columns: Vec<Column> = SELECTED_COLUMNS
            .iter()
            .rev()
            .map(|name| Column::new((*name).into(), &["x"]))
            .collect();
        columns.push(Column::new("Crossing".into(), &[55]));
        columns.push(Column::new("Photo".into(), &["p.png"]));
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn test_select_canonical_order() {
        let (df, action) = ColumnSelector.select(&full_frame()).unwrap();

        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        let expected: Vec<String> = SELECTED_COLUMNS.iter().map(|s| s.to_string()).collect();
        assert_eq!(names, expected);
        assert_eq!(action.affected, Some(2));
    }

    #[test]
    fn test_select_missing_column() {
        let df = full_frame().drop("Club").unwrap();
        let err = ColumnSelector.select(&df).unwrap_err();
        assert!(matches!(err, PipelineError::ColumnNotFound(ref c) if c == "Club"));
    }
}
