//! Run summary types.
//!
//! These are serializable so the CLI (or any other caller) can emit them as
//! JSON next to the cleaned table.

use crate::pipeline::PipelineStage;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Type of action performed during a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Table projected onto the fixed column set
    ColumnsSelected,
    /// Free-text column parsed into numbers or dates
    ColumnConverted,
    /// New column derived from an existing one
    ColumnDerived,
    /// Rows removed because a key column was missing
    RowsDropped,
    /// Missing values filled
    ValuesFilled,
    /// Column truncated to integers
    ColumnCast,
    /// Column rescaled into a larger unit
    ColumnScaled,
    /// Column relabelled for presentation
    ColumnRenamed,
    /// Rows removed by the cohort filter
    RowsFiltered,
}

impl ActionType {
    /// Returns a human-readable name for the action type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ColumnsSelected => "Columns Selected",
            Self::ColumnConverted => "Column Converted",
            Self::ColumnDerived => "Column Derived",
            Self::RowsDropped => "Rows Dropped",
            Self::ValuesFilled => "Values Filled",
            Self::ColumnCast => "Column Cast",
            Self::ColumnScaled => "Column Scaled",
            Self::ColumnRenamed => "Column Renamed",
            Self::RowsFiltered => "Rows Filtered",
        }
    }
}

/// A single action performed by a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageAction {
    pub action_type: ActionType,
    /// Column affected, or "dataset" for table-wide actions.
    pub target: String,
    pub description: String,
    /// Number of rows or cells affected, when meaningful.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected: Option<usize>,
}

impl StageAction {
    pub fn new(
        action_type: ActionType,
        target: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action_type,
            target: target.into(),
            description: description.into(),
            affected: None,
        }
    }

    /// Attach a count of affected rows or cells.
    pub fn with_affected(mut self, affected: usize) -> Self {
        self.affected = Some(affected);
        self
    }
}

/// Actions grouped under the stage that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: PipelineStage,
    pub rows_before: usize,
    pub rows_after: usize,
    pub actions: Vec<StageAction>,
}

/// Summary of a full pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,

    /// Rows dropped by the missing-value resolver.
    pub rows_dropped_missing_keys: usize,
    /// Rows removed by the cohort filter, when one was configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_removed_by_cohort: Option<usize>,

    /// Share of non-null cells in the input (0.0 - 1.0).
    pub completeness_before: f32,
    /// Share of non-null cells in the output (0.0 - 1.0).
    pub completeness_after: f32,

    pub stages: Vec<StageReport>,
}

impl PipelineSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_stage(&mut self, report: StageReport) {
        self.stages.push(report);
    }

    /// All actions in execution order.
    pub fn actions(&self) -> impl Iterator<Item = &StageAction> {
        self.stages.iter().flat_map(|s| s.actions.iter())
    }

    /// Percentage of input rows that did not survive the run.
    pub fn rows_removed_percentage(&self) -> f64 {
        if self.rows_before == 0 {
            0.0
        } else {
            self.rows_before.saturating_sub(self.rows_after) as f64 / self.rows_before as f64
                * 100.0
        }
    }
}

/// Cleaned table together with the summary of the run that produced it.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub data: DataFrame,
    pub summary: PipelineSummary,
}
