//! Club cohort filtering.
//!
//! Keeps only the players whose club's mean Overall rating falls in a
//! half-open range. The mean is taken over every row of the club in the
//! table handed in, before any row is removed.

use crate::error::{PipelineError, Result};
use crate::schema::{CLUB, OVERALL};
use crate::types::{ActionType, StageAction};
use crate::utils::{ensure_numeric, ensure_text, require_series};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Half-open rating range `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CohortRange {
    pub min: f64,
    pub max: f64,
}

impl Default for CohortRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
        }
    }
}

impl CohortRange {
    /// A range with `min` inclusive and `max` exclusive. `min == max` is
    /// allowed and selects nothing.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min.is_nan() || self.max.is_nan() || self.min > self.max {
            return Err(PipelineError::InvalidRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value < self.max
    }
}

/// Which table the pipeline hands to the cohort filter.
///
/// Club means depend on which rows still exist, so the choice is explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CohortBasis {
    /// Right after column selection: means cover every raw row of a club,
    /// and players without a club are never selected.
    #[default]
    Selected,
    /// After missing-value resolution: rows with missing keys are gone and
    /// clubless players form the fill-value club (e.g. "Free Agent").
    Resolved,
}

/// A range together with the point in the pipeline it applies to.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CohortSelection {
    pub range: CohortRange,
    pub basis: CohortBasis,
}

/// Filters rows by their club's mean Overall rating.
#[derive(Debug, Default, Clone, Copy)]
pub struct CohortFilter;

/// Scratch column holding each row's club mean while the mask is built.
const CLUB_MEAN: &str = "__club_mean_overall";

impl CohortFilter {
    /// Return the rows whose club mean Overall lies in `range`, keeping row order.
    ///
    /// Means are taken over non-missing ratings. Rows without a club, and
    /// clubs with no rating at all, are never selected.
    pub fn filter(&self, df: &DataFrame, range: CohortRange) -> Result<(DataFrame, StageAction)> {
        range.validate()?;

        let clubs = require_series(df, CLUB)?;
        ensure_text(clubs)?;
        ensure_numeric(require_series(df, OVERALL)?)?;
        let total_clubs = clubs.drop_nulls().n_unique()?;

        let club_mean = col(CLUB_MEAN);
        let in_range = col(CLUB)
            .is_not_null()
            .and(club_mean.clone().gt_eq(lit(range.min)))
            .and(club_mean.lt(lit(range.max)));

        let filtered = df
            .clone()
            .lazy()
            .with_column(
                col(OVERALL)
                    .cast(DataType::Float64)
                    .mean()
                    .over([col(CLUB)])
                    .alias(CLUB_MEAN),
            )
            .filter(in_range)
            .collect()?
            .drop(CLUB_MEAN)?;

        let kept_clubs = require_series(&filtered, CLUB)?.n_unique()?;
        let removed = df.height() - filtered.height();

        debug!("Computed mean {} for {} clubs", OVERALL, total_clubs);
        info!(
            "Cohort filter [{}, {}) kept {} of {} clubs ({} rows)",
            range.min,
            range.max,
            kept_clubs,
            total_clubs,
            filtered.height()
        );

        Ok((
            filtered,
            StageAction::new(
                ActionType::RowsFiltered,
                CLUB,
                format!(
                    "Kept {} clubs with mean {} in [{}, {})",
                    kept_clubs, OVERALL, range.min, range.max
                ),
            )
            .with_affected(removed),
        ))
    }
}
