//! Player Attribute Cleaning Library
//!
//! Turns a raw football player attribute table into an analysis-ready one,
//! built on Polars.
//!
//! # Overview
//!
//! The pipeline runs five stages, each taking a table and returning a new one:
//!
//! - **Column Selection**: projects the raw table onto 17 analysis columns
//! - **Unit Normalization**: parses `5'11`, `165lbs`, `€10.5M` and free-text
//!   dates into metric floats, currency units and dates; derives `Position_Group`
//! - **Missing-Value Resolution**: drops rows without a Name, Overall, Potential
//!   or Position, then fills every other column (Club included) by a fixed
//!   per-column policy
//! - **Integral Casting**: truncates reputation, weak foot and jersey number to integers
//! - **Unit Scaling**: expresses wages in thousands and release clauses in
//!   millions and labels columns with their units
//!
//! A separate [`CohortFilter`] keeps players whose club's mean Overall lies
//! in a half-open range.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use player_processing::{Pipeline, PipelineConfig, CohortBasis, CohortRange};
//!
//! let config = PipelineConfig::builder()
//!     .cohort(CohortRange::new(75.0, 85.0)?, CohortBasis::Selected)
//!     .build()?;
//!
//! let output = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| println!("[{:?}] {}", update.stage, update.message))
//!     .build()?
//!     .process(raw)?;
//!
//! println!("{}", output.data.head(Some(5)));
//! ```
//!
//! Every stage is also usable on its own:
//!
//! ```rust,ignore
//! use player_processing::{ColumnSelector, UnitNormalizer};
//!
//! let (selected, _) = ColumnSelector.select(&raw)?;
//! let (normalized, actions) = UnitNormalizer.normalize(&selected)?;
//! ```

pub mod caster;
pub mod cohort;
pub mod config;
pub mod error;
pub mod imputers;
pub mod normalizer;
pub mod pipeline;
pub mod scaler;
pub mod schema;
pub mod selector;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use caster::IntegralCaster;
pub use cohort::{CohortBasis, CohortFilter, CohortRange, CohortSelection};
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{PipelineError, Result as PipelineResult, ResultExt};
pub use imputers::{
    FillValue, ImputationPolicy, ImputationRule, ImputationStrategy, MissingValueResolver,
    StatisticalImputer,
};
pub use normalizer::{PositionGroup, UnitNormalizer};
pub use pipeline::{
    ClosureProgressReporter, Pipeline, PipelineBuilder, PipelineStage, ProgressReporter,
    ProgressUpdate,
};
pub use scaler::UnitScaler;
pub use selector::ColumnSelector;
pub use types::{ActionType, PipelineOutput, PipelineSummary, StageAction, StageReport};
pub use utils::is_numeric_dtype;
