//! Custom error types for the player cleaning pipeline.
//!
//! Only contract-level failures live here: a required column is absent, a
//! stage runs on a column it cannot handle, or a precondition left by an
//! earlier stage does not hold. Dirty cell values never become errors; the
//! parsers degrade them to missing (or zero, for currency) instead.
//!
//! Errors are serializable so a caller can forward them as `{ code, message }`.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Column was not found in the table.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A column still holds missing values where a stage requires none.
    #[error("Column '{column}' still contains {count} missing values before {stage}")]
    UnexpectedNulls {
        column: String,
        stage: String,
        count: usize,
    },

    /// A column has a dtype the stage cannot work with.
    #[error("Column '{column}' has type {found}, expected {expected}")]
    ColumnTypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    /// No valid values found in a column for computing a fill statistic.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// Cohort range bounds are unusable.
    #[error("Invalid cohort range [{min}, {max})")]
    InvalidRange { min: f64, max: f64 },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PipelineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for machine consumers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::UnexpectedNulls { .. } => "UNEXPECTED_NULLS",
            Self::ColumnTypeMismatch { .. } => "COLUMN_TYPE_MISMATCH",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::InvalidRange { .. } => "INVALID_RANGE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Name of the column the error is about, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::ColumnNotFound(column) | Self::NoValidValues(column) => Some(column),
            Self::UnexpectedNulls { column, .. } | Self::ColumnTypeMismatch { column, .. } => {
                Some(column)
            }
            Self::WithContext { source, .. } => source.column(),
            _ => None,
        }
    }

    /// Check if this error indicates a schema or stage-ordering problem
    /// rather than an environmental failure.
    pub fn is_contract_violation(&self) -> bool {
        match self {
            Self::ColumnNotFound(_)
            | Self::UnexpectedNulls { .. }
            | Self::ColumnTypeMismatch { .. }
            | Self::NoValidValues(_) => true,
            Self::WithContext { source, .. } => source.is_contract_violation(),
            _ => false,
        }
    }
}

impl Serialize for PipelineError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PipelineError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Polars(e).with_context(context))
    }
}
