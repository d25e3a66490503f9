//! Progress reporting for the cleaning pipeline.
//!
//! The pipeline is synchronous, so progress is reported by calling back into
//! a [`ProgressReporter`] between stages. Reporters must be `Send + Sync` so a
//! caller can run the pipeline on a worker thread and observe it elsewhere.
//!
//! # Example
//!
//! ```rust,ignore
//! use player_processing::Pipeline;
//!
//! let output = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process(df)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the cleaning pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Projecting the raw table onto the fixed column set
    Selecting,
    /// Parsing units, currencies and dates; grouping positions
    Normalizing,
    /// Dropping rows with missing keys and filling the rest
    Resolving,
    /// Truncating count-like columns to integers
    Casting,
    /// Rescaling currencies and applying unit labels
    Scaling,
    /// Keeping clubs whose mean rating lies in a range
    CohortFiltering,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Selecting => "Selecting Columns",
            Self::Normalizing => "Normalizing Units",
            Self::Resolving => "Resolving Missing Values",
            Self::Casting => "Casting Integers",
            Self::Scaling => "Scaling Units",
            Self::CohortFiltering => "Filtering Cohort",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Returns the typical weight of this stage in the overall pipeline (0.0 - 1.0).
    ///
    /// Weights of the processing stages sum to 1.0. The cohort filter is
    /// optional and shares its slot with resolution.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Selecting => 0.05,
            Self::Normalizing => 0.45,
            Self::Resolving => 0.30,
            Self::Casting => 0.10,
            Self::Scaling => 0.10,
            Self::CohortFiltering => 0.0,
            Self::Complete => 0.0,
            Self::Failed => 0.0,
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Selecting => 0.0,
            Self::Normalizing => 0.05,
            Self::Resolving => 0.50,
            Self::CohortFiltering => 0.80,
            Self::Casting => 0.80,
            Self::Scaling => 0.90,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A progress update emitted by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: PipelineStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing current activity
    pub message: String,

    /// Rows in the table at the time of the update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
}

impl ProgressUpdate {
    /// Creates a new progress update for a stage.
    pub fn new(stage: PipelineStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
            rows: None,
        }
    }

    /// Attach the current row count.
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
            rows: None,
        }
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
            rows: None,
        }
    }
}

/// Trait for receiving progress updates during a pipeline run.
///
/// Implementations must be `Send + Sync`; they are called synchronously from
/// the thread running the pipeline and should return quickly.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PROCESSING_STAGES: [PipelineStage; 6] = [
        PipelineStage::Selecting,
        PipelineStage::Normalizing,
        PipelineStage::Resolving,
        PipelineStage::CohortFiltering,
        PipelineStage::Casting,
        PipelineStage::Scaling,
    ];

    #[test]
    fn test_progress_update_new() {
        let update = ProgressUpdate::new(PipelineStage::Resolving, 0.5, "Resolving...");
        assert_eq!(update.stage, PipelineStage::Resolving);
        assert_eq!(update.stage_progress, 0.5);
        assert!((update.progress - 0.65).abs() < 1e-6);
        assert!(update.rows.is_none());
    }

    #[test]
    fn test_progress_update_complete() {
        let update = ProgressUpdate::complete("Done!");
        assert_eq!(update.stage, PipelineStage::Complete);
        assert_eq!(update.progress, 1.0);
    }

    #[test]
    fn test_stage_weights_sum() {
        let total_weight: f32 = PROCESSING_STAGES.iter().map(|s| s.weight()).sum();
        assert!((total_weight - 1.0).abs() < 0.01, "Weights should sum to ~1.0");
    }

    #[test]
    fn test_base_progress_is_monotonic() {
        let bases: Vec<f32> = PROCESSING_STAGES.iter().map(|s| s.base_progress()).collect();
        assert!(bases.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_closure_progress_reporter() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let reporter = ClosureProgressReporter::new(move |_update| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        reporter.report(ProgressUpdate::new(PipelineStage::Selecting, 0.0, "Test"));
        reporter.report(ProgressUpdate::complete("Done"));

        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_progress_reporter_across_threads() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let reporter = Arc::new(ClosureProgressReporter::new(move |_update| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        }));

        let reporter_clone = reporter.clone();
        std::thread::spawn(move || {
            reporter_clone.report(ProgressUpdate::new(PipelineStage::Casting, 1.0, "bg"));
        })
        .join()
        .expect("Thread should not panic");

        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stage_json_values() {
        let stage_expectations = [
            (PipelineStage::Selecting, "\"selecting\""),
            (PipelineStage::CohortFiltering, "\"cohort_filtering\""),
            (PipelineStage::Failed, "\"failed\""),
        ];

        for (stage, expected_json) in stage_expectations {
            let json = serde_json::to_string(&stage).expect("Should serialize");
            assert_eq!(json, expected_json);
        }
    }

    #[test]
    fn test_progress_update_json_skips_missing_rows() {
        let json = serde_json::to_string(&ProgressUpdate::new(
            PipelineStage::Scaling,
            0.0,
            "Scaling",
        ))
        .unwrap();
        assert!(json.contains("\"stage\":\"scaling\""));
        assert!(!json.contains("rows"));
    }
}
