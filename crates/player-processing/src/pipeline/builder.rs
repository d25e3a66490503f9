//! Main cleaning pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! running the stages in order over a raw player table.

use crate::caster::IntegralCaster;
use crate::cohort::{CohortBasis, CohortFilter, CohortSelection};
use crate::config::{ConfigValidationError, PipelineConfig};
use crate::error::{Result, ResultExt};
use crate::imputers::{ImputationPolicy, MissingValueResolver};
use crate::normalizer::UnitNormalizer;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::scaler::UnitScaler;
use crate::selector::ColumnSelector;
use crate::types::{ActionType, PipelineOutput, PipelineSummary, StageAction, StageReport};
use crate::utils::completeness;
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// The player cleaning pipeline.
///
/// Runs column selection, unit normalization, missing-value resolution,
/// integral casting and unit scaling in that order, with an optional club
/// cohort filter after selection or after resolution.
///
/// # Example
///
/// ```rust,ignore
/// use player_processing::{Pipeline, PipelineConfig};
///
/// let output = Pipeline::builder()
///     .config(PipelineConfig::default())
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .process(raw)?;
///
/// println!("{} rows kept", output.summary.rows_after);
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    selector: ColumnSelector,
    normalizer: UnitNormalizer,
    resolver: MissingValueResolver,
    caster: IntegralCaster,
    scaler: UnitScaler,
    cohort_filter: CohortFilter,
}

static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage over `df`.
    ///
    /// The input is never modified. On failure the error carries the name of
    /// the stage that raised it and, for contract failures, the column.
    pub fn process(&self, df: DataFrame) -> Result<PipelineOutput> {
        match self.process_internal(df) {
            Ok(output) => {
                self.report_progress(
                    ProgressUpdate::complete("Pipeline completed successfully")
                        .with_rows(output.data.height()),
                );
                Ok(output)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_internal(&self, df: DataFrame) -> Result<PipelineOutput> {
        let start_time = Instant::now();
        info!(
            "Starting cleaning pipeline on {} rows x {} columns...",
            df.height(),
            df.width()
        );

        let mut summary = PipelineSummary::new();
        summary.rows_before = df.height();
        summary.columns_before = df.width();
        summary.completeness_before = completeness(&df);

        let df = self.run_stage(PipelineStage::Selecting, &df, &mut summary, |df| {
            let (selected, action) = self.selector.select(df)?;
            Ok((selected, vec![action]))
        })?;

        let df = self.filter_cohort_at(CohortBasis::Selected, df, &mut summary)?;

        let df = self.run_stage(PipelineStage::Normalizing, &df, &mut summary, |df| {
            self.normalizer.normalize(df)
        })?;

        let df = self.run_stage(PipelineStage::Resolving, &df, &mut summary, |df| {
            let (resolved, actions) = self.resolver.resolve(df)?;
            self.resolver.verify(&resolved)?;
            Ok((resolved, actions))
        })?;
        summary.rows_dropped_missing_keys = Self::affected_by(&summary, ActionType::RowsDropped);

        let df = self.filter_cohort_at(CohortBasis::Resolved, df, &mut summary)?;

        let df = self.run_stage(PipelineStage::Casting, &df, &mut summary, |df| {
            self.caster.cast(df)
        })?;

        let df = self.run_stage(PipelineStage::Scaling, &df, &mut summary, |df| {
            self.scaler.scale_and_rename(df)
        })?;

        summary.rows_after = df.height();
        summary.columns_after = df.width();
        summary.completeness_after = completeness(&df);
        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Pipeline complete: {} -> {} rows ({} dropped for missing keys) in {}ms",
            summary.rows_before,
            summary.rows_after,
            summary.rows_dropped_missing_keys,
            summary.duration_ms
        );

        Ok(PipelineOutput { data: df, summary })
    }

    /// Run the configured cohort filter if it applies at `basis`.
    fn filter_cohort_at(
        &self,
        basis: CohortBasis,
        df: DataFrame,
        summary: &mut PipelineSummary,
    ) -> Result<DataFrame> {
        let Some(CohortSelection { range, .. }) = self
            .config
            .cohort
            .filter(|selection| selection.basis == basis)
        else {
            return Ok(df);
        };

        let filtered = self.run_stage(PipelineStage::CohortFiltering, &df, summary, |df| {
            let (filtered, action) = self.cohort_filter.filter(df, range)?;
            Ok((filtered, vec![action]))
        })?;
        summary.rows_removed_by_cohort = Some(df.height() - filtered.height());
        Ok(filtered)
    }

    /// Run one stage, record its actions and report progress around it.
    fn run_stage<F>(
        &self,
        stage: PipelineStage,
        df: &DataFrame,
        summary: &mut PipelineSummary,
        run: F,
    ) -> Result<DataFrame>
    where
        F: FnOnce(&DataFrame) -> Result<(DataFrame, Vec<StageAction>)>,
    {
        self.report_progress(
            ProgressUpdate::new(stage, 0.0, format!("{}...", stage.display_name()))
                .with_rows(df.height()),
        );

        let (out, actions) = run(df).context(stage.display_name())?;
        debug!(
            "{}: {} -> {} rows, {} actions",
            stage.display_name(),
            df.height(),
            out.height(),
            actions.len()
        );

        summary.add_stage(StageReport {
            stage,
            rows_before: df.height(),
            rows_after: out.height(),
            actions,
        });

        self.report_progress(
            ProgressUpdate::new(stage, 1.0, format!("{} complete", stage.display_name()))
                .with_rows(out.height()),
        );
        Ok(out)
    }

    fn affected_by(summary: &PipelineSummary, action_type: ActionType) -> usize {
        summary
            .actions()
            .filter(|a| a.action_type == action_type)
            .filter_map(|a| a.affected)
            .sum()
    }
}

/// Builder for creating a [`Pipeline`] instance.
///
/// Use [`Pipeline::builder()`] to get started.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let resolver = MissingValueResolver::new(ImputationPolicy::from_config(&config));

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
            selector: ColumnSelector,
            normalizer: UnitNormalizer,
            resolver,
            caster: IntegralCaster,
            scaler: UnitScaler,
            cohort_filter: CohortFilter,
        })
    }
}
