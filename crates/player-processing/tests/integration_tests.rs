//! Integration tests for the player cleaning pipeline.
//!
//! These tests run the full pipeline and the individual stages over a small
//! raw player dataset shaped like the real one.

use chrono::NaiveDate;
use player_processing::schema::{
    CLUB, CONTRACT_VALID_UNTIL, HEIGHT_LABEL, INTERNATIONAL_REPUTATION, JERSEY_NUMBER, JOINED,
    NAME, NATIONALITY, POSITION, POSITION_GROUP, PREFERRED_FOOT, RELEASE_CLAUSE_LABEL,
    WAGE_LABEL, WEAK_FOOT, WEIGHT_LABEL,
};
use player_processing::utils::{date_values, numeric_values, text_values};
use player_processing::{
    CohortBasis, CohortFilter, CohortRange, ColumnSelector, MissingValueResolver, Pipeline,
    PipelineConfig, PipelineError, PipelineStage, UnitNormalizer, UnitScaler,
};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_players() -> DataFrame {
    let path = fixtures_path().join("players_sample.csv");
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path))
        .expect("Failed to create CSV reader")
        .finish()
        .expect("Failed to read CSV file")
}

fn run(config: PipelineConfig) -> player_processing::PipelineOutput {
    Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .process(load_players())
        .expect("Pipeline should complete successfully")
}

fn texts(df: &DataFrame, col: &str) -> Vec<String> {
    text_values(df.column(col).unwrap().as_materialized_series())
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap_or_default())
        .collect()
}

fn numbers(df: &DataFrame, col: &str) -> Vec<f64> {
    numeric_values(df.column(col).unwrap().as_materialized_series())
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect()
}

fn dates(df: &DataFrame, col: &str) -> Vec<Option<NaiveDate>> {
    date_values(df.column(col).unwrap().as_materialized_series()).unwrap()
}

fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn resolved_players() -> DataFrame {
    let (selected, _) = ColumnSelector.select(&load_players()).unwrap();
    let (normalized, _) = UnitNormalizer.normalize(&selected).unwrap();
    let (resolved, _) = MissingValueResolver::default().resolve(&normalized).unwrap();
    resolved
}

// ============================================================================
// Full Pipeline
// ============================================================================

#[test]
fn test_full_pipeline_output_schema() {
    let output = run(PipelineConfig::default());

    let columns: Vec<String> = output
        .data
        .get_column_names()
        .iter()
        .map(|c| c.to_string())
        .collect();

    assert_eq!(
        columns,
        vec![
            "Name",
            "Age",
            "Nationality",
            "Overall",
            "Potential",
            "International Reputation",
            "Club",
            "Wage (K_EUR)",
            "Preferred Foot",
            "Weak Foot",
            "Position",
            "Position_Group",
            "Jersey Number",
            "Height_cm",
            "Weight_kg",
            "Joined",
            "Contract Valid Until",
            "Release Clause (M_EUR)",
        ]
    );
}

#[test]
fn test_full_pipeline_leaves_no_missing_values() {
    let output = run(PipelineConfig::default());

    for column in output.data.get_columns() {
        assert_eq!(column.null_count(), 0, "'{}' still has nulls", column.name());
    }
}

#[test]
fn test_full_pipeline_drops_rows_missing_keys() {
    let output = run(PipelineConfig::default());

    // one row without a Name, one without a Position
    assert_eq!(output.summary.rows_before, 8);
    assert_eq!(output.summary.rows_dropped_missing_keys, 2);
    assert_eq!(output.summary.rows_after, 6);
    assert_eq!(
        texts(&output.data, NAME),
        vec![
            "L. Messi",
            "Cristiano Ronaldo",
            "Neymar Jr",
            "De Gea",
            "J. Drifter",
            "T. Young"
        ]
    );
}

#[test]
fn test_full_pipeline_fills_defaults() {
    let data = run(PipelineConfig::default()).data;

    // J. Drifter is the fifth surviving row
    assert_eq!(texts(&data, CLUB)[4], "Free Agent");
    assert_eq!(texts(&data, NATIONALITY)[4], "Unknown");
    assert_eq!(texts(&data, PREFERRED_FOOT)[4], "Right");
    assert_eq!(dates(&data, JOINED)[4], ymd(2019, 1, 31));
    assert_eq!(dates(&data, CONTRACT_VALID_UNTIL)[4], ymd(2018, 12, 31));
    assert_eq!(numbers(&data, JERSEY_NUMBER)[4], 0.0);
    assert_eq!(numbers(&data, INTERNATIONAL_REPUTATION)[4], 1.0);
    assert_eq!(numbers(&data, WEAK_FOOT)[4], 3.0);
    // mean of 31, 33, 26, 27 and 19
    assert_eq!(numbers(&data, "Age")[4], 27.2);
}

#[test]
fn test_full_pipeline_units_and_scaling() {
    let data = run(PipelineConfig::default()).data;

    assert_eq!(numbers(&data, WAGE_LABEL)[0], 565.0);
    assert_eq!(numbers(&data, RELEASE_CLAUSE_LABEL)[0], 226.5);
    assert_eq!(numbers(&data, WAGE_LABEL)[4], 0.0);
    assert_eq!(numbers(&data, RELEASE_CLAUSE_LABEL)[4], 0.0);
    assert!((numbers(&data, HEIGHT_LABEL)[0] - 170.18).abs() < 1e-9);
    assert!((numbers(&data, WEIGHT_LABEL)[0] - 72.12).abs() < 1e-9);
    assert_eq!(dates(&data, JOINED)[0], ymd(2004, 7, 1));
    assert_eq!(dates(&data, CONTRACT_VALID_UNTIL)[0], ymd(2021, 12, 31));
    assert_eq!(dates(&data, CONTRACT_VALID_UNTIL)[5], ymd(2019, 6, 30));
}

#[test]
fn test_full_pipeline_integral_columns() {
    let data = run(PipelineConfig::default()).data;

    for col in [INTERNATIONAL_REPUTATION, WEAK_FOOT, JERSEY_NUMBER] {
        assert_eq!(data.column(col).unwrap().dtype(), &DataType::Int64, "{}", col);
    }
}

#[test]
fn test_full_pipeline_position_groups() {
    let data = run(PipelineConfig::default()).data;

    let columns = data.get_column_names();
    let position_idx = columns.iter().position(|c| c.as_str() == POSITION).unwrap();
    assert_eq!(columns[position_idx + 1].as_str(), POSITION_GROUP);
    assert_eq!(
        texts(&data, POSITION_GROUP),
        vec!["ATT", "ATT", "ATT", "GK", "MDF", "MDF"]
    );
}

#[test]
fn test_full_pipeline_summary_stages() {
    let summary = run(PipelineConfig::default()).summary;

    let stages: Vec<PipelineStage> = summary.stages.iter().map(|s| s.stage).collect();
    assert_eq!(
        stages,
        vec![
            PipelineStage::Selecting,
            PipelineStage::Normalizing,
            PipelineStage::Resolving,
            PipelineStage::Casting,
            PipelineStage::Scaling,
        ]
    );
    assert!(summary.rows_removed_by_cohort.is_none());
    assert!(summary.completeness_after > summary.completeness_before);
    assert_eq!(summary.completeness_after, 1.0);
}

#[test]
fn test_summary_serializes_to_json() {
    let summary = run(PipelineConfig::default()).summary;
    let json = serde_json::to_string(&summary).unwrap();

    assert!(json.contains("\"stage\":\"resolving\""));
    assert!(json.contains("\"rows_dropped_missing_keys\":2"));
    assert!(!json.contains("rows_removed_by_cohort"));
}

#[test]
fn test_progress_updates_follow_stage_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();

    let config = PipelineConfig::builder()
        .cohort(CohortRange::new(75.0, 100.0).unwrap(), CohortBasis::Resolved)
        .build()
        .unwrap();

    Pipeline::builder()
        .config(config)
        .on_progress(move |update| seen_clone.lock().unwrap().push(update.stage))
        .build()
        .unwrap()
        .process(load_players())
        .unwrap();

    let mut stages = seen.lock().unwrap().clone();
    stages.dedup();
    assert_eq!(
        stages,
        vec![
            PipelineStage::Selecting,
            PipelineStage::Normalizing,
            PipelineStage::Resolving,
            PipelineStage::CohortFiltering,
            PipelineStage::Casting,
            PipelineStage::Scaling,
            PipelineStage::Complete,
        ]
    );
}

// ============================================================================
// Cohort Filtering
// ============================================================================

#[test]
fn test_cohort_on_selected_table() {
    // Juventus averages (94 + 70 + 60) / 3 over its raw rows
    let config = PipelineConfig::builder()
        .cohort(CohortRange::new(75.0, 100.0).unwrap(), CohortBasis::Selected)
        .build()
        .unwrap();
    let output = run(config);

    assert_eq!(
        texts(&output.data, NAME),
        vec!["L. Messi", "Neymar Jr", "De Gea", "T. Young"]
    );
    assert_eq!(output.summary.rows_removed_by_cohort, Some(4));
    assert_eq!(output.summary.rows_dropped_missing_keys, 0);
}

#[test]
fn test_cohort_on_resolved_table() {
    // after dropping rows with missing keys Juventus is Ronaldo alone, and
    // the clubless player counts as a "Free Agent" club averaging 68
    let config = PipelineConfig::builder()
        .cohort(CohortRange::new(75.0, 100.0).unwrap(), CohortBasis::Resolved)
        .build()
        .unwrap();
    let output = run(config);

    assert_eq!(
        texts(&output.data, NAME),
        vec![
            "L. Messi",
            "Cristiano Ronaldo",
            "Neymar Jr",
            "De Gea",
            "T. Young"
        ]
    );
    assert_eq!(output.summary.rows_removed_by_cohort, Some(1));
}

#[test]
fn test_cohort_filter_standalone_on_raw_table() {
    let (filtered, action) = CohortFilter
        .filter(&load_players(), CohortRange::new(91.0, 92.0).unwrap())
        .unwrap();

    assert_eq!(texts(&filtered, NAME), vec!["De Gea"]);
    assert_eq!(action.affected, Some(7));
}

// ============================================================================
// Stage Properties
// ============================================================================

#[test]
fn test_resolver_is_idempotent() {
    let resolved = resolved_players();
    let (again, actions) = MissingValueResolver::default().resolve(&resolved).unwrap();

    assert!(resolved.equals_missing(&again));
    assert!(actions.iter().all(|a| a.affected.unwrap_or(0) == 0));
}

#[test]
fn test_resolver_drops_exactly_rows_without_name() {
    let (selected, _) = ColumnSelector.select(&load_players()).unwrap();
    let (mut normalized, _) = UnitNormalizer.normalize(&selected).unwrap();

    // give the row without a Position one, so only the nameless row remains to drop
    let positions: Vec<Option<String>> =
        text_values(normalized.column(POSITION).unwrap().as_materialized_series())
            .unwrap()
            .into_iter()
            .map(|p| p.or_else(|| Some("ST".to_string())))
            .collect();
    normalized
        .replace(POSITION, Series::new(POSITION.into(), positions))
        .unwrap();

    let missing_names = normalized.column(NAME).unwrap().null_count();
    let (resolved, _) = MissingValueResolver::default().resolve(&normalized).unwrap();

    assert_eq!(missing_names, 1);
    assert_eq!(normalized.height() - resolved.height(), missing_names);
}

#[test]
fn test_stages_do_not_modify_their_input() {
    let (selected, _) = ColumnSelector.select(&load_players()).unwrap();
    let (normalized, _) = UnitNormalizer.normalize(&selected).unwrap();
    let nulls_before = normalized.column(CLUB).unwrap().null_count();

    let _ = MissingValueResolver::default().resolve(&normalized).unwrap();

    assert_eq!(normalized.height(), 8);
    assert_eq!(normalized.column(CLUB).unwrap().null_count(), nulls_before);
    assert_eq!(selected.column("Height").unwrap().dtype(), &DataType::String);
}

#[test]
fn test_scaler_on_resolved_table() {
    let (scaled, _) = UnitScaler.scale_and_rename(&resolved_players()).unwrap();

    assert_eq!(numbers(&scaled, WAGE_LABEL)[1], 405.0);
    assert!((numbers(&scaled, RELEASE_CLAUSE_LABEL)[1] - 127.1).abs() < 1e-9);
    assert!(scaled.column("Wage").is_err());
}

// ============================================================================
// Contract Failures
// ============================================================================

#[test]
fn test_missing_selected_column_fails_in_selection() {
    let raw = load_players().drop("Weak Foot").unwrap();
    let err = Pipeline::builder()
        .build()
        .unwrap()
        .process(raw)
        .unwrap_err();

    assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    assert_eq!(err.column(), Some(WEAK_FOOT));
    assert!(err.to_string().contains(PipelineStage::Selecting.display_name()));
}

#[test]
fn test_resolver_requires_policy_columns() {
    let (selected, _) = ColumnSelector.select(&load_players()).unwrap();
    let (normalized, _) = UnitNormalizer.normalize(&selected).unwrap();
    let partial = normalized.drop(NATIONALITY).unwrap();

    let err = MissingValueResolver::default().resolve(&partial).unwrap_err();
    assert!(matches!(err, PipelineError::ColumnNotFound(ref c) if c == NATIONALITY));
}

#[test]
fn test_invalid_cohort_range_is_rejected() {
    assert!(matches!(
        CohortRange::new(90.0, 80.0),
        Err(PipelineError::InvalidRange { .. })
    ));
}
