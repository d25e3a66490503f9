//! CLI entry point for the player cleaning pipeline.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use player_processing::schema::KEY_COLUMNS;
use player_processing::{
    CohortBasis, CohortRange, CohortSelection, Pipeline, PipelineConfig, PipelineSummary,
};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// CLI-compatible cohort basis enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliCohortBasis {
    /// Club means over every selected row, before any row is dropped
    Selected,
    /// Club means after rows with missing keys are dropped and clubs filled
    Resolved,
}

impl From<CliCohortBasis> for CohortBasis {
    fn from(cli: CliCohortBasis) -> Self {
        match cli {
            CliCohortBasis::Selected => CohortBasis::Selected,
            CliCohortBasis::Resolved => CohortBasis::Resolved,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Player attribute cleaning pipeline",
    long_about = "Cleans a raw football player attribute table: selects the analysis \
                  columns, parses heights, weights, currencies and dates, resolves \
                  missing values, and rescales currencies.\n\n\
                  EXAMPLES:\n  \
                  # Clean a dataset and write the result\n  \
                  player-processing -i players.csv -o cleaned.csv\n\n  \
                  # Keep only clubs with a mean Overall in [75, 85)\n  \
                  player-processing -i players.csv --cohort-min 75 --cohort-max 85\n\n  \
                  # Machine-readable summary\n  \
                  player-processing -i players.csv --json | jq .summary.rows_after"
)]
struct Args {
    /// Path to the raw CSV file
    #[arg(short, long)]
    input: String,

    /// Path of the cleaned CSV to write
    #[arg(short, long)]
    output: Option<String>,

    /// JSON file with pipeline configuration (fill values, default dates)
    #[arg(short, long)]
    config: Option<String>,

    /// Lower bound (inclusive) of the club mean Overall range
    #[arg(long)]
    cohort_min: Option<f64>,

    /// Upper bound (exclusive) of the club mean Overall range
    #[arg(long)]
    cohort_max: Option<f64>,

    /// Table the cohort filter runs on
    #[arg(long, value_enum, default_value = "selected")]
    cohort_basis: CliCohortBasis,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,
}

/// What `--json` prints.
#[derive(Serialize)]
struct RunReport<'a> {
    input_file: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_file: Option<&'a str>,
    columns: Vec<String>,
    summary: &'a PipelineSummary,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let config = build_config(&args)?;

    info!("Loading dataset from: {}", args.input);
    let data = load_csv(&args.input)?;
    info!("Dataset loaded successfully: {:?}", data.shape());

    let mut builder = Pipeline::builder().config(config);
    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            debug!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }
    let pipeline = builder.build()?;

    let mut output = pipeline.process(data).map_err(|e| {
        error!("Pipeline failed: {}", e);
        anyhow!("Pipeline failed: {}", e)
    })?;

    if let Some(ref path) = args.output {
        write_csv(&mut output.data, path)?;
        info!("Cleaned dataset written to: {}", path);
    }

    if args.json {
        let report = RunReport {
            input_file: &args.input,
            output_file: args.output.as_deref(),
            columns: output
                .data
                .get_column_names()
                .iter()
                .map(|c| c.to_string())
                .collect(),
            summary: &output.summary,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_human_readable_summary(&output.data, &output.summary, &args);
    Ok(())
}

/// Start from the config file (or defaults) and apply cohort flags on top.
fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match args.config {
        Some(ref path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => PipelineConfig::default(),
    };

    if args.cohort_min.is_some() || args.cohort_max.is_some() {
        let defaults = config
            .cohort
            .map(|selection| selection.range)
            .unwrap_or_default();
        let range = CohortRange::new(
            args.cohort_min.unwrap_or(defaults.min),
            args.cohort_max.unwrap_or(defaults.max),
        )?;
        config.cohort = Some(CohortSelection {
            range,
            basis: args.cohort_basis.into(),
        });
    }

    Ok(config)
}

/// Load the raw CSV. Every column type is inferred from the first rows;
/// free-text unit columns stay strings.
fn load_csv(path: &str) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_infer_schema_length(Some(1000))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
        .with_context(|| format!("Failed to parse CSV: {}", path))
}

fn write_csv(df: &mut DataFrame, path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

/// Print a human-readable summary of the run.
fn print_human_readable_summary(data: &DataFrame, summary: &PipelineSummary, args: &Args) {
    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        args.input, summary.rows_before, summary.columns_before
    );
    match args.output {
        Some(ref path) => println!(
            "Output: {} ({} rows x {} columns)",
            path, summary.rows_after, summary.columns_after
        ),
        None => println!(
            "Output: not written ({} rows x {} columns)",
            summary.rows_after, summary.columns_after
        ),
    }
    println!();

    println!("Processing Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!(
        "  Rows: {} -> {} ({:.1}% removed)",
        summary.rows_before,
        summary.rows_after,
        summary.rows_removed_percentage()
    );
    println!(
        "  Dropped for missing {}: {}",
        KEY_COLUMNS.join("/"),
        summary.rows_dropped_missing_keys
    );
    if let Some(removed) = summary.rows_removed_by_cohort {
        println!("  Removed by cohort filter: {}", removed);
    }
    println!(
        "  Completeness: {:.1}% -> {:.1}%",
        summary.completeness_before * 100.0,
        summary.completeness_after * 100.0
    );
    println!();

    println!("Stages:");
    for report in &summary.stages {
        println!(
            "  {} ({} -> {} rows)",
            report.stage.display_name(),
            report.rows_before,
            report.rows_after
        );
        for action in &report.actions {
            match action.affected {
                Some(n) if n > 0 => println!("    - {} [{}]", action.description, n),
                _ => println!("    - {}", action.description),
            }
        }
    }
    println!();

    println!("{}", data.head(Some(5)));
    println!();
    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}
