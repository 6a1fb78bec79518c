//! Fraudprep CLI — runs the staged data-preparation pipeline.

use clap::Parser;
use fraudprep_core::{load_config, logging, run_pipeline, FileTracker, Stage, PIPELINE_STAGES};
use std::path::PathBuf;
use std::str::FromStr;

/// Fraudprep: staged data preparation for tabular fraud-detection datasets
#[derive(Parser, Debug)]
#[command(name = "fraudprep", version, about, long_about = None)]
struct Cli {
    /// Path to the pipeline configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Stage to resume the pipeline from
    #[arg(
        long,
        default_value = "ingest",
        value_parser = clap::builder::PossibleValuesParser::new(PIPELINE_STAGES.map(Stage::name))
    )]
    stage: String,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,
}

fn log_filter(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    let _guard = logging::init_logging(
        &config.pipeline.log_path,
        log_filter(cli.verbose, cli.quiet),
    )?;

    let stage = Stage::from_str(&cli.stage)?;
    let mut tracker = FileTracker::new(
        config.pipeline.tracking_dir.clone(),
        &config.pipeline.experiment_name,
    )?;

    let summary = run_pipeline(&config, &mut tracker, stage)?;
    tracing::info!(
        train_rows = summary.train_rows,
        test_rows = summary.test_rows,
        rows_removed = summary.rows_removed,
        dataset_hash = summary.dataset_hash.as_deref(),
        "pipeline completed"
    );

    if !cli.quiet {
        if let Some(hash) = &summary.dataset_hash {
            println!("dataset hash: {hash}");
        }
        if let Some(removed) = summary.rows_removed {
            println!("rows removed: {removed}");
        }
        println!(
            "train rows: {}  test rows: {}",
            summary.train_rows, summary.test_rows
        );
    }
    Ok(())
}
