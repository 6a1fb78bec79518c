//! Pipeline orchestration: ingest → clean → split.
//!
//! Stages are linearly ordered; configuration selects a start stage and all
//! stages from there to the end run in order. The first error aborts the
//! run — nothing is caught locally and later stages never execute.

use crate::artifacts::write_parquet;
use crate::config::PipelineConfig;
use crate::dataset::{
    clean_data, hashing, split_data, validate_data, validate_schema, validate_split, Dataset,
    DatasetSchema, SplitResult,
};
use crate::error::PipelineError;
use crate::tracking::TrackingSink;
use std::str::FromStr;

/// One discrete, ordered phase of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Ingest,
    Clean,
    Split,
}

/// All stages in execution order.
pub const PIPELINE_STAGES: [Stage; 3] = [Stage::Ingest, Stage::Clean, Stage::Split];

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Self::Ingest => "ingest",
            Self::Clean => "clean",
            Self::Split => "split",
        }
    }
}

impl FromStr for Stage {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ingest" => Ok(Self::Ingest),
            "clean" => Ok(Self::Clean),
            "split" => Ok(Self::Split),
            other => Err(PipelineError::invalid_parameter(format!(
                "unknown stage '{other}' (expected ingest, clean, or split)"
            ))),
        }
    }
}

/// Headline numbers from a completed run.
#[derive(Debug, Clone, Default)]
pub struct PipelineSummary {
    pub dataset_hash: Option<String>,
    pub rows_removed: Option<usize>,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Execute the pipeline from `start` through the split stage.
///
/// Each stage reports its parameters, metrics, and artifact paths to the
/// tracking sink inside a nested run scope before the next stage begins.
/// When `start` is later than ingest, the data transformations of the
/// skipped stages are replayed quietly (no validation, tracking, or
/// artifacts) to rebuild the evolving table.
pub fn run_pipeline(
    config: &PipelineConfig,
    tracker: &mut dyn TrackingSink,
    start: Stage,
) -> Result<PipelineSummary, PipelineError> {
    tracing::info!(start = start.name(), "starting pipeline");
    let schema = DatasetSchema::load(&config.data_ingestion.schema_path)?;

    tracker.start_run("pipeline_execution");
    let summary = run_stages(config, &schema, tracker, start)?;
    tracker.end_run()?;
    tracing::info!("pipeline finished");
    Ok(summary)
}

fn run_stages(
    config: &PipelineConfig,
    schema: &DatasetSchema,
    tracker: &mut dyn TrackingSink,
    start: Stage,
) -> Result<PipelineSummary, PipelineError> {
    let target = &config.data.target_column;
    let mut summary = PipelineSummary::default();
    let mut dataset: Option<Dataset> = None;

    // --------------- Data Ingestion ---------------
    if start <= Stage::Ingest {
        tracker.start_run("data_ingestion");
        let dataset_path = &config.data_ingestion.dataset_path;
        tracing::info!(path = %dataset_path.display(), "loading raw data");
        let ds = Dataset::from_csv(dataset_path)?;
        validate_schema(&ds, schema)?;
        tracing::info!("schema validated");
        let hash = hashing::hash_file(dataset_path)?;
        tracing::info!(%hash, "dataset fingerprint computed");

        tracker.set_tag("schema_version", &schema.schema_version);
        tracker.set_tag("dataset_name", &schema.dataset_name);
        tracker.log_param("dataset_hash", &hash);
        tracker.log_param("dataset_path", &dataset_path.display().to_string());
        tracker.log_metric("n_rows", ds.row_count() as f64);
        tracker.log_metric("n_columns", ds.column_count() as f64);
        tracker.log_artifact(&config.data_ingestion.schema_path);
        tracker.end_run()?;

        summary.dataset_hash = Some(hash);
        dataset = Some(ds);
    }

    // --------------- Data Cleaning ---------------
    if start <= Stage::Clean {
        let ds = match dataset.take() {
            Some(ds) => ds,
            // Resuming here: rebuild the raw table without re-running ingest.
            None => Dataset::from_csv(&config.data_ingestion.dataset_path)?,
        };
        tracker.start_run("data_cleaning");
        let (ds, report) = clean_data(ds, target)?;
        validate_data(&ds, target, config.data.min_samples, config.data.num_classes)?;
        tracker.log_metric("rows_removed", report.rows_removed as f64);
        tracker.end_run()?;

        summary.rows_removed = Some(report.rows_removed);
        dataset = Some(ds);
    }

    // --------------- Data Split ---------------
    let ds = match dataset.take() {
        Some(ds) => ds,
        // Resuming here: replay load and clean quietly.
        None => {
            let raw = Dataset::from_csv(&config.data_ingestion.dataset_path)?;
            clean_data(raw, target)?.0
        }
    };
    tracker.start_run("data_split");
    let split_cfg = &config.data_split;
    tracker.log_metric("test_size", split_cfg.test_size);
    tracker.log_param("random_state", &split_cfg.random_state.to_string());

    let SplitResult { train, test } =
        split_data(ds, target, split_cfg.test_size, split_cfg.random_state)?;
    validate_split(&train, &test, target, config.data.tolerance)?;

    write_parquet(&train, schema, &split_cfg.train_path)?;
    write_parquet(&test, schema, &split_cfg.test_path)?;
    tracker.log_artifact(&split_cfg.train_path);
    tracker.log_artifact(&split_cfg.test_path);
    tracker.end_run()?;

    summary.train_rows = train.row_count();
    summary.test_rows = test.row_count();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_ordering() {
        assert!(Stage::Ingest < Stage::Clean);
        assert!(Stage::Clean < Stage::Split);
        assert_eq!(PIPELINE_STAGES[0], Stage::Ingest);
        assert_eq!(PIPELINE_STAGES[2], Stage::Split);
    }

    #[test]
    fn test_stage_from_str() {
        assert_eq!(Stage::from_str("ingest").unwrap(), Stage::Ingest);
        assert_eq!(Stage::from_str("clean").unwrap(), Stage::Clean);
        assert_eq!(Stage::from_str("split").unwrap(), Stage::Split);
        assert!(Stage::from_str("train").is_err());
    }

    #[test]
    fn test_stage_name_roundtrip() {
        for stage in PIPELINE_STAGES {
            assert_eq!(Stage::from_str(stage.name()).unwrap(), stage);
        }
    }
}
