//! Pipeline configuration loaded from a YAML file.
//!
//! Every key without a `#[serde(default)]` is required; a missing key is a
//! fatal configuration error detected before any stage runs.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub pipeline: PipelineSection,
    pub data_ingestion: IngestionConfig,
    pub data: DataConfig,
    pub data_split: SplitConfig,
}

/// Run-wide settings: experiment naming, log and tracking destinations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSection {
    /// Experiment name reported to the tracking sink.
    pub experiment_name: String,
    /// Destination for the file log sink.
    pub log_path: PathBuf,
    /// Directory where run records are persisted.
    #[serde(default = "default_tracking_dir")]
    pub tracking_dir: PathBuf,
}

/// Ingest stage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Path to the raw CSV dataset.
    pub dataset_path: PathBuf,
    /// Path to the declarative schema YAML.
    pub schema_path: PathBuf,
}

/// Dataset-level validation settings shared by the clean and split stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub target_column: String,
    pub min_samples: usize,
    pub num_classes: usize,
    /// Maximum allowed absolute deviation between a partition's class
    /// proportion and the full dataset's class proportion.
    pub tolerance: f64,
}

/// Split stage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    pub test_size: f64,
    pub random_state: u64,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
}

fn default_tracking_dir() -> PathBuf {
    PathBuf::from(".fraudprep/runs")
}

/// Load and deserialize the pipeline configuration.
pub fn load_config(path: &Path) -> Result<PipelineConfig, PipelineError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        PipelineError::config(format!("cannot read config file {}: {e}", path.display()))
    })?;
    serde_yaml::from_str(&content)
        .map_err(|e| PipelineError::config(format!("malformed config {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"
pipeline:
  experiment_name: fraud-detection
  log_path: logs/run.log
data_ingestion:
  dataset_path: data/raw/creditcard.csv
  schema_path: schemas/creditcard.yaml
data:
  target_column: Class
  min_samples: 1000
  num_classes: 2
  tolerance: 0.05
data_split:
  test_size: 0.2
  random_state: 42
  train_path: data/processed/train.parquet
  test_path: data/processed/test.parquet
"#;

    #[test]
    fn test_parse_full_config() {
        let config: PipelineConfig = serde_yaml::from_str(FULL_CONFIG).unwrap();
        assert_eq!(config.pipeline.experiment_name, "fraud-detection");
        assert_eq!(config.data.target_column, "Class");
        assert_eq!(config.data.num_classes, 2);
        assert_eq!(config.data_split.random_state, 42);
        // tracking_dir falls back to its default
        assert_eq!(config.pipeline.tracking_dir, PathBuf::from(".fraudprep/runs"));
    }

    #[test]
    fn test_missing_required_key_is_fatal() {
        // Drop the data_split section entirely
        let truncated = FULL_CONFIG.split("data_split:").next().unwrap();
        let result: Result<PipelineConfig, _> = serde_yaml::from_str(truncated);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/config.yaml")).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_load_config_malformed_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "pipeline: [not, a, mapping").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
