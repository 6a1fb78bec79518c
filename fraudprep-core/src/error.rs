//! Error types for the fraudprep-core crate.

use thiserror::Error;

/// Top-level error type for pipeline operations.
///
/// Every variant is fatal to a run: the orchestrator propagates the first
/// error and no later stage executes.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Type violation in column '{column}': value {value} is not coercible to {expected}")]
    TypeViolation {
        column: String,
        value: String,
        expected: String,
    },

    #[error("Null constraint violation: column '{column}' is non-nullable but has {count} null value(s)")]
    NullConstraintViolation { column: String, count: usize },

    #[error("Constraint violation in column '{column}': {reason}")]
    ConstraintViolation { column: String, reason: String },

    #[error("Column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("Insufficient samples: {observed} < {required}")]
    InsufficientSamples { observed: usize, required: usize },

    #[error("Class count mismatch: observed {observed} classes, expected {expected}")]
    ClassCountMismatch { observed: usize, expected: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Split imbalance for class '{class}' in {partition}: deviation {deviation:.4} exceeds tolerance {tolerance:.4}")]
    SplitImbalance {
        class: String,
        partition: String,
        deviation: f64,
        tolerance: f64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

impl PipelineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn schema_mismatch(msg: impl Into<String>) -> Self {
        Self::SchemaMismatch(msg.into())
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}
