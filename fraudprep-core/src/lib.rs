//! # fraudprep-core — staged data preparation for tabular fraud datasets
//!
//! Ingests a raw CSV, validates it against a declarative schema, cleans it
//! with row-removal accounting, checks sample-size and class-balance
//! constraints, performs a deterministic stratified train/test split, and
//! validates that the split preserves class proportions within tolerance.
//!
//! Every stage reports parameters, metrics, and artifact paths to a
//! [`tracking::TrackingSink`] and logs through `tracing`. The orchestrator
//! in [`pipeline`] sequences the stages and aborts the run on the first
//! error.

pub mod artifacts;
pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod tracking;

pub use config::{load_config, PipelineConfig};
pub use dataset::{Dataset, DatasetSchema};
pub use error::PipelineError;
pub use pipeline::{run_pipeline, PipelineSummary, Stage, PIPELINE_STAGES};
pub use tracking::{FileTracker, MemoryTracker, TrackingSink};
