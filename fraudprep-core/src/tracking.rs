//! Experiment tracking sink.
//!
//! The sink is an explicit object handed to the orchestrator rather than
//! ambient global state, so stages stay testable without a live tracking
//! environment. Run scopes nest with stack discipline, mirroring the stage
//! tree (`pipeline_execution` → per-stage runs).

use crate::error::PipelineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One recorded run scope: parameters, metrics, tags, and artifact paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: String,
    pub name: String,
    pub experiment: String,
    pub parent_id: Option<String>,
    pub tags: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>,
    pub metrics: BTreeMap<String, f64>,
    pub artifacts: Vec<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl RunRecord {
    fn new(name: &str, experiment: &str, parent_id: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            experiment: experiment.to_string(),
            parent_id,
            tags: BTreeMap::new(),
            params: BTreeMap::new(),
            metrics: BTreeMap::new(),
            artifacts: Vec::new(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }
}

/// Sink for named parameters, metrics, and artifact paths, scoped to a
/// nested run hierarchy. Writes are append-only and order-preserving
/// relative to the single execution thread.
pub trait TrackingSink {
    /// Open a run scope nested under the currently active one.
    fn start_run(&mut self, name: &str);
    /// Close the innermost open run scope.
    fn end_run(&mut self) -> Result<(), PipelineError>;
    fn set_tag(&mut self, key: &str, value: &str);
    fn log_param(&mut self, key: &str, value: &str);
    fn log_metric(&mut self, key: &str, value: f64);
    fn log_artifact(&mut self, path: &Path);
}

// ---------------------------------------------------------------------------
// FileTracker
// ---------------------------------------------------------------------------

/// File-backed tracker: one JSON record per finished run under `root`.
pub struct FileTracker {
    experiment: String,
    root: PathBuf,
    stack: Vec<RunRecord>,
}

impl FileTracker {
    pub fn new(root: impl Into<PathBuf>, experiment: &str) -> Result<Self, PipelineError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            experiment: experiment.to_string(),
            root,
            stack: Vec::new(),
        })
    }

    fn active(&mut self) -> Option<&mut RunRecord> {
        if self.stack.is_empty() {
            tracing::warn!("tracking call outside of any run scope, ignored");
        }
        self.stack.last_mut()
    }
}

impl TrackingSink for FileTracker {
    fn start_run(&mut self, name: &str) {
        let parent_id = self.stack.last().map(|r| r.id.clone());
        tracing::debug!(run = name, "starting tracked run");
        self.stack.push(RunRecord::new(name, &self.experiment, parent_id));
    }

    fn end_run(&mut self) -> Result<(), PipelineError> {
        let Some(mut record) = self.stack.pop() else {
            tracing::warn!("end_run without matching start_run");
            return Ok(());
        };
        record.ended_at = Some(Utc::now());
        let path = self.root.join(format!("{}.json", record.id));
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(&record)?)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn set_tag(&mut self, key: &str, value: &str) {
        if let Some(run) = self.active() {
            run.tags.insert(key.to_string(), value.to_string());
        }
    }

    fn log_param(&mut self, key: &str, value: &str) {
        if let Some(run) = self.active() {
            run.params.insert(key.to_string(), value.to_string());
        }
    }

    fn log_metric(&mut self, key: &str, value: f64) {
        if let Some(run) = self.active() {
            run.metrics.insert(key.to_string(), value);
        }
    }

    fn log_artifact(&mut self, path: &Path) {
        if let Some(run) = self.active() {
            run.artifacts.push(path.to_path_buf());
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryTracker
// ---------------------------------------------------------------------------

/// In-memory tracker for tests and dry runs. Finished runs are kept in
/// completion order.
#[derive(Default)]
pub struct MemoryTracker {
    stack: Vec<RunRecord>,
    pub finished: Vec<RunRecord>,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// First finished run with the given name, if any.
    pub fn find(&self, name: &str) -> Option<&RunRecord> {
        self.finished.iter().find(|r| r.name == name)
    }
}

impl TrackingSink for MemoryTracker {
    fn start_run(&mut self, name: &str) {
        let parent_id = self.stack.last().map(|r| r.id.clone());
        self.stack.push(RunRecord::new(name, "memory", parent_id));
    }

    fn end_run(&mut self) -> Result<(), PipelineError> {
        if let Some(mut record) = self.stack.pop() {
            record.ended_at = Some(Utc::now());
            self.finished.push(record);
        }
        Ok(())
    }

    fn set_tag(&mut self, key: &str, value: &str) {
        if let Some(run) = self.stack.last_mut() {
            run.tags.insert(key.to_string(), value.to_string());
        }
    }

    fn log_param(&mut self, key: &str, value: &str) {
        if let Some(run) = self.stack.last_mut() {
            run.params.insert(key.to_string(), value.to_string());
        }
    }

    fn log_metric(&mut self, key: &str, value: f64) {
        if let Some(run) = self.stack.last_mut() {
            run.metrics.insert(key.to_string(), value);
        }
    }

    fn log_artifact(&mut self, path: &Path) {
        if let Some(run) = self.stack.last_mut() {
            run.artifacts.push(path.to_path_buf());
        }
    }
}
