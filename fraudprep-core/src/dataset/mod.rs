//! In-memory tabular dataset — loading, schema contract, hashing, cleaning,
//! splitting, and validation.

pub mod clean;
pub mod hashing;
pub mod schema;
pub mod split;
pub mod validate;

pub use clean::{clean_data, CleaningReport};
pub use schema::{validate_schema, ColumnConstraint, ColumnSpec, ColumnType, DatasetSchema};
pub use split::{split_data, SplitResult};
pub use validate::{validate_data, validate_split};

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An in-memory table: ordered named columns and rows of typed cells.
///
/// Owned exclusively by the active pipeline stage and moved between stages;
/// no stage observes it concurrently with another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<serde_json::Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Index of a named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Load a dataset from a comma-separated file with a header row.
    ///
    /// Cells are typed on read: integer, then float, then boolean, falling
    /// back to string. An empty cell becomes null.
    pub fn from_csv(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path)?;
        let mut lines = content.lines();

        let columns: Vec<String> = lines
            .next()
            .ok_or_else(|| {
                PipelineError::schema_mismatch(format!(
                    "dataset {} is empty (header row required)",
                    path.display()
                ))
            })?
            .split(',')
            .map(|s| s.trim().trim_matches('"').to_string())
            .collect();

        let mut rows = Vec::new();
        for (line_no, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row: Vec<serde_json::Value> = line.split(',').map(parse_cell).collect();
            if row.len() != columns.len() {
                return Err(PipelineError::schema_mismatch(format!(
                    "row {} has {} fields, header declares {}",
                    line_no + 2,
                    row.len(),
                    columns.len()
                )));
            }
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }
}

fn parse_cell(raw: &str) -> serde_json::Value {
    let s = raw.trim().trim_matches('"');
    if s.is_empty() {
        return serde_json::Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return serde_json::Value::Number(i.into());
    }
    if let Ok(f) = s.parse::<f64>() {
        return serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(s.to_string()));
    }
    if s == "true" || s == "false" {
        return serde_json::Value::Bool(s == "true");
    }
    serde_json::Value::String(s.to_string())
}

/// Stable rendering of a target-class cell, used as a grouping key and in
/// diagnostics. Strings render without quotes.
pub(crate) fn class_key(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
