//! Data cleaning: drop rows with a missing target, then exact duplicates.

use crate::dataset::Dataset;
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Row-removal accounting for one clean stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_removed: usize,
}

/// Remove rows whose target cell is null/missing, then remove exact
/// duplicate rows (all columns equal). Surviving rows keep their order and
/// column types are untouched.
pub fn clean_data(
    mut dataset: Dataset,
    target_column: &str,
) -> Result<(Dataset, CleaningReport), PipelineError> {
    let target_idx = dataset
        .column_index(target_column)
        .ok_or_else(|| PipelineError::MissingColumn(target_column.to_string()))?;

    let before = dataset.row_count();

    dataset
        .rows
        .retain(|row| row.get(target_idx).is_some_and(|v| !v.is_null()));

    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(dataset.rows.len());
    for row in std::mem::take(&mut dataset.rows) {
        let key = serde_json::to_string(&row)?;
        if seen.insert(key) {
            rows.push(row);
        }
    }
    dataset.rows = rows;

    let rows_removed = before - dataset.row_count();
    tracing::info!(rows_removed, remaining = dataset.row_count(), "cleaned dataset");
    Ok((dataset, CleaningReport { rows_removed }))
}
