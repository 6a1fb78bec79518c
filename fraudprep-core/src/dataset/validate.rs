//! Dataset integrity and split-balance validation. Both checks are pure:
//! they accept the data wholesale or reject it with the violated rule.

use crate::dataset::{class_key, Dataset};
use crate::error::PipelineError;
use std::collections::BTreeMap;

/// Check that the cleaned dataset has at least `min_samples` rows and that
/// the target column holds exactly `num_classes` distinct non-null values.
pub fn validate_data(
    dataset: &Dataset,
    target_column: &str,
    min_samples: usize,
    num_classes: usize,
) -> Result<(), PipelineError> {
    let observed = dataset.row_count();
    if observed < min_samples {
        return Err(PipelineError::InsufficientSamples {
            observed,
            required: min_samples,
        });
    }

    let counts = class_counts(dataset, target_column)?;
    if counts.len() != num_classes {
        return Err(PipelineError::ClassCountMismatch {
            observed: counts.len(),
            expected: num_classes,
        });
    }
    Ok(())
}

/// Check that per-class proportions in train and test each stay within
/// `tolerance` (absolute difference) of the proportion in the combined data.
pub fn validate_split(
    train: &Dataset,
    test: &Dataset,
    target_column: &str,
    tolerance: f64,
) -> Result<(), PipelineError> {
    let train_counts = class_counts(train, target_column)?;
    let test_counts = class_counts(test, target_column)?;

    let mut combined: BTreeMap<String, usize> = train_counts.clone();
    for (class, count) in &test_counts {
        *combined.entry(class.clone()).or_default() += count;
    }
    let total = train.row_count() + test.row_count();
    if total == 0 {
        return Err(PipelineError::invalid_parameter(
            "cannot validate split of an empty dataset",
        ));
    }

    for (class, &count) in &combined {
        let overall = count as f64 / total as f64;
        for (partition, counts, len) in [
            ("train", &train_counts, train.row_count()),
            ("test", &test_counts, test.row_count()),
        ] {
            let proportion = if len == 0 {
                0.0
            } else {
                counts.get(class).copied().unwrap_or(0) as f64 / len as f64
            };
            let deviation = (proportion - overall).abs();
            if deviation > tolerance {
                return Err(PipelineError::SplitImbalance {
                    class: class.clone(),
                    partition: partition.to_string(),
                    deviation,
                    tolerance,
                });
            }
        }
    }
    Ok(())
}

/// Count rows per distinct non-null target value.
fn class_counts(
    dataset: &Dataset,
    target_column: &str,
) -> Result<BTreeMap<String, usize>, PipelineError> {
    let idx = dataset
        .column_index(target_column)
        .ok_or_else(|| PipelineError::MissingColumn(target_column.to_string()))?;
    let mut counts = BTreeMap::new();
    for row in &dataset.rows {
        match row.get(idx) {
            Some(v) if !v.is_null() => *counts.entry(class_key(v)).or_default() += 1,
            _ => {}
        }
    }
    Ok(counts)
}
