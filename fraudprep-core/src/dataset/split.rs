//! Deterministic stratified train/test splitting.

use crate::dataset::{class_key, Dataset};
use crate::error::PipelineError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashSet};

/// Disjoint row partition of a dataset. Together train and test reconstruct
/// the input exactly; no row is created, duplicated, or lost.
#[derive(Debug, Clone)]
pub struct SplitResult {
    pub train: Dataset,
    pub test: Dataset,
}

/// Stratified random partition of `dataset` into train and test.
///
/// Rows are grouped by target value; within each group a seeded-random
/// subset of `round(group_len * test_size)` rows is assigned to test (round
/// half away from zero), the remainder to train. Groups are visited in
/// sorted class-key order so a single RNG stream, seeded from
/// `random_state`, makes the partition fully deterministic. Surviving rows
/// keep their original relative order inside each partition.
pub fn split_data(
    dataset: Dataset,
    target_column: &str,
    test_size: f64,
    random_state: u64,
) -> Result<SplitResult, PipelineError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PipelineError::invalid_parameter(format!(
            "test_size must be in (0, 1), got {test_size}"
        )));
    }
    let target_idx = dataset
        .column_index(target_column)
        .ok_or_else(|| PipelineError::MissingColumn(target_column.to_string()))?;

    // Sorted keys give a stable group visiting order for the RNG stream.
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, row) in dataset.rows.iter().enumerate() {
        let value = row.get(target_idx).cloned().unwrap_or(serde_json::Value::Null);
        groups.entry(class_key(&value)).or_default().push(i);
    }

    let mut rng = StdRng::seed_from_u64(random_state);
    let mut test_indices: HashSet<usize> = HashSet::new();
    for indices in groups.values() {
        let n_test = (indices.len() as f64 * test_size).round() as usize;
        let n_test = n_test.min(indices.len());
        let mut shuffled = indices.clone();
        shuffled.shuffle(&mut rng);
        test_indices.extend(shuffled.into_iter().take(n_test));
    }

    let columns = dataset.columns.clone();
    let mut train_rows = Vec::with_capacity(dataset.row_count() - test_indices.len());
    let mut test_rows = Vec::with_capacity(test_indices.len());
    for (i, row) in dataset.rows.into_iter().enumerate() {
        if test_indices.contains(&i) {
            test_rows.push(row);
        } else {
            train_rows.push(row);
        }
    }

    tracing::info!(
        train_rows = train_rows.len(),
        test_rows = test_rows.len(),
        random_state,
        "split dataset"
    );
    Ok(SplitResult {
        train: Dataset::new(columns.clone(), train_rows),
        test: Dataset::new(columns, test_rows),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dataset(class_counts: &[(i64, usize)]) -> Dataset {
        let mut rows = Vec::new();
        let mut id = 0i64;
        for &(class, count) in class_counts {
            for _ in 0..count {
                rows.push(vec![serde_json::json!(id), serde_json::json!(class)]);
                id += 1;
            }
        }
        Dataset::new(vec!["id".into(), "class".into()], rows)
    }

    fn class_count(ds: &Dataset, class: i64) -> usize {
        let idx = ds.column_index("class").unwrap();
        ds.rows
            .iter()
            .filter(|r| r[idx] == serde_json::json!(class))
            .count()
    }

    #[test]
    fn test_invalid_test_size() {
        for bad in [0.0, 1.0, -0.1, 1.5] {
            let err = split_data(dataset(&[(0, 10)]), "class", bad, 42).unwrap_err();
            assert!(matches!(err, PipelineError::InvalidParameter(_)), "{bad}");
        }
    }

    #[test]
    fn test_missing_target_column() {
        let err = split_data(dataset(&[(0, 10)]), "label", 0.2, 42).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(_)));
    }

    #[test]
    fn test_partition_invariant() {
        let ds = dataset(&[(0, 37), (1, 13)]);
        let original: Vec<String> = ds
            .rows
            .iter()
            .map(|r| serde_json::to_string(r).unwrap())
            .collect();
        let SplitResult { train, test } = split_data(ds, "class", 0.3, 7).unwrap();

        let mut recombined: Vec<String> = train
            .rows
            .iter()
            .chain(test.rows.iter())
            .map(|r| serde_json::to_string(r).unwrap())
            .collect();
        let mut expected = original;
        recombined.sort();
        expected.sort();
        assert_eq!(recombined, expected);

        // Disjointness: ids are unique, so string keys suffice
        let train_keys: HashSet<_> = train
            .rows
            .iter()
            .map(|r| serde_json::to_string(r).unwrap())
            .collect();
        assert!(test
            .rows
            .iter()
            .all(|r| !train_keys.contains(&serde_json::to_string(r).unwrap())));
    }

    #[test]
    fn test_deterministic_given_same_seed() {
        let a = split_data(dataset(&[(0, 50), (1, 20)]), "class", 0.25, 99).unwrap();
        let b = split_data(dataset(&[(0, 50), (1, 20)]), "class", 0.25, 99).unwrap();
        assert_eq!(a.train.rows, b.train.rows);
        assert_eq!(a.test.rows, b.test.rows);
    }

    #[test]
    fn test_different_seed_changes_partition() {
        let a = split_data(dataset(&[(0, 50), (1, 20)]), "class", 0.25, 1).unwrap();
        let b = split_data(dataset(&[(0, 50), (1, 20)]), "class", 0.25, 2).unwrap();
        assert_ne!(a.test.rows, b.test.rows);
    }

    #[test]
    fn test_stratified_900_100_scenario() {
        let ds = dataset(&[(0, 900), (1, 100)]);
        let SplitResult { train, test } = split_data(ds, "class", 0.2, 42).unwrap();

        assert_eq!(test.row_count(), 200);
        assert_eq!(train.row_count(), 800);
        assert_eq!(class_count(&test, 0), 180);
        assert_eq!(class_count(&test, 1), 20);
        assert_eq!(class_count(&train, 0), 720);
        assert_eq!(class_count(&train, 1), 80);
    }

    #[test]
    fn test_rounding_half_up_per_class() {
        // 5 * 0.3 = 1.5 rounds to 2 test rows for that class
        let ds = dataset(&[(0, 5)]);
        let SplitResult { train, test } = split_data(ds, "class", 0.3, 0).unwrap();
        assert_eq!(test.row_count(), 2);
        assert_eq!(train.row_count(), 3);
    }

    #[test]
    fn test_row_order_preserved_within_partitions() {
        let ds = dataset(&[(0, 100)]);
        let SplitResult { train, test } = split_data(ds, "class", 0.2, 5).unwrap();
        let ids = |d: &Dataset| -> Vec<i64> {
            d.rows.iter().map(|r| r[0].as_i64().unwrap()).collect()
        };
        let mut train_ids = ids(&train);
        let mut test_ids = ids(&test);
        assert!(train_ids.windows(2).all(|w| w[0] < w[1]));
        assert!(test_ids.windows(2).all(|w| w[0] < w[1]));
        train_ids.append(&mut test_ids);
        assert_eq!(train_ids.len(), 100);
    }
}
