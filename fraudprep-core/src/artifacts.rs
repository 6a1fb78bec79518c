//! Columnar artifact output: train/test partitions persisted as Parquet.

use crate::dataset::{ColumnType, Dataset, DatasetSchema};
use crate::error::PipelineError;
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema as ArrowSchema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Write a dataset to a Parquet file, mapping declared column types to
/// arrow types. Parent directories are created as needed.
pub fn write_parquet(
    dataset: &Dataset,
    schema: &DatasetSchema,
    path: &Path,
) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut fields = Vec::with_capacity(dataset.columns.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(dataset.columns.len());
    for (idx, name) in dataset.columns.iter().enumerate() {
        let spec = schema
            .columns
            .iter()
            .find(|c| &c.name == name)
            .ok_or_else(|| PipelineError::MissingColumn(name.clone()))?;
        fields.push(Field::new(name, arrow_type(spec.dtype), spec.nullable));
        arrays.push(column_array(dataset, idx, spec.dtype));
    }

    let arrow_schema = Arc::new(ArrowSchema::new(fields));
    let batch = RecordBatch::try_new(arrow_schema.clone(), arrays)?;

    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, arrow_schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    tracing::info!(path = %path.display(), rows = dataset.row_count(), "wrote parquet artifact");
    Ok(())
}

fn arrow_type(dtype: ColumnType) -> DataType {
    match dtype {
        ColumnType::Integer => DataType::Int64,
        ColumnType::Float => DataType::Float64,
        ColumnType::Boolean => DataType::Boolean,
        ColumnType::String => DataType::Utf8,
    }
}

fn column_array(dataset: &Dataset, idx: usize, dtype: ColumnType) -> ArrayRef {
    match dtype {
        ColumnType::Integer => {
            let values: Vec<Option<i64>> = dataset
                .rows
                .iter()
                .map(|row| cell(row, idx).and_then(as_i64))
                .collect();
            Arc::new(Int64Array::from(values))
        }
        ColumnType::Float => {
            let values: Vec<Option<f64>> = dataset
                .rows
                .iter()
                .map(|row| cell(row, idx).and_then(serde_json::Value::as_f64))
                .collect();
            Arc::new(Float64Array::from(values))
        }
        ColumnType::Boolean => {
            let values: Vec<Option<bool>> = dataset
                .rows
                .iter()
                .map(|row| cell(row, idx).and_then(serde_json::Value::as_bool))
                .collect();
            Arc::new(BooleanArray::from(values))
        }
        ColumnType::String => {
            let values: Vec<Option<String>> = dataset
                .rows
                .iter()
                .map(|row| cell(row, idx).map(render_text))
                .collect();
            Arc::new(StringArray::from(values))
        }
    }
}

fn cell<'a>(row: &'a [serde_json::Value], idx: usize) -> Option<&'a serde_json::Value> {
    row.get(idx).filter(|v| !v.is_null())
}

fn as_i64(value: &serde_json::Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
}

fn render_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ColumnSpec;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    fn schema() -> DatasetSchema {
        DatasetSchema {
            schema_version: "1.0".into(),
            dataset_name: "test".into(),
            columns: vec![
                ColumnSpec {
                    name: "amount".into(),
                    dtype: ColumnType::Float,
                    nullable: false,
                    constraint: None,
                },
                ColumnSpec {
                    name: "merchant".into(),
                    dtype: ColumnType::String,
                    nullable: true,
                    constraint: None,
                },
                ColumnSpec {
                    name: "class".into(),
                    dtype: ColumnType::Integer,
                    nullable: false,
                    constraint: None,
                },
            ],
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(
            vec!["amount".into(), "merchant".into(), "class".into()],
            vec![
                vec![
                    serde_json::json!(12.5),
                    serde_json::json!("acme"),
                    serde_json::json!(0),
                ],
                vec![
                    serde_json::json!(99.0),
                    serde_json::Value::Null,
                    serde_json::json!(1),
                ],
            ],
        )
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.parquet");
        write_parquet(&dataset(), &schema(), &path).unwrap();

        let file = File::open(&path).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();
        let batches: Vec<RecordBatch> = reader.map(|b| b.unwrap()).collect();
        let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(rows, 2);
        assert_eq!(batches[0].num_columns(), 3);
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deep/out.parquet");
        write_parquet(&dataset(), &schema(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_column_missing_from_schema() {
        let mut ds = dataset();
        ds.columns[1] = "unknown".into();
        let dir = tempfile::tempdir().unwrap();
        let err = write_parquet(&ds, &schema(), &dir.path().join("x.parquet")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(_)));
    }
}
