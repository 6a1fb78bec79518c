//! Declarative schema contract and schema validation.
//!
//! The schema is loaded once per run from a YAML document and is immutable
//! afterwards. Validation is a pure check: rules run in a fixed order and
//! the first violation wins.

use crate::dataset::Dataset;
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Declared column data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Float,
    String,
    Boolean,
}

impl ColumnType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Boolean => "boolean",
        }
    }
}

/// Optional per-column value constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnConstraint {
    /// Numeric range; either bound may be open.
    Range {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    /// Closed set of allowed values.
    AllowedValues { values: Vec<serde_json::Value> },
}

/// Schema for a single column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub dtype: ColumnType,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub constraint: Option<ColumnConstraint>,
}

/// Declarative schema contract for a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSchema {
    pub schema_version: String,
    pub dataset_name: String,
    pub columns: Vec<ColumnSpec>,
}

impl DatasetSchema {
    /// Load a schema from a YAML file.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

/// Validate a dataset against its declared schema.
///
/// Rule order, first failure wins:
/// 1. column-set match, 2. per-column types, 3. nullability, 4. constraints.
pub fn validate_schema(dataset: &Dataset, schema: &DatasetSchema) -> Result<(), PipelineError> {
    check_column_set(dataset, schema)?;

    // The set check guarantees every declared column resolves.
    let indexed: Vec<(usize, &ColumnSpec)> = schema
        .columns
        .iter()
        .filter_map(|spec| dataset.column_index(&spec.name).map(|idx| (idx, spec)))
        .collect();

    for &(idx, spec) in &indexed {
        check_types(dataset, spec, idx)?;
    }
    for &(idx, spec) in &indexed {
        if !spec.nullable {
            check_nulls(dataset, spec, idx)?;
        }
    }
    for &(idx, spec) in &indexed {
        if let Some(constraint) = &spec.constraint {
            check_constraint(dataset, spec, constraint, idx)?;
        }
    }
    Ok(())
}

fn check_column_set(dataset: &Dataset, schema: &DatasetSchema) -> Result<(), PipelineError> {
    let declared: BTreeSet<&str> = schema.columns.iter().map(|c| c.name.as_str()).collect();
    let observed: BTreeSet<&str> = dataset.columns.iter().map(|c| c.as_str()).collect();

    let missing: Vec<&str> = declared.difference(&observed).copied().collect();
    let unexpected: Vec<&str> = observed.difference(&declared).copied().collect();
    if missing.is_empty() && unexpected.is_empty() {
        return Ok(());
    }

    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing columns [{}]", missing.join(", ")));
    }
    if !unexpected.is_empty() {
        parts.push(format!("unexpected columns [{}]", unexpected.join(", ")));
    }
    Err(PipelineError::schema_mismatch(parts.join("; ")))
}

fn check_types(dataset: &Dataset, spec: &ColumnSpec, idx: usize) -> Result<(), PipelineError> {
    for row in &dataset.rows {
        let value = row.get(idx).unwrap_or(&serde_json::Value::Null);
        if value.is_null() {
            // Null handling belongs to the nullability rule.
            continue;
        }
        if !coercible(value, spec.dtype) {
            return Err(PipelineError::TypeViolation {
                column: spec.name.clone(),
                value: value.to_string(),
                expected: spec.dtype.name().to_string(),
            });
        }
    }
    Ok(())
}

fn coercible(value: &serde_json::Value, dtype: ColumnType) -> bool {
    match dtype {
        ColumnType::Integer => match value {
            serde_json::Value::Number(n) => {
                n.as_i64().is_some() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            _ => false,
        },
        ColumnType::Float => value.is_number(),
        ColumnType::Boolean => value.is_boolean(),
        // Scalars always render as text.
        ColumnType::String => value.is_string() || value.is_number() || value.is_boolean(),
    }
}

fn check_nulls(dataset: &Dataset, spec: &ColumnSpec, idx: usize) -> Result<(), PipelineError> {
    let count = dataset
        .rows
        .iter()
        .filter(|row| row.get(idx).is_none_or(|v| v.is_null()))
        .count();
    if count > 0 {
        return Err(PipelineError::NullConstraintViolation {
            column: spec.name.clone(),
            count,
        });
    }
    Ok(())
}

fn check_constraint(
    dataset: &Dataset,
    spec: &ColumnSpec,
    constraint: &ColumnConstraint,
    idx: usize,
) -> Result<(), PipelineError> {
    for row in &dataset.rows {
        let value = row.get(idx).unwrap_or(&serde_json::Value::Null);
        if value.is_null() {
            continue;
        }
        match constraint {
            ColumnConstraint::Range { min, max } => {
                let Some(v) = value.as_f64() else {
                    return Err(PipelineError::ConstraintViolation {
                        column: spec.name.clone(),
                        reason: format!("range constraint on non-numeric value {value}"),
                    });
                };
                if min.is_some_and(|m| v < m) || max.is_some_and(|m| v > m) {
                    return Err(PipelineError::ConstraintViolation {
                        column: spec.name.clone(),
                        reason: format!(
                            "value {v} outside range [{}, {}]",
                            min.map_or("-inf".to_string(), |m| m.to_string()),
                            max.map_or("+inf".to_string(), |m| m.to_string())
                        ),
                    });
                }
            }
            ColumnConstraint::AllowedValues { values } => {
                if !values.contains(value) {
                    return Err(PipelineError::ConstraintViolation {
                        column: spec.name.clone(),
                        reason: format!("value {value} not in allowed set"),
                    });
                }
            }
        }
    }
    Ok(())
}
