//! Typed rows and tabular datasets
//!
//! Query results are never consumed positionally by callers: a [`Record`] is
//! always interpreted through the [`EntitySpec`] it was fetched for, and a
//! [`Dataset`] pairs records with the destination column names.

use super::entity::EntitySpec;
use super::errors::ExportError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single typed cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
}

impl Value {
    /// Returns true for SQL NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Renders the value as a flat-file field. NULL becomes an empty field.
    pub fn to_field(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => s.clone(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            Value::TimestampTz(ts) => ts.to_rfc3339(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            other => write!(f, "{}", other.to_field()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// One fetched row, with values in the entity's declared column order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    /// Creates a record from values in declared column order
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the record holds no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in declared order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consumes the record and returns its values
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl<V: Into<Value>> FromIterator<V> for Record {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// A named tabular dataset ready for an export sink
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    name: String,
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Dataset {
    /// Shapes fetched records into the entity's declared destination schema
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Shaping`] if a record does not have one value per
    /// declared column, or if a record carries a NULL key.
    pub fn shape(spec: &EntitySpec, records: Vec<Record>) -> Result<Self, ExportError> {
        let columns: Vec<String> = spec
            .destination_columns()
            .into_iter()
            .map(str::to_string)
            .collect();

        let key_index = spec
            .columns
            .iter()
            .position(|c| c.source == spec.key_column)
            .ok_or_else(|| ExportError::Shaping {
                dataset: spec.dataset_name().to_string(),
                message: format!("key column '{}' is not declared", spec.key_column),
            })?;

        for (index, record) in records.iter().enumerate() {
            if record.len() != columns.len() {
                return Err(ExportError::Shaping {
                    dataset: spec.dataset_name().to_string(),
                    message: format!(
                        "row {index} has {} values, expected {}",
                        record.len(),
                        columns.len()
                    ),
                });
            }
            if record.values()[key_index].is_null() {
                return Err(ExportError::Shaping {
                    dataset: spec.dataset_name().to_string(),
                    message: format!("row {index} has a NULL key '{}'", spec.key_column),
                });
            }
        }

        Ok(Self {
            name: spec.dataset_name().to_string(),
            columns,
            rows: records,
        })
    }

    /// Dataset name (destination identifier)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Destination column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in fetch order
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Looks up a cell by row index and destination column name
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).map(|r| &r.values()[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::ColumnSpec;

    fn products() -> EntitySpec {
        EntitySpec::builder("products")
            .key_column("id")
            .column(ColumnSpec::new("id").required())
            .column(ColumnSpec::new("type").required().renamed("name"))
            .column(ColumnSpec::new("price"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_value_fields() {
        assert_eq!(Value::Null.to_field(), "");
        assert_eq!(Value::Integer(7).to_field(), "7");
        assert_eq!(Value::from("auto").to_field(), "auto");
        assert_eq!(Value::from(None::<i64>), Value::Null);
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(Value::Date(date).to_field(), "2024-03-01");
    }

    #[test]
    fn test_shape_uses_destination_names() {
        let records = vec![
            Record::new(vec![Value::Integer(1), "auto".into(), Value::Float(99.5)]),
            Record::new(vec![Value::Integer(2), "home".into(), Value::Null]),
        ];
        let dataset = Dataset::shape(&products(), records).unwrap();

        assert_eq!(dataset.name(), "products");
        assert_eq!(dataset.columns(), ["id", "name", "price"]);
        assert_eq!(dataset.get(0, "name"), Some(&Value::from("auto")));
        assert_eq!(dataset.get(1, "price"), Some(&Value::Null));
        assert_eq!(dataset.get(0, "type"), None);
    }

    #[test]
    fn test_shape_rejects_arity_mismatch() {
        let records = vec![Record::new(vec![Value::Integer(1), "auto".into()])];
        let err = Dataset::shape(&products(), records).unwrap_err();
        assert!(matches!(err, ExportError::Shaping { .. }));
        assert!(err.to_string().contains("expected 3"));
    }

    #[test]
    fn test_shape_rejects_null_key() {
        let records = vec![Record::new(vec![Value::Null, "auto".into(), Value::Float(1.0)])];
        let err = Dataset::shape(&products(), records).unwrap_err();
        assert!(err.to_string().contains("NULL key"));
    }

    #[test]
    fn test_shape_empty_dataset() {
        let dataset = Dataset::shape(&products(), Vec::new()).unwrap();
        assert_eq!(dataset.row_count(), 0);
        assert_eq!(dataset.columns().len(), 3);
    }
}
