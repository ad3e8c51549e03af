//! Flat row representation.
//!
//! A `Row` is one record of a denormalized join result. The hydrator only
//! ever reads rows; nothing here mutates a row after construction.

use crate::Result;
use crate::error::{Error, TypeError};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Column metadata shared across all rows in a result set.
///
/// This struct is wrapped in `Arc` so all rows from the same query share
/// the same column information, saving memory for large result sets.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    /// Column names in order
    names: Vec<String>,
    /// Name -> index mapping for O(1) lookup
    name_to_index: HashMap<String, usize>,
}

impl ColumnInfo {
    /// Create new column info from a list of column names.
    ///
    /// If a name repeats, lookups by name resolve to its last position.
    pub fn new(names: Vec<String>) -> Self {
        let name_to_index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            names,
            name_to_index,
        }
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Get the index of a column by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Get the name of a column by index.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Check if a column exists.
    pub fn contains(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// Get all column names.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// A single flat row of a dataset.
///
/// Rows provide both index-based and name-based access to column values.
/// Column metadata is shared via `Arc` for memory efficiency.
#[derive(Debug, Clone)]
pub struct Row {
    /// Column values in order
    values: Vec<Value>,
    /// Shared column metadata
    columns: Arc<ColumnInfo>,
}

impl Row {
    /// Create a new row with the given columns and values.
    ///
    /// For multiple rows from the same result set, prefer `with_columns`
    /// to share the column metadata.
    pub fn new(column_names: Vec<String>, values: Vec<Value>) -> Self {
        let columns = Arc::new(ColumnInfo::new(column_names));
        Self { values, columns }
    }

    /// Create a new row with shared column metadata.
    pub fn with_columns(columns: Arc<ColumnInfo>, values: Vec<Value>) -> Self {
        Self { values, columns }
    }

    /// Create a row from `(column, value)` pairs.
    ///
    /// ```
    /// use sqlnest_core::{Row, Value};
    ///
    /// let row = Row::from_pairs([("id", Value::BigInt(1)), ("name", "Album 1".into())]);
    /// assert_eq!(row.get_by_name("id"), Some(&Value::BigInt(1)));
    /// ```
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let (names, values): (Vec<String>, Vec<Value>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self::new(names, values)
    }

    /// Build a row from a JSON object of scalar values.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(map) = json else {
            return Err(Error::Type(TypeError::new("JSON object", json_kind(json))));
        };

        let mut names = Vec::with_capacity(map.len());
        let mut values = Vec::with_capacity(map.len());
        for (name, value) in map {
            let value = Value::from_json(value).map_err(|e| match e {
                Error::Type(te) => Error::Type(te.in_column(name.as_str())),
                e => e,
            })?;
            names.push(name.clone());
            values.push(value);
        }
        Ok(Self::new(names, values))
    }

    /// Get the shared column metadata.
    pub fn column_info(&self) -> Arc<ColumnInfo> {
        Arc::clone(&self.columns)
    }

    /// Get the number of columns in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if this row is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a value by column index. O(1) operation.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get a value by column name. O(1) operation via HashMap lookup.
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.columns.index_of(name).and_then(|i| self.values.get(i))
    }

    /// Get a value by column name, treating an absent column as NULL.
    pub fn value_or_null(&self, name: &str) -> &Value {
        const NULL: &Value = &Value::Null;
        self.get_by_name(name).unwrap_or(NULL)
    }

    /// Whether the column is absent or holds NULL.
    pub fn is_null(&self, name: &str) -> bool {
        self.value_or_null(name).is_null()
    }

    /// Check if a column exists by name.
    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    /// Get a typed value by column name.
    pub fn get_named<T: FromValue>(&self, name: &str) -> Result<T> {
        let value = self.get_by_name(name).ok_or_else(|| {
            Error::Type(
                TypeError::new(
                    std::any::type_name::<T>(),
                    format!("column '{}' not found", name),
                )
                .in_column(name),
            )
        })?;
        T::from_value(value).map_err(|e| match e {
            Error::Type(te) => Error::Type(te.in_column(name)),
            e => e,
        })
    }

    /// Get all column names.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.names().iter().map(String::as_str)
    }

    /// Iterate over all values.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    /// Iterate over (column_name, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

/// Build a dataset from a JSON array of objects.
///
/// Consecutive rows with the same column set share one `ColumnInfo`.
pub fn rows_from_json(json: &serde_json::Value) -> Result<Vec<Row>> {
    let serde_json::Value::Array(items) = json else {
        return Err(Error::Type(TypeError::new("JSON array", json_kind(json))));
    };

    let mut rows: Vec<Row> = Vec::with_capacity(items.len());
    for item in items {
        let row = Row::from_json(item)?;
        let row = match rows.last() {
            Some(prev) if *prev.columns == *row.columns => {
                Row::with_columns(prev.column_info(), row.values)
            }
            _ => row,
        };
        rows.push(row);
    }

    tracing::trace!(rows = rows.len(), "Loaded dataset from JSON");
    Ok(rows)
}

/// Parse a dataset from JSON text.
pub fn rows_from_str(text: &str) -> Result<Vec<Row>> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    rows_from_json(&json)
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Trait for converting from a `Value` to a typed value.
pub trait FromValue: Sized {
    /// Convert from a Value, returning an error if the conversion fails.
    fn from_value(value: &Value) -> Result<Self>;
}

fn type_mismatch(expected: &'static str, value: &Value) -> Error {
    Error::Type(TypeError::new(expected, value.type_name()))
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_bool().ok_or_else(|| type_mismatch("bool", value))
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::TinyInt(v) => Ok(i32::from(*v)),
            Value::SmallInt(v) => Ok(i32::from(*v)),
            Value::Int(v) => Ok(*v),
            Value::BigInt(v) => i32::try_from(*v).map_err(|_| {
                Error::Type(TypeError::new("i32", format!("value {} out of range", v)))
            }),
            _ => Err(type_mismatch("i32", value)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_i64().ok_or_else(|| type_mismatch("i64", value))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_f64().ok_or_else(|| type_mismatch("f64", value))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Text(s) | Value::Decimal(s) => Ok(s.clone()),
            _ => Err(type_mismatch("String", value)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_bytes()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| type_mismatch("Vec<u8>", value))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}
