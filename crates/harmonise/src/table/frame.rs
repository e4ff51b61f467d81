//! Labeled tabular data: a row index plus ordered, named columns.

use std::collections::{HashMap, HashSet};
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{HarmoniseError, Result};

use super::value::Value;

/// Stable identifier of a record (row) in a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowKey {
    /// Numeric record identifier.
    Int(i64),
    /// Textual record identifier (e.g. a participant code).
    Text(String),
}

impl RowKey {
    /// Keys `0..rows`, the default index of a freshly loaded table.
    pub fn range(rows: usize) -> Vec<RowKey> {
        (0..rows as i64).map(RowKey::Int).collect()
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Int(i) => write!(f, "{}", i),
            RowKey::Text(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<i64> for RowKey {
    fn from(value: i64) -> Self {
        RowKey::Int(value)
    }
}

impl From<i32> for RowKey {
    fn from(value: i32) -> Self {
        RowKey::Int(i64::from(value))
    }
}

impl From<&str> for RowKey {
    fn from(value: &str) -> Self {
        RowKey::Text(value.to_string())
    }
}

impl From<String> for RowKey {
    fn from(value: String) -> Self {
        RowKey::Text(value)
    }
}

/// In-memory table with a unique row index and ordered named columns.
///
/// Every column holds exactly one value per index entry. Row keys cannot
/// change after construction; columns can be added, renamed, and dropped.
#[derive(Debug, Clone, Default)]
pub struct DataTable {
    index: Vec<RowKey>,
    positions: HashMap<RowKey, usize>,
    columns: IndexMap<String, Vec<Value>>,
}

impl DataTable {
    /// Create a table with the given row index and no columns.
    pub fn new(index: Vec<RowKey>) -> Result<Self> {
        let mut positions = HashMap::with_capacity(index.len());
        for (pos, key) in index.iter().enumerate() {
            if positions.insert(key.clone(), pos).is_some() {
                return Err(HarmoniseError::DuplicateRowKey(key.clone()));
            }
        }

        Ok(Self {
            index,
            positions,
            columns: IndexMap::new(),
        })
    }

    /// Create a table from a row index and a list of named columns.
    pub fn from_columns<I, S>(index: Vec<RowKey>, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<Value>)>,
        S: Into<String>,
    {
        let mut table = Self::new(index)?;
        for (name, values) in columns {
            table.insert_column(name, values)?;
        }
        Ok(table)
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.index.len()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// The row index, in order.
    pub fn index(&self) -> &[RowKey] {
        &self.index
    }

    /// Column names, in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Owned copy of the column names, in order.
    pub fn column_name_list(&self) -> Vec<String> {
        self.columns.keys().cloned().collect()
    }

    /// Columns with their values, in order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.columns
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Whether the table has a column with this name.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// All values of a column.
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Position of a row key in the index.
    pub fn row_position(&self, key: &RowKey) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// A single cell.
    pub fn get(&self, key: &RowKey, column: &str) -> Option<&Value> {
        let pos = self.row_position(key)?;
        self.columns.get(column).and_then(|values| values.get(pos))
    }

    /// Overwrite a single cell, returning the previous value.
    pub fn set(&mut self, key: &RowKey, column: &str, value: Value) -> Result<Value> {
        let pos = self
            .row_position(key)
            .ok_or_else(|| HarmoniseError::UnknownRow(key.clone()))?;
        let values = self
            .columns
            .get_mut(column)
            .ok_or_else(|| HarmoniseError::UnknownColumn(column.to_string()))?;
        Ok(std::mem::replace(&mut values[pos], value))
    }

    /// Append a column at the end.
    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<()> {
        let name = name.into();
        self.check_new_column(&name, values.len())?;
        self.columns.insert(name, values);
        Ok(())
    }

    /// Append a column filled with `Missing`.
    pub fn insert_missing_column(&mut self, name: impl Into<String>) -> Result<()> {
        let values = vec![Value::Missing; self.height()];
        self.insert_column(name, values)
    }

    /// Append several columns at once.
    ///
    /// Every column is checked before any is inserted, so on error the table
    /// is left unchanged.
    pub fn hstack(&mut self, columns: Vec<(String, Vec<Value>)>) -> Result<()> {
        {
            let mut incoming = HashSet::with_capacity(columns.len());
            for (name, values) in &columns {
                self.check_new_column(name, values.len())?;
                if !incoming.insert(name.as_str()) {
                    return Err(HarmoniseError::DuplicateColumn(name.clone()));
                }
            }
        }

        self.columns.extend(columns);
        Ok(())
    }

    /// Check that a rename mapping can be applied without producing
    /// duplicate column names. Names absent from the table are ignored.
    pub fn validate_rename(&self, mapping: &IndexMap<String, String>) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.columns.len());
        for name in self.columns.keys() {
            let target = mapping.get(name).unwrap_or(name);
            if !seen.insert(target.as_str()) {
                return Err(HarmoniseError::DuplicateColumn(target.clone()));
            }
        }
        Ok(())
    }

    /// Rename columns in place, keeping their positions.
    ///
    /// All pairs are applied at once, so swaps such as `a -> b, b -> a` work.
    /// Names absent from the table are ignored.
    pub fn rename_columns(&mut self, mapping: &IndexMap<String, String>) -> Result<()> {
        self.validate_rename(mapping)?;

        let columns = std::mem::take(&mut self.columns);
        self.columns = columns
            .into_iter()
            .map(|(name, values)| match mapping.get(&name) {
                Some(target) => (target.clone(), values),
                None => (name, values),
            })
            .collect();
        Ok(())
    }

    /// Remove columns in place. Fails without changes if any is absent.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        for name in names {
            let name: &str = name.as_ref();
            if !self.has_column(name) {
                return Err(HarmoniseError::UnknownColumn(name.to_string()));
            }
        }

        for name in names {
            self.columns.shift_remove(name.as_ref());
        }
        Ok(())
    }

    /// Copy of the table without the named columns. Absent names are ignored.
    pub fn without_columns<S: AsRef<str>>(&self, names: &[S]) -> DataTable {
        let excluded: HashSet<&str> = names.iter().map(AsRef::as_ref).collect();
        DataTable {
            index: self.index.clone(),
            positions: self.positions.clone(),
            columns: self
                .columns
                .iter()
                .filter(|(name, _)| !excluded.contains(name.as_str()))
                .map(|(name, values)| (name.clone(), values.clone()))
                .collect(),
        }
    }

    /// Copy of the table with columns renamed.
    pub fn renamed(&self, mapping: &IndexMap<String, String>) -> Result<DataTable> {
        let mut table = self.clone();
        table.rename_columns(mapping)?;
        Ok(table)
    }

    fn check_new_column(&self, name: &str, len: usize) -> Result<()> {
        if self.has_column(name) {
            return Err(HarmoniseError::DuplicateColumn(name.to_string()));
        }
        if len != self.height() {
            return Err(HarmoniseError::LengthMismatch {
                column: name.to_string(),
                expected: self.height(),
                actual: len,
            });
        }
        Ok(())
    }
}
