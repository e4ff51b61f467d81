//! Change records: explicit cell-level recodes.

use serde::{Deserialize, Serialize};

use crate::error::{HarmoniseError, Result};
use crate::table::{RowKey, Value};

/// Declares that `value` was written into every cell of `columns` × `idx`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ChangeRecordFields")]
pub struct ChangeRecord {
    columns: Vec<String>,
    idx: Vec<RowKey>,
    value: Value,
}

#[derive(Deserialize)]
struct ChangeRecordFields {
    columns: Vec<String>,
    idx: Vec<RowKey>,
    value: Value,
}

impl TryFrom<ChangeRecordFields> for ChangeRecord {
    type Error = HarmoniseError;

    fn try_from(fields: ChangeRecordFields) -> Result<Self> {
        ChangeRecord::new(fields.columns, fields.idx, fields.value)
    }
}

impl ChangeRecord {
    /// Create a change record. Fails if `columns` or `idx` is empty.
    pub fn new<C, R>(columns: Vec<C>, idx: Vec<R>, value: impl Into<Value>) -> Result<Self>
    where
        C: Into<String>,
        R: Into<RowKey>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let idx: Vec<RowKey> = idx.into_iter().map(Into::into).collect();

        if columns.is_empty() {
            return Err(HarmoniseError::InvalidRule(
                "change record lists no columns".to_string(),
            ));
        }
        if let Some(blank) = columns.iter().find(|c| c.trim().is_empty()) {
            return Err(HarmoniseError::InvalidRule(format!(
                "change record has a blank column name '{}'",
                blank
            )));
        }
        if idx.is_empty() {
            return Err(HarmoniseError::InvalidRule(format!(
                "change record for {} lists no rows",
                columns.join(", ")
            )));
        }

        Ok(Self {
            columns,
            idx,
            value: value.into(),
        })
    }

    /// Columns the value was written into.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows the value was written into.
    pub fn idx(&self) -> &[RowKey] {
        &self.idx
    }

    /// The written value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Number of cells covered by the record.
    pub fn cell_count(&self) -> usize {
        self.columns.len() * self.idx.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_converts_keys() {
        let record = ChangeRecord::new(vec!["age"], vec![0, 3], 99).unwrap();
        assert_eq!(record.columns(), ["age".to_string()]);
        assert_eq!(record.idx(), [RowKey::Int(0), RowKey::Int(3)]);
        assert_eq!(record.value(), &Value::Int(99));
        assert_eq!(record.cell_count(), 2);
    }

    #[test]
    fn test_rejects_empty_targets() {
        assert!(ChangeRecord::new(Vec::<String>::new(), vec![0], 1).is_err());
        assert!(ChangeRecord::new(vec!["age"], Vec::<i64>::new(), 1).is_err());
        assert!(ChangeRecord::new(vec![""], vec![0], 1).is_err());
    }

    #[test]
    fn test_deserialize_text_keys() {
        let record: ChangeRecord = serde_json::from_str(
            r#"{"columns": ["sex"], "idx": ["P001", "P007"], "value": null}"#,
        )
        .unwrap();
        assert_eq!(record.idx()[0], RowKey::from("P001"));
        assert_eq!(record.value(), &Value::Missing);

        assert!(serde_json::from_str::<ChangeRecord>(r#"{"columns": [], "idx": [1], "value": 1}"#).is_err());
    }
}
