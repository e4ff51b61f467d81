//! Transformation operations and the audit trail they leave.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::table::{RowKey, Value};

/// A transformation operation applied to a data table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformOperation {
    /// Derive a new column from an existing one.
    Create {
        column: String,
        condition_column: String,
        conditions: usize,
    },

    /// Rename a column.
    Rename { from: String, to: String },

    /// Write one value into a block of cells.
    Recode {
        columns: Vec<String>,
        rows: usize,
        value: Value,
    },

    /// Remove a column.
    Delete { column: String },
}

impl TransformOperation {
    /// Get a human-readable description of the operation.
    pub fn description(&self) -> String {
        match self {
            TransformOperation::Create {
                column,
                condition_column,
                conditions,
            } => format!(
                "Create '{}' from '{}' ({} condition(s))",
                column, condition_column, conditions
            ),
            TransformOperation::Rename { from, to } => {
                format!("Rename '{}' → '{}'", from, to)
            }
            TransformOperation::Recode {
                columns,
                rows,
                value,
            } => format!(
                "Recode {} row(s) in {} to {}",
                rows,
                columns
                    .iter()
                    .map(|c| format!("'{}'", c))
                    .collect::<Vec<_>>()
                    .join(", "),
                value
            ),
            TransformOperation::Delete { column } => format!("Delete '{}'", column),
        }
    }
}

/// Result of applying a harmonisation plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformResult {
    /// Number of operations applied.
    pub operations_applied: usize,

    /// Number of cells whose value changed.
    pub cells_modified: usize,

    /// Number of columns added.
    pub columns_added: usize,

    /// Number of columns removed.
    pub columns_removed: usize,

    /// Detailed changes for each operation.
    pub changes: Vec<TransformChange>,

    /// When the plan was applied.
    pub applied_at: DateTime<Utc>,
}

/// A single change made during transformation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformChange {
    /// The operation that produced this change.
    pub operation: TransformOperation,

    /// Description of the change.
    pub description: String,

    /// Number of values changed.
    pub values_changed: usize,

    /// Per-cell audit information.
    pub row_audits: Vec<RowAudit>,
}

impl TransformChange {
    /// Record an operation that changed no existing cells.
    pub fn structural(operation: TransformOperation) -> Self {
        Self {
            description: operation.description(),
            operation,
            values_changed: 0,
            row_audits: Vec::new(),
        }
    }

    /// Record an operation together with the cells it wrote.
    pub fn with_audits(operation: TransformOperation, row_audits: Vec<RowAudit>) -> Self {
        let values_changed = row_audits
            .iter()
            .filter(|a| a.original_value != a.new_value)
            .count();
        Self {
            description: operation.description(),
            operation,
            values_changed,
            row_audits,
        }
    }
}

/// Audit information for a single cell write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowAudit {
    /// Row key.
    pub row: RowKey,

    /// Column that was written.
    pub column: String,

    /// Value before the write.
    pub original_value: Value,

    /// Value after the write.
    pub new_value: Value,
}

impl TransformResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self {
            operations_applied: 0,
            cells_modified: 0,
            columns_added: 0,
            columns_removed: 0,
            changes: Vec::new(),
            applied_at: Utc::now(),
        }
    }

    /// Add a change to the result.
    pub fn add_change(&mut self, change: TransformChange) {
        self.operations_applied += 1;
        self.cells_modified += change.values_changed;
        match change.operation {
            TransformOperation::Create { .. } => self.columns_added += 1,
            TransformOperation::Delete { .. } => self.columns_removed += 1,
            TransformOperation::Rename { .. } | TransformOperation::Recode { .. } => {}
        }
        self.changes.push(change);
    }
}

impl Default for TransformResult {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptions() {
        let op = TransformOperation::Rename {
            from: "sex".to_string(),
            to: "gender".to_string(),
        };
        assert_eq!(op.description(), "Rename 'sex' → 'gender'");

        let op = TransformOperation::Recode {
            columns: vec!["age".to_string(), "age_w2".to_string()],
            rows: 2,
            value: Value::Int(99),
        };
        assert_eq!(op.description(), "Recode 2 row(s) in 'age', 'age_w2' to 99");
    }

    #[test]
    fn test_counts() {
        let mut result = TransformResult::new();
        result.add_change(TransformChange::structural(TransformOperation::Create {
            column: "age_group".to_string(),
            condition_column: "age".to_string(),
            conditions: 2,
        }));
        result.add_change(TransformChange::with_audits(
            TransformOperation::Recode {
                columns: vec!["age".to_string()],
                rows: 2,
                value: Value::Int(99),
            },
            vec![
                RowAudit {
                    row: RowKey::Int(0),
                    column: "age".to_string(),
                    original_value: Value::Int(98),
                    new_value: Value::Int(99),
                },
                RowAudit {
                    row: RowKey::Int(1),
                    column: "age".to_string(),
                    original_value: Value::Int(99),
                    new_value: Value::Int(99),
                },
            ],
        ));
        result.add_change(TransformChange::structural(TransformOperation::Delete {
            column: "tmp".to_string(),
        }));

        assert_eq!(result.operations_applied, 3);
        assert_eq!(result.cells_modified, 1);
        assert_eq!(result.columns_added, 1);
        assert_eq!(result.columns_removed, 1);
    }
}
