//! Error types for the harmonise library.

use thiserror::Error;

use crate::table::{CellDiff, RowKey, Value};
use crate::verify::ColumnCheck;

/// Main error type for harmonisation and verification.
///
/// Every check in this crate is terminal: the first violated invariant is
/// returned to the caller and nothing is retried or aggregated.
#[derive(Debug, Error)]
pub enum HarmoniseError {
    /// A transform did not leave the tables in the expected state.
    #[error("Postcondition failed in {operation}: {message}")]
    Postcondition {
        operation: &'static str,
        message: String,
    },

    /// The column set of the updated data does not match the declared intent.
    #[error("{}: {}", .check.describe(), .columns.join(", "))]
    ColumnSet {
        check: ColumnCheck,
        columns: Vec<String>,
    },

    /// A declared change was not found in the updated data.
    #[error("Value mismatch in '{column}' at row {row}: expected {expected}, found {actual}")]
    ValueMismatch {
        column: String,
        row: RowKey,
        expected: Value,
        actual: Value,
    },

    /// Cells differ between two tables that should be identical.
    #[error("{total} cell(s) differ: {}", format_diffs(.sample))]
    CellsDiffer { total: usize, sample: Vec<CellDiff> },

    /// Two tables differ in shape, column labels, or row index.
    #[error("Table mismatch: {0}")]
    FrameMismatch(String),

    /// A referenced column does not exist.
    #[error("Column '{0}' not found")]
    UnknownColumn(String),

    /// A referenced row does not exist.
    #[error("Row {0} not found")]
    UnknownRow(RowKey),

    /// A column name would appear twice.
    #[error("Column '{0}' already exists")]
    DuplicateColumn(String),

    /// A row key appears twice in an index.
    #[error("Duplicate row key {0}")]
    DuplicateRowKey(RowKey),

    /// A column does not have one value per row.
    #[error("Column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// The metadata table no longer exposes the same columns as the data table.
    #[error("Metadata out of sync with data: {0}")]
    MetadataMisaligned(String),

    /// A rule description is malformed or conflicts with another rule.
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

fn format_diffs(diffs: &[CellDiff]) -> String {
    diffs
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for harmonise operations.
pub type Result<T> = std::result::Result<T, HarmoniseError>;
