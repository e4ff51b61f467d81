//! Checks that declared cell changes are present in the updated data.

use tracing::debug;

use crate::error::{HarmoniseError, Result};
use crate::rules::ChangeRecord;
use crate::table::{DataTable, RowKey, Value};

/// Check that every cell of `columns` × `row_ids` holds `value`.
///
/// Integers and floats compare numerically without tolerance; `Missing`
/// matches only `Missing`. An unknown column or row is an error.
pub fn verify_change<S: AsRef<str>>(
    table: &DataTable,
    columns: &[S],
    row_ids: &[RowKey],
    value: &Value,
) -> Result<()> {
    for column in columns {
        let column: &str = column.as_ref();
        let cells = table
            .column(column)
            .ok_or_else(|| HarmoniseError::UnknownColumn(column.to_string()))?;

        for row in row_ids {
            let pos = table
                .row_position(row)
                .ok_or_else(|| HarmoniseError::UnknownRow(row.clone()))?;
            let actual = &cells[pos];
            if !actual.numeric_eq(value) {
                return Err(HarmoniseError::ValueMismatch {
                    column: column.to_string(),
                    row: row.clone(),
                    expected: value.clone(),
                    actual: actual.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Check every change record, in order. Stops at the first failure.
pub fn verify_changes(table: &DataTable, changes: &[ChangeRecord]) -> Result<()> {
    for record in changes {
        verify_change(table, record.columns(), record.idx(), record.value())?;
    }
    debug!(records = changes.len(), "declared changes verified");
    Ok(())
}

/// Columns referenced by any change record, without duplicates, in first-seen order.
pub fn columns_with_data_changed(changes: &[ChangeRecord]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for column in changes.iter().flat_map(ChangeRecord::columns) {
        if !columns.contains(column) {
            columns.push(column.clone());
        }
    }
    columns
}
