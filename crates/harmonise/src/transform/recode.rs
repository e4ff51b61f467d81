//! Cell-level recodes driven by change records.

use crate::error::{HarmoniseError, Result};
use crate::rules::ChangeRecord;
use crate::table::DataTable;

use super::operations::RowAudit;

/// Write each record's value into its cells, returning one audit per cell.
///
/// Every referenced column and row is checked before anything is written,
/// so an unknown column or row leaves the table unchanged. Records are
/// applied in order; a later record overwrites an earlier one on shared cells.
pub fn recode_values(table: &mut DataTable, records: &[ChangeRecord]) -> Result<Vec<RowAudit>> {
    for record in records {
        for column in record.columns() {
            if !table.has_column(column) {
                return Err(HarmoniseError::UnknownColumn(column.clone()));
            }
        }
        for row in record.idx() {
            if table.row_position(row).is_none() {
                return Err(HarmoniseError::UnknownRow(row.clone()));
            }
        }
    }

    let mut audits = Vec::with_capacity(records.iter().map(ChangeRecord::cell_count).sum());
    for record in records {
        for column in record.columns() {
            for row in record.idx() {
                let original_value = table.set(row, column, record.value().clone())?;
                audits.push(RowAudit {
                    row: row.clone(),
                    column: column.clone(),
                    original_value,
                    new_value: record.value().clone(),
                });
            }
        }
    }
    Ok(audits)
}
