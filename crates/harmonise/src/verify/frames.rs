//! Whole-table comparisons that catch undeclared changes.

use indexmap::IndexMap;
use tracing::debug;

use crate::config::CompareConfig;
use crate::error::Result;
use crate::rules::{ChangeRecord, CreateRule};
use crate::table::{CellMask, DataTable, assert_tables_equal, assert_tables_equal_masked};
use crate::transform::reformat_create;

use super::changes::columns_with_data_changed;

/// `updated` without the columns the create rules introduced.
pub fn filter_updated_for_comparison(updated: &DataTable, create: &[CreateRule]) -> DataTable {
    updated.without_columns(&reformat_create(create))
}

/// `original` without deleted columns and with the rest renamed, so that its
/// column names line up with the filtered updated table.
pub fn filter_original_for_comparison<S: AsRef<str>>(
    original: &DataTable,
    rename: &IndexMap<String, String>,
    delete: &[S],
) -> Result<DataTable> {
    original.without_columns(delete).renamed(rename)
}

/// Fail unless two tables are identical in shape, labels, index, and values.
pub fn verify_data_eq(a: &DataTable, b: &DataTable, config: &CompareConfig) -> Result<()> {
    assert_tables_equal(a, b, config)
}

/// Fail if any column no change record mentions differs between the tables.
///
/// Columns named by change records are dropped from both sides before the
/// comparison. With no change records this is plain table equality.
pub fn verify_data_unchanged_for_unchanged_columns(
    updated: &DataTable,
    original: &DataTable,
    changes: &[ChangeRecord],
    config: &CompareConfig,
) -> Result<()> {
    let changed = columns_with_data_changed(changes);
    assert_tables_equal(
        &updated.without_columns(&changed),
        &original.without_columns(&changed),
        config,
    )?;
    debug!(excluded = changed.len(), "unchanged columns verified");
    Ok(())
}

/// Fail if any cell outside the declared change targets differs.
///
/// Cells in the cross product of each record's columns and rows are masked;
/// everything else must match.
pub fn verify_data_unchanged_for_changed_columns(
    updated: &DataTable,
    original: &DataTable,
    changes: &[ChangeRecord],
    config: &CompareConfig,
) -> Result<()> {
    let mut mask = CellMask::new();
    for record in changes {
        mask.mark(updated, record.columns(), record.idx());
    }
    assert_tables_equal_masked(updated, original, &mask, config)?;
    debug!(masked = mask.len(), "untargeted cells verified");
    Ok(())
}
