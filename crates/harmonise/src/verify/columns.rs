//! Column-set checks between an updated table and its original.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HarmoniseError, Result};
use crate::table::DataTable;

/// Which column-set property was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnCheck {
    /// A column declared as added is absent from the updated table.
    AddedMissing,
    /// A column declared as removed is still in the updated table.
    RemovedStillPresent,
    /// An original column that was not removed is gone from the updated table.
    UnchangedMissing,
}

impl ColumnCheck {
    /// Human-readable description of the violation.
    pub fn describe(&self) -> &'static str {
        match self {
            ColumnCheck::AddedMissing => "Added columns missing from updated data",
            ColumnCheck::RemovedStillPresent => "Removed columns still present in updated data",
            ColumnCheck::UnchangedMissing => "Unchanged columns missing from updated data",
        }
    }
}

impl fmt::Display for ColumnCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Check the updated table's columns against the declared additions and removals.
///
/// Every name in `added` must be a column of `updated`, no name in `removed`
/// may be, and every column of `original` not listed in `removed` must
/// still be present.
pub fn verify_columns<A, R>(
    updated: &DataTable,
    original: &DataTable,
    added: &[A],
    removed: &[R],
) -> Result<()>
where
    A: AsRef<str>,
    R: AsRef<str>,
{
    let missing: Vec<String> = added
        .iter()
        .map(AsRef::<str>::as_ref)
        .filter(|name| !updated.has_column(name))
        .map(str::to_string)
        .collect();
    fail_if_any(ColumnCheck::AddedMissing, missing)?;

    let present: Vec<String> = removed
        .iter()
        .map(AsRef::<str>::as_ref)
        .filter(|name| updated.has_column(name))
        .map(str::to_string)
        .collect();
    fail_if_any(ColumnCheck::RemovedStillPresent, present)?;

    let lost: Vec<String> = original
        .column_names()
        .filter(|name| !removed.iter().any(|r| AsRef::<str>::as_ref(r) == *name))
        .filter(|name| !updated.has_column(name))
        .map(str::to_string)
        .collect();
    fail_if_any(ColumnCheck::UnchangedMissing, lost)?;

    debug!(
        added = added.len(),
        removed = removed.len(),
        "column sets verified"
    );
    Ok(())
}

fn fail_if_any(check: ColumnCheck, columns: Vec<String>) -> Result<()> {
    if columns.is_empty() {
        Ok(())
    } else {
        Err(HarmoniseError::ColumnSet { check, columns })
    }
}
