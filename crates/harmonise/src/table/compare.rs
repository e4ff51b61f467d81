//! Cell-by-cell table comparison.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::config::CompareConfig;
use crate::error::{HarmoniseError, Result};

use super::frame::{DataTable, RowKey};
use super::value::Value;

/// A cell whose value differs between two tables.
#[derive(Debug, Clone, Serialize)]
pub struct CellDiff {
    pub column: String,
    pub row: RowKey,
    pub left: Value,
    pub right: Value,
}

impl fmt::Display for CellDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' row {}: {} != {}",
            self.column, self.row, self.left, self.right
        )?;
        if self.left.kind() != self.right.kind() {
            write!(f, " ({} vs {})", self.left.kind(), self.right.kind())?;
        }
        Ok(())
    }
}

/// Set of cells excluded from a comparison.
///
/// Cells are addressed by column position and row position in the table the
/// mask was built for.
#[derive(Debug, Clone, Default)]
pub struct CellMask {
    cells: HashSet<(usize, usize)>,
}

impl CellMask {
    /// Create an empty mask.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the cross product of `columns` and `rows` in `table`.
    ///
    /// Columns or rows absent from `table` are skipped. Returns the number
    /// of newly marked cells.
    pub fn mark<S: AsRef<str>>(&mut self, table: &DataTable, columns: &[S], rows: &[RowKey]) -> usize {
        let column_positions: Vec<usize> = columns
            .iter()
            .filter_map(|c| {
                let c: &str = c.as_ref();
                table.column_names().position(|name| name == c)
            })
            .collect();

        let mut added = 0;
        for row in rows {
            let Some(row_pos) = table.row_position(row) else {
                continue;
            };
            for &col_pos in &column_positions {
                if self.cells.insert((col_pos, row_pos)) {
                    added += 1;
                }
            }
        }
        added
    }

    /// Whether a cell is masked.
    pub fn contains(&self, column: usize, row: usize) -> bool {
        self.cells.contains(&(column, row))
    }

    /// Number of masked cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell is masked.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Fail unless two tables have the same shape, labels, index, and values.
pub fn assert_tables_equal(left: &DataTable, right: &DataTable, config: &CompareConfig) -> Result<()> {
    compare_tables(left, right, None, config)
}

/// Like [`assert_tables_equal`], ignoring the cells in `mask`.
///
/// The mask must have been built against `left`.
pub fn assert_tables_equal_masked(
    left: &DataTable,
    right: &DataTable,
    mask: &CellMask,
    config: &CompareConfig,
) -> Result<()> {
    compare_tables(left, right, Some(mask), config)
}

fn compare_tables(
    left: &DataTable,
    right: &DataTable,
    mask: Option<&CellMask>,
    config: &CompareConfig,
) -> Result<()> {
    if left.height() != right.height() || left.width() != right.width() {
        return Err(HarmoniseError::FrameMismatch(format!(
            "shape ({}, {}) != ({}, {})",
            left.height(),
            left.width(),
            right.height(),
            right.width()
        )));
    }

    compare_labels(left, right, config)?;

    if let Some(pos) = left
        .index()
        .iter()
        .zip(right.index())
        .position(|(l, r)| l != r)
    {
        return Err(HarmoniseError::FrameMismatch(format!(
            "row index differs at position {}: {} != {}",
            pos,
            left.index()[pos],
            right.index()[pos]
        )));
    }

    let mut total = 0;
    let mut sample = Vec::new();

    for (col_pos, (name, left_values)) in left.columns().enumerate() {
        // Labels were checked above, so the column exists on both sides.
        let Some(right_values) = right.column(name) else {
            return Err(HarmoniseError::UnknownColumn(name.to_string()));
        };

        for (row_pos, (l, r)) in left_values.iter().zip(right_values).enumerate() {
            if mask.is_some_and(|m| m.contains(col_pos, row_pos)) {
                continue;
            }
            let equal = if config.check_dtype {
                l == r
            } else {
                l.numeric_eq(r)
            };
            if !equal {
                total += 1;
                if sample.len() < config.max_reported_mismatches {
                    sample.push(CellDiff {
                        column: name.to_string(),
                        row: left.index()[row_pos].clone(),
                        left: l.clone(),
                        right: r.clone(),
                    });
                }
            }
        }
    }

    if total > 0 {
        return Err(HarmoniseError::CellsDiffer { total, sample });
    }
    Ok(())
}

fn compare_labels(left: &DataTable, right: &DataTable, config: &CompareConfig) -> Result<()> {
    if config.check_column_order {
        if let Some((l, r)) = left
            .column_names()
            .zip(right.column_names())
            .find(|(l, r)| l != r)
        {
            return Err(HarmoniseError::FrameMismatch(format!(
                "column labels differ: '{}' != '{}'",
                l, r
            )));
        }
        return Ok(());
    }

    let right_names: HashSet<&str> = right.column_names().collect();
    let unmatched: Vec<&str> = left
        .column_names()
        .filter(|name| !right_names.contains(name))
        .collect();
    if !unmatched.is_empty() {
        return Err(HarmoniseError::FrameMismatch(format!(
            "columns only in left table: {}",
            unmatched.join(", ")
        )));
    }
    Ok(())
}
