//! Tabular data model: cell values, labeled tables, and table comparison.

mod compare;
mod frame;
mod value;

pub use compare::{CellDiff, CellMask, assert_tables_equal, assert_tables_equal_masked};
pub use frame::{DataTable, RowKey};
pub use value::Value;
