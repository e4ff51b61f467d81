//! Verification that an updated table differs from its original only as declared.
//!
//! Every check is fail-fast: it returns the first violation it finds as an
//! error and never aggregates or recovers.

mod changes;
mod columns;
mod created;
mod frames;
mod suite;

pub use changes::{columns_with_data_changed, verify_change, verify_changes};
pub use columns::{ColumnCheck, verify_columns};
pub use created::verify_created_columns;
pub use frames::{
    filter_original_for_comparison, filter_updated_for_comparison, verify_data_eq,
    verify_data_unchanged_for_changed_columns, verify_data_unchanged_for_unchanged_columns,
};
pub use suite::{SuiteCheck, SuiteReport, run_full_test_suite};
