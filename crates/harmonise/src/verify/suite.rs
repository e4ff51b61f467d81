//! The full verification suite.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::HarmoniseConfig;
use crate::error::Result;
use crate::rules::{ChangeRecord, HarmonisationPlan};
use crate::table::DataTable;

use super::changes::verify_changes;
use super::columns::verify_columns;
use super::created::verify_created_columns;
use super::frames::{
    filter_original_for_comparison, filter_updated_for_comparison,
    verify_data_unchanged_for_changed_columns, verify_data_unchanged_for_unchanged_columns,
};

/// A check performed by [`run_full_test_suite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteCheck {
    Columns,
    DeclaredChanges,
    UnchangedColumns,
    ChangedColumns,
    CreatedColumns,
}

impl SuiteCheck {
    /// Short label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            SuiteCheck::Columns => "column sets",
            SuiteCheck::DeclaredChanges => "declared changes",
            SuiteCheck::UnchangedColumns => "unchanged columns",
            SuiteCheck::ChangedColumns => "untargeted cells in changed columns",
            SuiteCheck::CreatedColumns => "created columns",
        }
    }
}

/// Summary of a passing verification run.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// Checks that passed, in the order they ran.
    pub checks: Vec<SuiteCheck>,
    /// Columns the plan declared as added.
    pub columns_added: Vec<String>,
    /// Columns the plan declared as removed.
    pub columns_removed: Vec<String>,
    /// Number of declared change cells that were checked.
    pub cells_verified: usize,
}

/// Verify an updated table against its original under a harmonisation plan.
///
/// Runs, in order:
///
/// 1. builds comparable views of both tables (created columns dropped from
///    `updated`; deleted columns dropped from and renames applied to
///    `original`);
/// 2. works out the added and removed column names;
/// 3. checks column sets on the unfiltered tables;
/// 4. checks the declared changes on the unfiltered updated table;
/// 5. compares the columns no change record touches;
/// 6. compares every cell of the views outside the change targets;
/// 7. if enabled in `config`, re-derives each created column.
///
/// The first failing check ends the run with its error.
pub fn run_full_test_suite(
    updated: &DataTable,
    original: &DataTable,
    plan: &HarmonisationPlan,
    config: &HarmoniseConfig,
) -> Result<SuiteReport> {
    let updated_view = filter_updated_for_comparison(updated, &plan.create);
    let original_view = filter_original_for_comparison(original, &plan.rename, &plan.delete)?;

    let columns = plan.column_changes();
    let mut checks = Vec::with_capacity(5);

    verify_columns(updated, original, &columns.added, &columns.removed)?;
    passed(&mut checks, SuiteCheck::Columns);

    verify_changes(updated, &plan.changes)?;
    passed(&mut checks, SuiteCheck::DeclaredChanges);

    verify_data_unchanged_for_unchanged_columns(
        &updated_view,
        &original_view,
        &plan.changes,
        &config.compare,
    )?;
    passed(&mut checks, SuiteCheck::UnchangedColumns);

    verify_data_unchanged_for_changed_columns(
        &updated_view,
        &original_view,
        &plan.changes,
        &config.compare,
    )?;
    passed(&mut checks, SuiteCheck::ChangedColumns);

    if config.verify_created_columns {
        verify_created_columns(updated, original, &plan.create, &plan.changes)?;
        passed(&mut checks, SuiteCheck::CreatedColumns);
    } else {
        debug!("created column re-derivation skipped");
    }

    let report = SuiteReport {
        checks,
        columns_added: columns.added,
        columns_removed: columns.removed,
        cells_verified: plan.changes.iter().map(ChangeRecord::cell_count).sum(),
    };
    info!(
        checks = report.checks.len(),
        cells = report.cells_verified,
        "All harmonisation checks passed"
    );
    Ok(report)
}

fn passed(checks: &mut Vec<SuiteCheck>, check: SuiteCheck) {
    debug!(check = check.label(), "check passed");
    checks.push(check);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarmoniseError;
    use crate::table::{RowKey, Value};

    fn original() -> DataTable {
        DataTable::from_columns(
            RowKey::range(2),
            [
                ("age", vec![Value::Int(10), Value::Int(98)]),
                ("sex", vec!["F".into(), "M".into()]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_identity_passes() {
        let report = run_full_test_suite(
            &original(),
            &original(),
            &HarmonisationPlan::new(),
            &HarmoniseConfig::default(),
        )
        .unwrap();
        assert_eq!(
            report.checks,
            vec![
                SuiteCheck::Columns,
                SuiteCheck::DeclaredChanges,
                SuiteCheck::UnchangedColumns,
                SuiteCheck::ChangedColumns,
            ]
        );
        assert_eq!(report.cells_verified, 0);
    }

    #[test]
    fn test_rename_and_recode() {
        let mut updated = original();
        updated
            .rename_columns(&[("sex".to_string(), "gender".to_string())].into_iter().collect())
            .unwrap();
        updated.set(&RowKey::Int(1), "age", Value::Int(99)).unwrap();

        let plan = HarmonisationPlan::new()
            .with_rename("sex", "gender")
            .with_change(ChangeRecord::new(vec!["age"], vec![1], 99).unwrap());

        let report = run_full_test_suite(&updated, &original(), &plan, &HarmoniseConfig::default()).unwrap();
        assert_eq!(report.columns_added, vec!["gender"]);
        assert_eq!(report.columns_removed, vec!["sex"]);
        assert_eq!(report.cells_verified, 1);
    }

    #[test]
    fn test_undeclared_rename_stops_at_columns() {
        let mut updated = original();
        updated
            .rename_columns(&[("sex".to_string(), "gender".to_string())].into_iter().collect())
            .unwrap();

        let err = run_full_test_suite(
            &updated,
            &original(),
            &HarmonisationPlan::new(),
            &HarmoniseConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, HarmoniseError::ColumnSet { .. }));
    }

    #[test]
    fn test_check_labels() {
        assert_eq!(SuiteCheck::Columns.label(), "column sets");
        assert_eq!(SuiteCheck::CreatedColumns.label(), "created columns");
    }
}
