//! Re-derivation check for created columns.

use tracing::debug;

use crate::error::{HarmoniseError, Result};
use crate::rules::{ChangeRecord, CreateRule};
use crate::table::{CellMask, DataTable};
use crate::transform::apply_conditions;

/// Check that each created column holds exactly what its rule derives.
///
/// The condition column is read from `original` when it exists there, and
/// from `updated` otherwise. Both tables must share the same row index.
/// Cells targeted by `changes` were recoded after derivation and are skipped;
/// [`verify_changes`](super::verify_changes) checks those.
pub fn verify_created_columns(
    updated: &DataTable,
    original: &DataTable,
    create: &[CreateRule],
    changes: &[ChangeRecord],
) -> Result<()> {
    if !create.is_empty() && updated.index() != original.index() {
        return Err(HarmoniseError::FrameMismatch(
            "row index of updated data differs from original".to_string(),
        ));
    }

    let mut recoded = CellMask::new();
    for record in changes {
        recoded.mark(updated, record.columns(), record.idx());
    }

    for rule in create {
        let actual = updated
            .column(rule.target_col())
            .ok_or_else(|| HarmoniseError::UnknownColumn(rule.target_col().to_string()))?;

        let source = if original.has_column(rule.condition_col()) {
            original
        } else {
            updated
        };
        let expected = apply_conditions(
            source,
            rule.condition_col(),
            rule.conditions(),
            rule.default_value().clone(),
        )?;

        let col_pos = updated
            .column_names()
            .position(|name| name == rule.target_col())
            .unwrap_or_default();
        if let Some(pos) = expected
            .iter()
            .zip(actual)
            .enumerate()
            .position(|(row_pos, (e, a))| e != a && !recoded.contains(col_pos, row_pos))
        {
            return Err(HarmoniseError::ValueMismatch {
                column: rule.target_col().to_string(),
                row: updated.index()[pos].clone(),
                expected: expected[pos].clone(),
                actual: actual[pos].clone(),
            });
        }
        debug!(column = rule.target_col(), "created column verified");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Condition, ConditionalValue};
    use crate::table::{RowKey, Value};

    fn rule() -> CreateRule {
        CreateRule::new(
            "age_group",
            "age",
            vec![
                ConditionalValue::new(Condition::Range { min: None, max: Some(18.0) }, "minor"),
                ConditionalValue::new(Condition::Range { min: Some(18.0), max: None }, "adult"),
            ],
        )
        .unwrap()
    }

    fn original() -> DataTable {
        DataTable::from_columns(
            RowKey::range(2),
            [("age", vec![Value::Int(10), Value::Int(25)])],
        )
        .unwrap()
    }

    #[test]
    fn test_matching_column_passes() {
        let mut updated = original();
        updated
            .insert_column("age_group", vec!["minor".into(), "adult".into()])
            .unwrap();
        assert!(verify_created_columns(&updated, &original(), &[rule()], &[]).is_ok());
    }

    #[test]
    fn test_reads_original_condition_column() {
        let mut updated = original();
        updated.set(&RowKey::Int(0), "age", Value::Int(30)).unwrap();
        updated
            .insert_column("age_group", vec!["minor".into(), "adult".into()])
            .unwrap();
        assert!(verify_created_columns(&updated, &original(), &[rule()], &[]).is_ok());
    }

    #[test]
    fn test_wrong_value_reported() {
        let mut updated = original();
        updated
            .insert_column("age_group", vec!["adult".into(), "adult".into()])
            .unwrap();
        let err = verify_created_columns(&updated, &original(), &[rule()], &[]).unwrap_err();
        assert!(matches!(
            err,
            HarmoniseError::ValueMismatch { ref row, .. } if *row == RowKey::Int(0)
        ));
    }

    #[test]
    fn test_recoded_cells_are_skipped() {
        let mut updated = original();
        updated
            .insert_column("age_group", vec!["minor".into(), "unknown".into()])
            .unwrap();
        let recode = ChangeRecord::new(vec!["age_group"], vec![1], "unknown").unwrap();
        assert!(verify_created_columns(&updated, &original(), &[rule()], &[recode]).is_ok());

        let elsewhere = ChangeRecord::new(vec!["age_group"], vec![0], "minor").unwrap();
        let err = verify_created_columns(&updated, &original(), &[rule()], &[elsewhere]).unwrap_err();
        assert!(matches!(
            err,
            HarmoniseError::ValueMismatch { ref row, .. } if *row == RowKey::Int(1)
        ));
    }

    #[test]
    fn test_missing_target() {
        let err = verify_created_columns(&original(), &original(), &[rule()], &[]).unwrap_err();
        assert!(matches!(err, HarmoniseError::UnknownColumn(ref c) if c == "age_group"));
    }
}
