//! Conditional value mapping over a single column.

use crate::error::{HarmoniseError, Result};
use crate::rules::ConditionalValue;
use crate::table::{DataTable, Value};

/// Map every row of `condition_column` through an ordered list of conditions.
///
/// Each row gets the value of the first condition that matches its cell, or
/// `default` if none do. Later conditions that overlap an earlier one are
/// shadowed.
///
/// # Example
///
/// ```
/// use harmonise::{Condition, ConditionalValue, DataTable, RowKey, Value};
/// use harmonise::transform::apply_conditions;
///
/// let table = DataTable::from_columns(
///     RowKey::range(3),
///     [("age", vec![Value::Int(10), Value::Int(25), Value::Missing])],
/// ).unwrap();
///
/// let conditions = vec![
///     ConditionalValue::new(Condition::predicate(|v| v.as_f64().is_some_and(|x| x < 18.0)), "minor"),
///     ConditionalValue::new(Condition::predicate(|v| v.as_f64().is_some_and(|x| x >= 18.0)), "adult"),
/// ];
///
/// let groups = apply_conditions(&table, "age", &conditions, Value::Missing).unwrap();
/// assert_eq!(groups, vec!["minor".into(), "adult".into(), Value::Missing]);
/// ```
pub fn apply_conditions(
    table: &DataTable,
    condition_column: &str,
    conditions: &[ConditionalValue],
    default: Value,
) -> Result<Vec<Value>> {
    let cells = table
        .column(condition_column)
        .ok_or_else(|| HarmoniseError::UnknownColumn(condition_column.to_string()))?;

    Ok(cells
        .iter()
        .map(|cell| {
            conditions
                .iter()
                .find(|c| c.condition.evaluate(cell))
                .map_or_else(|| default.clone(), |c| c.value.clone())
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Condition;
    use crate::table::RowKey;

    fn ages(values: Vec<Value>) -> DataTable {
        DataTable::from_columns(RowKey::range(values.len()), [("age", values)]).unwrap()
    }

    #[test]
    fn test_first_match_wins() {
        let table = ages(vec![Value::Int(10), Value::Int(70)]);
        let conditions = vec![
            ConditionalValue::new(Condition::Range { min: None, max: Some(18.0) }, "minor"),
            ConditionalValue::new(Condition::Range { min: Some(0.0), max: None }, "adult"),
            ConditionalValue::new(Condition::Range { min: Some(65.0), max: None }, "senior"),
        ];
        let out = apply_conditions(&table, "age", &conditions, Value::Missing).unwrap();
        assert_eq!(out, vec![Value::from("minor"), Value::from("adult")]);
    }

    #[test]
    fn test_default_when_nothing_matches() {
        let table = ages(vec![Value::Int(1), Value::Missing]);
        let conditions = vec![ConditionalValue::new(Condition::equals(2), "two")];
        let out = apply_conditions(&table, "age", &conditions, Value::from("other")).unwrap();
        assert_eq!(out, vec![Value::from("other"), Value::from("other")]);
    }

    #[test]
    fn test_missing_can_be_mapped() {
        let table = ages(vec![Value::Int(1), Value::Missing]);
        let conditions = vec![ConditionalValue::new(Condition::Missing, -9)];
        let out = apply_conditions(&table, "age", &conditions, Value::Missing).unwrap();
        assert_eq!(out, vec![Value::Missing, Value::Int(-9)]);
    }

    #[test]
    fn test_unknown_column() {
        let table = ages(vec![Value::Int(1)]);
        let err = apply_conditions(&table, "bmi", &[], Value::Missing).unwrap_err();
        assert!(matches!(err, HarmoniseError::UnknownColumn(ref c) if c == "bmi"));
    }
}
