//! Column-level create, rename, and delete on a data table and its metadata.
//!
//! Each operation touches the data table and the metadata table together and
//! checks its postcondition on both before returning. Preconditions are
//! checked up front, so a failing call leaves both tables as they were.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HarmoniseError, Result};
use crate::rules::CreateRule;
use crate::table::{DataTable, Value};

use super::conditions::apply_conditions;

/// Columns added and removed by a set of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnChanges {
    /// Create targets followed by rename targets.
    pub added: Vec<String>,
    /// Deleted columns followed by rename sources.
    pub removed: Vec<String>,
}

/// Check that the metadata exposes exactly the data table's columns.
pub fn ensure_metadata_aligned(table: &DataTable, metadata: &DataTable) -> Result<()> {
    let data_names: HashSet<&str> = table.column_names().collect();
    let meta_names: HashSet<&str> = metadata.column_names().collect();

    let mut only_data: Vec<&str> = data_names.difference(&meta_names).copied().collect();
    let mut only_meta: Vec<&str> = meta_names.difference(&data_names).copied().collect();
    if only_data.is_empty() && only_meta.is_empty() {
        return Ok(());
    }

    only_data.sort_unstable();
    only_meta.sort_unstable();
    Err(HarmoniseError::MetadataMisaligned(format!(
        "only in data: [{}]; only in metadata: [{}]",
        only_data.join(", "),
        only_meta.join(", ")
    )))
}

/// Derive new columns from create rules and append them in one batch.
///
/// Every rule is evaluated against the table as it was on entry, so one
/// rule cannot read another rule's output. Each new column also gets a
/// metadata column filled with `Missing`, marking its metadata as still to
/// be harmonised. A target that already exists in either table, or that two
/// rules share, is an error.
pub fn create_variables_with_conditions(
    table: &mut DataTable,
    metadata: &mut DataTable,
    rules: &[CreateRule],
) -> Result<()> {
    let mut new_columns: Vec<(String, Vec<Value>)> = Vec::with_capacity(rules.len());

    for rule in rules {
        let target = rule.target_col();
        if table.has_column(target)
            || metadata.has_column(target)
            || new_columns.iter().any(|(name, _)| name == target)
        {
            return Err(HarmoniseError::DuplicateColumn(target.to_string()));
        }

        let values = apply_conditions(
            table,
            rule.condition_col(),
            rule.conditions(),
            rule.default_value().clone(),
        )?;
        debug!(
            column = target,
            source = rule.condition_col(),
            conditions = rule.conditions().len(),
            "derived column"
        );
        new_columns.push((target.to_string(), values));
    }

    let names: Vec<String> = new_columns.iter().map(|(name, _)| name.clone()).collect();
    let meta_height = metadata.height();

    table.hstack(new_columns)?;
    metadata.hstack(
        names
            .iter()
            .map(|name| (name.clone(), vec![Value::Missing; meta_height]))
            .collect(),
    )?;

    assert_present("create_variables_with_conditions", &names, table, metadata)
}

/// Names of the columns a list of create rules introduces.
pub fn reformat_create(rules: &[CreateRule]) -> Vec<String> {
    rules.iter().map(|r| r.target_col().to_string()).collect()
}

/// Add empty (`Missing`) columns to both the data table and the metadata.
pub fn create_variables<S: AsRef<str>>(
    table: &mut DataTable,
    metadata: &mut DataTable,
    names: &[S],
) -> Result<()> {
    let names: Vec<String> = names.iter().map(|n| n.as_ref().to_string()).collect();

    let data_height = table.height();
    let meta_height = metadata.height();
    let for_data = names
        .iter()
        .map(|n| (n.clone(), vec![Value::Missing; data_height]))
        .collect();
    let for_meta = names
        .iter()
        .map(|n| (n.clone(), vec![Value::Missing; meta_height]))
        .collect();

    if let Some(existing) = names.iter().find(|n| metadata.has_column(n)) {
        return Err(HarmoniseError::DuplicateColumn(existing.clone()));
    }
    table.hstack(for_data)?;
    metadata.hstack(for_meta)?;
    debug!(columns = names.len(), "created empty columns");

    assert_present("create_variables", &names, table, metadata)
}

/// Rename columns in both the data table and the metadata.
///
/// Every old name must exist in both tables. Pairs are applied together, so
/// a swap such as `a -> b, b -> a` is allowed.
pub fn rename_variables(
    table: &mut DataTable,
    metadata: &mut DataTable,
    rename_map: &IndexMap<String, String>,
) -> Result<()> {
    for old in rename_map.keys() {
        for (label, t) in [("data", &*table), ("metadata", &*metadata)] {
            if !t.has_column(old) {
                return Err(HarmoniseError::Postcondition {
                    operation: "rename_variables",
                    message: format!("cannot rename '{}': not a column of the {} table", old, label),
                });
            }
        }
    }
    table.validate_rename(rename_map)?;
    metadata.validate_rename(rename_map)?;

    table.rename_columns(rename_map)?;
    metadata.rename_columns(rename_map)?;
    debug!(pairs = rename_map.len(), "renamed columns");

    let targets: HashSet<&str> = rename_map.values().map(String::as_str).collect();
    for (old, new) in rename_map {
        for (label, t) in [("data", &*table), ("metadata", &*metadata)] {
            if !targets.contains(old.as_str()) && t.has_column(old) {
                return Err(HarmoniseError::Postcondition {
                    operation: "rename_variables",
                    message: format!("'{}' is still a column of the {} table", old, label),
                });
            }
            if !t.has_column(new) {
                return Err(HarmoniseError::Postcondition {
                    operation: "rename_variables",
                    message: format!("'{}' is not a column of the {} table", new, label),
                });
            }
        }
    }
    Ok(())
}

/// Drop columns from both the data table and the metadata.
pub fn delete_variables<S: AsRef<str>>(
    table: &mut DataTable,
    metadata: &mut DataTable,
    names: &[S],
) -> Result<()> {
    for name in names {
        let name: &str = name.as_ref();
        if !metadata.has_column(name) {
            return Err(HarmoniseError::UnknownColumn(name.to_string()));
        }
    }
    table.drop_columns(names)?;
    metadata.drop_columns(names)?;
    debug!(columns = names.len(), "deleted columns");

    for name in names {
        let name: &str = name.as_ref();
        for (label, t) in [("data", &*table), ("metadata", &*metadata)] {
            if t.has_column(name) {
                return Err(HarmoniseError::Postcondition {
                    operation: "delete_variables",
                    message: format!("'{}' is still a column of the {} table", name, label),
                });
            }
        }
    }
    Ok(())
}

/// Columns a set of rules adds and removes.
///
/// `added` is the create targets followed by the rename targets; `removed`
/// is the delete list followed by the rename sources.
pub fn reformat_crud<S: AsRef<str>>(
    create: &[CreateRule],
    rename: &IndexMap<String, String>,
    delete: &[S],
) -> ColumnChanges {
    let mut added = reformat_create(create);
    added.extend(rename.values().cloned());

    let mut removed: Vec<String> = delete.iter().map(|d| d.as_ref().to_string()).collect();
    removed.extend(rename.keys().cloned());

    ColumnChanges { added, removed }
}

fn assert_present(
    operation: &'static str,
    names: &[String],
    table: &DataTable,
    metadata: &DataTable,
) -> Result<()> {
    for name in names {
        for (label, t) in [("data", table), ("metadata", metadata)] {
            if !t.has_column(name) {
                return Err(HarmoniseError::Postcondition {
                    operation,
                    message: format!("'{}' is not a column of the {} table", name, label),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Condition, ConditionalValue};
    use crate::table::RowKey;

    fn cohort() -> (DataTable, DataTable) {
        let table = DataTable::from_columns(
            RowKey::range(2),
            [
                ("age", vec![Value::Int(10), Value::Int(25)]),
                ("sex", vec![Value::from("F"), Value::from("M")]),
            ],
        )
        .unwrap();
        let metadata = DataTable::from_columns(
            vec![RowKey::from("label")],
            [
                ("age", vec![Value::from("Age at visit")]),
                ("sex", vec![Value::from("Sex")]),
            ],
        )
        .unwrap();
        (table, metadata)
    }

    fn age_group() -> CreateRule {
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

    #[test]
    fn test_create_with_conditions() {
        let (mut table, mut metadata) = cohort();
        create_variables_with_conditions(&mut table, &mut metadata, &[age_group()]).unwrap();

        assert_eq!(table.column_name_list(), vec!["age", "sex", "age_group"]);
        assert_eq!(
            table.column("age_group").unwrap(),
            [Value::from("minor"), Value::from("adult")]
        );
        assert_eq!(metadata.column("age_group").unwrap(), [Value::Missing]);
    }

    #[test]
    fn test_create_collision_is_an_error() {
        let (mut table, mut metadata) = cohort();
        let clash = CreateRule::new(
            "sex",
            "age",
            vec![ConditionalValue::new(Condition::equals(10), "x")],
        )
        .unwrap();

        let err = create_variables_with_conditions(&mut table, &mut metadata, &[age_group(), clash])
            .unwrap_err();
        assert!(matches!(err, HarmoniseError::DuplicateColumn(ref c) if c == "sex"));
        assert_eq!(table.width(), 2);
        assert_eq!(metadata.width(), 2);
    }

    #[test]
    fn test_create_and_delete_round_trip() {
        let (mut table, mut metadata) = cohort();
        create_variables(&mut table, &mut metadata, &["bmi", "height"]).unwrap();
        assert_eq!(table.column("bmi").unwrap(), [Value::Missing, Value::Missing]);
        assert!(metadata.has_column("height"));

        delete_variables(&mut table, &mut metadata, &["bmi", "height"]).unwrap();
        assert_eq!(table.column_name_list(), vec!["age", "sex"]);
        assert_eq!(metadata.column_name_list(), vec!["age", "sex"]);
    }

    #[test]
    fn test_rename_both_tables() {
        let (mut table, mut metadata) = cohort();
        let map: IndexMap<String, String> =
            [("sex".to_string(), "gender".to_string())].into_iter().collect();
        rename_variables(&mut table, &mut metadata, &map).unwrap();

        assert_eq!(table.column_name_list(), vec!["age", "gender"]);
        assert_eq!(metadata.column_name_list(), vec!["age", "gender"]);
    }

    #[test]
    fn test_rename_swap() {
        let (mut table, mut metadata) = cohort();
        let map: IndexMap<String, String> = [
            ("sex".to_string(), "age".to_string()),
            ("age".to_string(), "sex".to_string()),
        ]
        .into_iter()
        .collect();
        rename_variables(&mut table, &mut metadata, &map).unwrap();
        assert_eq!(table.column_name_list(), vec!["sex", "age"]);
        assert_eq!(table.get(&RowKey::Int(0), "age"), Some(&Value::from("F")));
    }

    #[test]
    fn test_rename_missing_column_leaves_tables_untouched() {
        let (mut table, mut metadata) = cohort();
        metadata.drop_columns(&["sex"]).unwrap();
        let map: IndexMap<String, String> =
            [("sex".to_string(), "gender".to_string())].into_iter().collect();

        let err = rename_variables(&mut table, &mut metadata, &map).unwrap_err();
        assert!(matches!(err, HarmoniseError::Postcondition { operation: "rename_variables", .. }));
        assert!(table.has_column("sex"));
    }

    #[test]
    fn test_delete_unknown_column() {
        let (mut table, mut metadata) = cohort();
        let err = delete_variables(&mut table, &mut metadata, &["bmi"]).unwrap_err();
        assert!(matches!(err, HarmoniseError::UnknownColumn(_)));
        assert_eq!(table.width(), 2);
    }

    #[test]
    fn test_reformat_crud() {
        let rename: IndexMap<String, String> =
            [("sex".to_string(), "gender".to_string())].into_iter().collect();
        let changes = reformat_crud(&[age_group()], &rename, &["tmp"]);
        assert_eq!(changes.added, vec!["age_group", "gender"]);
        assert_eq!(changes.removed, vec!["tmp", "sex"]);
    }

    #[test]
    fn test_metadata_alignment() {
        let (table, mut metadata) = cohort();
        assert!(ensure_metadata_aligned(&table, &metadata).is_ok());

        metadata.insert_missing_column("bmi").unwrap();
        let err = ensure_metadata_aligned(&table, &metadata).unwrap_err();
        assert!(err.to_string().contains("only in metadata: [bmi]"));
    }
}
