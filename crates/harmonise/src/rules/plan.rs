//! A complete set of rule descriptions for one harmonisation pass.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{HarmoniseError, Result};
use crate::transform::{ColumnChanges, reformat_create, reformat_crud};

use super::change::ChangeRecord;
use super::create::CreateRule;

/// Create, rename, delete, and change rules supplied together.
///
/// The same plan drives the transform and the verification suite.
///
/// # Example
///
/// ```
/// use harmonise::HarmonisationPlan;
///
/// let plan = HarmonisationPlan::from_json(r#"{
///     "rename": {"sex": "gender"},
///     "delete": ["tmp_flag"],
///     "changes": [{"columns": ["age"], "idx": [0], "value": 99}]
/// }"#).unwrap();
///
/// let columns = plan.column_changes();
/// assert_eq!(columns.added, vec!["gender"]);
/// assert_eq!(columns.removed, vec!["tmp_flag", "sex"]);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HarmonisationPlan {
    /// Derived columns to create.
    pub create: Vec<CreateRule>,
    /// Old column name to new column name.
    pub rename: IndexMap<String, String>,
    /// Columns to delete.
    pub delete: Vec<String>,
    /// Explicit cell-level recodes.
    pub changes: Vec<ChangeRecord>,
}

impl HarmonisationPlan {
    /// Create an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a create rule.
    pub fn with_create(mut self, rule: CreateRule) -> Self {
        self.create.push(rule);
        self
    }

    /// Add a rename pair.
    pub fn with_rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rename.insert(from.into(), to.into());
        self
    }

    /// Add a column to delete.
    pub fn with_delete(mut self, column: impl Into<String>) -> Self {
        self.delete.push(column.into());
        self
    }

    /// Add a change record.
    pub fn with_change(mut self, change: ChangeRecord) -> Self {
        self.changes.push(change);
        self
    }

    /// Parse and validate a plan from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let plan: HarmonisationPlan = serde_json::from_str(json)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Serialize the plan as pretty-printed JSON.
    ///
    /// Fails if a create rule uses a [`Condition::Predicate`](super::Condition::Predicate).
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Names of the columns the create rules introduce.
    pub fn created_columns(&self) -> Vec<String> {
        reformat_create(&self.create)
    }

    /// Columns the plan adds and removes.
    pub fn column_changes(&self) -> ColumnChanges {
        reformat_crud(&self.create, &self.rename, &self.delete)
    }

    /// Check that the rules do not contradict each other.
    ///
    /// Rejects duplicate create targets, duplicate rename targets, blank or
    /// identity renames, rename chains and swaps, a column both created and
    /// renamed into, deleting a column the plan itself introduces or renames
    /// away, and change records on columns that are deleted or renamed away.
    pub fn validate(&self) -> Result<()> {
        let mut introduced: HashSet<&str> = HashSet::new();

        for rule in &self.create {
            if !introduced.insert(rule.target_col()) {
                return Err(HarmoniseError::InvalidRule(format!(
                    "column '{}' is created more than once",
                    rule.target_col()
                )));
            }
        }

        for (from, to) in &self.rename {
            if from.trim().is_empty() || to.trim().is_empty() {
                return Err(HarmoniseError::InvalidRule(format!(
                    "blank name in rename '{}' -> '{}'",
                    from, to
                )));
            }
            if from == to {
                return Err(HarmoniseError::InvalidRule(format!(
                    "column '{}' is renamed to itself",
                    from
                )));
            }
            if !introduced.insert(to.as_str()) {
                return Err(HarmoniseError::InvalidRule(format!(
                    "column '{}' is introduced more than once",
                    to
                )));
            }
            if self.rename.contains_key(to) {
                return Err(HarmoniseError::InvalidRule(format!(
                    "rename '{}' -> '{}' targets a column that is itself renamed",
                    from, to
                )));
            }
        }

        let mut deleted = HashSet::new();
        for column in &self.delete {
            if introduced.contains(column.as_str()) {
                return Err(HarmoniseError::InvalidRule(format!(
                    "column '{}' is both introduced and deleted",
                    column
                )));
            }
            if self.rename.contains_key(column) {
                return Err(HarmoniseError::InvalidRule(format!(
                    "column '{}' is both renamed and deleted",
                    column
                )));
            }
            if !deleted.insert(column.as_str()) {
                return Err(HarmoniseError::InvalidRule(format!(
                    "column '{}' is deleted more than once",
                    column
                )));
            }
        }

        for change in &self.changes {
            for column in change.columns() {
                if deleted.contains(column.as_str()) {
                    return Err(HarmoniseError::InvalidRule(format!(
                        "change record targets column '{}', which is deleted",
                        column
                    )));
                }
                if self.rename.contains_key(column) {
                    return Err(HarmoniseError::InvalidRule(format!(
                        "change record targets column '{}', which is renamed away",
                        column
                    )));
                }
            }
        }

        Ok(())
    }
}
