//! Create rules: derive a new column from an existing one.

use serde::{Deserialize, Serialize};

use crate::error::{HarmoniseError, Result};
use crate::table::Value;

use super::condition::ConditionalValue;

/// Declarative description of a derived column.
///
/// Each row of `target_col` takes the value of the first condition that
/// matches the row's `condition_col` cell, or `default` when none match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CreateRuleFields")]
pub struct CreateRule {
    target_col: String,
    condition_col: String,
    conditions: Vec<ConditionalValue>,
    default: Value,
}

#[derive(Deserialize)]
struct CreateRuleFields {
    target_col: String,
    condition_col: String,
    conditions: Vec<ConditionalValue>,
    #[serde(default)]
    default: Value,
}

impl TryFrom<CreateRuleFields> for CreateRule {
    type Error = HarmoniseError;

    fn try_from(fields: CreateRuleFields) -> Result<Self> {
        CreateRule::new(fields.target_col, fields.condition_col, fields.conditions)
            .map(|rule| rule.with_default(fields.default))
    }
}

impl CreateRule {
    /// Create a rule with a `Missing` default.
    ///
    /// Fails if either column name is blank, the names are equal, or there
    /// are no conditions.
    pub fn new(
        target_col: impl Into<String>,
        condition_col: impl Into<String>,
        conditions: Vec<ConditionalValue>,
    ) -> Result<Self> {
        let target_col = target_col.into();
        let condition_col = condition_col.into();

        if target_col.trim().is_empty() {
            return Err(HarmoniseError::InvalidRule(
                "create rule has an empty target_col".to_string(),
            ));
        }
        if condition_col.trim().is_empty() {
            return Err(HarmoniseError::InvalidRule(format!(
                "create rule for '{}' has an empty condition_col",
                target_col
            )));
        }
        if target_col == condition_col {
            return Err(HarmoniseError::InvalidRule(format!(
                "create rule for '{}' uses itself as condition_col",
                target_col
            )));
        }
        if conditions.is_empty() {
            return Err(HarmoniseError::InvalidRule(format!(
                "create rule for '{}' has no conditions",
                target_col
            )));
        }

        Ok(Self {
            target_col,
            condition_col,
            conditions,
            default: Value::Missing,
        })
    }

    /// Value used for rows no condition matches.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    /// Name of the column to create.
    pub fn target_col(&self) -> &str {
        &self.target_col
    }

    /// Name of the column the conditions are evaluated against.
    pub fn condition_col(&self) -> &str {
        &self.condition_col
    }

    /// Conditions, in priority order.
    pub fn conditions(&self) -> &[ConditionalValue] {
        &self.conditions
    }

    /// Value used for rows no condition matches.
    pub fn default_value(&self) -> &Value {
        &self.default
    }
}
