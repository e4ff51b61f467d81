//! Predicates used by create rules to map existing values to new ones.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Result;
use crate::table::Value;

/// Arbitrary unary test on a cell value.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>);

impl Predicate {
    /// Wrap a function.
    pub fn new(test: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(test))
    }

    /// Run the test.
    pub fn test(&self, value: &Value) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(<fn>)")
    }
}

/// Compiled regular expression that serializes as its source string.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compile a pattern.
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self(Regex::new(pattern)?))
    }

    /// The source pattern.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether the pattern matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Regex::new(&source)
            .map(Pattern)
            .map_err(serde::de::Error::custom)
    }
}

/// Test applied to each cell of a condition column.
///
/// Everything except [`Condition::Predicate`] can be written as JSON, e.g.
/// `{"equals": 1}`, `{"range": {"min": 18}}` or `"missing"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Cell equals the literal (integers and floats compare numerically).
    Equals(Value),
    /// Cell equals any of the literals.
    OneOf(Vec<Value>),
    /// Numeric cell within `[min, max)`; a missing bound is unbounded.
    Range {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    /// Text cell matching a regular expression.
    Matches(Pattern),
    /// Cell has no value.
    Missing,
    /// Arbitrary function of the cell. Cannot be serialized.
    #[serde(skip)]
    Predicate(Predicate),
}

impl Condition {
    /// Equality test against a literal.
    pub fn equals(value: impl Into<Value>) -> Self {
        Condition::Equals(value.into())
    }

    /// Test with an arbitrary function.
    pub fn predicate(test: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Condition::Predicate(Predicate::new(test))
    }

    /// Regular-expression test on text cells.
    pub fn matches(pattern: &str) -> Result<Self> {
        Ok(Condition::Matches(Pattern::new(pattern)?))
    }

    /// Evaluate the condition against one cell.
    pub fn evaluate(&self, value: &Value) -> bool {
        match self {
            Condition::Equals(expected) => value.numeric_eq(expected),
            Condition::OneOf(options) => options.iter().any(|o| value.numeric_eq(o)),
            Condition::Range { min, max } => value.as_f64().is_some_and(|x| {
                min.is_none_or(|lo| x >= lo) && max.is_none_or(|hi| x < hi)
            }),
            Condition::Matches(pattern) => value.as_str().is_some_and(|s| pattern.is_match(s)),
            Condition::Missing => value.is_missing(),
            Condition::Predicate(predicate) => predicate.test(value),
        }
    }
}

/// A condition and the value produced when it is the first to match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionalValue {
    pub condition: Condition,
    pub value: Value,
}

impl ConditionalValue {
    /// Pair a condition with its output value.
    pub fn new(condition: Condition, value: impl Into<Value>) -> Self {
        Self {
            condition,
            value: value.into(),
        }
    }
}
