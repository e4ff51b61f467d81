//! Cell values and their comparison semantics.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single cell of a [`DataTable`](super::DataTable).
///
/// `Missing` is the "no information" sentinel. It compares equal to itself,
/// so two tables with missing values in the same cells are equal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// No value recorded.
    #[default]
    Missing,
    /// Boolean flag.
    Bool(bool),
    /// Whole number.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// Free text or a categorical code.
    Text(String),
    /// Calendar date. Serialized as `YYYY-MM-DD`; JSON strings always
    /// deserialize to `Text`.
    Date(NaiveDate),
}

impl Value {
    /// Returns true for `Missing` and for a NaN float.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) if !f.is_nan() => Some(*f),
            _ => None,
        }
    }

    /// Text view of the value, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the value's kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Missing => "missing",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(f) if f.is_nan() => "missing",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
        }
    }

    /// Equality that treats integers and floats as numbers.
    ///
    /// `Int(99)` equals `Float(99.0)`. There is no tolerance: `Float(99.5)`
    /// never equals `Int(99)` or `Int(100)`. The comparison is exact beyond
    /// 2^53, where not every integer has a float of the same value.
    pub fn numeric_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(i), Value::Float(f)) | (Value::Float(f), Value::Int(i)) => {
                f.fract() == 0.0
                    && *f >= i64::MIN as f64
                    && *f < i64::MAX as f64
                    && *i == *f as i64
            }
            _ => self == other,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if self.is_missing() || other.is_missing() {
            return self.is_missing() && other.is_missing();
        }
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(v) if v.is_nan() => write!(f, "NA"),
            Value::Missing => write!(f, "NA"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Text(v) => write!(f, "'{}'", v),
            Value::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Value::Missing
        } else {
            Value::Float(value)
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Missing, Into::into)
    }
}
