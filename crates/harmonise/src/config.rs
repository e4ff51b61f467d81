//! Configuration for transforms and verification.

use serde::{Deserialize, Serialize};

/// How two tables are compared for equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Require identical value kinds. When false, `Int(2)` equals `Float(2.0)`.
    pub check_dtype: bool,
    /// Require columns in the same order. When false, columns are matched by name.
    pub check_column_order: bool,
    /// Maximum number of differing cells listed in an error.
    pub max_reported_mismatches: usize,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            check_dtype: true,
            check_column_order: true,
            max_reported_mismatches: 5,
        }
    }
}

/// Configuration for a [`Harmoniser`](crate::Harmoniser).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HarmoniseConfig {
    /// Table comparison settings used by the verification suite.
    pub compare: CompareConfig,
    /// Also re-derive every created column and compare it with the updated data.
    pub verify_created_columns: bool,
}
