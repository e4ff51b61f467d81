//! Harmonise: declarative harmonisation and verification of tabular data.
//!
//! A harmonisation pass derives new columns from existing ones, renames
//! and deletes columns, and recodes individual cells, keeping a parallel
//! metadata table in step with the data. The verification suite then proves
//! that the updated table differs from the original exactly as declared.
//!
//! # Core Principles
//!
//! - **Declarative**: Create rules, renames, deletes, and change records are plain data
//! - **Fail fast**: Every check returns the first violation as an error
//! - **Atomic**: A failed transform leaves the data and metadata untouched
//!
//! # Example
//!
//! ```
//! use harmonise::{ChangeRecord, DataTable, HarmonisationPlan, Harmoniser, RowKey, Value};
//!
//! let mut data = DataTable::from_columns(
//!     RowKey::range(2),
//!     [
//!         ("age", vec![Value::Int(34), Value::Int(98)]),
//!         ("sex", vec![Value::from("F"), Value::from("M")]),
//!     ],
//! ).unwrap();
//! let mut metadata = DataTable::from_columns(
//!     vec![RowKey::from("label")],
//!     [("age", vec![Value::from("Age")]), ("sex", vec![Value::from("Sex")])],
//! ).unwrap();
//! let original = data.clone();
//!
//! let plan = HarmonisationPlan::new()
//!     .with_rename("sex", "gender")
//!     .with_change(ChangeRecord::new(vec!["age"], vec![1], 99).unwrap());
//!
//! let harmoniser = Harmoniser::new();
//! harmoniser.apply(&plan, &mut data, &mut metadata).unwrap();
//! let report = harmoniser.verify(&data, &original, &plan).unwrap();
//!
//! assert_eq!(report.columns_removed, vec!["sex"]);
//! ```

pub mod config;
pub mod error;
pub mod rules;
pub mod table;
pub mod transform;
pub mod verify;

mod harmonise;

pub use crate::harmonise::{HarmonisationOutcome, Harmoniser};
pub use config::{CompareConfig, HarmoniseConfig};
pub use error::{HarmoniseError, Result};
pub use rules::{ChangeRecord, Condition, ConditionalValue, CreateRule, HarmonisationPlan};
pub use table::{CellDiff, DataTable, RowKey, Value};
pub use transform::{TransformEngine, TransformResult};
pub use verify::{ColumnCheck, SuiteReport, run_full_test_suite};
