//! Data transformation module: derive, rename, recode, and delete columns.

mod conditions;
mod engine;
mod operations;
mod recode;
mod variables;

pub use conditions::apply_conditions;
pub use engine::TransformEngine;
pub use operations::{RowAudit, TransformChange, TransformOperation, TransformResult};
pub use recode::recode_values;
pub use variables::{
    ColumnChanges, create_variables, create_variables_with_conditions, delete_variables,
    ensure_metadata_aligned, reformat_create, reformat_crud, rename_variables,
};
