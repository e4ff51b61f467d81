//! Transformation engine that applies a harmonisation plan to data.

use tracing::{debug, info};

use crate::error::Result;
use crate::rules::HarmonisationPlan;
use crate::table::DataTable;

use super::operations::{TransformChange, TransformOperation, TransformResult};
use super::recode::recode_values;
use super::variables::{
    create_variables_with_conditions, delete_variables, ensure_metadata_aligned, rename_variables,
};

/// Engine for applying harmonisation plans to a data table and its metadata.
pub struct TransformEngine;

impl TransformEngine {
    /// Create a new transform engine.
    pub fn new() -> Self {
        Self
    }

    /// Apply every rule of a plan.
    ///
    /// Steps run in a fixed order: create, rename, recode, delete. Change
    /// records therefore name columns as they are after renaming. The work
    /// happens on copies that replace the inputs only once every step has
    /// succeeded, so on error `data` and `metadata` are untouched.
    pub fn apply(
        &self,
        plan: &HarmonisationPlan,
        data: &mut DataTable,
        metadata: &mut DataTable,
    ) -> Result<TransformResult> {
        plan.validate()?;
        ensure_metadata_aligned(data, metadata)?;

        let mut staged = data.clone();
        let mut staged_meta = metadata.clone();
        let mut result = TransformResult::new();

        if !plan.create.is_empty() {
            create_variables_with_conditions(&mut staged, &mut staged_meta, &plan.create)?;
            for rule in &plan.create {
                result.add_change(TransformChange::structural(TransformOperation::Create {
                    column: rule.target_col().to_string(),
                    condition_column: rule.condition_col().to_string(),
                    conditions: rule.conditions().len(),
                }));
            }
        }

        if !plan.rename.is_empty() {
            rename_variables(&mut staged, &mut staged_meta, &plan.rename)?;
            for (from, to) in &plan.rename {
                result.add_change(TransformChange::structural(TransformOperation::Rename {
                    from: from.clone(),
                    to: to.clone(),
                }));
            }
        }

        if !plan.changes.is_empty() {
            let mut audits = recode_values(&mut staged, &plan.changes)?.into_iter();
            for record in &plan.changes {
                let record_audits: Vec<_> = audits.by_ref().take(record.cell_count()).collect();
                let operation = TransformOperation::Recode {
                    columns: record.columns().to_vec(),
                    rows: record.idx().len(),
                    value: record.value().clone(),
                };
                debug!(operation = %operation.description(), "recoded cells");
                result.add_change(TransformChange::with_audits(operation, record_audits));
            }
        }

        if !plan.delete.is_empty() {
            delete_variables(&mut staged, &mut staged_meta, &plan.delete)?;
            for column in &plan.delete {
                result.add_change(TransformChange::structural(TransformOperation::Delete {
                    column: column.clone(),
                }));
            }
        }

        *data = staged;
        *metadata = staged_meta;

        info!(
            operations = result.operations_applied,
            cells = result.cells_modified,
            added = result.columns_added,
            removed = result.columns_removed,
            "Applied harmonisation plan"
        );
        Ok(result)
    }
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self::new()
    }
}
