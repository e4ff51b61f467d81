//! Main Harmoniser struct and public API.

use serde::Serialize;

use crate::config::HarmoniseConfig;
use crate::error::Result;
use crate::rules::HarmonisationPlan;
use crate::table::DataTable;
use crate::transform::{TransformEngine, TransformResult};
use crate::verify::{SuiteReport, run_full_test_suite};

/// Outcome of applying a plan and verifying the result.
#[derive(Debug, Clone, Serialize)]
pub struct HarmonisationOutcome {
    /// Audit of the applied transforms.
    pub transform: TransformResult,
    /// Checks that passed on the transformed data.
    pub report: SuiteReport,
}

/// Applies harmonisation plans and verifies their effect.
pub struct Harmoniser {
    config: HarmoniseConfig,
    engine: TransformEngine,
}

impl Harmoniser {
    /// Create a harmoniser with default configuration.
    pub fn new() -> Self {
        Self::with_config(HarmoniseConfig::default())
    }

    /// Create a harmoniser with custom configuration.
    pub fn with_config(config: HarmoniseConfig) -> Self {
        Self {
            config,
            engine: TransformEngine::new(),
        }
    }

    /// Also re-derive created columns during verification.
    pub fn with_created_column_checks(mut self) -> Self {
        self.config.verify_created_columns = true;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &HarmoniseConfig {
        &self.config
    }

    /// Apply a plan to a data table and its metadata in place.
    pub fn apply(
        &self,
        plan: &HarmonisationPlan,
        data: &mut DataTable,
        metadata: &mut DataTable,
    ) -> Result<TransformResult> {
        self.engine.apply(plan, data, metadata)
    }

    /// Check that `updated` differs from `original` exactly as the plan declares.
    pub fn verify(
        &self,
        updated: &DataTable,
        original: &DataTable,
        plan: &HarmonisationPlan,
    ) -> Result<SuiteReport> {
        run_full_test_suite(updated, original, plan, &self.config)
    }

    /// Apply a plan, then verify the result against the untouched input.
    ///
    /// `data` and `metadata` are only replaced when both steps succeed.
    pub fn harmonise(
        &self,
        plan: &HarmonisationPlan,
        data: &mut DataTable,
        metadata: &mut DataTable,
    ) -> Result<HarmonisationOutcome> {
        let mut updated = data.clone();
        let mut updated_meta = metadata.clone();

        let transform = self.apply(plan, &mut updated, &mut updated_meta)?;
        let report = self.verify(&updated, data, plan)?;

        *data = updated;
        *metadata = updated_meta;
        Ok(HarmonisationOutcome { transform, report })
    }
}

impl Default for Harmoniser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ChangeRecord;
    use crate::table::{RowKey, Value};

    fn tables() -> (DataTable, DataTable) {
        let data = DataTable::from_columns(
            RowKey::range(2),
            [
                ("age", vec![Value::Int(10), Value::Int(98)]),
                ("sex", vec!["F".into(), "M".into()]),
            ],
        )
        .unwrap();
        let metadata = DataTable::from_columns(
            vec![RowKey::from("label")],
            [("age", vec!["Age".into()]), ("sex", vec!["Sex".into()])],
        )
        .unwrap();
        (data, metadata)
    }

    #[test]
    fn test_harmonise_applies_and_verifies() {
        let (mut data, mut metadata) = tables();
        let plan = HarmonisationPlan::new()
            .with_rename("sex", "gender")
            .with_change(ChangeRecord::new(vec!["age"], vec![1], 99).unwrap());

        let outcome = Harmoniser::new()
            .with_created_column_checks()
            .harmonise(&plan, &mut data, &mut metadata)
            .unwrap();

        assert_eq!(outcome.transform.operations_applied, 2);
        assert_eq!(outcome.report.cells_verified, 1);
        assert_eq!(data.column_name_list(), vec!["age", "gender"]);
        assert_eq!(metadata.column_name_list(), vec!["age", "gender"]);
    }

    #[test]
    fn test_default_config() {
        let harmoniser = Harmoniser::default();
        assert!(!harmoniser.config().verify_created_columns);
        assert!(harmoniser.config().compare.check_dtype);
    }
}
