//! Transform and verification performance benchmarks.
//!
//! Measures the engine and the full verification suite on synthetic cohort tables.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use harmonise::{
    ChangeRecord, Condition, ConditionalValue, CreateRule, DataTable, HarmonisationPlan,
    HarmoniseConfig, Harmoniser, RowKey, Value, run_full_test_suite,
};

/// Row counts to benchmark.
const SIZES: &[usize] = &[1_000, 10_000, 100_000];

/// Build a cohort table with an age, a sex, and a few measurement columns.
fn cohort(rows: usize) -> (DataTable, DataTable) {
    let age: Vec<Value> = (0..rows).map(|i| Value::Int((i % 90) as i64)).collect();
    let sex: Vec<Value> = (0..rows)
        .map(|i| if i % 7 == 0 { Value::Missing } else if i % 2 == 0 { "F".into() } else { "M".into() })
        .collect();

    let mut columns = vec![("age".to_string(), age), ("sex".to_string(), sex)];
    for m in 0..6 {
        columns.push((
            format!("measure_{}", m),
            (0..rows).map(|i| Value::Float((i * (m + 1)) as f64 / 10.0)).collect(),
        ));
    }

    let metadata = DataTable::from_columns(
        vec![RowKey::from("label")],
        columns
            .iter()
            .map(|(name, _)| (name.clone(), vec![Value::from(name.as_str())])),
    )
    .expect("valid metadata");
    let data = DataTable::from_columns(RowKey::range(rows), columns).expect("valid data");
    (data, metadata)
}

/// A plan touching every kind of rule.
fn plan(rows: usize) -> HarmonisationPlan {
    let age_group = CreateRule::new(
        "age_group",
        "age",
        vec![
            ConditionalValue::new(Condition::Range { min: None, max: Some(18.0) }, "minor"),
            ConditionalValue::new(Condition::Range { min: Some(18.0), max: Some(65.0) }, "adult"),
            ConditionalValue::new(Condition::Range { min: Some(65.0), max: None }, "senior"),
        ],
    )
    .expect("valid rule");
    let recoded: Vec<RowKey> = RowKey::range(rows).into_iter().step_by(50).collect();

    HarmonisationPlan::new()
        .with_create(age_group)
        .with_rename("sex", "gender")
        .with_change(ChangeRecord::new(vec!["measure_0", "measure_1"], recoded, -1).expect("valid change"))
        .with_delete("measure_5")
}

/// Benchmark applying a plan.
fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply");
    let harmoniser = Harmoniser::new();

    for &rows in SIZES {
        let (data, metadata) = cohort(rows);
        let plan = plan(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, _| {
            b.iter(|| {
                let mut data = data.clone();
                let mut metadata = metadata.clone();
                black_box(harmoniser.apply(&plan, &mut data, &mut metadata))
            })
        });
    }

    group.finish();
}

/// Benchmark the full verification suite.
fn bench_full_suite(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_suite");
    let harmoniser = Harmoniser::new();
    let config = HarmoniseConfig {
        verify_created_columns: true,
        ..HarmoniseConfig::default()
    };

    for &rows in SIZES {
        let (original, metadata) = cohort(rows);
        let plan = plan(rows);
        let mut updated = original.clone();
        let mut updated_meta = metadata.clone();
        harmoniser
            .apply(&plan, &mut updated, &mut updated_meta)
            .expect("apply failed");

        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, _| {
            b.iter(|| black_box(run_full_test_suite(&updated, &original, &plan, &config)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_apply, bench_full_suite);
criterion_main!(benches);
