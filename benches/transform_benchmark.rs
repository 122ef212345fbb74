//! Benchmark of the clean + high-risk filter path
//!
//! Run with: cargo bench --bench transform_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use polars::prelude::*;
use rand::prelude::*;
use rand::SeedableRng;

use churn_etl::pipeline::transform::{clean, filter_high_risk};

/// Synthetic customer table with ~5% nulls in the imputed columns and ~2% duplicates
fn generate_customers(n_rows: usize, seed: u64) -> DataFrame {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    let ids: Vec<i64> = (0..n_rows as i64)
        .map(|i| if rng.gen_bool(0.02) { i.saturating_sub(1) } else { i })
        .collect();
    let ages: Vec<Option<f64>> = (0..n_rows)
        .map(|_| (!rng.gen_bool(0.05)).then(|| rng.gen_range(18.0..80.0f64).round()))
        .collect();
    let bills: Vec<Option<f64>> = (0..n_rows)
        .map(|_| (!rng.gen_bool(0.05)).then(|| rng.gen_range(30.0..100.0f64)))
        .collect();
    let usage: Vec<Option<f64>> = (0..n_rows)
        .map(|_| (!rng.gen_bool(0.05)).then(|| rng.gen_range(50.0..500.0f64).round()))
        .collect();
    let months: Vec<i64> = (0..n_rows).map(|_| rng.gen_range(1..25)).collect();

    df! {
        "CustomerID" => ids,
        "Age" => ages,
        "Monthly_Bill" => bills,
        "Total_Usage_GB" => usage,
        "Subscription_Length_Months" => months,
    }
    .unwrap()
}

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");

    for &rows in &[10_000usize, 100_000] {
        let df = generate_customers(rows, 42);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("clean_and_filter", rows), &df, |b, df| {
            b.iter(|| {
                let (cleaned, _) = clean(df.clone()).unwrap();
                let (filtered, _) = filter_high_risk(&cleaned).unwrap();
                black_box(filtered.height())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_transform);
criterion_main!(benches);
