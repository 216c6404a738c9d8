//! Pipeline performance benchmarks.
//!
//! Measures cleaning, aggregation and the combined run over synthetic
//! timesheet data.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use reportpilot::{
    AggFunc, AggregationConfig, AggregationEngine, CleaningConfig, CleaningEngine, FillStrategy,
    NullSink, Pipeline, PipelineConfig, Table, Value,
};

/// Generate timesheet rows: padded project names, some duplicates, some
/// missing hours and the occasional outlier.
fn generate_timesheet(rows: usize) -> Table {
    let projects = [" alpha", "beta ", "gamma", "delta", "epsilon"];
    let owners = ["ana", "bo", "cy"];

    let data = (0..rows)
        .map(|row| {
            let day = (row % 90) as u32;
            let date = format!("2024-{:02}-{:02}", day / 30 + 1, day % 28 + 1);
            let hours = if row % 17 == 0 {
                Value::Missing
            } else if row % 101 == 0 {
                Value::Number(400.0)
            } else {
                Value::Number(((row * 7) % 12) as f64 + 0.5)
            };
            vec![
                Value::text(date),
                Value::text(projects[row % projects.len()]),
                Value::text(owners[(row / 3) % owners.len()]),
                hours,
            ]
        })
        .collect();

    Table::new(
        vec![
            "date".to_string(),
            "project".to_string(),
            "owner".to_string(),
            "hours".to_string(),
        ],
        data,
    )
    .unwrap()
}

fn cleaning_config() -> CleaningConfig {
    CleaningConfig::default()
        .with_date_columns(["date"])
        .with_numeric_columns(["hours"])
        .with_fill_missing(FillStrategy::Mean)
        .with_outlier_removal(true)
}

fn aggregation_config() -> AggregationConfig {
    AggregationConfig::new("date")
        .with_group_by(["project", "owner"])
        .with_metric("hours", &[AggFunc::Sum, AggFunc::Mean, AggFunc::Median])
}

/// Benchmark the cleaning stage alone.
fn bench_cleaning(c: &mut Criterion) {
    let mut group = c.benchmark_group("cleaning");
    let config = cleaning_config();

    for rows in [100, 1_000, 10_000].iter() {
        let table = generate_timesheet(*rows);

        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &table, |b, table| {
            b.iter_with_setup(
                || table.clone(),
                |table| {
                    let mut engine = CleaningEngine::new();
                    black_box(engine.clean(table, &config, &mut NullSink).unwrap())
                },
            )
        });
    }

    group.finish();
}

/// Benchmark the aggregation stage over already-cleaned data.
fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");
    let config = aggregation_config();

    for rows in [100, 1_000, 10_000].iter() {
        let table = CleaningEngine::new()
            .clean(generate_timesheet(*rows), &cleaning_config(), &mut NullSink)
            .unwrap();

        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &table, |b, table| {
            b.iter(|| {
                let mut engine = AggregationEngine::new();
                black_box(engine.summarize(table, &config, &mut NullSink).unwrap())
            })
        });
    }

    group.finish();
}

/// Benchmark a full pipeline run.
fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_run");
    let config = PipelineConfig {
        cleaning: cleaning_config(),
        aggregation: aggregation_config(),
    };

    for rows in [1_000, 50_000].iter() {
        let table = generate_timesheet(*rows);

        group.throughput(Throughput::Elements(*rows as u64));
        group.sample_size(20);
        group.bench_with_input(BenchmarkId::new("rows", rows), &table, |b, table| {
            b.iter_with_setup(
                || table.clone(),
                |table| {
                    let mut pipeline = Pipeline::with_config(config.clone());
                    black_box(pipeline.run(table, &mut NullSink).unwrap())
                },
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cleaning, bench_aggregation, bench_full_run);
criterion_main!(benches);
