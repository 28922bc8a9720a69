//! Criterion benchmarks for evaluation and the MA grid search.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chrono::NaiveDate;
use signallab_core::data::{PriceLoader, SyntheticLoader};
use signallab_core::engine::run_ma_strategy;
use signallab_runner::{evaluate, MaGrid, OptimizeMetric, Optimizer};

fn prices(years: i32) -> signallab_core::domain::PriceSeries {
    SyntheticLoader::new()
        .load(
            "BENCH",
            NaiveDate::from_ymd_opt(2024 - years, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
        )
        .unwrap()
}

fn bench_evaluate(c: &mut Criterion) {
    let series = prices(20);
    let bundle = run_ma_strategy(&series, 10, 50).unwrap();
    c.bench_function("evaluate_20y", |b| b.iter(|| evaluate(black_box(&bundle))));
}

fn bench_grid(c: &mut Criterion) {
    let series = prices(10);
    let mut group = c.benchmark_group("ma_grid");
    group.sample_size(10);
    for parallel in [false, true] {
        let label = if parallel { "parallel" } else { "sequential" };
        let optimizer = Optimizer::new(MaGrid::standard()).with_parallelism(parallel);
        group.bench_with_input(BenchmarkId::new(label, series.len()), &series, |b, s| {
            b.iter(|| optimizer.run(black_box(s), OptimizeMetric::SharpeRatio))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_grid);
criterion_main!(benches);
