//! Criterion benchmarks for pricer_risk.
//!
//! Benchmarks cover:
//! - Portfolio aggregation with varying leg counts
//! - Spot × volatility scenario grids, sequential and parallel
//! - Time decay

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pricer_core::types::{InstrumentSpec, MarketState};
use pricer_risk::parallel::ParallelConfig;
use pricer_risk::portfolio::PortfolioAggregator;
use pricer_risk::scenarios::ScenarioEngine;

/// Alternating calls and puts around the money.
fn generate_book(n_legs: usize) -> Vec<InstrumentSpec> {
    (0..n_legs)
        .map(|i| {
            let strike = 80.0 + (i % 41) as f64;
            let quantity = if i % 3 == 0 { -1.0 } else { 2.0 };
            if i % 2 == 0 {
                InstrumentSpec::call(strike, quantity, 100.0).unwrap()
            } else {
                InstrumentSpec::put(strike, quantity, 100.0).unwrap()
            }
        })
        .collect()
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| start + (end - start) * i as f64 / (n - 1) as f64)
        .collect()
}

fn market() -> MarketState {
    MarketState::new(100.0, 0.05, 0.01, 0.25, 0.5).unwrap()
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    let market = market();

    for n_legs in [10, 100, 1_000] {
        let book = generate_book(n_legs);
        group.bench_with_input(BenchmarkId::new("sequential", n_legs), &book, |b, book| {
            let aggregator = PortfolioAggregator::new(ParallelConfig::sequential());
            b.iter(|| aggregator.aggregate(black_box(book), black_box(&market)));
        });
        group.bench_with_input(BenchmarkId::new("parallel", n_legs), &book, |b, book| {
            let aggregator = PortfolioAggregator::default();
            b.iter(|| aggregator.aggregate(black_box(book), black_box(&market)));
        });
    }

    group.finish();
}

fn bench_scenario_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenario_grid");
    group.sample_size(30);
    let market = market();
    let book = generate_book(20);
    let spots = linspace(0.7, 1.3, 25);
    let vols = linspace(-0.1, 0.1, 21);

    for (label, parallel) in [
        ("sequential", ParallelConfig::sequential()),
        ("parallel", ParallelConfig::default()),
    ] {
        let engine = ScenarioEngine::new(parallel);
        group.bench_function(BenchmarkId::new(label, "25x21"), |b| {
            b.iter(|| engine.run_grid(black_box(&book), black_box(&market), &spots, &vols));
        });
    }

    group.finish();
}

fn bench_time_decay(c: &mut Criterion) {
    let mut group = c.benchmark_group("time_decay");
    let market = market();
    let book = generate_book(20);
    let engine = ScenarioEngine::default();

    for steps in [30, 180] {
        group.bench_with_input(BenchmarkId::new("steps", steps), &steps, |b, &steps| {
            b.iter(|| engine.run_time_decay(black_box(&book), black_box(&market), steps));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_aggregate, bench_scenario_grid, bench_time_decay);
criterion_main!(benches);
