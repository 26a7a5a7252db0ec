//! Criterion benchmarks for the interactive slider path.
//!
//! Benchmarks:
//!   - reoptimize at a single slider position
//!   - a full 0.10 → 0.90 sweep in 0.01 steps
//!   - optimal_green_fraction grid search
//!
//! Budget: a single recompute must stay well under 50 ms.
//!
//! Run with: cargo bench -p valuation --bench slider_bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use valuation::analysis::{run_analysis, AnalysisRequest};
use valuation::intent::UserIntent;
use valuation::land_cover::{LandCoverClass, LandCoverDistribution};
use valuation::rate_tables::RateTables;
use valuation::scenario::{optimal_green_fraction, ScenarioBaselines};
use valuation::site::LatLng;
use valuation::slider::reoptimize;

fn reference_baselines() -> ScenarioBaselines {
    let d = 0.0009;
    let request = AnalysisRequest {
        project: None,
        area_m2: 10_000.0,
        polygon: vec![
            LatLng::new(18.52, 73.85),
            LatLng::new(18.52, 73.85 + d),
            LatLng::new(18.52 + d, 73.85 + d),
            LatLng::new(18.52 + d, 73.85),
        ],
        land_cover_distribution: LandCoverDistribution::from_pairs(&[
            (LandCoverClass::Forest, 0.6),
            (LandCoverClass::OpenLand, 0.4),
        ]),
        dominant_type: None,
        annual_rainfall_mm: Some(1200.0),
        avg_daily_irradiance_kwh_m2: Some(5.4),
        terrain: None,
        user_intent: UserIntent::Mixed,
        horizon_years: 10,
        green_fraction: 0.5,
        include_yearly: false,
    };
    match run_analysis(&request, &RateTables::default()) {
        Ok(result) => result.baselines,
        Err(err) => panic!("reference analysis failed: {err}"),
    }
}

// ---------------------------------------------------------------------------
// Benchmark: reoptimize
// ---------------------------------------------------------------------------

fn bench_reoptimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("slider_reoptimize");
    let baselines = reference_baselines();

    group.bench_function("single_position", |b| {
        b.iter(|| black_box(reoptimize(&baselines, UserIntent::Mixed, black_box(0.42))));
    });

    group.bench_function("sweep_81_positions", |b| {
        b.iter(|| {
            for k in 10..=90 {
                black_box(reoptimize(&baselines, UserIntent::Mixed, k as f64 / 100.0));
            }
        });
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: optimizer
// ---------------------------------------------------------------------------

fn bench_optimizer(c: &mut Criterion) {
    let baselines = reference_baselines();
    c.bench_function("optimal_green_fraction", |b| {
        b.iter(|| black_box(optimal_green_fraction(&baselines, UserIntent::Solar, black_box(10))));
    });
}

criterion_group!(benches, bench_reoptimize, bench_optimizer);
criterion_main!(benches);
