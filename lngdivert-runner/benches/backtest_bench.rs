//! Criterion benchmarks for the evaluation and backtest hot paths.
//!
//! Run with: `cargo bench -p lngdivert-runner`

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lngdivert_core::domain::{CostParams, RoutePair, RouteSpec, VesselSpec};
use lngdivert_core::stress::{BaselineInputs, RiskPack, StressShocks};
use lngdivert_core::evaluate;
use lngdivert_runner::backtest::backtest;
use lngdivert_runner::metrics::BacktestSummary;
use lngdivert_runner::synthetic::{generate, SyntheticSpec};

fn tfde() -> VesselSpec {
    VesselSpec {
        vessel_class: "TFDE".into(),
        cargo_capacity_m3: 174_000.0,
        laden_speed_kn: 19.5,
        ballast_speed_kn: 19.5,
        boil_off_pct_per_day: 0.10,
        fuel_consumption_tpd_laden: 130.0,
        fuel_consumption_tpd_ballast: 130.0,
    }
}

fn gulf_routes() -> RoutePair {
    RoutePair {
        europe: RouteSpec {
            load_port: "US_Gulf".into(),
            discharge_port: "Rotterdam".into(),
            distance_nm: 5_000.0,
        },
        asia: RouteSpec {
            load_port: "US_Gulf".into(),
            discharge_port: "Tokyo".into(),
            distance_nm: 9_500.0,
        },
    }
}

/// Synthetic history of roughly `years` × 261 weekdays.
fn history(years: i32) -> lngdivert_core::domain::MarketSeries {
    let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2000 + years, 1, 1).unwrap();
    generate(&SyntheticSpec::new(start, end, 7)).unwrap()
}

fn bench_single_evaluation(c: &mut Criterion) {
    let series = history(1);
    let snapshot = &series.as_slice()[0];
    let (vessel, routes, cost) = (tfde(), gulf_routes(), CostParams::default());
    c.bench_function("evaluate_single_date", |b| {
        b.iter(|| {
            evaluate(
                black_box(snapshot.date),
                &vessel,
                &routes,
                black_box(snapshot),
                &cost,
            )
        })
    });
}

fn bench_backtest(c: &mut Criterion) {
    let mut group = c.benchmark_group("backtest");
    let (vessel, routes, cost) = (tfde(), gulf_routes(), CostParams::default());

    for years in [1, 5, 20] {
        let series = history(years);
        group.bench_with_input(BenchmarkId::from_parameter(series.len()), &series, |b, s| {
            b.iter(|| backtest(black_box(s), &vessel, &routes, &cost))
        });
    }

    group.finish();
}

fn bench_summary(c: &mut Criterion) {
    let series = history(20);
    let out = backtest(&series, &tfde(), &gulf_routes(), &CostParams::default()).unwrap();
    c.bench_function("summary_20y", |b| {
        b.iter(|| BacktestSummary::compute(black_box(&out.records)))
    });
}

fn bench_risk_pack(c: &mut Criterion) {
    let series = history(1);
    let snapshot = series.as_slice()[0].clone();
    let baseline = BaselineInputs {
        vessel: tfde(),
        routes: gulf_routes(),
        market: snapshot.clone(),
        cost: CostParams::default(),
    };
    let shocks = StressShocks::default();
    c.bench_function("risk_pack", |b| {
        b.iter(|| RiskPack::build(black_box(snapshot.date), &baseline, &shocks))
    });
}

criterion_group!(
    benches,
    bench_single_evaluation,
    bench_backtest,
    bench_summary,
    bench_risk_pack,
);
criterion_main!(benches);
