//! Integration tests for the runner: sample reference data and market
//! history from `data/`, synthetic histories, and artifact round trips.

use std::path::PathBuf;

use chrono::NaiveDate;
use proptest::prelude::*;

use lngdivert_core::domain::{CostParams, Provenance, RoutePair, VesselSpec};
use lngdivert_core::stress::{BaselineInputs, StressShocks};
use lngdivert_runner::backtest::{backtest, run_backtest, BacktestError};
use lngdivert_runner::data_loader::{
    load_carbon_params, load_market, load_reference, LoadError, LoadedMarket, AUX_FILE,
    BENCHMARK_FILE,
};
use lngdivert_runner::export;
use lngdivert_runner::metrics::SharpeRatio;
use lngdivert_runner::pack::TradePack;
use lngdivert_runner::synthetic::{generate, SyntheticSpec};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("data")
}

fn gulf_voyage() -> (VesselSpec, RoutePair) {
    let reference = load_reference(&data_dir()).unwrap();
    let vessel = reference.vessel("TFDE").unwrap().clone();
    let routes = reference
        .route_pair("US_Gulf", "Rotterdam", "Tokyo")
        .unwrap();
    (vessel, routes)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ─── Sample data ────────────────────────────────────────────────────

#[test]
fn reference_data_loads() {
    let reference = load_reference(&data_dir()).unwrap();
    let classes: Vec<&str> = reference.vessel_classes().collect();
    assert_eq!(classes, vec!["MEGI", "STEAM", "TFDE"]);
    assert_eq!(reference.route_count(), 6);
    assert!(reference.route("Qatar", "Tokyo").is_ok());
    assert!(reference.route("US_Gulf", "Shanghai").is_err());
}

#[test]
fn carbon_params_load() {
    let factors = load_carbon_params(&data_dir()).unwrap().unwrap();
    assert_eq!(factors.vlsfo_tco2_per_t, 3.114);
    assert_eq!(factors.lng_tco2_per_t, 2.750);
}

#[test]
fn market_join_drops_unmatched_dates() {
    let market = load_market(&data_dir()).unwrap();
    assert_eq!(market.series.len(), 10);
    assert_eq!(market.series.first_date(), Some(date(2025, 1, 6)));
    assert_eq!(market.series.last_date(), Some(date(2025, 1, 17)));
    assert!(market.series.get(date(2025, 1, 20)).is_none());
    assert!(market.has_proxy);
    assert_eq!(market.dataset_hash.len(), 64);

    let jan16 = market.series.get(date(2025, 1, 16)).unwrap();
    assert_eq!(jan16.jkm.provenance, Provenance::Proxy);
    assert_eq!(jan16.ttf.provenance, Provenance::Real);
    assert_eq!(jan16.freight.provenance, Provenance::Proxy);
}

#[test]
fn sample_backtest_end_to_end() {
    let (vessel, routes) = gulf_voyage();
    let market = load_market(&data_dir()).unwrap();
    let report = run_backtest(&market, &vessel, &routes, &CostParams::default()).unwrap();

    let s = &report.summary;
    assert_eq!(s.total_observations, 10);
    assert_eq!(s.trigger_count, 8);
    assert!((s.hit_rate - 0.8).abs() < 1e-12);
    assert_eq!(s.keep_count(), 2);
    assert!(matches!(s.sharpe, SharpeRatio::Defined { .. }));
    assert_eq!(s.max_drawdown_usd, 0.0);
    assert!(report.rule_validated());

    // 2025-01-10: spread 0.90 misses the buffer; 2025-01-17: spread 0.40 is negative uplift
    let keeps: Vec<NaiveDate> = report
        .records
        .iter()
        .filter(|r| !r.is_divert())
        .map(|r| r.date)
        .collect();
    assert_eq!(keeps, vec![date(2025, 1, 10), date(2025, 1, 17)]);

    let golden = report
        .records
        .iter()
        .find(|r| r.date == date(2025, 1, 8))
        .unwrap();
    assert_eq!(golden.hedge.jkm_lots, 319);
    assert_eq!(golden.hedge.ttf_lots, 319);
}

#[test]
fn equity_curve_is_running_sum_of_conditional_pnl() {
    let (vessel, routes) = gulf_voyage();
    let market = load_market(&data_dir()).unwrap();
    let outcome = backtest(&market.series, &vessel, &routes, &CostParams::default()).unwrap();

    let mut running = 0.0;
    for (record, point) in outcome.records.iter().zip(&outcome.summary.equity_curve) {
        running += record.pnl_usd();
        assert_eq!(record.date, point.date);
        assert!((point.equity_usd - running).abs() < 1e-6);
    }
    assert!((outcome.summary.total_pnl_usd - running).abs() < 1e-6);
}

#[test]
fn missing_aux_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(
        data_dir().join(BENCHMARK_FILE),
        dir.path().join(BENCHMARK_FILE),
    )
    .unwrap();
    assert!(matches!(
        load_market(dir.path()),
        Err(LoadError::Io { .. })
    ));
}

#[test]
fn combined_market_file_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("market.csv");
    std::fs::write(
        &path,
        "date,TTF_USD_MMBTU,JKM_USD_MMBTU,FREIGHT_USD_DAY,FUEL_USD_PER_T,EUA_USD_PER_TCO2\n\
         2025-01-15,35.69,38.44,85000,583,74.4\n",
    )
    .unwrap();
    let market = load_market(&path).unwrap();
    assert_eq!(market.series.len(), 1);
    assert!(!market.has_proxy);
    assert!(data_dir().join(AUX_FILE).exists());
}

#[test]
fn unknown_route_fails_before_backtest() {
    let reference = load_reference(&data_dir()).unwrap();
    assert!(reference
        .route_pair("US_Gulf", "Rotterdam", "Shanghai")
        .is_err());
}

#[test]
fn infeasible_voyage_skips_every_date() {
    let (vessel, mut routes) = gulf_voyage();
    // 0.10 %/day boils the whole cargo off in 1000 days
    routes.asia.distance_nm = 19.5 * 24.0 * 1_001.0;
    let market = load_market(&data_dir()).unwrap();
    let err = run_backtest(&market, &vessel, &routes, &CostParams::default()).unwrap_err();
    assert!(matches!(err, BacktestError::NoObservations { skipped: 10 }));
}

// ─── Synthetic histories ────────────────────────────────────────────

#[test]
fn synthetic_backtest_is_deterministic() {
    let (vessel, routes) = gulf_voyage();
    let spec = SyntheticSpec::new(date(2023, 1, 1), date(2023, 12, 31), 42);
    let a = run_backtest(
        &LoadedMarket::new(generate(&spec).unwrap()),
        &vessel,
        &routes,
        &CostParams::default(),
    )
    .unwrap();
    let b = run_backtest(
        &LoadedMarket::new(generate(&spec).unwrap()),
        &vessel,
        &routes,
        &CostParams::default(),
    )
    .unwrap();
    assert_eq!(a.dataset_hash, b.dataset_hash);
    assert_eq!(a.records, b.records);
    assert_eq!(a.summary.total_observations, 260);
    assert!(a.has_proxy);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn hit_rate_counts_divert_records(seed in 0u64..10_000, buffer in 0.0f64..5_000_000.0) {
        let (vessel, routes) = gulf_voyage();
        let spec = SyntheticSpec::new(date(2024, 1, 1), date(2024, 6, 30), seed);
        let series = generate(&spec).unwrap();
        let cost = CostParams { decision_buffer_usd: buffer, ..CostParams::default() };
        let out = backtest(&series, &vessel, &routes, &cost).unwrap();

        let diverts = out.records.iter().filter(|r| r.is_divert()).count();
        prop_assert_eq!(out.summary.trigger_count, diverts);
        prop_assert_eq!(out.summary.total_observations, series.len());
        prop_assert!((out.summary.hit_rate * series.len() as f64 - diverts as f64).abs() < 1e-9);
        for r in &out.records {
            prop_assert_eq!(r.is_divert(), r.adjusted_uplift_usd >= buffer);
        }
        prop_assert!(out.summary.max_drawdown_usd >= 0.0);
    }
}

// ─── Artifacts ──────────────────────────────────────────────────────

#[test]
fn backtest_artifacts_round_trip() {
    let (vessel, routes) = gulf_voyage();
    let market = load_market(&data_dir()).unwrap();
    let report = run_backtest(&market, &vessel, &routes, &CostParams::default()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let run_dir = export::save_backtest(&report, dir.path()).unwrap();
    let loaded = export::load_artifacts(&run_dir).unwrap();
    assert_eq!(loaded.records, report.records);
    assert_eq!(loaded.summary.trigger_count, 8);

    let decisions = std::fs::read_to_string(run_dir.join("decisions.csv")).unwrap();
    assert_eq!(decisions.lines().count(), 11);
    let md = std::fs::read_to_string(run_dir.join("report.md")).unwrap();
    assert!(md.contains("| DIVERT Signals | 8 |"));
}

#[test]
fn trade_pack_artifacts_round_trip() {
    let (vessel, routes) = gulf_voyage();
    let market = load_market(&data_dir()).unwrap();
    let snapshot = market.series.get(date(2025, 1, 8)).unwrap().clone();
    let baseline = BaselineInputs {
        vessel,
        routes,
        market: snapshot,
        cost: CostParams::default(),
    };
    let pack = TradePack::build(date(2025, 1, 8), &baseline, Some(&StressShocks::default())).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let run_dir = export::save_trade_pack(&pack, dir.path()).unwrap();
    assert!(run_dir.join("trade_note.txt").exists());
    let stress_csv = std::fs::read_to_string(run_dir.join("stress.csv")).unwrap();
    assert_eq!(stress_csv.lines().count(), 7);

    let loaded = export::load_trade_pack(&run_dir).unwrap();
    assert_eq!(loaded.record, pack.record);
    assert_eq!(loaded.hedge_legs, pack.hedge_legs);
    assert_eq!(
        loaded.risk.as_ref().map(|r| r.results.len()),
        Some(6)
    );
}
