//! Backtest engine: replay the decision rule across a market history.
//!
//! Per-date evaluations are independent and run on the rayon pool. Results
//! come back in date order and are folded sequentially. A physically
//! infeasible date is skipped with a warning and excluded from the
//! observation count; any other error aborts the run.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lngdivert_core::domain::{CostParams, DecisionRecord, MarketSeries, RoutePair, VesselSpec};
use lngdivert_core::{evaluate, EngineError, InputError};

use crate::data_loader::LoadedMarket;
use crate::metrics::BacktestSummary;

/// Current schema version for persisted backtest reports.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("no observations evaluated ({skipped} date(s) skipped)")]
    NoObservations { skipped: usize },
    #[error("evaluation failed on {date}: {source}")]
    Evaluation {
        date: NaiveDate,
        #[source]
        source: EngineError,
    },
    #[error("invalid backtest inputs: {0}")]
    Input(#[from] InputError),
}

/// A date left out of the statistics, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedDate {
    pub date: NaiveDate,
    pub reason: String,
}

/// Records, summary and skipped dates of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestOutcome {
    pub records: Vec<DecisionRecord>,
    pub summary: BacktestSummary,
    pub skipped: Vec<SkippedDate>,
}

/// Evaluate every date in `series` and fold the results.
pub fn backtest(
    series: &MarketSeries,
    vessel: &VesselSpec,
    routes: &RoutePair,
    cost: &CostParams,
) -> Result<BacktestOutcome, BacktestError> {
    vessel.validate()?;
    routes.validate()?;
    cost.validate()?;

    let evaluated: Vec<(NaiveDate, Result<DecisionRecord, EngineError>)> = series
        .as_slice()
        .par_iter()
        .map(|snapshot| {
            (
                snapshot.date,
                evaluate(snapshot.date, vessel, routes, snapshot, cost),
            )
        })
        .collect();

    let mut records = Vec::with_capacity(evaluated.len());
    let mut skipped = Vec::new();
    for (date, result) in evaluated {
        match result {
            Ok(record) => records.push(record),
            Err(EngineError::Physical(infeasible)) => {
                tracing::warn!(%date, reason = %infeasible, "skipping infeasible date");
                skipped.push(SkippedDate {
                    date,
                    reason: infeasible.to_string(),
                });
            }
            Err(source) => return Err(BacktestError::Evaluation { date, source }),
        }
    }

    if records.is_empty() {
        return Err(BacktestError::NoObservations {
            skipped: skipped.len(),
        });
    }

    let summary = BacktestSummary::compute(&records);
    tracing::info!(
        observations = summary.total_observations,
        triggers = summary.trigger_count,
        skipped = skipped.len(),
        "backtest complete"
    );
    Ok(BacktestOutcome {
        records,
        summary,
        skipped,
    })
}

/// Persistable backtest result with run metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub vessel_class: String,
    pub cargo_capacity_m3: f64,
    pub load_port: String,
    pub europe_port: String,
    pub asia_port: String,
    pub cost: CostParams,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub dataset_hash: String,
    pub has_proxy: bool,
    pub summary: BacktestSummary,
    pub records: Vec<DecisionRecord>,
    pub skipped: Vec<SkippedDate>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestReport {
    /// At least one date triggered and triggered days averaged a positive
    /// adjusted uplift.
    pub fn rule_validated(&self) -> bool {
        self.summary.trigger_count > 0
            && self
                .summary
                .conditional_uplift
                .is_some_and(|u| u.mean_usd > 0.0)
    }
}

/// Run a backtest over loaded market data and attach report metadata.
pub fn run_backtest(
    market: &LoadedMarket,
    vessel: &VesselSpec,
    routes: &RoutePair,
    cost: &CostParams,
) -> Result<BacktestReport, BacktestError> {
    let outcome = backtest(&market.series, vessel, routes, cost)?;
    let (start_date, end_date) = match (outcome.records.first(), outcome.records.last()) {
        (Some(first), Some(last)) => (first.date, last.date),
        _ => {
            return Err(BacktestError::NoObservations {
                skipped: outcome.skipped.len(),
            })
        }
    };
    Ok(BacktestReport {
        schema_version: SCHEMA_VERSION,
        vessel_class: vessel.vessel_class.clone(),
        cargo_capacity_m3: vessel.cargo_capacity_m3,
        load_port: routes.load_port().to_string(),
        europe_port: routes.europe.discharge_port.clone(),
        asia_port: routes.asia.discharge_port.clone(),
        cost: cost.clone(),
        start_date,
        end_date,
        dataset_hash: market.dataset_hash.clone(),
        has_proxy: market.has_proxy,
        summary: outcome.summary,
        records: outcome.records,
        skipped: outcome.skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lngdivert_core::domain::{MarketSnapshot, Quote, RouteSpec};

    fn vessel() -> VesselSpec {
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

    fn routes(asia_nm: f64) -> RoutePair {
        RoutePair {
            europe: RouteSpec {
                load_port: "US_Gulf".into(),
                discharge_port: "Rotterdam".into(),
                distance_nm: 5_000.0,
            },
            asia: RouteSpec {
                load_port: "US_Gulf".into(),
                discharge_port: "Tokyo".into(),
                distance_nm: asia_nm,
            },
        }
    }

    fn snap(day: u32, spread: f64) -> MarketSnapshot {
        MarketSnapshot {
            date: NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            ttf: Quote::real(30.0),
            jkm: Quote::real(30.0 + spread),
            freight: Quote::real(85_000.0),
            fuel: Quote::real(583.0),
            eua: Quote::real(74.4),
        }
    }

    fn series() -> MarketSeries {
        MarketSeries::new(vec![
            snap(1, 3.0),
            snap(2, 0.0),
            snap(5, 4.0),
            snap(6, -1.0),
            snap(7, 2.5),
            snap(8, 0.5),
        ])
        .unwrap()
    }

    #[test]
    fn one_record_per_date_in_order() {
        let out = backtest(&series(), &vessel(), &routes(9_500.0), &CostParams::default()).unwrap();
        assert_eq!(out.records.len(), 6);
        assert!(out.records.windows(2).all(|w| w[0].date < w[1].date));
        assert!(out.skipped.is_empty());
    }

    #[test]
    fn hit_rate_matches_divert_count() {
        let out = backtest(&series(), &vessel(), &routes(9_500.0), &CostParams::default()).unwrap();
        let diverts = out.records.iter().filter(|r| r.is_divert()).count();
        assert_eq!(out.summary.trigger_count, diverts);
        assert_eq!(
            (out.summary.hit_rate * out.summary.total_observations as f64).round() as usize,
            diverts
        );
        // wide spreads divert, flat/negative spreads keep
        assert!(out.records[0].is_divert());
        assert!(!out.records[1].is_divert());
        assert!(!out.records[3].is_divert());
    }

    #[test]
    fn matches_sequential_evaluation() {
        let cost = CostParams::default();
        let out = backtest(&series(), &vessel(), &routes(9_500.0), &cost).unwrap();
        for (snapshot, record) in series().iter().zip(&out.records) {
            let expected = evaluate(snapshot.date, &vessel(), &routes(9_500.0), snapshot, &cost).unwrap();
            assert_eq!(&expected, record);
        }
    }

    #[test]
    fn all_infeasible_is_no_observations() {
        let err = backtest(&series(), &vessel(), &routes(600_000.0), &CostParams::default())
            .unwrap_err();
        assert!(matches!(err, BacktestError::NoObservations { skipped: 6 }));
    }

    #[test]
    fn empty_series_is_no_observations() {
        let err = backtest(
            &MarketSeries::default(),
            &vessel(),
            &routes(9_500.0),
            &CostParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BacktestError::NoObservations { skipped: 0 }));
    }

    #[test]
    fn invalid_cost_params_fail_fast() {
        let cost = CostParams {
            coverage: 2.0,
            ..CostParams::default()
        };
        assert!(matches!(
            backtest(&series(), &vessel(), &routes(9_500.0), &cost),
            Err(BacktestError::Input(_))
        ));
    }

    #[test]
    fn report_carries_metadata() {
        let market = LoadedMarket::new(series());
        let report =
            run_backtest(&market, &vessel(), &routes(9_500.0), &CostParams::default()).unwrap();
        assert_eq!(report.schema_version, SCHEMA_VERSION);
        assert_eq!(report.start_date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(report.end_date, NaiveDate::from_ymd_opt(2024, 2, 8).unwrap());
        assert_eq!(report.dataset_hash, market.dataset_hash);
        assert!(!report.has_proxy);
        assert_eq!(report.asia_port, "Tokyo");
        assert!(report.rule_validated());
    }
}
