//! Backtest statistics: pure functions over decision records and P&L series.
//!
//! Two denominators are in play: conditional uplift
//! stats average over DIVERT days only, while the Sharpe-like ratio averages
//! daily P&L over every observation (KEEP days contribute zero).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lngdivert_core::domain::DecisionRecord;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Fewer observations than this leave the Sharpe-like ratio undefined.
pub const MIN_SHARPE_OBSERVATIONS: usize = 5;

/// Why a statistic could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateStatistic {
    #[error("P&L series has zero variance")]
    ZeroVariance,
    #[error("fewer than 5 observations")]
    InsufficientObservations,
}

/// Sharpe-like ratio, or an explicit marker that it is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SharpeRatio {
    Defined { value: f64 },
    Undefined { reason: DegenerateStatistic },
}

impl SharpeRatio {
    pub fn value(&self) -> Option<f64> {
        match self {
            SharpeRatio::Defined { value } => Some(*value),
            SharpeRatio::Undefined { .. } => None,
        }
    }
}

impl std::fmt::Display for SharpeRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SharpeRatio::Defined { value } => write!(f, "{value:.2}"),
            SharpeRatio::Undefined { reason } => write!(f, "undefined ({reason})"),
        }
    }
}

/// Adjusted-uplift statistics over DIVERT days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpliftStats {
    pub count: usize,
    pub mean_usd: f64,
    pub min_usd: f64,
    pub max_usd: f64,
    pub total_usd: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity_usd: f64,
}

/// Aggregate over an ordered sequence of decision records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub total_observations: usize,
    pub trigger_count: usize,
    pub hit_rate: f64,
    /// `None` when no date triggered.
    pub conditional_uplift: Option<UpliftStats>,
    pub total_pnl_usd: f64,
    pub mean_daily_pnl_usd: f64,
    /// Largest peak-to-trough fall of the equity curve, in USD (non-negative).
    pub max_drawdown_usd: f64,
    pub sharpe: SharpeRatio,
    pub equity_curve: Vec<EquityPoint>,
}

impl BacktestSummary {
    /// Fold records (already in date order) into summary statistics.
    pub fn compute(records: &[DecisionRecord]) -> Self {
        let pnl = daily_pnl(records);
        let equity = cumulative(&pnl);
        let trigger_count = records.iter().filter(|r| r.is_divert()).count();
        Self {
            total_observations: records.len(),
            trigger_count,
            hit_rate: hit_rate(trigger_count, records.len()),
            conditional_uplift: uplift_stats(records),
            total_pnl_usd: pnl.iter().sum(),
            mean_daily_pnl_usd: mean_f64(&pnl),
            max_drawdown_usd: max_drawdown(&equity),
            sharpe: sharpe_ratio(&pnl),
            equity_curve: records
                .iter()
                .zip(&equity)
                .map(|(r, e)| EquityPoint {
                    date: r.date,
                    equity_usd: *e,
                })
                .collect(),
        }
    }

    pub fn keep_count(&self) -> usize {
        self.total_observations - self.trigger_count
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// DIVERT count over total observations; 0 for an empty run.
pub fn hit_rate(trigger_count: usize, total_observations: usize) -> f64 {
    if total_observations == 0 {
        return 0.0;
    }
    trigger_count as f64 / total_observations as f64
}

pub fn uplift_stats(records: &[DecisionRecord]) -> Option<UpliftStats> {
    let uplifts: Vec<f64> = records
        .iter()
        .filter(|r| r.is_divert())
        .map(|r| r.adjusted_uplift_usd)
        .collect();
    if uplifts.is_empty() {
        return None;
    }
    Some(UpliftStats {
        count: uplifts.len(),
        mean_usd: mean_f64(&uplifts),
        min_usd: uplifts.iter().copied().fold(f64::INFINITY, f64::min),
        max_usd: uplifts.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        total_usd: uplifts.iter().sum(),
    })
}

/// Adjusted uplift on DIVERT days, zero on KEEP days.
pub fn daily_pnl(records: &[DecisionRecord]) -> Vec<f64> {
    records.iter().map(|r| r.pnl_usd()).collect()
}

/// Running sum.
pub fn cumulative(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

/// Largest `running_peak − value` over the curve, in curve units.
///
/// The peak starts at the first point. Returns 0.0 for a nondecreasing curve.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        max_dd = max_dd.max(peak - eq);
    }
    max_dd
}

/// Annualised mean / std of daily P&L.
///
/// Undefined below [`MIN_SHARPE_OBSERVATIONS`] points or at zero variance.
pub fn sharpe_ratio(daily_pnl: &[f64]) -> SharpeRatio {
    if daily_pnl.len() < MIN_SHARPE_OBSERVATIONS {
        return SharpeRatio::Undefined {
            reason: DegenerateStatistic::InsufficientObservations,
        };
    }
    let std = std_dev(daily_pnl);
    if std < 1e-12 {
        return SharpeRatio::Undefined {
            reason: DegenerateStatistic::ZeroVariance,
        };
    }
    SharpeRatio::Defined {
        value: mean_f64(daily_pnl) / std * TRADING_DAYS_PER_YEAR.sqrt(),
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n − 1).
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
