//! Stress engine: re-run the decision under named market shocks.
//!
//! Each scenario moves one or more of {JKM−TTF spread, freight, EUA}. The
//! spread moves through JKM with TTF held fixed. Shocked prices are floored
//! at zero so a large collapse never produces a negative quote.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{CostParams, Decision, DecisionRecord, MarketSnapshot, Quote, RoutePair, VesselSpec};
use crate::error::{ensure_non_negative, EngineError, InputError};
use crate::pipeline;

pub const DEFAULT_SPREAD_SHOCK_USD_MMBTU: f64 = 1.0;
pub const DEFAULT_FREIGHT_SHOCK_USD_DAY: f64 = 20_000.0;
pub const DEFAULT_EUA_SHOCK_USD_PER_TCO2: f64 = 10.0;

/// Shock magnitudes. All non-negative; the catalogue applies the sign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StressShocks {
    pub spread_usd_mmbtu: f64,
    pub freight_usd_day: f64,
    pub eua_usd_per_tco2: f64,
}

impl Default for StressShocks {
    fn default() -> Self {
        Self {
            spread_usd_mmbtu: DEFAULT_SPREAD_SHOCK_USD_MMBTU,
            freight_usd_day: DEFAULT_FREIGHT_SHOCK_USD_DAY,
            eua_usd_per_tco2: DEFAULT_EUA_SHOCK_USD_PER_TCO2,
        }
    }
}

impl StressShocks {
    pub fn zero() -> Self {
        Self {
            spread_usd_mmbtu: 0.0,
            freight_usd_day: 0.0,
            eua_usd_per_tco2: 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), InputError> {
        ensure_non_negative("stress.spread_usd_mmbtu", self.spread_usd_mmbtu)?;
        ensure_non_negative("stress.freight_usd_day", self.freight_usd_day)?;
        ensure_non_negative("stress.eua_usd_per_tco2", self.eua_usd_per_tco2)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    SpreadCollapse,
    SpreadWiden,
    FreightSpike,
    FreightDrop,
    CarbonSpike,
    CombinedAdverse,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 6] = [
        ScenarioKind::SpreadCollapse,
        ScenarioKind::SpreadWiden,
        ScenarioKind::FreightSpike,
        ScenarioKind::FreightDrop,
        ScenarioKind::CarbonSpike,
        ScenarioKind::CombinedAdverse,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScenarioKind::SpreadCollapse => "spread_collapse",
            ScenarioKind::SpreadWiden => "spread_widen",
            ScenarioKind::FreightSpike => "freight_spike",
            ScenarioKind::FreightDrop => "freight_drop",
            ScenarioKind::CarbonSpike => "carbon_spike",
            ScenarioKind::CombinedAdverse => "combined_adverse",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named set of signed deltas on the shockable inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressScenario {
    pub kind: ScenarioKind,
    pub spread_delta: f64,
    pub freight_delta: f64,
    pub eua_delta: f64,
}

impl StressScenario {
    pub fn new(kind: ScenarioKind, shocks: &StressShocks) -> Self {
        let (s, f, e) = (
            shocks.spread_usd_mmbtu,
            shocks.freight_usd_day,
            shocks.eua_usd_per_tco2,
        );
        let (spread_delta, freight_delta, eua_delta) = match kind {
            ScenarioKind::SpreadCollapse => (-s, 0.0, 0.0),
            ScenarioKind::SpreadWiden => (s, 0.0, 0.0),
            ScenarioKind::FreightSpike => (0.0, f, 0.0),
            ScenarioKind::FreightDrop => (0.0, -f, 0.0),
            ScenarioKind::CarbonSpike => (0.0, 0.0, e),
            ScenarioKind::CombinedAdverse => (-s, f, e),
        };
        Self {
            kind,
            spread_delta,
            freight_delta,
            eua_delta,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Derive the shocked snapshot. Provenance tags are preserved.
    pub fn apply(&self, market: &MarketSnapshot) -> MarketSnapshot {
        MarketSnapshot {
            jkm: floored(market.jkm, self.spread_delta),
            freight: floored(market.freight, self.freight_delta),
            eua: floored(market.eua, self.eua_delta),
            ..market.clone()
        }
    }
}

fn floored(quote: Quote, delta: f64) -> Quote {
    let shifted = quote.shifted(delta);
    Quote {
        value: shifted.value.max(0.0),
        ..shifted
    }
}

/// The six required scenarios, in reporting order.
pub fn catalogue(shocks: &StressShocks) -> Vec<StressScenario> {
    ScenarioKind::ALL
        .iter()
        .map(|kind| StressScenario::new(*kind, shocks))
        .collect()
}

/// Everything needed to re-run the decision for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineInputs {
    pub vessel: VesselSpec,
    pub routes: RoutePair,
    pub market: MarketSnapshot,
    pub cost: CostParams,
}

impl BaselineInputs {
    pub fn evaluate(&self, date: NaiveDate) -> Result<DecisionRecord, EngineError> {
        pipeline::evaluate(date, &self.vessel, &self.routes, &self.market, &self.cost)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressResult {
    pub scenario: String,
    pub kind: ScenarioKind,
    pub shocked_market: MarketSnapshot,
    pub adjusted_uplift_usd: f64,
    pub decision: Decision,
    pub baseline_decision: Decision,
    /// Stressed decision differs from baseline.
    pub flipped: bool,
    /// Stressed minus baseline adjusted uplift.
    pub pnl_impact_usd: f64,
}

/// Run the full catalogue for `date`.
pub fn stress(
    date: NaiveDate,
    baseline: &BaselineInputs,
    shocks: &StressShocks,
) -> Result<Vec<StressResult>, EngineError> {
    shocks.validate()?;
    let base = baseline.evaluate(date)?;
    run_scenarios(date, baseline, &base, &catalogue(shocks))
}

/// Run arbitrary scenarios against an already-evaluated baseline record.
pub fn run_scenarios(
    date: NaiveDate,
    baseline: &BaselineInputs,
    base: &DecisionRecord,
    scenarios: &[StressScenario],
) -> Result<Vec<StressResult>, EngineError> {
    scenarios
        .iter()
        .map(|scenario| {
            let shocked_market = scenario.apply(&baseline.market);
            let record = pipeline::evaluate(
                date,
                &baseline.vessel,
                &baseline.routes,
                &shocked_market,
                &baseline.cost,
            )?;
            Ok(StressResult {
                scenario: scenario.name().to_string(),
                kind: scenario.kind,
                shocked_market,
                adjusted_uplift_usd: record.adjusted_uplift_usd,
                decision: record.decision,
                baseline_decision: base.decision,
                flipped: record.decision != base.decision,
                pnl_impact_usd: record.adjusted_uplift_usd - base.adjusted_uplift_usd,
            })
        })
        .collect()
}

/// Baseline decision plus every stress outcome, summarised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPack {
    pub baseline: DecisionRecord,
    pub shocks: StressShocks,
    pub results: Vec<StressResult>,
    /// Most negative P&L impact across scenarios (0 if none is adverse).
    pub worst_case_pnl_impact_usd: f64,
    pub worst_case_scenario: Option<String>,
    pub flipped_scenarios: Vec<String>,
}

impl RiskPack {
    pub fn build(
        date: NaiveDate,
        baseline: &BaselineInputs,
        shocks: &StressShocks,
    ) -> Result<Self, EngineError> {
        shocks.validate()?;
        let base = baseline.evaluate(date)?;
        let results = run_scenarios(date, baseline, &base, &catalogue(shocks))?;
        Ok(Self::from_results(base, *shocks, results))
    }

    pub fn from_results(
        baseline: DecisionRecord,
        shocks: StressShocks,
        results: Vec<StressResult>,
    ) -> Self {
        let worst = results
            .iter()
            .filter(|r| r.pnl_impact_usd < 0.0)
            .min_by(|a, b| a.pnl_impact_usd.total_cmp(&b.pnl_impact_usd));
        let flipped_scenarios = results
            .iter()
            .filter(|r| r.flipped)
            .map(|r| r.scenario.clone())
            .collect();
        Self {
            worst_case_pnl_impact_usd: worst.map_or(0.0, |r| r.pnl_impact_usd),
            worst_case_scenario: worst.map(|r| r.scenario.clone()),
            baseline,
            shocks,
            results,
            flipped_scenarios,
        }
    }

    pub fn any_flipped(&self) -> bool {
        !self.flipped_scenarios.is_empty()
    }
}
