//! Trade pack: everything a desk needs to act on one evaluation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use lngdivert_core::domain::{
    CostParams, DecisionRecord, HedgeLeg, MarketField, MarketSnapshot, Provenance, RoutePair,
    VesselSpec, VoyageResult,
};
use lngdivert_core::stress::{BaselineInputs, RiskPack, StressShocks};
use lngdivert_core::{evaluate_detailed, EngineError};

pub const TRADE_PACK_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeInputs {
    pub vessel: VesselSpec,
    pub routes: RoutePair,
    pub market: MarketSnapshot,
    pub cost: CostParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePack {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub date: NaiveDate,
    pub inputs: TradeInputs,
    pub europe: VoyageResult,
    pub asia: VoyageResult,
    pub record: DecisionRecord,
    /// Legs oriented by the decision.
    pub hedge_legs: Vec<HedgeLeg>,
    pub risk: Option<RiskPack>,
}

fn default_schema_version() -> u32 {
    TRADE_PACK_SCHEMA_VERSION
}

impl TradePack {
    /// Evaluate `baseline` on `date`, optionally running the stress catalogue.
    pub fn build(
        date: NaiveDate,
        baseline: &BaselineInputs,
        shocks: Option<&StressShocks>,
    ) -> Result<Self, EngineError> {
        let eval = evaluate_detailed(
            date,
            &baseline.vessel,
            &baseline.routes,
            &baseline.market,
            &baseline.cost,
        )?;
        let risk = shocks
            .map(|s| RiskPack::build(date, baseline, s))
            .transpose()?;
        Ok(Self {
            schema_version: TRADE_PACK_SCHEMA_VERSION,
            date,
            inputs: TradeInputs {
                vessel: baseline.vessel.clone(),
                routes: baseline.routes.clone(),
                market: baseline.market.clone(),
                cost: baseline.cost.clone(),
            },
            hedge_legs: eval.record.hedge_legs().to_vec(),
            europe: eval.europe,
            asia: eval.asia,
            record: eval.record,
            risk,
        })
    }

    /// Labels of market inputs tagged `proxy`.
    pub fn proxy_fields(&self) -> Vec<&'static str> {
        MarketField::ALL
            .iter()
            .filter(|f| self.inputs.market.quote(**f).provenance == Provenance::Proxy)
            .map(|f| f.label())
            .collect()
    }

    /// Plain-text note for the terminal.
    pub fn trade_note(&self) -> String {
        let r = &self.record;
        let mut out = String::with_capacity(1024);
        out.push_str(&format!(
            "TRADE NOTE {} | {} -> {} vs {} | {}\n",
            self.date,
            self.inputs.routes.load_port(),
            self.europe.discharge_port,
            self.asia.discharge_port,
            self.inputs.vessel.vessel_class
        ));
        out.push_str(&format!("Decision: {}\n", r.decision));
        out.push_str(&format!(
            "Netback Europe: ${:.0}  ({:.1} days, {:.0} m3 boil-off)\n",
            r.netback_europe_usd, self.europe.voyage_days, self.europe.boil_off_m3
        ));
        out.push_str(&format!(
            "Netback Asia:   ${:.0}  ({:.1} days, {:.0} m3 boil-off)\n",
            r.netback_asia_usd, self.asia.voyage_days, self.asia.boil_off_m3
        ));
        out.push_str(&format!(
            "Raw uplift: ${:.0}  Adjusted: ${:.0}  (buffer ${:.0})\n",
            r.raw_uplift_usd, r.adjusted_uplift_usd, self.inputs.cost.decision_buffer_usd
        ));
        out.push_str(&format!(
            "Hedge: {:.0} MMBtu ({:.0}% coverage): {}\n",
            r.hedge.hedge_energy_mmbtu,
            self.inputs.cost.coverage * 100.0,
            self.hedge_legs
                .iter()
                .map(|l| l.to_string())
                .collect::<Vec<_>>()
                .join(" / ")
        ));
        let proxies = self.proxy_fields();
        if !proxies.is_empty() {
            out.push_str(&format!("Proxy inputs: {}\n", proxies.join(", ")));
        }
        if let Some(risk) = &self.risk {
            out.push_str(&format!(
                "Worst stress impact: ${:.0}{}\n",
                risk.worst_case_pnl_impact_usd,
                risk.worst_case_scenario
                    .as_deref()
                    .map(|s| format!(" ({s})"))
                    .unwrap_or_default()
            ));
            if risk.any_flipped() {
                out.push_str(&format!(
                    "Decision flips under: {}\n",
                    risk.flipped_scenarios.join(", ")
                ));
            }
        }
        out
    }
}
