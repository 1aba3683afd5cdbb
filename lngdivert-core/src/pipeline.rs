//! Single-date evaluation: two netbacks into one decision.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decision;
use crate::domain::{CostParams, DecisionRecord, MarketSnapshot, RoutePair, VesselSpec, VoyageResult};
use crate::error::{EngineError, InputError};
use crate::netback;

/// A decision together with the voyages it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub record: DecisionRecord,
    pub europe: VoyageResult,
    pub asia: VoyageResult,
}

/// Full evaluation including both voyage breakdowns.
pub fn evaluate_detailed(
    date: NaiveDate,
    vessel: &VesselSpec,
    routes: &RoutePair,
    market: &MarketSnapshot,
    cost: &CostParams,
) -> Result<Evaluation, EngineError> {
    if date != market.date {
        return Err(InputError::DateMismatch {
            requested: date,
            snapshot: market.date,
        }
        .into());
    }
    let (europe, asia) = netback::compare_netbacks(vessel, routes, market, cost)?;
    let record = decision::decide(
        date,
        europe.netback_usd,
        asia.netback_usd,
        asia.delivered_energy_mmbtu,
        cost,
    )?;
    Ok(Evaluation {
        record,
        europe,
        asia,
    })
}

pub fn evaluate(
    date: NaiveDate,
    vessel: &VesselSpec,
    routes: &RoutePair,
    market: &MarketSnapshot,
    cost: &CostParams,
) -> Result<DecisionRecord, EngineError> {
    evaluate_detailed(date, vessel, routes, market, cost).map(|e| e.record)
}
