//! Decision rule: adjusted uplift, DIVERT/KEEP, and hedge sizing.

use chrono::NaiveDate;

use crate::domain::{CostParams, Decision, DecisionRecord, HedgeInstruction};
use crate::error::{ensure_finite, ensure_non_negative, InputError};

/// `raw × (1 − haircut) − ops_buffer`.
pub fn adjusted_uplift(raw_uplift_usd: f64, basis_haircut: f64, ops_buffer_usd: f64) -> f64 {
    raw_uplift_usd * (1.0 - basis_haircut) - ops_buffer_usd
}

/// DIVERT iff the adjusted uplift clears the buffer. Ties divert.
pub fn classify(adjusted_uplift_usd: f64, decision_buffer_usd: f64) -> Decision {
    if adjusted_uplift_usd >= decision_buffer_usd {
        Decision::Divert
    } else {
        Decision::Keep
    }
}

/// Lots per leg for a spread hedge covering `coverage` of `energy_mmbtu`.
pub fn size_hedge(energy_mmbtu: f64, cost: &CostParams) -> Result<HedgeInstruction, InputError> {
    ensure_non_negative("hedge_energy_mmbtu", energy_mmbtu)?;
    let hedge_energy_mmbtu = energy_mmbtu * cost.coverage;
    Ok(HedgeInstruction {
        hedge_energy_mmbtu,
        jkm_lots: lots(hedge_energy_mmbtu, cost.jkm_lot_mmbtu),
        ttf_lots: lots(hedge_energy_mmbtu, cost.ttf_lot_mmbtu),
    })
}

fn lots(energy_mmbtu: f64, lot_mmbtu: f64) -> u64 {
    (energy_mmbtu / lot_mmbtu).floor() as u64
}

/// Apply the rule to a pair of netbacks.
///
/// The hedge is sized from the energy delivered to Asia whatever the
/// decision, so a KEEP record still shows what a diversion would hedge.
pub fn decide(
    date: NaiveDate,
    netback_europe_usd: f64,
    netback_asia_usd: f64,
    asia_energy_mmbtu: f64,
    cost: &CostParams,
) -> Result<DecisionRecord, InputError> {
    cost.validate()?;
    ensure_finite("netback_europe_usd", netback_europe_usd)?;
    ensure_finite("netback_asia_usd", netback_asia_usd)?;

    let raw_uplift_usd = netback_asia_usd - netback_europe_usd;
    let adjusted_uplift_usd =
        adjusted_uplift(raw_uplift_usd, cost.basis_haircut, cost.ops_buffer_usd);

    Ok(DecisionRecord {
        date,
        netback_europe_usd,
        netback_asia_usd,
        raw_uplift_usd,
        adjusted_uplift_usd,
        decision: classify(adjusted_uplift_usd, cost.decision_buffer_usd),
        hedge: size_hedge(asia_energy_mmbtu, cost)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn worked_example_diverts() {
        let cost = CostParams {
            basis_haircut: 0.05,
            ops_buffer_usd: 250_000.0,
            decision_buffer_usd: 500_000.0,
            ..CostParams::default()
        };
        let rec = decide(day(), 126_800_000.0, 134_500_000.0, 4_000_000.0, &cost).unwrap();
        assert_eq!(rec.raw_uplift_usd, 7_700_000.0);
        assert!((rec.adjusted_uplift_usd - 7_065_000.0).abs() < 1e-6);
        assert_eq!(rec.decision, Decision::Divert);
    }

    #[test]
    fn exact_tie_diverts() {
        let cost = CostParams {
            basis_haircut: 0.5,
            ops_buffer_usd: 0.0,
            decision_buffer_usd: 500_000.0,
            ..CostParams::default()
        };
        let rec = decide(day(), 0.0, 1_000_000.0, 1.0, &cost).unwrap();
        assert_eq!(rec.adjusted_uplift_usd, 500_000.0);
        assert_eq!(rec.decision, Decision::Divert);
    }

    #[test]
    fn just_below_buffer_keeps() {
        assert_eq!(classify(499_999.99, 500_000.0), Decision::Keep);
    }

    #[test]
    fn negative_uplift_keeps() {
        let rec = decide(day(), 2_000_000.0, 1_000_000.0, 1.0, &CostParams::default()).unwrap();
        assert!(rec.adjusted_uplift_usd < 0.0);
        assert_eq!(rec.decision, Decision::Keep);
    }

    #[test]
    fn hedge_sizing_floors() {
        let cost = CostParams {
            coverage: 0.80,
            ..CostParams::default()
        };
        let hedge = size_hedge(4_062_378.0, &cost).unwrap();
        assert!((hedge.hedge_energy_mmbtu - 3_249_902.4).abs() < 1e-6);
        assert_eq!(hedge.jkm_lots, 324);
        assert_eq!(hedge.ttf_lots, 324);
    }

    #[test]
    fn lot_sizes_differ_per_leg() {
        let cost = CostParams {
            coverage: 1.0,
            jkm_lot_mmbtu: 10_000.0,
            ttf_lot_mmbtu: 25_000.0,
            ..CostParams::default()
        };
        let hedge = size_hedge(100_000.0, &cost).unwrap();
        assert_eq!(hedge.jkm_lots, 10);
        assert_eq!(hedge.ttf_lots, 4);
    }

    #[test]
    fn hedge_computed_on_keep() {
        let rec = decide(day(), 10.0, 0.0, 1_000_000.0, &CostParams::default()).unwrap();
        assert_eq!(rec.decision, Decision::Keep);
        assert_eq!(rec.hedge.jkm_lots, 80);
    }

    #[test]
    fn zero_coverage_zero_lots() {
        let cost = CostParams {
            coverage: 0.0,
            ..CostParams::default()
        };
        assert_eq!(size_hedge(5_000_000.0, &cost).unwrap().jkm_lots, 0);
    }

    #[test]
    fn invalid_params_rejected() {
        let cost = CostParams {
            basis_haircut: 1.5,
            ..CostParams::default()
        };
        assert!(decide(day(), 0.0, 1.0, 1.0, &cost).is_err());
    }

    #[test]
    fn non_finite_netback_rejected() {
        assert!(decide(day(), f64::INFINITY, 1.0, 1.0, &CostParams::default()).is_err());
    }
}
