//! DecisionRecord and hedge instruction types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::route::Benchmark;

/// Outcome of the diversion rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Divert,
    Keep,
}

impl Decision {
    pub fn is_divert(self) -> bool {
        self == Decision::Divert
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Divert => write!(f, "DIVERT"),
            Decision::Keep => write!(f, "KEEP"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LegSide {
    Buy,
    Sell,
}

impl fmt::Display for LegSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegSide::Buy => write!(f, "BUY"),
            LegSide::Sell => write!(f, "SELL"),
        }
    }
}

/// One futures leg of the spread hedge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HedgeLeg {
    pub side: LegSide,
    pub benchmark: Benchmark,
    pub lots: u64,
}

impl fmt::Display for HedgeLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} lots", self.side, self.benchmark, self.lots)
    }
}

/// Hedge sizing for the JKM/TTF spread. Computed for every evaluation;
/// only acted upon when the decision is DIVERT.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HedgeInstruction {
    pub hedge_energy_mmbtu: f64,
    pub jkm_lots: u64,
    pub ttf_lots: u64,
}

impl HedgeInstruction {
    /// Legs oriented by the decision: a diversion goes long JKM / short TTF,
    /// keeping the cargo in Europe takes the opposite side.
    pub fn legs(&self, decision: Decision) -> [HedgeLeg; 2] {
        match decision {
            Decision::Divert => [
                HedgeLeg {
                    side: LegSide::Buy,
                    benchmark: Benchmark::Jkm,
                    lots: self.jkm_lots,
                },
                HedgeLeg {
                    side: LegSide::Sell,
                    benchmark: Benchmark::Ttf,
                    lots: self.ttf_lots,
                },
            ],
            Decision::Keep => [
                HedgeLeg {
                    side: LegSide::Buy,
                    benchmark: Benchmark::Ttf,
                    lots: self.ttf_lots,
                },
                HedgeLeg {
                    side: LegSide::Sell,
                    benchmark: Benchmark::Jkm,
                    lots: self.jkm_lots,
                },
            ],
        }
    }
}

/// The atomic unit of evaluation: one date, two netbacks, one decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub date: NaiveDate,
    pub netback_europe_usd: f64,
    pub netback_asia_usd: f64,
    pub raw_uplift_usd: f64,
    pub adjusted_uplift_usd: f64,
    pub decision: Decision,
    pub hedge: HedgeInstruction,
}

impl DecisionRecord {
    pub fn is_divert(&self) -> bool {
        self.decision.is_divert()
    }

    /// Conditional P&L contribution: adjusted uplift on DIVERT days, zero otherwise.
    pub fn pnl_usd(&self) -> f64 {
        if self.is_divert() {
            self.adjusted_uplift_usd
        } else {
            0.0
        }
    }

    pub fn hedge_legs(&self) -> [HedgeLeg; 2] {
        self.hedge.legs(self.decision)
    }
}
