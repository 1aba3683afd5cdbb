//! VoyageResult: derived physical and financial outcome of one laden leg.

use serde::{Deserialize, Serialize};

use super::route::Destination;

/// Netback and its full cost breakdown for one destination on one date.
///
/// Built once by the netback calculator and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoyageResult {
    pub destination: Destination,
    pub discharge_port: String,

    // ── Physics ──
    pub distance_nm: f64,
    pub voyage_days: f64,
    pub boil_off_m3: f64,
    pub delivered_m3: f64,
    pub delivered_energy_mmbtu: f64,
    pub fuel_consumed_t: f64,
    pub carbon_emissions_tco2: f64,

    // ── Costs ──
    pub fuel_cost_usd: f64,
    pub charter_cost_usd: f64,
    pub carbon_cost_usd: f64,
    pub total_cost_usd: f64,

    // ── Revenue ──
    pub price_usd_mmbtu: f64,
    pub revenue_usd: f64,
    pub netback_usd: f64,
}

impl VoyageResult {
    /// Voyage cost excluding carbon.
    pub fn voyage_cost_ex_carbon_usd(&self) -> f64 {
        self.fuel_cost_usd + self.charter_cost_usd
    }
}
