//! CostParams: carbon factors, decision knobs and hedge sizing parameters.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ensure_non_negative, ensure_positive, ensure_unit_interval, InputError};

/// LNG liquid density, tonnes per m³.
pub const LNG_DENSITY_T_PER_M3: f64 = 0.45;

/// Energy content of LNG, MMBtu per tonne.
pub const ENERGY_CONTENT_MMBTU_PER_T: f64 = 52.0;

/// Standard TTF/JKM futures lot, MMBtu.
pub const DEFAULT_LOT_MMBTU: f64 = 10_000.0;

/// tCO₂ emitted per tonne of VLSFO burned.
pub const CO2_FACTOR_VLSFO: f64 = 3.114;

/// tCO₂ emitted per tonne of LNG burned as fuel.
pub const CO2_FACTOR_LNG: f64 = 2.750;

/// Fuel burned on the laden leg; selects the CO₂ factor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    #[default]
    Vlsfo,
    Lng,
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuelType::Vlsfo => write!(f, "VLSFO"),
            FuelType::Lng => write!(f, "LNG"),
        }
    }
}

/// Volume → energy conversion constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhysicalConstants {
    #[serde(default = "default_density")]
    pub lng_density_t_per_m3: f64,
    #[serde(default = "default_energy_content")]
    pub energy_content_mmbtu_per_t: f64,
}

fn default_density() -> f64 {
    LNG_DENSITY_T_PER_M3
}

fn default_energy_content() -> f64 {
    ENERGY_CONTENT_MMBTU_PER_T
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            lng_density_t_per_m3: LNG_DENSITY_T_PER_M3,
            energy_content_mmbtu_per_t: ENERGY_CONTENT_MMBTU_PER_T,
        }
    }
}

impl PhysicalConstants {
    /// MMBtu per m³ of liquid cargo.
    pub fn mmbtu_per_m3(&self) -> f64 {
        self.lng_density_t_per_m3 * self.energy_content_mmbtu_per_t
    }

    pub fn validate(&self) -> Result<(), InputError> {
        ensure_positive("lng_density_t_per_m3", self.lng_density_t_per_m3)?;
        ensure_positive("energy_content_mmbtu_per_t", self.energy_content_mmbtu_per_t)?;
        Ok(())
    }
}

/// CO₂ emission factors per fuel type, tCO₂ per tonne of fuel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarbonFactors {
    pub vlsfo_tco2_per_t: f64,
    pub lng_tco2_per_t: f64,
}

impl Default for CarbonFactors {
    fn default() -> Self {
        Self {
            vlsfo_tco2_per_t: CO2_FACTOR_VLSFO,
            lng_tco2_per_t: CO2_FACTOR_LNG,
        }
    }
}

impl CarbonFactors {
    pub fn factor(&self, fuel: FuelType) -> f64 {
        match fuel {
            FuelType::Vlsfo => self.vlsfo_tco2_per_t,
            FuelType::Lng => self.lng_tco2_per_t,
        }
    }
}

/// Everything the netback calculator and decision rule need beyond market data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostParams {
    pub fuel_type: FuelType,
    pub carbon: CarbonFactors,
    /// Fraction of raw uplift discounted for basis risk, in [0, 1].
    pub basis_haircut: f64,
    /// Fixed USD deduction for unmodeled delays and demurrage.
    pub ops_buffer_usd: f64,
    /// Minimum adjusted uplift (USD) that triggers a diversion.
    pub decision_buffer_usd: f64,
    /// Fraction of delivered energy hedged, in [0, 1].
    pub coverage: f64,
    pub ttf_lot_mmbtu: f64,
    pub jkm_lot_mmbtu: f64,
    pub physics: PhysicalConstants,
}

impl Default for CostParams {
    fn default() -> Self {
        Self {
            fuel_type: FuelType::Vlsfo,
            carbon: CarbonFactors::default(),
            basis_haircut: 0.05,
            ops_buffer_usd: 150_000.0,
            decision_buffer_usd: 250_000.0,
            coverage: 0.80,
            ttf_lot_mmbtu: DEFAULT_LOT_MMBTU,
            jkm_lot_mmbtu: DEFAULT_LOT_MMBTU,
            physics: PhysicalConstants::default(),
        }
    }
}

impl CostParams {
    pub fn validate(&self) -> Result<(), InputError> {
        ensure_non_negative("co2_factor_vlsfo", self.carbon.vlsfo_tco2_per_t)?;
        ensure_non_negative("co2_factor_lng", self.carbon.lng_tco2_per_t)?;
        ensure_unit_interval("basis_haircut", self.basis_haircut)?;
        ensure_non_negative("ops_buffer_usd", self.ops_buffer_usd)?;
        ensure_non_negative("decision_buffer_usd", self.decision_buffer_usd)?;
        ensure_unit_interval("coverage", self.coverage)?;
        ensure_positive("ttf_lot_mmbtu", self.ttf_lot_mmbtu)?;
        ensure_positive("jkm_lot_mmbtu", self.jkm_lot_mmbtu)?;
        self.physics.validate()?;
        Ok(())
    }

    /// CO₂ factor for the configured fuel type.
    pub fn co2_factor(&self) -> f64 {
        self.carbon.factor(self.fuel_type)
    }
}
