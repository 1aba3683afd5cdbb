//! VesselSpec: immutable per-class vessel reference data.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive, InputError};

/// Physical and consumption characteristics of an LNG carrier class.
///
/// Field names match the `vessels.csv` header so rows deserialize directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselSpec {
    pub vessel_class: String,
    pub cargo_capacity_m3: f64,
    pub laden_speed_kn: f64,
    pub ballast_speed_kn: f64,
    /// Daily boil-off as a percentage of cargo volume (0.10 = 0.10 %/day).
    pub boil_off_pct_per_day: f64,
    pub fuel_consumption_tpd_laden: f64,
    pub fuel_consumption_tpd_ballast: f64,
}

impl VesselSpec {
    pub fn validate(&self) -> Result<(), InputError> {
        if self.vessel_class.trim().is_empty() {
            return Err(InputError::MissingField {
                field: "vessel_class".into(),
                date: None,
            });
        }
        ensure_positive("cargo_capacity_m3", self.cargo_capacity_m3)?;
        ensure_positive("laden_speed_kn", self.laden_speed_kn)?;
        ensure_positive("ballast_speed_kn", self.ballast_speed_kn)?;
        ensure_non_negative("boil_off_pct_per_day", self.boil_off_pct_per_day)?;
        ensure_non_negative("fuel_consumption_tpd_laden", self.fuel_consumption_tpd_laden)?;
        ensure_non_negative(
            "fuel_consumption_tpd_ballast",
            self.fuel_consumption_tpd_ballast,
        )?;
        Ok(())
    }

    /// Boil-off as a fraction of cargo volume per day.
    pub fn boil_off_rate_per_day(&self) -> f64 {
        self.boil_off_pct_per_day / 100.0
    }

    /// Copy of this spec with a different cargo size (CLI `--cargo-m3`).
    pub fn with_capacity(&self, cargo_capacity_m3: f64) -> Self {
        Self {
            cargo_capacity_m3,
            ..self.clone()
        }
    }
}

#[cfg(test)]
pub(crate) fn tfde() -> VesselSpec {
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
