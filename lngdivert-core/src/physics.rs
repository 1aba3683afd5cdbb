//! Unit conversion and physical model.
//!
//! Turns cargo volume, boil-off and sailing time into delivered energy.
//! Every function is pure; the only failure modes are a non-positive speed
//! (input error) and boil-off exceeding the cargo (physical infeasibility).

use serde::{Deserialize, Serialize};

use crate::domain::{PhysicalConstants, VesselSpec};
use crate::error::{
    ensure_non_negative, ensure_positive, EngineError, InputError, PhysicalInfeasibility,
};

pub const HOURS_PER_DAY: f64 = 24.0;

/// Sailing time in days: distance / (speed × 24).
///
/// Zero distance is zero days. A non-positive speed is an input error.
pub fn voyage_days(distance_nm: f64, speed_kn: f64) -> Result<f64, InputError> {
    ensure_non_negative("distance_nm", distance_nm)?;
    ensure_positive("speed_kn", speed_kn)?;
    Ok(distance_nm / (speed_kn * HOURS_PER_DAY))
}

/// Cargo lost to evaporation, m³. `rate_per_day` is a fraction, not a percent.
pub fn boil_off_m3(capacity_m3: f64, rate_per_day: f64, voyage_days: f64) -> f64 {
    capacity_m3 * rate_per_day * voyage_days
}

/// Volume left at discharge.
pub fn delivered_m3(
    capacity_m3: f64,
    boil_off_m3: f64,
    voyage_days: f64,
) -> Result<f64, PhysicalInfeasibility> {
    let delivered = capacity_m3 - boil_off_m3;
    if delivered < 0.0 {
        return Err(PhysicalInfeasibility {
            capacity_m3,
            boil_off_m3,
            voyage_days,
        });
    }
    Ok(delivered)
}

pub fn delivered_energy_mmbtu(delivered_m3: f64, physics: &PhysicalConstants) -> f64 {
    delivered_m3 * physics.mmbtu_per_m3()
}

/// Physical outcome of a laden leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CargoDelivery {
    pub voyage_days: f64,
    pub boil_off_m3: f64,
    pub delivered_m3: f64,
    pub delivered_energy_mmbtu: f64,
}

/// Sail a full cargo `distance_nm` at laden speed.
pub fn laden_leg(
    vessel: &VesselSpec,
    distance_nm: f64,
    physics: &PhysicalConstants,
) -> Result<CargoDelivery, EngineError> {
    let days = voyage_days(distance_nm, vessel.laden_speed_kn)?;
    let lost = boil_off_m3(
        vessel.cargo_capacity_m3,
        vessel.boil_off_rate_per_day(),
        days,
    );
    let delivered = delivered_m3(vessel.cargo_capacity_m3, lost, days)?;
    Ok(CargoDelivery {
        voyage_days: days,
        boil_off_m3: lost,
        delivered_m3: delivered,
        delivered_energy_mmbtu: delivered_energy_mmbtu(delivered, physics),
    })
}

/// Laden leg out, ballast leg back, in days. Reported in trade notes only.
pub fn round_trip_days(vessel: &VesselSpec, distance_nm: f64) -> Result<f64, InputError> {
    let laden = voyage_days(distance_nm, vessel.laden_speed_kn)?;
    let ballast = voyage_days(distance_nm, vessel.ballast_speed_kn)?;
    Ok(laden + ballast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vessel::tfde;

    #[test]
    fn asia_leg_days() {
        let days = voyage_days(9_500.0, 19.5).unwrap();
        assert!((days - 20.2991).abs() < 1e-3, "got {days}");
    }

    #[test]
    fn europe_leg_days() {
        let days = voyage_days(5_000.0, 19.5).unwrap();
        assert!((days - 10.684).abs() < 1e-3, "got {days}");
    }

    #[test]
    fn zero_distance_is_zero_days() {
        assert_eq!(voyage_days(0.0, 19.5), Ok(0.0));
    }

    #[test]
    fn zero_speed_is_input_error() {
        assert!(matches!(
            voyage_days(100.0, 0.0),
            Err(InputError::NonPositive {
                field: "speed_kn",
                ..
            })
        ));
    }

    #[test]
    fn negative_distance_is_input_error() {
        assert!(voyage_days(-1.0, 19.5).is_err());
    }

    #[test]
    fn golden_asia_boil_off() {
        let leg = laden_leg(&tfde(), 9_500.0, &PhysicalConstants::default()).unwrap();
        assert!((leg.boil_off_m3 - 3_532.05).abs() < 0.1, "got {}", leg.boil_off_m3);
        assert!((leg.delivered_m3 - 170_467.95).abs() < 0.1);
        assert!((leg.delivered_energy_mmbtu - leg.delivered_m3 * 23.4).abs() < 1e-6);
    }

    #[test]
    fn golden_europe_boil_off() {
        let leg = laden_leg(&tfde(), 5_000.0, &PhysicalConstants::default()).unwrap();
        assert!((leg.boil_off_m3 - 1_859.0).abs() < 0.5, "got {}", leg.boil_off_m3);
    }

    #[test]
    fn zero_distance_delivers_full_cargo() {
        let leg = laden_leg(&tfde(), 0.0, &PhysicalConstants::default()).unwrap();
        assert_eq!(leg.boil_off_m3, 0.0);
        assert_eq!(leg.delivered_m3, 174_000.0);
    }

    #[test]
    fn boil_off_exceeding_cargo_is_infeasible() {
        // ~1068 days at 0.1 %/day
        let err = laden_leg(&tfde(), 500_000.0, &PhysicalConstants::default()).unwrap_err();
        assert!(err.is_physical());
    }

    #[test]
    fn delivered_exactly_zero_is_feasible() {
        assert_eq!(delivered_m3(100.0, 100.0, 1.0), Ok(0.0));
    }

    #[test]
    fn round_trip_sums_both_legs() {
        let mut v = tfde();
        v.ballast_speed_kn = 17.0;
        let rt = round_trip_days(&v, 5_000.0).unwrap();
        let expected = 5_000.0 / (19.5 * 24.0) + 5_000.0 / (17.0 * 24.0);
        assert!((rt - expected).abs() < 1e-9);
    }
}
