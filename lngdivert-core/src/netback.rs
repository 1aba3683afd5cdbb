//! Netback calculator: revenue and cost breakdown for one laden leg.

use crate::domain::{
    CostParams, Destination, MarketSnapshot, RoutePair, RouteSpec, VesselSpec, VoyageResult,
};
use crate::error::EngineError;
use crate::physics;

/// Compute the netback of sailing `vessel` along `route` to `destination`.
///
/// Every input is validated here; nothing is defaulted. Canal and port costs
/// are zero in this model.
pub fn compute_voyage(
    destination: Destination,
    vessel: &VesselSpec,
    route: &RouteSpec,
    market: &MarketSnapshot,
    cost: &CostParams,
) -> Result<VoyageResult, EngineError> {
    vessel.validate()?;
    route.validate()?;
    market.validate()?;
    cost.validate()?;

    let leg = physics::laden_leg(vessel, route.distance_nm, &cost.physics)?;

    let fuel_consumed_t = vessel.fuel_consumption_tpd_laden * leg.voyage_days;
    let fuel_cost_usd = fuel_consumed_t * market.fuel.value;
    let charter_cost_usd = market.freight.value * leg.voyage_days;
    let carbon_emissions_tco2 = fuel_consumed_t * cost.co2_factor();
    let carbon_cost_usd = carbon_emissions_tco2 * market.eua.value;
    let total_cost_usd = fuel_cost_usd + charter_cost_usd + carbon_cost_usd;

    let price_usd_mmbtu = market.price_for(destination);
    let revenue_usd = price_usd_mmbtu * leg.delivered_energy_mmbtu;

    Ok(VoyageResult {
        destination,
        discharge_port: route.discharge_port.clone(),
        distance_nm: route.distance_nm,
        voyage_days: leg.voyage_days,
        boil_off_m3: leg.boil_off_m3,
        delivered_m3: leg.delivered_m3,
        delivered_energy_mmbtu: leg.delivered_energy_mmbtu,
        fuel_consumed_t,
        carbon_emissions_tco2,
        fuel_cost_usd,
        charter_cost_usd,
        carbon_cost_usd,
        total_cost_usd,
        price_usd_mmbtu,
        revenue_usd,
        netback_usd: revenue_usd - total_cost_usd,
    })
}

/// Europe and Asia voyages for the same cargo on the same date.
pub fn compare_netbacks(
    vessel: &VesselSpec,
    routes: &RoutePair,
    market: &MarketSnapshot,
    cost: &CostParams,
) -> Result<(VoyageResult, VoyageResult), EngineError> {
    routes.validate()?;
    let europe = compute_voyage(Destination::Europe, vessel, &routes.europe, market, cost)?;
    let asia = compute_voyage(Destination::Asia, vessel, &routes.asia, market, cost)?;
    Ok((europe, asia))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::golden_snapshot;
    use crate::domain::route::gulf_pair;
    use crate::domain::vessel::tfde;
    use crate::domain::Quote;
    use crate::error::InputError;

    fn asia(market: &MarketSnapshot) -> VoyageResult {
        compute_voyage(
            Destination::Asia,
            &tfde(),
            &gulf_pair().asia,
            market,
            &CostParams::default(),
        )
        .unwrap()
    }

    #[test]
    fn cost_breakdown_sums() {
        let v = asia(&golden_snapshot());
        assert!((v.total_cost_usd - (v.fuel_cost_usd + v.charter_cost_usd + v.carbon_cost_usd)).abs() < 1e-6);
        assert!((v.netback_usd - (v.revenue_usd - v.total_cost_usd)).abs() < 1e-6);
    }

    #[test]
    fn asia_components_match_hand_calculation() {
        let v = asia(&golden_snapshot());
        let days = 9_500.0 / (19.5 * 24.0);
        let fuel_t = 130.0 * days;
        assert!((v.fuel_consumed_t - fuel_t).abs() < 1e-9);
        assert!((v.fuel_cost_usd - fuel_t * 583.0).abs() < 1e-6);
        assert!((v.charter_cost_usd - 85_000.0 * days).abs() < 1e-6);
        assert!((v.carbon_emissions_tco2 - fuel_t * 3.114).abs() < 1e-9);
        assert!((v.carbon_cost_usd - fuel_t * 3.114 * 74.40).abs() < 1e-6);
        assert_eq!(v.price_usd_mmbtu, 38.44);
    }

    #[test]
    fn europe_prices_at_ttf() {
        let v = compute_voyage(
            Destination::Europe,
            &tfde(),
            &gulf_pair().europe,
            &golden_snapshot(),
            &CostParams::default(),
        )
        .unwrap();
        assert_eq!(v.price_usd_mmbtu, 35.69);
        assert_eq!(v.discharge_port, "Rotterdam");
    }

    #[test]
    fn golden_asia_beats_europe() {
        let (eu, asia) = compare_netbacks(
            &tfde(),
            &gulf_pair(),
            &golden_snapshot(),
            &CostParams::default(),
        )
        .unwrap();
        assert!(asia.netback_usd > eu.netback_usd);
        assert!(asia.netback_usd - eu.netback_usd > 100_000.0);
    }

    #[test]
    fn higher_jkm_raises_asia_netback() {
        let base = golden_snapshot();
        let bumped = MarketSnapshot {
            jkm: base.jkm.shifted(1.0),
            ..base.clone()
        };
        assert!(asia(&bumped).netback_usd > asia(&base).netback_usd);
    }

    #[test]
    fn negative_price_is_input_error() {
        let market = MarketSnapshot {
            fuel: Quote::real(-5.0),
            ..golden_snapshot()
        };
        let err = compute_voyage(
            Destination::Asia,
            &tfde(),
            &gulf_pair().asia,
            &market,
            &CostParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Input(InputError::Negative { .. })));
    }

    #[test]
    fn nan_price_is_input_error() {
        let market = MarketSnapshot {
            jkm: Quote::real(f64::NAN),
            ..golden_snapshot()
        };
        let err = compute_voyage(
            Destination::Asia,
            &tfde(),
            &gulf_pair().asia,
            &market,
            &CostParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Input(InputError::NonFinite { .. })));
    }

    #[test]
    fn lng_fuel_lowers_carbon_cost() {
        let lng = CostParams {
            fuel_type: crate::domain::FuelType::Lng,
            ..CostParams::default()
        };
        let v = compute_voyage(
            Destination::Asia,
            &tfde(),
            &gulf_pair().asia,
            &golden_snapshot(),
            &lng,
        )
        .unwrap();
        assert!(v.carbon_cost_usd < asia(&golden_snapshot()).carbon_cost_usd);
    }
}
