//! Synthetic market history for development, tests and benches.
//!
//! TTF follows a multiplicative random walk. JKM is TTF plus a premium that
//! mean-reverts towards a seasonal target: wider in the northern winter,
//! tighter in summer. Freight, fuel and EUA are independent walks. Weekends
//! are skipped. Every generated price is tagged `proxy`.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use lngdivert_core::domain::{MarketSeries, MarketSnapshot, Quote};
use lngdivert_core::error::{
    ensure_finite, ensure_non_negative, ensure_positive, ensure_unit_interval,
};
use lngdivert_core::InputError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticSpec {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub seed: u64,
    pub ttf_start: f64,
    /// Mean JKM premium over TTF, USD/MMBtu.
    pub premium_mean: f64,
    /// Half the winter/summer swing in the premium target.
    pub premium_seasonal_amplitude: f64,
    /// Fraction of the gap to target closed each day.
    pub premium_reversion: f64,
    pub premium_noise: f64,
    pub freight_start: f64,
    pub fuel_start: f64,
    pub eua_start: f64,
}

impl SyntheticSpec {
    pub fn new(start: NaiveDate, end: NaiveDate, seed: u64) -> Self {
        Self {
            start,
            end,
            seed,
            ttf_start: 35.0,
            premium_mean: 1.5,
            premium_seasonal_amplitude: 1.5,
            premium_reversion: 0.1,
            premium_noise: 0.35,
            freight_start: 80_000.0,
            fuel_start: 580.0,
            eua_start: 75.0,
        }
    }

    /// Reject parameters the walks cannot sample from.
    pub fn validate(&self) -> Result<(), InputError> {
        ensure_positive("ttf_start", self.ttf_start)?;
        ensure_positive("freight_start", self.freight_start)?;
        ensure_positive("fuel_start", self.fuel_start)?;
        ensure_positive("eua_start", self.eua_start)?;
        ensure_finite("premium_mean", self.premium_mean)?;
        ensure_finite("premium_seasonal_amplitude", self.premium_seasonal_amplitude)?;
        ensure_unit_interval("premium_reversion", self.premium_reversion)?;
        ensure_non_negative("premium_noise", self.premium_noise)?;
        Ok(())
    }
}

/// Seasonal premium target. Peaks mid-January, troughs mid-July.
fn seasonal_target(spec: &SyntheticSpec, date: NaiveDate) -> f64 {
    let phase = (date.ordinal0() as f64 - 14.0) / 365.25 * std::f64::consts::TAU;
    spec.premium_mean + spec.premium_seasonal_amplitude * phase.cos()
}

fn walk(rng: &mut StdRng, value: f64, vol: f64, floor: f64) -> f64 {
    (value * (1.0 + rng.gen_range(-vol..vol))).max(floor)
}

pub fn generate(spec: &SyntheticSpec) -> Result<MarketSeries, InputError> {
    spec.validate()?;

    // Seed through BLAKE3 so nearby seeds give unrelated streams.
    let seed: [u8; 32] = *blake3::hash(&spec.seed.to_le_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut ttf = spec.ttf_start;
    let mut premium = seasonal_target(spec, spec.start);
    let mut freight = spec.freight_start;
    let mut fuel = spec.fuel_start;
    let mut eua = spec.eua_start;

    let mut snapshots = Vec::new();
    let mut next = Some(spec.start);
    while let Some(current) = next.filter(|d| *d <= spec.end) {
        next = current.succ_opt();
        if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }

        ttf = walk(&mut rng, ttf, 0.025, 1.0);
        let target = seasonal_target(spec, current);
        premium += spec.premium_reversion * (target - premium)
            + rng.gen_range(-spec.premium_noise..=spec.premium_noise);
        freight = walk(&mut rng, freight, 0.04, 5_000.0);
        fuel = walk(&mut rng, fuel, 0.015, 100.0);
        eua = walk(&mut rng, eua, 0.02, 5.0);

        snapshots.push(MarketSnapshot::new(
            current,
            Quote::proxy(ttf),
            Quote::proxy((ttf + premium).max(0.0)),
            Quote::proxy(freight),
            Quote::proxy(fuel),
            Quote::proxy(eua),
        )?);
    }

    MarketSeries::new(snapshots)
}
