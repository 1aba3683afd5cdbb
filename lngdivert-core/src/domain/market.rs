//! Market snapshots and the ordered series the backtest replays.
//!
//! Every price carries a [`Provenance`] tag. Provenance is reporting metadata
//! only: nothing in the netback or decision path branches on it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::route::Destination;
use crate::error::{ensure_non_negative, InputError};

/// Where a price came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    #[default]
    Real,
    Proxy,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Real => write!(f, "real"),
            Provenance::Proxy => write!(f, "proxy"),
        }
    }
}

impl std::str::FromStr for Provenance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "real" => Ok(Provenance::Real),
            "proxy" => Ok(Provenance::Proxy),
            other => Err(format!("unknown provenance '{other}' (expected real|proxy)")),
        }
    }
}

/// A price value tagged with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub value: f64,
    pub provenance: Provenance,
}

impl Quote {
    pub fn real(value: f64) -> Self {
        Self {
            value,
            provenance: Provenance::Real,
        }
    }

    pub fn proxy(value: f64) -> Self {
        Self {
            value,
            provenance: Provenance::Proxy,
        }
    }

    /// Same provenance, shifted value.
    pub fn shifted(self, delta: f64) -> Self {
        Self {
            value: self.value + delta,
            provenance: self.provenance,
        }
    }
}

/// The five market inputs of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketField {
    Ttf,
    Jkm,
    Freight,
    Fuel,
    Eua,
}

impl MarketField {
    pub const ALL: [MarketField; 5] = [
        MarketField::Ttf,
        MarketField::Jkm,
        MarketField::Freight,
        MarketField::Fuel,
        MarketField::Eua,
    ];

    /// Column name used by market-history CSV files.
    pub fn column(self) -> &'static str {
        match self {
            MarketField::Ttf => "TTF_USD_MMBTU",
            MarketField::Jkm => "JKM_USD_MMBTU",
            MarketField::Freight => "FREIGHT_USD_DAY",
            MarketField::Fuel => "FUEL_USD_PER_T",
            MarketField::Eua => "EUA_USD_PER_TCO2",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MarketField::Ttf => "TTF",
            MarketField::Jkm => "JKM",
            MarketField::Freight => "FREIGHT",
            MarketField::Fuel => "FUEL",
            MarketField::Eua => "EUA",
        }
    }
}

/// Dated market inputs for one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub date: NaiveDate,
    /// TTF, USD/MMBtu.
    pub ttf: Quote,
    /// JKM, USD/MMBtu.
    pub jkm: Quote,
    /// Time-charter rate, USD/day.
    pub freight: Quote,
    /// Bunker fuel, USD/tonne.
    pub fuel: Quote,
    /// EU allowance, USD/tCO2.
    pub eua: Quote,
}

impl MarketSnapshot {
    pub fn new(
        date: NaiveDate,
        ttf: Quote,
        jkm: Quote,
        freight: Quote,
        fuel: Quote,
        eua: Quote,
    ) -> Result<Self, InputError> {
        let snapshot = Self {
            date,
            ttf,
            jkm,
            freight,
            fuel,
            eua,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn validate(&self) -> Result<(), InputError> {
        ensure_non_negative("ttf_usd_mmbtu", self.ttf.value)?;
        ensure_non_negative("jkm_usd_mmbtu", self.jkm.value)?;
        ensure_non_negative("freight_usd_day", self.freight.value)?;
        ensure_non_negative("fuel_usd_per_t", self.fuel.value)?;
        ensure_non_negative("eua_usd_per_tco2", self.eua.value)?;
        Ok(())
    }

    pub fn quote(&self, field: MarketField) -> Quote {
        match field {
            MarketField::Ttf => self.ttf,
            MarketField::Jkm => self.jkm,
            MarketField::Freight => self.freight,
            MarketField::Fuel => self.fuel,
            MarketField::Eua => self.eua,
        }
    }

    /// Sale price at a destination, USD/MMBtu.
    pub fn price_for(&self, destination: Destination) -> f64 {
        match destination {
            Destination::Europe => self.ttf.value,
            Destination::Asia => self.jkm.value,
        }
    }

    /// JKM − TTF, USD/MMBtu.
    pub fn spread(&self) -> f64 {
        self.jkm.value - self.ttf.value
    }

    pub fn has_proxy(&self) -> bool {
        MarketField::ALL
            .iter()
            .any(|f| self.quote(*f).provenance == Provenance::Proxy)
    }
}

/// Market snapshots in strictly ascending date order.
///
/// Deserialization goes through [`MarketSeries::new`], so a decoded series
/// upholds the same ordering guarantee as a constructed one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries")]
pub struct MarketSeries {
    snapshots: Vec<MarketSnapshot>,
}

#[derive(Deserialize)]
struct RawSeries {
    snapshots: Vec<MarketSnapshot>,
}

impl TryFrom<RawSeries> for MarketSeries {
    type Error = InputError;

    fn try_from(raw: RawSeries) -> Result<Self, Self::Error> {
        Self::new(raw.snapshots)
    }
}

impl MarketSeries {
    /// Validate ordering, uniqueness and prices. Gaps between dates are fine.
    pub fn new(snapshots: Vec<MarketSnapshot>) -> Result<Self, InputError> {
        for snapshot in &snapshots {
            snapshot.validate()?;
        }
        for w in snapshots.windows(2) {
            let (previous, current) = (w[0].date, w[1].date);
            if current == previous {
                return Err(InputError::DuplicateDate { date: current });
            }
            if current < previous {
                return Err(InputError::OutOfOrder { previous, current });
            }
        }
        Ok(Self { snapshots })
    }

    pub fn as_slice(&self) -> &[MarketSnapshot] {
        &self.snapshots
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MarketSnapshot> {
        self.snapshots.iter()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.snapshots.first().map(|s| s.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.snapshots.last().map(|s| s.date)
    }

    pub fn get(&self, date: NaiveDate) -> Option<&MarketSnapshot> {
        self.snapshots
            .binary_search_by_key(&date, |s| s.date)
            .ok()
            .map(|i| &self.snapshots[i])
    }
}

impl<'a> IntoIterator for &'a MarketSeries {
    type Item = &'a MarketSnapshot;
    type IntoIter = std::slice::Iter<'a, MarketSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}

#[cfg(test)]
pub(crate) fn golden_snapshot() -> MarketSnapshot {
    MarketSnapshot {
        date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        ttf: Quote::real(35.69),
        jkm: Quote::proxy(38.44),
        freight: Quote::proxy(85_000.0),
        fuel: Quote::proxy(583.0),
        eua: Quote::real(74.40),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32) -> MarketSnapshot {
        MarketSnapshot {
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            ..golden_snapshot()
        }
    }

    #[test]
    fn spread_is_jkm_minus_ttf() {
        assert!((golden_snapshot().spread() - 2.75).abs() < 1e-9);
    }

    #[test]
    fn new_rejects_negative_price() {
        let s = golden_snapshot();
        let err = MarketSnapshot::new(s.date, Quote::real(-1.0), s.jkm, s.freight, s.fuel, s.eua)
            .unwrap_err();
        assert!(matches!(
            err,
            InputError::Negative {
                field: "ttf_usd_mmbtu",
                ..
            }
        ));
    }

    #[test]
    fn series_accepts_gaps() {
        let series = MarketSeries::new(vec![at(2), at(3), at(9)]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.first_date(), NaiveDate::from_ymd_opt(2025, 1, 2));
        assert_eq!(series.last_date(), NaiveDate::from_ymd_opt(2025, 1, 9));
    }

    #[test]
    fn series_rejects_out_of_order() {
        let err = MarketSeries::new(vec![at(3), at(2)]).unwrap_err();
        assert!(matches!(err, InputError::OutOfOrder { .. }));
    }

    #[test]
    fn series_rejects_duplicates() {
        let err = MarketSeries::new(vec![at(3), at(3)]).unwrap_err();
        assert!(matches!(err, InputError::DuplicateDate { .. }));
    }

    #[test]
    fn deserialized_series_is_validated() {
        let ok = MarketSeries::new(vec![at(2), at(5)]).unwrap();
        let json = serde_json::to_string(&ok).unwrap();
        let back: MarketSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ok);

        let bad = json.replace("2025-01-02", "2025-01-07");
        let err = serde_json::from_str::<MarketSeries>(&bad).unwrap_err();
        assert!(err.to_string().contains("2025-01-07"));

        let dup = json.replace("2025-01-02", "2025-01-05");
        assert!(serde_json::from_str::<MarketSeries>(&dup).is_err());
    }

    #[test]
    fn series_lookup_by_date() {
        let series = MarketSeries::new(vec![at(2), at(5), at(9)]).unwrap();
        assert!(series.get(NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()).is_some());
        assert!(series.get(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()).is_none());
    }

    #[test]
    fn provenance_parses_case_insensitive() {
        assert_eq!("PROXY".parse::<Provenance>().unwrap(), Provenance::Proxy);
        assert_eq!(" real ".parse::<Provenance>().unwrap(), Provenance::Real);
        assert!("estimated".parse::<Provenance>().is_err());
    }

    #[test]
    fn shifted_quote_keeps_provenance() {
        let q = Quote::proxy(10.0).shifted(-2.5);
        assert_eq!(q.value, 7.5);
        assert_eq!(q.provenance, Provenance::Proxy);
    }

    #[test]
    fn has_proxy_detects_any_proxy_field() {
        assert!(golden_snapshot().has_proxy());
        let all_real = MarketSnapshot {
            jkm: Quote::real(38.44),
            freight: Quote::real(85_000.0),
            fuel: Quote::real(583.0),
            ..golden_snapshot()
        };
        assert!(!all_real.has_proxy());
    }
}
