//! Typed engine configuration.
//!
//! Two on-disk forms map into the same [`EngineConfig`]:
//! - TOML with one table per concern (`[decision]`, `[hedge]`, ...). Unknown
//!   keys are rejected by serde.
//! - A legacy `param,value` CSV with upper-case keys, mapped field by field.
//!
//! Either way the result is validated before anything reads it, and CLI
//! overrides go through [`EngineConfig::with_overrides`], which re-validates.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lngdivert_core::domain::cost::{CO2_FACTOR_LNG, CO2_FACTOR_VLSFO, DEFAULT_LOT_MMBTU};
use lngdivert_core::domain::{
    CarbonFactors, CostParams, FuelType, MarketSnapshot, PhysicalConstants, Quote,
};
use lngdivert_core::stress::StressShocks;
use lngdivert_core::InputError;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid parameter CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("unknown config key '{0}'")]
    UnknownKey(String),
    #[error("missing required config key(s): {}", .0.join(", "))]
    MissingKeys(Vec<String>),
    #[error("duplicate config key '{0}'")]
    DuplicateKey(String),
    #[error("config key '{key}' has non-numeric value '{value}'")]
    NotANumber { key: String, value: String },
    #[error("config key '{key}' has invalid value '{value}'")]
    InvalidValue { key: String, value: String },
    #[error("invalid config: {0}")]
    Invalid(#[from] InputError),
}

// ─── Sections ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecisionSection {
    pub basis_haircut: f64,
    pub ops_buffer_usd: f64,
    pub decision_buffer_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HedgeSection {
    pub coverage: f64,
    #[serde(default = "default_lot")]
    pub ttf_lot_mmbtu: f64,
    #[serde(default = "default_lot")]
    pub jkm_lot_mmbtu: f64,
}

fn default_lot() -> f64 {
    DEFAULT_LOT_MMBTU
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CarbonSection {
    #[serde(default)]
    pub fuel_type: FuelType,
    #[serde(default = "default_vlsfo")]
    pub co2_factor_vlsfo: f64,
    #[serde(default = "default_lng")]
    pub co2_factor_lng: f64,
}

fn default_vlsfo() -> f64 {
    CO2_FACTOR_VLSFO
}

fn default_lng() -> f64 {
    CO2_FACTOR_LNG
}

impl Default for CarbonSection {
    fn default() -> Self {
        Self {
            fuel_type: FuelType::Vlsfo,
            co2_factor_vlsfo: CO2_FACTOR_VLSFO,
            co2_factor_lng: CO2_FACTOR_LNG,
        }
    }
}

/// Which cargo, from where, to where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoyageSection {
    pub load_port: String,
    pub europe_port: String,
    pub asia_port: String,
    pub vessel_class: String,
    /// Replaces the vessel class capacity when set.
    #[serde(default)]
    pub cargo_capacity_m3: Option<f64>,
}

impl Default for VoyageSection {
    fn default() -> Self {
        Self {
            load_port: "US_Gulf".into(),
            europe_port: "Rotterdam".into(),
            asia_port: "Tokyo".into(),
            vessel_class: "TFDE".into(),
            cargo_capacity_m3: None,
        }
    }
}

/// Offline proxy snapshot. Every price it produces is tagged `proxy`.
///
/// JKM is taken verbatim when given, otherwise TTF plus the premium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProxyMarketSection {
    pub ttf_usd_mmbtu: f64,
    #[serde(default)]
    pub jkm_usd_mmbtu: Option<f64>,
    #[serde(default)]
    pub jkm_premium_usd_mmbtu: f64,
    pub freight_usd_day: f64,
    #[serde(default = "default_multiplier")]
    pub freight_regime_multiplier: f64,
    pub fuel_usd_per_t: f64,
    pub eua_usd_per_tco2: f64,
}

fn default_multiplier() -> f64 {
    1.0
}

impl ProxyMarketSection {
    pub fn jkm(&self) -> f64 {
        self.jkm_usd_mmbtu
            .unwrap_or(self.ttf_usd_mmbtu + self.jkm_premium_usd_mmbtu)
    }

    pub fn snapshot(&self, date: NaiveDate) -> Result<MarketSnapshot, InputError> {
        MarketSnapshot::new(
            date,
            Quote::proxy(self.ttf_usd_mmbtu),
            Quote::proxy(self.jkm()),
            Quote::proxy(self.freight_usd_day * self.freight_regime_multiplier),
            Quote::proxy(self.fuel_usd_per_t),
            Quote::proxy(self.eua_usd_per_tco2),
        )
    }
}

// ─── EngineConfig ───────────────────────────────────────────────────

/// The complete, validated configuration for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    pub decision: DecisionSection,
    pub hedge: HedgeSection,
    #[serde(default)]
    pub carbon: CarbonSection,
    #[serde(default)]
    pub physics: PhysicalConstants,
    #[serde(default)]
    pub stress: StressShocks,
    #[serde(default)]
    pub voyage: VoyageSection,
    #[serde(default)]
    pub market: Option<ProxyMarketSection>,
}

/// Per-field overrides from the command line. `None` keeps the file value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub basis_haircut: Option<f64>,
    pub ops_buffer_usd: Option<f64>,
    pub decision_buffer_usd: Option<f64>,
    pub coverage: Option<f64>,
    pub stress_spread_usd_mmbtu: Option<f64>,
    pub stress_freight_usd_day: Option<f64>,
    pub stress_eua_usd_per_tco2: Option<f64>,
    pub cargo_capacity_m3: Option<f64>,
    pub vessel_class: Option<String>,
    pub load_port: Option<String>,
    pub europe_port: Option<String>,
    pub asia_port: Option<String>,
}

impl EngineConfig {
    /// Load from disk. `.csv` files use the legacy key/value format,
    /// everything else is parsed as TOML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            Self::from_param_csv(&content)
        } else {
            Self::from_toml(&content)
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse the legacy `param,value` format.
    pub fn from_param_csv(content: &str) -> Result<Self, ConfigError> {
        let params = read_params(content)?;
        let config = legacy::map(params)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cost_params().validate()?;
        self.stress.validate()?;
        if let Some(capacity) = self.voyage.cargo_capacity_m3 {
            if !(capacity.is_finite() && capacity > 0.0) {
                return Err(InputError::NonPositive {
                    field: "voyage.cargo_capacity_m3",
                    value: capacity,
                }
                .into());
            }
        }
        for (key, port) in [
            ("voyage.load_port", &self.voyage.load_port),
            ("voyage.europe_port", &self.voyage.europe_port),
            ("voyage.asia_port", &self.voyage.asia_port),
            ("voyage.vessel_class", &self.voyage.vessel_class),
        ] {
            if port.trim().is_empty() {
                return Err(ConfigError::MissingKeys(vec![key.to_string()]));
            }
        }
        if let Some(market) = &self.market {
            if !(market.freight_regime_multiplier.is_finite()
                && market.freight_regime_multiplier >= 0.0)
            {
                return Err(ConfigError::InvalidValue {
                    key: "market.freight_regime_multiplier".into(),
                    value: market.freight_regime_multiplier.to_string(),
                });
            }
            // A placeholder date is enough to run the price checks.
            market.snapshot(NaiveDate::MIN)?;
        }
        Ok(())
    }

    pub fn cost_params(&self) -> CostParams {
        CostParams {
            fuel_type: self.carbon.fuel_type,
            carbon: CarbonFactors {
                vlsfo_tco2_per_t: self.carbon.co2_factor_vlsfo,
                lng_tco2_per_t: self.carbon.co2_factor_lng,
            },
            basis_haircut: self.decision.basis_haircut,
            ops_buffer_usd: self.decision.ops_buffer_usd,
            decision_buffer_usd: self.decision.decision_buffer_usd,
            coverage: self.hedge.coverage,
            ttf_lot_mmbtu: self.hedge.ttf_lot_mmbtu,
            jkm_lot_mmbtu: self.hedge.jkm_lot_mmbtu,
            physics: self.physics,
        }
    }

    /// Replace the carbon factors, e.g. from `carbon_params.csv`.
    pub fn with_carbon_factors(mut self, factors: CarbonFactors) -> Result<Self, ConfigError> {
        self.carbon.co2_factor_vlsfo = factors.vlsfo_tco2_per_t;
        self.carbon.co2_factor_lng = factors.lng_tco2_per_t;
        self.validate()?;
        Ok(self)
    }

    pub fn with_overrides(mut self, o: &ConfigOverrides) -> Result<Self, ConfigError> {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }
        set(&mut self.decision.basis_haircut, &o.basis_haircut);
        set(&mut self.decision.ops_buffer_usd, &o.ops_buffer_usd);
        set(&mut self.decision.decision_buffer_usd, &o.decision_buffer_usd);
        set(&mut self.hedge.coverage, &o.coverage);
        set(&mut self.stress.spread_usd_mmbtu, &o.stress_spread_usd_mmbtu);
        set(&mut self.stress.freight_usd_day, &o.stress_freight_usd_day);
        set(&mut self.stress.eua_usd_per_tco2, &o.stress_eua_usd_per_tco2);
        set(&mut self.voyage.vessel_class, &o.vessel_class);
        set(&mut self.voyage.load_port, &o.load_port);
        set(&mut self.voyage.europe_port, &o.europe_port);
        set(&mut self.voyage.asia_port, &o.asia_port);
        if o.cargo_capacity_m3.is_some() {
            self.voyage.cargo_capacity_m3 = o.cargo_capacity_m3;
        }
        self.validate()?;
        Ok(self)
    }

    /// Proxy snapshot for `date`, if a `[market]` section is configured.
    pub fn proxy_snapshot(&self, date: NaiveDate) -> Result<Option<MarketSnapshot>, InputError> {
        self.market.as_ref().map(|m| m.snapshot(date)).transpose()
    }
}

// ─── Legacy key/value format ────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ParamRow {
    param: String,
    value: String,
}

/// Read `param,value` rows into a map. Duplicate keys are rejected.
pub(crate) fn read_params(content: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let mut params = BTreeMap::new();
    for row in rdr.deserialize() {
        let row: ParamRow = row?;
        if params.insert(row.param.clone(), row.value).is_some() {
            return Err(ConfigError::DuplicateKey(row.param));
        }
    }
    Ok(params)
}

mod legacy {
    use super::*;

    const REQUIRED: [&str; 9] = [
        "DECISION_BUFFER_USD",
        "OPS_BUFFER_USD",
        "BASIS_ADJUSTMENT",
        "COVERAGE_PCT",
        "TTF_LOT_MMBTU",
        "JKM_LOT_MMBTU",
        "STRESS_SPREAD_USD",
        "STRESS_FREIGHT_USD_PER_DAY",
        "STRESS_EUA_USD",
    ];

    const OPTIONAL: [&str; 14] = [
        "FUEL_TYPE",
        "CO2_FACTOR_VLSFO",
        "CO2_FACTOR_LNG",
        "LOAD_PORT",
        "EUROPE_PORT",
        "ASIA_PORT",
        "VESSEL_CLASS",
        "TTF_USD_MMBTU",
        "JKM_USD_MMBTU",
        "JKM_PREMIUM_USD_PER_MMBTU",
        "FREIGHT_USD_DAY",
        "FREIGHT_REGIME_MULTIPLIER",
        "FUEL_USD_PER_T",
        "EUA_USD_PER_TCO2",
    ];

    const MARKET_REQUIRED: [&str; 3] = ["FREIGHT_USD_DAY", "FUEL_USD_PER_T", "EUA_USD_PER_TCO2"];

    struct Params(BTreeMap<String, String>);

    impl Params {
        fn number(&self, key: &str) -> Result<Option<f64>, ConfigError> {
            self.0
                .get(key)
                .map(|raw| {
                    raw.parse::<f64>().map_err(|_| ConfigError::NotANumber {
                        key: key.to_string(),
                        value: raw.clone(),
                    })
                })
                .transpose()
        }

        fn required(&self, key: &str) -> Result<f64, ConfigError> {
            self.number(key)?
                .ok_or_else(|| ConfigError::MissingKeys(vec![key.to_string()]))
        }

        fn text(&self, key: &str) -> Option<String> {
            self.0.get(key).cloned()
        }
    }

    pub(super) fn map(raw: BTreeMap<String, String>) -> Result<EngineConfig, ConfigError> {
        if let Some(unknown) = raw
            .keys()
            .find(|k| !REQUIRED.contains(&k.as_str()) && !OPTIONAL.contains(&k.as_str()))
        {
            return Err(ConfigError::UnknownKey(unknown.clone()));
        }
        let missing: Vec<String> = REQUIRED
            .iter()
            .filter(|k| !raw.contains_key(**k))
            .map(|k| k.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys(missing));
        }

        let p = Params(raw);
        let defaults = CarbonSection::default();
        let fuel_type = match p.text("FUEL_TYPE") {
            None => FuelType::Vlsfo,
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "vlsfo" => FuelType::Vlsfo,
                "lng" => FuelType::Lng,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "FUEL_TYPE".into(),
                        value: raw,
                    })
                }
            },
        };
        let voyage_defaults = VoyageSection::default();

        Ok(EngineConfig {
            decision: DecisionSection {
                basis_haircut: p.required("BASIS_ADJUSTMENT")?,
                ops_buffer_usd: p.required("OPS_BUFFER_USD")?,
                decision_buffer_usd: p.required("DECISION_BUFFER_USD")?,
            },
            hedge: HedgeSection {
                coverage: p.required("COVERAGE_PCT")?,
                ttf_lot_mmbtu: p.required("TTF_LOT_MMBTU")?,
                jkm_lot_mmbtu: p.required("JKM_LOT_MMBTU")?,
            },
            carbon: CarbonSection {
                fuel_type,
                co2_factor_vlsfo: p
                    .number("CO2_FACTOR_VLSFO")?
                    .unwrap_or(defaults.co2_factor_vlsfo),
                co2_factor_lng: p
                    .number("CO2_FACTOR_LNG")?
                    .unwrap_or(defaults.co2_factor_lng),
            },
            physics: PhysicalConstants::default(),
            stress: StressShocks {
                spread_usd_mmbtu: p.required("STRESS_SPREAD_USD")?,
                freight_usd_day: p.required("STRESS_FREIGHT_USD_PER_DAY")?,
                eua_usd_per_tco2: p.required("STRESS_EUA_USD")?,
            },
            voyage: VoyageSection {
                load_port: p.text("LOAD_PORT").unwrap_or(voyage_defaults.load_port),
                europe_port: p.text("EUROPE_PORT").unwrap_or(voyage_defaults.europe_port),
                asia_port: p.text("ASIA_PORT").unwrap_or(voyage_defaults.asia_port),
                vessel_class: p
                    .text("VESSEL_CLASS")
                    .unwrap_or(voyage_defaults.vessel_class),
                cargo_capacity_m3: None,
            },
            market: market(&p)?,
        })
    }

    /// The proxy market is present iff TTF is configured; the other prices
    /// then become mandatory.
    fn market(p: &Params) -> Result<Option<ProxyMarketSection>, ConfigError> {
        let Some(ttf) = p.number("TTF_USD_MMBTU")? else {
            return Ok(None);
        };
        let missing: Vec<String> = MARKET_REQUIRED
            .iter()
            .filter(|k| !p.0.contains_key(**k))
            .map(|k| k.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys(missing));
        }
        Ok(Some(ProxyMarketSection {
            ttf_usd_mmbtu: ttf,
            jkm_usd_mmbtu: p.number("JKM_USD_MMBTU")?,
            jkm_premium_usd_mmbtu: p.number("JKM_PREMIUM_USD_PER_MMBTU")?.unwrap_or(0.0),
            freight_usd_day: p.required("FREIGHT_USD_DAY")?,
            freight_regime_multiplier: p.number("FREIGHT_REGIME_MULTIPLIER")?.unwrap_or(1.0),
            fuel_usd_per_t: p.required("FUEL_USD_PER_T")?,
            eua_usd_per_tco2: p.required("EUA_USD_PER_TCO2")?,
        }))
    }
}
