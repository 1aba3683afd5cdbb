//! RouteSpec, RoutePair and the Europe/Asia destination split.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ensure_non_negative, InputError};

/// A single load → discharge leg with its sailing distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSpec {
    pub load_port: String,
    pub discharge_port: String,
    pub distance_nm: f64,
}

impl RouteSpec {
    pub fn validate(&self) -> Result<(), InputError> {
        for (field, port) in [
            ("load_port", &self.load_port),
            ("discharge_port", &self.discharge_port),
        ] {
            if port.trim().is_empty() {
                return Err(InputError::MissingField {
                    field: field.into(),
                    date: None,
                });
            }
        }
        ensure_non_negative("distance_nm", self.distance_nm)?;
        Ok(())
    }
}

/// Discharge region of a voyage. Europe sells at TTF, Asia at JKM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Europe,
    Asia,
}

impl Destination {
    pub fn benchmark(self) -> Benchmark {
        match self {
            Destination::Europe => Benchmark::Ttf,
            Destination::Asia => Benchmark::Jkm,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Europe => write!(f, "Europe"),
            Destination::Asia => write!(f, "Asia"),
        }
    }
}

/// Gas price benchmark a destination is marked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Benchmark {
    Ttf,
    Jkm,
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Benchmark::Ttf => write!(f, "TTF"),
            Benchmark::Jkm => write!(f, "JKM"),
        }
    }
}

/// The contracted European leg and the candidate Asian leg, sharing a load port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePair {
    pub europe: RouteSpec,
    pub asia: RouteSpec,
}

impl RoutePair {
    pub fn new(europe: RouteSpec, asia: RouteSpec) -> Result<Self, InputError> {
        let pair = Self { europe, asia };
        pair.validate()?;
        Ok(pair)
    }

    pub fn validate(&self) -> Result<(), InputError> {
        self.europe.validate()?;
        self.asia.validate()?;
        if self.europe.load_port != self.asia.load_port {
            return Err(InputError::MismatchedLoadPort {
                europe: self.europe.load_port.clone(),
                asia: self.asia.load_port.clone(),
            });
        }
        Ok(())
    }

    pub fn leg(&self, destination: Destination) -> &RouteSpec {
        match destination {
            Destination::Europe => &self.europe,
            Destination::Asia => &self.asia,
        }
    }

    pub fn load_port(&self) -> &str {
        &self.europe.load_port
    }
}

#[cfg(test)]
pub(crate) fn gulf_pair() -> RoutePair {
    RoutePair {
        europe: RouteSpec {
            load_port: "US_Gulf".into(),
            discharge_port: "Rotterdam".into(),
            distance_nm: 5_000.0,
        },
        asia: RouteSpec {
            load_port: "US_Gulf".into(),
            discharge_port: "Tokyo".into(),
            distance_nm: 9_500.0,
        },
    }
}
