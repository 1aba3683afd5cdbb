//! ReferenceData: vessel and route lookups keyed by class and port pair.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::route::{RoutePair, RouteSpec};
use super::vessel::VesselSpec;
use crate::error::InputError;

/// Immutable reference tables, loaded once per run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    vessels: BTreeMap<String, VesselSpec>,
    routes: BTreeMap<(String, String), RouteSpec>,
}

/// Rejected while building [`ReferenceData`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReferenceError {
    #[error("duplicate vessel class '{0}'")]
    DuplicateVessel(String),
    #[error("duplicate route {0} -> {1}")]
    DuplicateRoute(String, String),
    #[error(transparent)]
    Invalid(#[from] InputError),
}

impl ReferenceData {
    /// Build the lookup tables, validating every row.
    pub fn new(vessels: Vec<VesselSpec>, routes: Vec<RouteSpec>) -> Result<Self, ReferenceError> {
        let mut data = Self::default();
        for vessel in vessels {
            vessel.validate()?;
            let class = vessel.vessel_class.clone();
            if data.vessels.insert(class.clone(), vessel).is_some() {
                return Err(ReferenceError::DuplicateVessel(class));
            }
        }
        for route in routes {
            route.validate()?;
            let key = (route.load_port.clone(), route.discharge_port.clone());
            if data.routes.insert(key.clone(), route).is_some() {
                return Err(ReferenceError::DuplicateRoute(key.0, key.1));
            }
        }
        Ok(data)
    }

    pub fn vessel(&self, class: &str) -> Result<&VesselSpec, InputError> {
        self.vessels
            .get(class)
            .ok_or_else(|| InputError::UnknownVessel {
                class: class.to_string(),
            })
    }

    pub fn route(&self, load_port: &str, discharge_port: &str) -> Result<&RouteSpec, InputError> {
        self.routes
            .get(&(load_port.to_string(), discharge_port.to_string()))
            .ok_or_else(|| InputError::UnknownRoute {
                load_port: load_port.to_string(),
                discharge_port: discharge_port.to_string(),
            })
    }

    /// Resolve both legs of a diversion decision. Either leg missing is fatal.
    pub fn route_pair(
        &self,
        load_port: &str,
        europe_port: &str,
        asia_port: &str,
    ) -> Result<RoutePair, InputError> {
        let europe = self.route(load_port, europe_port)?.clone();
        let asia = self.route(load_port, asia_port)?.clone();
        RoutePair::new(europe, asia)
    }

    pub fn vessel_classes(&self) -> impl Iterator<Item = &str> {
        self.vessels.keys().map(|k| k.as_str())
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }
}
