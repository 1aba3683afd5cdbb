//! Domain types for the diversion engine.

pub mod cost;
pub mod market;
pub mod record;
pub mod reference;
pub mod route;
pub mod vessel;
pub mod voyage;

pub use cost::{CarbonFactors, CostParams, FuelType, PhysicalConstants};
pub use market::{MarketField, MarketSeries, MarketSnapshot, Provenance, Quote};
pub use record::{Decision, DecisionRecord, HedgeInstruction, HedgeLeg, LegSide};
pub use reference::{ReferenceData, ReferenceError};
pub use route::{Benchmark, Destination, RoutePair, RouteSpec};
pub use vessel::VesselSpec;
pub use voyage::VoyageResult;
