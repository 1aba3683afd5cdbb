//! lngdivert core: physical model, netback calculator, decision rule, stress engine.
//!
//! This crate is the pure decision engine:
//! - Domain types (vessels, routes, market snapshots, cost parameters, decision records)
//! - Unit conversion and boil-off physics
//! - Per-destination netback with fuel, charter and carbon cost breakdown
//! - DIVERT/KEEP rule with basis haircut, ops buffer and hedge sizing
//! - Stress scenarios that re-run the rule under shocked inputs
//!
//! No I/O, no global state. Every result is a pure function of its inputs.

pub mod decision;
pub mod domain;
pub mod error;
pub mod netback;
pub mod physics;
pub mod pipeline;
pub mod stress;

pub use error::{EngineError, InputError, PhysicalInfeasibility};
pub use pipeline::{evaluate, evaluate_detailed, Evaluation};
pub use stress::{stress, BaselineInputs, RiskPack, StressResult, StressScenario, StressShocks};
