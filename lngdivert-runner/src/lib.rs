//! lngdivert runner: configuration, data loading, backtests, statistics, export.
//!
//! This crate builds on `lngdivert-core` to provide:
//! - TOML and legacy parameter-CSV configuration with CLI overrides
//! - Reference data and market history loading with provenance and hashing
//! - Seeded synthetic market history
//! - Parallel backtest over a market history with summary statistics
//! - Trade packs (decision, hedge legs, stress risk pack)
//! - JSON, CSV and Markdown artifacts

pub mod backtest;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod pack;
pub mod synthetic;

pub use backtest::{backtest, run_backtest, BacktestError, BacktestOutcome, BacktestReport};
pub use config::{ConfigError, ConfigOverrides, EngineConfig};
pub use data_loader::{load_market, load_reference, LoadError, LoadedMarket};
pub use metrics::{BacktestSummary, DegenerateStatistic, SharpeRatio};
pub use pack::TradePack;
pub use synthetic::{generate, SyntheticSpec};
