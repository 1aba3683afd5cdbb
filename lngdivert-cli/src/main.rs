//! lngdivert CLI: evaluate, stress and backtest commands.
//!
//! Commands:
//! - `evaluate`: DIVERT/KEEP decision and hedge for one date
//! - `stress`: evaluate plus the stress scenario catalogue
//! - `backtest`: replay the rule over a market history (CSV or synthetic)
//!
//! Logs go to stderr (`RUST_LOG` overrides the `info` default). Reports go to
//! stdout.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use lngdivert_core::domain::{MarketSnapshot, RoutePair, VesselSpec};
use lngdivert_core::stress::{BaselineInputs, RiskPack, StressShocks};
use lngdivert_runner::backtest::{run_backtest, BacktestReport};
use lngdivert_runner::config::{ConfigOverrides, EngineConfig};
use lngdivert_runner::data_loader::{
    load_carbon_params, load_market, load_reference, LoadedMarket,
};
use lngdivert_runner::export;
use lngdivert_runner::pack::TradePack;
use lngdivert_runner::synthetic::{generate, SyntheticSpec};

#[derive(Parser)]
#[command(
    name = "lngdivert",
    about = "LNG cargo diversion decision engine: netbacks, hedge sizing, stress and backtests"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide DIVERT or KEEP for one date and size the hedge.
    Evaluate {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        market: SnapshotArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Evaluate one date and re-run the decision under each stress scenario.
    Stress {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        market: SnapshotArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Replay the decision rule over a market history.
    Backtest {
        #[command(flatten)]
        common: CommonArgs,

        /// Market history: a combined CSV, or a directory holding
        /// benchmark_prices.csv and aux_series.csv. Defaults to --data-dir.
        #[arg(long)]
        market: Option<PathBuf>,

        /// Generate a seeded synthetic history instead of loading one.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Synthetic history seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Synthetic history start (YYYY-MM-DD). Defaults to 3 years ago.
        #[arg(long)]
        start: Option<String>,

        /// Synthetic history end (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Configuration, reference data and per-field overrides shared by every command.
#[derive(Args)]
struct CommonArgs {
    /// Engine config (TOML, or legacy param,value CSV).
    #[arg(long, default_value = "config/engine.toml")]
    config: PathBuf,

    /// Directory with vessels.csv, routes.csv and optional carbon_params.csv.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    #[arg(long)]
    vessel: Option<String>,

    /// Cargo volume override, m3.
    #[arg(long)]
    cargo_m3: Option<f64>,

    #[arg(long)]
    load_port: Option<String>,

    #[arg(long)]
    europe_port: Option<String>,

    #[arg(long)]
    asia_port: Option<String>,

    /// Basis haircut as a fraction (0.05 = 5%).
    #[arg(long)]
    basis: Option<f64>,

    /// Operational buffer, USD.
    #[arg(long)]
    ops_buffer: Option<f64>,

    /// Minimum adjusted uplift to divert, USD.
    #[arg(long)]
    decision_buffer: Option<f64>,

    /// Hedge coverage as a fraction of delivered energy.
    #[arg(long)]
    coverage: Option<f64>,

    /// Spread shock, USD/MMBtu.
    #[arg(long)]
    stress_spread: Option<f64>,

    /// Freight shock, USD/day.
    #[arg(long)]
    stress_freight: Option<f64>,

    /// EUA shock, USD/tCO2.
    #[arg(long)]
    stress_eua: Option<f64>,
}

impl CommonArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            basis_haircut: self.basis,
            ops_buffer_usd: self.ops_buffer,
            decision_buffer_usd: self.decision_buffer,
            coverage: self.coverage,
            stress_spread_usd_mmbtu: self.stress_spread,
            stress_freight_usd_day: self.stress_freight,
            stress_eua_usd_per_tco2: self.stress_eua,
            cargo_capacity_m3: self.cargo_m3,
            vessel_class: self.vessel.clone(),
            load_port: self.load_port.clone(),
            europe_port: self.europe_port.clone(),
            asia_port: self.asia_port.clone(),
        }
    }
}

#[derive(Args)]
struct SnapshotArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to the last market date, or
    /// today for the config proxy snapshot.
    #[arg(long)]
    date: Option<String>,

    /// Market history to take the snapshot from. Without it the config's
    /// [market] proxy snapshot is used.
    #[arg(long)]
    market: Option<PathBuf>,
}

#[derive(Args)]
struct OutputArgs {
    /// Print JSON instead of the text report.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Write the artifact set under --output-dir.
    #[arg(long, default_value_t = false)]
    save: bool,

    #[arg(long, default_value = "results")]
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            common,
            market,
            output,
        } => run_evaluate(&common, &market, &output, false),
        Commands::Stress {
            common,
            market,
            output,
        } => run_evaluate(&common, &market, &output, true),
        Commands::Backtest {
            common,
            market,
            synthetic,
            seed,
            start,
            end,
            output,
        } => run_backtest_cmd(
            &common,
            market.as_deref(),
            synthetic,
            seed,
            start.as_deref(),
            end.as_deref(),
            &output,
        ),
    }
}

// ─── Setup ──────────────────────────────────────────────────────────

struct Setup {
    config: EngineConfig,
    vessel: VesselSpec,
    routes: RoutePair,
}

fn setup(common: &CommonArgs) -> Result<Setup> {
    let mut config = EngineConfig::from_file(&common.config)
        .with_context(|| format!("loading config {}", common.config.display()))?;
    if let Some(factors) = load_carbon_params(&common.data_dir)? {
        config = config.with_carbon_factors(factors)?;
    }
    let config = config.with_overrides(&common.overrides())?;

    let reference = load_reference(&common.data_dir)
        .with_context(|| format!("loading reference data from {}", common.data_dir.display()))?;
    let voyage = &config.voyage;
    let mut vessel = reference.vessel(&voyage.vessel_class)?.clone();
    if let Some(capacity) = voyage.cargo_capacity_m3 {
        vessel = vessel.with_capacity(capacity);
    }
    let routes = reference.route_pair(&voyage.load_port, &voyage.europe_port, &voyage.asia_port)?;

    Ok(Setup {
        config,
        vessel,
        routes,
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{raw}' (expected YYYY-MM-DD)"))
}

fn resolve_snapshot(config: &EngineConfig, args: &SnapshotArgs) -> Result<MarketSnapshot> {
    let date = args.date.as_deref().map(parse_date).transpose()?;

    if let Some(path) = &args.market {
        let market = load_market(path)?;
        let snapshot = match date {
            Some(d) => market.series.get(d),
            None => market.series.as_slice().last(),
        };
        return match snapshot {
            Some(s) => Ok(s.clone()),
            None => bail!(
                "no market data for {} in {} ({:?} to {:?})",
                date.map(|d| d.to_string()).unwrap_or_default(),
                path.display(),
                market.series.first_date(),
                market.series.last_date()
            ),
        };
    }

    let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
    match config.proxy_snapshot(date)? {
        Some(snapshot) => {
            tracing::warn!(%date, "using proxy market snapshot from config");
            Ok(snapshot)
        }
        None => bail!("no --market given and the config has no [market] section"),
    }
}

// ─── Commands ───────────────────────────────────────────────────────

fn run_evaluate(
    common: &CommonArgs,
    snapshot_args: &SnapshotArgs,
    output: &OutputArgs,
    with_stress: bool,
) -> Result<()> {
    let Setup {
        config,
        vessel,
        routes,
    } = setup(common)?;
    let market = resolve_snapshot(&config, snapshot_args)?;
    let date = market.date;
    let baseline = BaselineInputs {
        vessel,
        routes,
        market,
        cost: config.cost_params(),
    };

    let shocks = with_stress.then_some(&config.stress);
    let pack = TradePack::build(date, &baseline, shocks)?;

    if output.json {
        println!("{}", export::export_pack_json(&pack)?);
    } else {
        print!("{}", pack.trade_note());
        if let Some(risk) = &pack.risk {
            print_stress_table(risk, &config.stress);
        }
    }

    if output.save {
        let dir = export::save_trade_pack(&pack, &output.output_dir)?;
        println!("Artifacts saved to: {}", dir.display());
    }
    Ok(())
}

fn run_backtest_cmd(
    common: &CommonArgs,
    market_path: Option<&Path>,
    synthetic: bool,
    seed: u64,
    start: Option<&str>,
    end: Option<&str>,
    output: &OutputArgs,
) -> Result<()> {
    let Setup {
        config,
        vessel,
        routes,
    } = setup(common)?;

    let market = if synthetic {
        if market_path.is_some() {
            bail!("--market and --synthetic are mutually exclusive");
        }
        let end_date = end
            .map(parse_date)
            .transpose()?
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let start_date = start
            .map(parse_date)
            .transpose()?
            .unwrap_or_else(|| end_date - chrono::Duration::days(365 * 3));
        tracing::info!(%start_date, %end_date, seed, "generating synthetic history");
        LoadedMarket::new(generate(&SyntheticSpec::new(start_date, end_date, seed))?)
    } else {
        load_market(market_path.unwrap_or(common.data_dir.as_path()))?
    };

    let report = run_backtest(&market, &vessel, &routes, &config.cost_params())?;

    if output.json {
        println!("{}", export::export_json(&report)?);
    } else {
        print_backtest_summary(&report);
    }

    if output.save {
        let dir = export::save_backtest(&report, &output.output_dir)?;
        println!("Artifacts saved to: {}", dir.display());
    }
    Ok(())
}

// ─── Printing ───────────────────────────────────────────────────────

fn print_stress_table(risk: &RiskPack, shocks: &StressShocks) {
    println!();
    println!(
        "=== Stress (spread ±{:.2} USD/MMBtu, freight ±{:.0} USD/day, EUA ±{:.1} USD/t) ===",
        shocks.spread_usd_mmbtu, shocks.freight_usd_day, shocks.eua_usd_per_tco2
    );
    println!(
        "{:<16} {:>16} {:>8} {:>16} {:>8}",
        "Scenario", "Adj. uplift", "Decision", "P&L impact", "Flip"
    );
    println!("{}", "-".repeat(68));
    for r in &risk.results {
        println!(
            "{:<16} {:>16.0} {:>8} {:>16.0} {:>8}",
            r.scenario,
            r.adjusted_uplift_usd,
            r.decision.to_string(),
            r.pnl_impact_usd,
            if r.flipped { "YES" } else { "" }
        );
    }
    println!();
}

fn print_backtest_summary(report: &BacktestReport) {
    let s = &report.summary;
    println!();
    println!("=== Backtest Result ===");
    println!(
        "Voyage:         {} -> {} vs {} ({})",
        report.load_port, report.europe_port, report.asia_port, report.vessel_class
    );
    println!("Period:         {} to {}", report.start_date, report.end_date);
    println!("Dataset:        {}", report.dataset_hash);
    println!(
        "Observations:   {} ({} skipped)",
        s.total_observations,
        report.skipped.len()
    );
    println!();
    println!("--- Decision Rule ---");
    println!("DIVERT signals: {}", s.trigger_count);
    println!("KEEP days:      {}", s.keep_count());
    println!("Hit rate:       {:.1}%", s.hit_rate * 100.0);
    match &s.conditional_uplift {
        Some(u) => {
            println!("Mean uplift:    ${:.0} (when triggered)", u.mean_usd);
            println!("Uplift range:   ${:.0} to ${:.0}", u.min_usd, u.max_usd);
        }
        None => println!("Mean uplift:    n/a (never triggered)"),
    }
    println!();
    println!("--- P&L ---");
    println!("Total P&L:      ${:.0}", s.total_pnl_usd);
    println!("Mean daily:     ${:.0}", s.mean_daily_pnl_usd);
    println!("Max drawdown:   ${:.0}", s.max_drawdown_usd);
    println!("Sharpe:         {}", s.sharpe);
    println!();
    println!(
        "Rule validated: {}",
        if report.rule_validated() { "YES" } else { "NO" }
    );
    if report.has_proxy {
        println!("WARNING: history contains proxy inputs");
    }
    println!();
}
