//! Reporting and export: JSON, CSV, and Markdown artifact generation.
//!
//! Backtest reports and trade packs persist as JSON with a `schema_version`
//! field; newer versions are rejected on load. CSV tapes (decisions, equity,
//! stress) feed spreadsheets. Markdown reports are for humans.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use lngdivert_core::domain::DecisionRecord;
use lngdivert_core::stress::StressResult;

use crate::backtest::{BacktestReport, SCHEMA_VERSION};
use crate::metrics::EquityPoint;
use crate::pack::{TradePack, TRADE_PACK_SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestReport` to pretty JSON.
pub fn export_json(report: &BacktestReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize BacktestReport to JSON")
}

/// Deserialize a `BacktestReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestReport> {
    let report: BacktestReport =
        serde_json::from_str(json).context("failed to deserialize BacktestReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

pub fn export_pack_json(pack: &TradePack) -> Result<String> {
    serde_json::to_string_pretty(pack).context("failed to serialize TradePack to JSON")
}

pub fn import_pack_json(json: &str) -> Result<TradePack> {
    let pack: TradePack =
        serde_json::from_str(json).context("failed to deserialize TradePack from JSON")?;
    if pack.schema_version > TRADE_PACK_SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            pack.schema_version,
            TRADE_PACK_SCHEMA_VERSION
        );
    }
    Ok(pack)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// One row per evaluated date.
///
/// Columns: date, netback_europe_usd, netback_asia_usd, raw_uplift_usd,
/// adjusted_uplift_usd, decision, hedge_energy_mmbtu, jkm_lots, ttf_lots
pub fn export_decisions_csv(records: &[DecisionRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "netback_europe_usd",
        "netback_asia_usd",
        "raw_uplift_usd",
        "adjusted_uplift_usd",
        "decision",
        "hedge_energy_mmbtu",
        "jkm_lots",
        "ttf_lots",
    ])?;

    for r in records {
        wtr.write_record([
            &r.date.to_string(),
            &format!("{:.2}", r.netback_europe_usd),
            &format!("{:.2}", r.netback_asia_usd),
            &format!("{:.2}", r.raw_uplift_usd),
            &format!("{:.2}", r.adjusted_uplift_usd),
            &r.decision.to_string(),
            &format!("{:.2}", r.hedge.hedge_energy_mmbtu),
            &r.hedge.jkm_lots.to_string(),
            &r.hedge.ttf_lots.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Cumulative conditional P&L by date.
pub fn export_equity_csv(equity_curve: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "equity_usd"])?;
    for p in equity_curve {
        wtr.write_record([&p.date.to_string(), &format!("{:.2}", p.equity_usd)])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

pub fn export_stress_csv(results: &[StressResult]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "scenario",
        "ttf_usd_mmbtu",
        "jkm_usd_mmbtu",
        "freight_usd_day",
        "eua_usd_per_tco2",
        "adjusted_uplift_usd",
        "decision",
        "flipped",
        "pnl_impact_usd",
    ])?;
    for r in results {
        let m = &r.shocked_market;
        wtr.write_record([
            r.scenario.as_str(),
            &format!("{:.4}", m.ttf.value),
            &format!("{:.4}", m.jkm.value),
            &format!("{:.2}", m.freight.value),
            &format!("{:.2}", m.eua.value),
            &format!("{:.2}", r.adjusted_uplift_usd),
            &r.decision.to_string(),
            &r.flipped.to_string(),
            &format!("{:.2}", r.pnl_impact_usd),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Create a fresh `{prefix}_{timestamp}` directory. Saves landing in the same
/// second get `_2`, `_3`, ... so no run overwrites another.
fn timestamped_dir(output_dir: &Path, prefix: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;
    let stem = format!("{prefix}_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    for attempt in 1u32..=1_000 {
        let dirname = match attempt {
            1 => stem.clone(),
            n => format!("{stem}_{n}"),
        };
        let run_dir = output_dir.join(dirname);
        match std::fs::create_dir(&run_dir) {
            Ok(()) => return Ok(run_dir),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to create artifact dir: {}", run_dir.display())
                })
            }
        }
    }
    bail!("no free artifact dir name under {}", output_dir.display())
}

fn write_file(dir: &Path, name: &str, contents: &str) -> Result<()> {
    let path = dir.join(name);
    std::fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Save the full artifact set for one backtest.
///
/// Creates `backtest_{timestamp}/` under `output_dir` containing
/// `manifest.json`, `decisions.csv`, `equity.csv` and `report.md`.
/// Returns the path to the created directory.
pub fn save_backtest(report: &BacktestReport, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = timestamped_dir(output_dir, "backtest")?;
    write_file(&run_dir, "manifest.json", &export_json(report)?)?;
    write_file(&run_dir, "decisions.csv", &export_decisions_csv(&report.records)?)?;
    write_file(
        &run_dir,
        "equity.csv",
        &export_equity_csv(&report.summary.equity_curve)?,
    )?;
    write_file(&run_dir, "report.md", &generate_report(report))?;
    tracing::info!(dir = %run_dir.display(), "saved backtest artifacts");
    Ok(run_dir)
}

/// Load a `BacktestReport` from an artifact directory's manifest.json.
pub fn load_artifacts(dir: &Path) -> Result<BacktestReport> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

/// Save a trade pack as `trade_pack.json`, `trade_note.txt` and, when the
/// pack carries a risk section, `stress.csv`.
pub fn save_trade_pack(pack: &TradePack, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = timestamped_dir(output_dir, &format!("trade_{}", pack.date))?;
    write_file(&run_dir, "trade_pack.json", &export_pack_json(pack)?)?;
    write_file(&run_dir, "trade_note.txt", &pack.trade_note())?;
    if let Some(risk) = &pack.risk {
        write_file(&run_dir, "stress.csv", &export_stress_csv(&risk.results)?)?;
    }
    tracing::info!(dir = %run_dir.display(), "saved trade pack");
    Ok(run_dir)
}

pub fn load_trade_pack(dir: &Path) -> Result<TradePack> {
    let path = dir.join("trade_pack.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_pack_json(&json)
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Generate a Markdown report for one backtest.
pub fn generate_report(report: &BacktestReport) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str("# Backtest Report\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!(
        "| Voyage | {} -> {} vs {} |\n",
        report.load_port, report.europe_port, report.asia_port
    ));
    md.push_str(&format!(
        "| Vessel | {} ({:.0} m3) |\n",
        report.vessel_class, report.cargo_capacity_m3
    ));
    md.push_str(&format!(
        "| Period | {} to {} |\n",
        report.start_date, report.end_date
    ));
    md.push_str(&format!("| Dataset Hash | {} |\n", report.dataset_hash));
    if report.has_proxy {
        md.push_str("| Data | **PROXY INPUTS** |\n");
    }
    md.push('\n');

    let c = &report.cost;
    md.push_str("## Decision Rule\n\n");
    md.push_str("| Parameter | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Basis Haircut | {:.1}% |\n", c.basis_haircut * 100.0));
    md.push_str(&format!("| Ops Buffer | ${:.0} |\n", c.ops_buffer_usd));
    md.push_str(&format!("| Decision Buffer | ${:.0} |\n", c.decision_buffer_usd));
    md.push_str(&format!("| Hedge Coverage | {:.0}% |\n", c.coverage * 100.0));
    md.push_str(&format!("| Fuel Type | {} |\n", c.fuel_type));
    md.push('\n');

    let s = &report.summary;
    md.push_str("## Performance Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Observations | {} |\n", s.total_observations));
    md.push_str(&format!("| DIVERT Signals | {} |\n", s.trigger_count));
    md.push_str(&format!("| Hit Rate | {:.1}% |\n", s.hit_rate * 100.0));
    md.push_str(&format!("| Total P&L | ${:.0} |\n", s.total_pnl_usd));
    md.push_str(&format!("| Mean Daily P&L | ${:.0} |\n", s.mean_daily_pnl_usd));
    md.push_str(&format!("| Max Drawdown | ${:.0} |\n", s.max_drawdown_usd));
    md.push_str(&format!("| Sharpe | {} |\n", s.sharpe));
    md.push('\n');

    if let Some(u) = &s.conditional_uplift {
        md.push_str("## Uplift When Triggered\n\n");
        md.push_str("| Metric | Value |\n");
        md.push_str("| --- | --- |\n");
        md.push_str(&format!("| Mean | ${:.0} |\n", u.mean_usd));
        md.push_str(&format!("| Min | ${:.0} |\n", u.min_usd));
        md.push_str(&format!("| Max | ${:.0} |\n", u.max_usd));
        md.push('\n');
    }

    md.push_str(&format!(
        "Rule validated: **{}**\n\n",
        if report.rule_validated() { "yes" } else { "no" }
    ));

    if !report.skipped.is_empty() {
        md.push_str("## Skipped Dates\n\n");
        for skip in &report.skipped {
            md.push_str(&format!("- {}: {}\n", skip.date, skip.reason));
        }
        md.push('\n');
    }

    md
}
