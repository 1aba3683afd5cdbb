//! Reference and market-history loading for the runner.
//!
//! Reference data comes from `vessels.csv` and `routes.csv` (plus an optional
//! `carbon_params.csv`). Market history comes either from a single combined
//! CSV or from `benchmark_prices.csv` inner-joined with `aux_series.csv` on
//! date. Each price column may carry a `<LABEL>_SOURCE` companion column
//! (`TTF_SOURCE`, `JKM_SOURCE`, ...) with `real` or `proxy`; absent means `real`.
//!
//! An empty price cell is never treated as zero: it fails with the column
//! name and the date.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use lngdivert_core::domain::{
    CarbonFactors, MarketField, MarketSeries, MarketSnapshot, Provenance, Quote, ReferenceData,
    ReferenceError, RouteSpec, VesselSpec,
};
use lngdivert_core::InputError;

pub const VESSELS_FILE: &str = "vessels.csv";
pub const ROUTES_FILE: &str = "routes.csv";
pub const CARBON_FILE: &str = "carbon_params.csv";
pub const BENCHMARK_FILE: &str = "benchmark_prices.csv";
pub const AUX_FILE: &str = "aux_series.csv";

const CO2_VLSFO_KEY: &str = "CO2_factor_VLSFO_tCO2_per_t_fuel";
const CO2_LNG_KEY: &str = "CO2_factor_LNG_tCO2_per_t_fuel";

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
    #[error("{file}: missing column '{column}'")]
    MissingColumn { file: String, column: String },
    #[error("{file} row {row}: invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate {
        file: String,
        row: usize,
        value: String,
    },
    #[error("{file}: column '{column}' on {date} is not a number: '{value}'")]
    InvalidNumber {
        file: String,
        column: String,
        date: NaiveDate,
        value: String,
    },
    #[error("{file}: {message}")]
    InvalidProvenance { file: String, message: String },
    #[error("{file}: unknown parameter '{key}'")]
    UnknownParam { file: String, key: String },
    #[error("{file}: no rows")]
    Empty { file: String },
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    #[error("invalid market data: {0}")]
    Input(#[from] InputError),
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn reader(content: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes())
}

// ─── Reference data ─────────────────────────────────────────────────

fn parse_rows<T: for<'de> Deserialize<'de>>(
    file: &str,
    content: &str,
) -> Result<Vec<T>, LoadError> {
    reader(content)
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| LoadError::Csv {
            file: file.to_string(),
            source,
        })
}

pub fn parse_vessels(content: &str) -> Result<Vec<VesselSpec>, LoadError> {
    parse_rows(VESSELS_FILE, content)
}

pub fn parse_routes(content: &str) -> Result<Vec<RouteSpec>, LoadError> {
    parse_rows(ROUTES_FILE, content)
}

/// Load `vessels.csv` and `routes.csv` from `dir`.
pub fn load_reference(dir: &Path) -> Result<ReferenceData, LoadError> {
    let vessels = parse_vessels(&read_file(&dir.join(VESSELS_FILE))?)?;
    let routes = parse_routes(&read_file(&dir.join(ROUTES_FILE))?)?;
    tracing::debug!(
        vessels = vessels.len(),
        routes = routes.len(),
        dir = %dir.display(),
        "loaded reference data"
    );
    Ok(ReferenceData::new(vessels, routes)?)
}

#[derive(Debug, Deserialize)]
struct ParamRow {
    param: String,
    value: f64,
}

/// Parse `carbon_params.csv`. The VLSFO factor is required, LNG defaults.
pub fn parse_carbon_params(content: &str) -> Result<CarbonFactors, LoadError> {
    let rows: Vec<ParamRow> = parse_rows(CARBON_FILE, content)?;
    let mut factors = CarbonFactors::default();
    let mut saw_vlsfo = false;
    for row in rows {
        match row.param.as_str() {
            CO2_VLSFO_KEY => {
                factors.vlsfo_tco2_per_t = row.value;
                saw_vlsfo = true;
            }
            CO2_LNG_KEY => factors.lng_tco2_per_t = row.value,
            _ => {
                return Err(LoadError::UnknownParam {
                    file: CARBON_FILE.into(),
                    key: row.param,
                })
            }
        }
    }
    if !saw_vlsfo {
        return Err(InputError::MissingField {
            field: CO2_VLSFO_KEY.into(),
            date: None,
        }
        .into());
    }
    Ok(factors)
}

/// `carbon_params.csv` from `dir`, or `None` if the file is absent.
pub fn load_carbon_params(dir: &Path) -> Result<Option<CarbonFactors>, LoadError> {
    let path = dir.join(CARBON_FILE);
    if !path.exists() {
        return Ok(None);
    }
    parse_carbon_params(&read_file(&path)?).map(Some)
}

// ─── Market history ─────────────────────────────────────────────────

/// A market series plus the metadata reports need.
#[derive(Debug, Clone)]
pub struct LoadedMarket {
    pub series: MarketSeries,
    /// BLAKE3 over dates, prices and provenance.
    pub dataset_hash: String,
    /// Whether any price in the series is a proxy.
    pub has_proxy: bool,
}

impl LoadedMarket {
    pub fn new(series: MarketSeries) -> Self {
        let dataset_hash = compute_dataset_hash(&series);
        let has_proxy = series.iter().any(|s| s.has_proxy());
        Self {
            series,
            dataset_hash,
            has_proxy,
        }
    }
}

type QuoteRow = (NaiveDate, HashMap<MarketField, Quote>);

fn source_column(field: MarketField) -> String {
    format!("{}_SOURCE", field.label())
}

/// Read the `date` column plus the given price columns, in file order.
fn parse_quote_rows(
    file: &str,
    content: &str,
    fields: &[MarketField],
) -> Result<Vec<QuoteRow>, LoadError> {
    let csv_err = |source| LoadError::Csv {
        file: file.to_string(),
        source,
    };
    let mut rdr = reader(content);
    let headers = rdr.headers().map_err(csv_err)?.clone();
    let index_of = |name: &str| headers.iter().position(|h| h == name);

    let date_idx = index_of("date").ok_or_else(|| LoadError::MissingColumn {
        file: file.to_string(),
        column: "date".into(),
    })?;
    let mut columns = Vec::with_capacity(fields.len());
    for field in fields {
        let idx = index_of(field.column()).ok_or_else(|| LoadError::MissingColumn {
            file: file.to_string(),
            column: field.column().into(),
        })?;
        columns.push((*field, idx, index_of(&source_column(*field))));
    }

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(csv_err)?;
        let raw_date = record.get(date_idx).unwrap_or("");
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|_| {
            LoadError::InvalidDate {
                file: file.to_string(),
                row: i + 1,
                value: raw_date.to_string(),
            }
        })?;

        let mut quotes = HashMap::with_capacity(columns.len());
        for (field, idx, source_idx) in &columns {
            let raw = record.get(*idx).unwrap_or("");
            if raw.is_empty() {
                return Err(InputError::MissingField {
                    field: field.column().into(),
                    date: Some(date),
                }
                .into());
            }
            let value = raw.parse::<f64>().map_err(|_| LoadError::InvalidNumber {
                file: file.to_string(),
                column: field.column().into(),
                date,
                value: raw.to_string(),
            })?;
            let provenance = match source_idx.and_then(|s| record.get(s)) {
                None | Some("") => Provenance::Real,
                Some(tag) => tag
                    .parse::<Provenance>()
                    .map_err(|message| LoadError::InvalidProvenance {
                        file: file.to_string(),
                        message: format!("{} on {date}: {message}", source_column(*field)),
                    })?,
            };
            quotes.insert(*field, Quote { value, provenance });
        }
        rows.push((date, quotes));
    }
    if rows.is_empty() {
        return Err(LoadError::Empty {
            file: file.to_string(),
        });
    }
    Ok(rows)
}

fn into_snapshot(
    date: NaiveDate,
    mut quotes: HashMap<MarketField, Quote>,
) -> Result<MarketSnapshot, InputError> {
    let mut take = |field: MarketField| {
        quotes.remove(&field).ok_or_else(|| InputError::MissingField {
            field: field.column().into(),
            date: Some(date),
        })
    };
    MarketSnapshot::new(
        date,
        take(MarketField::Ttf)?,
        take(MarketField::Jkm)?,
        take(MarketField::Freight)?,
        take(MarketField::Fuel)?,
        take(MarketField::Eua)?,
    )
}

/// Parse a combined CSV carrying all five price columns.
pub fn parse_market_csv(file: &str, content: &str) -> Result<MarketSeries, LoadError> {
    let rows = parse_quote_rows(file, content, &MarketField::ALL)?;
    let snapshots = rows
        .into_iter()
        .map(|(date, quotes)| into_snapshot(date, quotes))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MarketSeries::new(snapshots)?)
}

/// Inner-join benchmark prices with auxiliary series on date.
///
/// Dates present in only one file are dropped. Order follows the benchmark
/// file, which must itself be ascending.
pub fn join_market_csv(benchmark: &str, aux: &str) -> Result<MarketSeries, LoadError> {
    let bench_rows = parse_quote_rows(
        BENCHMARK_FILE,
        benchmark,
        &[MarketField::Ttf, MarketField::Jkm],
    )?;
    let aux_rows = parse_quote_rows(
        AUX_FILE,
        aux,
        &[MarketField::Freight, MarketField::Fuel, MarketField::Eua],
    )?;

    let mut aux_by_date = HashMap::with_capacity(aux_rows.len());
    for (date, quotes) in aux_rows {
        if aux_by_date.insert(date, quotes).is_some() {
            return Err(InputError::DuplicateDate { date }.into());
        }
    }

    let total = bench_rows.len();
    let mut snapshots = Vec::with_capacity(total);
    for (date, mut quotes) in bench_rows {
        let Some(aux_quotes) = aux_by_date.remove(&date) else {
            continue;
        };
        quotes.extend(aux_quotes);
        snapshots.push(into_snapshot(date, quotes)?);
    }
    if snapshots.len() < total {
        tracing::info!(
            kept = snapshots.len(),
            dropped = total - snapshots.len(),
            "benchmark dates without auxiliary data dropped by join"
        );
    }
    Ok(MarketSeries::new(snapshots)?)
}

/// Load market history from a file or a directory.
///
/// A file is read as a combined CSV. A directory must contain
/// `benchmark_prices.csv` and `aux_series.csv`.
pub fn load_market(path: &Path) -> Result<LoadedMarket, LoadError> {
    let series = if path.is_dir() {
        let benchmark = read_file(&path.join(BENCHMARK_FILE))?;
        let aux = read_file(&path.join(AUX_FILE))?;
        join_market_csv(&benchmark, &aux)?
    } else {
        parse_market_csv(&file_label(path), &read_file(path)?)?
    };
    tracing::info!(
        observations = series.len(),
        first = ?series.first_date(),
        last = ?series.last_date(),
        "loaded market history"
    );
    Ok(LoadedMarket::new(series))
}

/// Deterministic BLAKE3 hash over every date, price and provenance tag.
pub fn compute_dataset_hash(series: &MarketSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    for snapshot in series {
        hasher.update(snapshot.date.to_string().as_bytes());
        for field in MarketField::ALL {
            let quote = snapshot.quote(field);
            hasher.update(&quote.value.to_le_bytes());
            hasher.update(&[quote.provenance as u8]);
        }
    }
    hasher.finalize().to_hex().to_string()
}
