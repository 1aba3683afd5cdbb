//! Error taxonomy for the decision core.
//!
//! Two failure families exist at this layer:
//! - [`InputError`]: malformed, missing or out-of-range inputs. Always fatal for
//!   the evaluation that hit it.
//! - [`PhysicalInfeasibility`]: the voyage is too long for the cargo to survive
//!   boil-off. Fatal for that date; the backtest engine decides whether to skip.
//!
//! [`EngineError`] is the union returned by every evaluation entry point.

use chrono::NaiveDate;
use thiserror::Error;

/// Validation failures at the core boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be strictly positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("missing required field '{field}'{}", .date.map(|d| format!(" on {d}")).unwrap_or_default())]
    MissingField {
        field: String,
        date: Option<NaiveDate>,
    },

    #[error("unknown vessel class '{class}'")]
    UnknownVessel { class: String },

    #[error("route not found: {load_port} -> {discharge_port}")]
    UnknownRoute {
        load_port: String,
        discharge_port: String,
    },

    #[error("route pair load ports differ: europe leg loads at '{europe}', asia leg at '{asia}'")]
    MismatchedLoadPort { europe: String, asia: String },

    #[error("market series out of order: {current} follows {previous}")]
    OutOfOrder {
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("duplicate market date {date}")]
    DuplicateDate { date: NaiveDate },

    #[error("evaluation date {requested} does not match market snapshot date {snapshot}")]
    DateMismatch {
        requested: NaiveDate,
        snapshot: NaiveDate,
    },
}

/// Boil-off consumed more cargo than the vessel carries.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "boil-off of {boil_off_m3:.1} m3 over {voyage_days:.2} days exceeds cargo capacity of {capacity_m3:.1} m3"
)]
pub struct PhysicalInfeasibility {
    pub capacity_m3: f64,
    pub boil_off_m3: f64,
    pub voyage_days: f64,
}

/// Any failure from a single evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("input validation failed: {0}")]
    Input(#[from] InputError),
    #[error("physically infeasible voyage: {0}")]
    Physical(#[from] PhysicalInfeasibility),
}

impl EngineError {
    pub fn is_physical(&self) -> bool {
        matches!(self, EngineError::Physical(_))
    }
}

// ─── Field checks ───────────────────────────────────────────────────

pub fn ensure_finite(field: &'static str, value: f64) -> Result<f64, InputError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InputError::NonFinite { field, value })
    }
}

pub fn ensure_non_negative(field: &'static str, value: f64) -> Result<f64, InputError> {
    ensure_finite(field, value)?;
    if value < 0.0 {
        return Err(InputError::Negative { field, value });
    }
    Ok(value)
}

pub fn ensure_positive(field: &'static str, value: f64) -> Result<f64, InputError> {
    ensure_finite(field, value)?;
    if value <= 0.0 {
        return Err(InputError::NonPositive { field, value });
    }
    Ok(value)
}

pub fn ensure_unit_interval(field: &'static str, value: f64) -> Result<f64, InputError> {
    ensure_finite(field, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(InputError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: 1.0,
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_negative_accepts_zero() {
        assert_eq!(ensure_non_negative("x", 0.0), Ok(0.0));
    }

    #[test]
    fn non_negative_rejects_negative() {
        let err = ensure_non_negative("ttf", -1.0).unwrap_err();
        assert_eq!(
            err,
            InputError::Negative {
                field: "ttf",
                value: -1.0
            }
        );
    }

    #[test]
    fn nan_is_rejected_before_sign_check() {
        let err = ensure_non_negative("jkm", f64::NAN).unwrap_err();
        assert!(matches!(err, InputError::NonFinite { field: "jkm", .. }));
    }

    #[test]
    fn unit_interval_bounds_are_inclusive() {
        assert!(ensure_unit_interval("haircut", 0.0).is_ok());
        assert!(ensure_unit_interval("haircut", 1.0).is_ok());
        assert!(ensure_unit_interval("haircut", 1.0001).is_err());
        assert!(ensure_unit_interval("haircut", 5.0).is_err());
    }

    #[test]
    fn positive_rejects_zero() {
        assert!(ensure_positive("speed", 0.0).is_err());
    }

    #[test]
    fn missing_field_message_includes_date() {
        let err = InputError::MissingField {
            field: "JKM_USD_MMBTU".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1),
        };
        assert_eq!(
            err.to_string(),
            "missing required field 'JKM_USD_MMBTU' on 2024-03-01"
        );
    }

    #[test]
    fn engine_error_classifies_physical() {
        let err: EngineError = PhysicalInfeasibility {
            capacity_m3: 100.0,
            boil_off_m3: 120.0,
            voyage_days: 50.0,
        }
        .into();
        assert!(err.is_physical());
        let err: EngineError = InputError::DuplicateDate {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
        .into();
        assert!(!err.is_physical());
    }
}
