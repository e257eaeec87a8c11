//! Typed failures raised by the calculation engines.
//!
//! Engines return [`anyhow::Result`] and attach one of these as the root cause
//! so callers can recover the specific failure with
//! `err.downcast_ref::<CalcError>()`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("unsupported vehicle kind `{0}`, expected one of ICE, EV, HEV, PHEV")]
    UnsupportedVehicleKind(String),
    #[error("{kind} vehicle is missing required attribute `{attribute}`")]
    MissingAttribute {
        kind: &'static str,
        attribute: &'static str,
    },
    #[error("division by zero while computing `{quantity}`")]
    DivisionByZero { quantity: &'static str },
    #[error("end date {end} is before start date {start}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
    #[error("fleet must contain a single vehicle kind: expected {expected}, found {found}")]
    MixedFleet {
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid value {value} for parameter `{name}`")]
    InvalidParameter { name: &'static str, value: f64 },
}
