#![allow(clippy::field_reassign_with_default)]

//! Crate containing engines for energy use, CO₂ emissions and total cost of
//! ownership of internal-combustion, battery-electric, hybrid and plug-in
//! hybrid road vehicles, plus a day-stepped simulation over a calendar period.
//! # Features:
//! - resources: bundle the sample vehicle files found in `resources/`

#[macro_use]
pub mod macros;

pub mod compare;
pub mod cost;
pub mod dynamics;
pub mod emissions;
pub mod energy;
pub mod error;
pub mod imports;
pub mod params;
pub mod prelude;
#[cfg(feature = "resources")]
pub mod resources;
pub mod scenario;
pub mod simulation;
pub mod traits;
pub mod utils;
pub mod vehicle;
