//! Module containing submodules for vehicle and powertrain models

pub(crate) use crate::imports::*;
pub(crate) use crate::params::*;
pub(crate) use crate::scenario::DrivingConditions;

// powertrain types
pub mod bev;
pub mod conv;
pub mod hev;
pub mod phev;

// vehicle model
pub mod chassis;
pub mod fleet;
pub mod powertrain_type;
pub mod traits;
pub mod vehicle_model;

pub use bev::BatteryElectricVehicle;
pub use chassis::Chassis;
pub use conv::{ConventionalVehicle, FuelType};
pub use hev::HybridElectricVehicle;
pub use phev::PluginHybridElectricVehicle;
pub use powertrain_type::{PowertrainType, VehicleKind};
pub use traits::*;
pub use vehicle_model::VehicleSpec;

pub type Ice = ConventionalVehicle;
pub type Ev = BatteryElectricVehicle;
pub type Hev = HybridElectricVehicle;
pub type Phev = PluginHybridElectricVehicle;
