//! Convenience module for exposing commonly used structs

pub use crate::compare::{
    compare_all, compare_emissions, compare_energy, compare_tco, Comparison, ComparisonReport,
};
pub use crate::cost::{calculate_tco, daily_energy_cost, energy_cost, TcoResult};
pub use crate::dynamics::{required_force, simulate_acceleration, AccelerationRun, ForceResult};
pub use crate::emissions::{compute_co2, scenario_co2};
pub use crate::energy::{compute_energy, EnergyResult};
pub use crate::error::CalcError;
pub use crate::params::CalcParams;
pub use crate::scenario::{DrivingConditions, EnergySource, Scenario, Season};
pub use crate::simulation::{
    simulate_fleet, ConditionPolicy, DailyResult, NoiseParams, SimulationResult, SimulationRun,
};
pub use crate::traits::{Init, SerdeAPI};
pub use crate::vehicle::{
    Chassis, Ev, FuelType, Hev, Ice, Phev, PowertrainType, VehicleKind, VehicleSpec,
};
