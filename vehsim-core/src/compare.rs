//! Side-by-side evaluation of several vehicles under one scenario.
//!
//! A vehicle that cannot be evaluated, e.g. an EV without a battery
//! capacity, is dropped from the rows with a warning and listed in
//! `skipped` so the remaining vehicles are still compared.

use crate::cost::{calculate_tco, energy_cost, TcoResult};
use crate::emissions::scenario_co2;
use crate::energy::{compute_energy, EnergyResult};
use crate::imports::*;
use crate::params::CalcParams;
use crate::scenario::{DrivingConditions, Scenario};
use crate::vehicle::{VehicleKind, VehicleSpec};
use std::cmp::Ordering;

/// A vehicle left out of a comparison and why
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SkippedVehicle {
    /// position in the input
    pub index: usize,
    pub name: String,
    pub kind: VehicleKind,
    pub reason: String,
}

impl SkippedVehicle {
    pub(crate) fn new(index: usize, vehicle: &VehicleSpec, err: &anyhow::Error) -> Self {
        Self {
            index,
            name: vehicle.name.clone(),
            kind: vehicle.kind(),
            reason: format!("{err:#}"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ComparisonRow<T> {
    pub index: usize,
    pub name: String,
    pub kind: VehicleKind,
    pub result: T,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Comparison<T> {
    pub rows: Vec<ComparisonRow<T>>,
    pub skipped: Vec<SkippedVehicle>,
}

impl<T> Default for Comparison<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T: Serialize + for<'a> Deserialize<'a>> SerdeAPI for Comparison<T> {}
impl<T> Init for Comparison<T> {}

impl<T> Comparison<T> {
    /// Evaluates `f` for every vehicle, skipping the ones it fails for
    pub fn collect<F>(vehicles: &[VehicleSpec], f: F) -> Self
    where
        F: Fn(&VehicleSpec) -> anyhow::Result<T>,
    {
        let mut comparison = Self::default();
        for (index, veh) in vehicles.iter().enumerate() {
            match f(veh) {
                Ok(result) => comparison.rows.push(ComparisonRow {
                    index,
                    name: veh.name.clone(),
                    kind: veh.kind(),
                    result,
                }),
                Err(err) => {
                    log::warn!("skipping vehicle idx {index} {:?}: {err:#}", veh.name);
                    comparison
                        .skipped
                        .push(SkippedVehicle::new(index, veh, &err));
                }
            }
        }
        comparison
    }

    /// Row with the smallest `key`
    pub fn best_by<K, F>(&self, key: F) -> Option<&ComparisonRow<T>>
    where
        K: PartialOrd,
        F: Fn(&T) -> K,
    {
        self.rows.iter().min_by(|a, b| {
            key(&a.result)
                .partial_cmp(&key(&b.result))
                .unwrap_or(Ordering::Equal)
        })
    }

    /// Rows ordered by ascending `key`
    pub fn ranked_by<K, F>(&self, key: F) -> Vec<&ComparisonRow<T>>
    where
        K: PartialOrd,
        F: Fn(&T) -> K,
    {
        let mut rows: Vec<&ComparisonRow<T>> = self.rows.iter().collect();
        rows.sort_by(|a, b| {
            key(&a.result)
                .partial_cmp(&key(&b.result))
                .unwrap_or(Ordering::Equal)
        });
        rows
    }
}

/// Everything computed for one vehicle by [compare_all]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VehicleReport {
    pub energy: EnergyResult,
    pub co2_g: f64,
    /// fuel and electricity cost of the trip
    pub trip_cost: f64,
    pub tco: TcoResult,
}

pub type ComparisonReport = Comparison<VehicleReport>;

pub fn compare_energy(
    vehicles: &[VehicleSpec],
    distance_km: f64,
    conditions: DrivingConditions,
    params: &CalcParams,
) -> Comparison<EnergyResult> {
    Comparison::collect(vehicles, |veh| {
        compute_energy(veh, distance_km, conditions, params)
    })
}

pub fn compare_emissions(
    vehicles: &[VehicleSpec],
    scenario: &Scenario,
    params: &CalcParams,
) -> Comparison<f64> {
    Comparison::collect(vehicles, |veh| scenario_co2(veh, scenario, params))
}

pub fn compare_tco(
    vehicles: &[VehicleSpec],
    distance_km: Option<f64>,
    params: &CalcParams,
) -> Comparison<TcoResult> {
    Comparison::collect(vehicles, |veh| calculate_tco(veh, distance_km, params))
}

/// Energy, emissions and trip cost over `scenario` plus lifetime TCO for
/// every vehicle
pub fn compare_all(
    vehicles: &[VehicleSpec],
    scenario: &Scenario,
    params: &CalcParams,
) -> ComparisonReport {
    Comparison::collect(vehicles, |veh| {
        Ok(VehicleReport {
            energy: compute_energy(
                veh,
                scenario.distance_km,
                scenario.driving_conditions,
                params,
            )?,
            co2_g: scenario_co2(veh, scenario, params)?,
            trip_cost: energy_cost(
                veh,
                scenario.distance_km,
                scenario.driving_conditions,
                params,
            )?,
            tco: calculate_tco(veh, None, params)?,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::vehicle_model::tests::*;
    use crate::vehicle::PowertrainType;

    #[test]
    fn test_compare_all() {
        let params = CalcParams::default();
        let report = compare_all(&mock_fleet(), &Scenario::default(), &params);
        assert_eq!(report.rows.len(), 4);
        assert!(report.skipped.is_empty());
        let kinds: Vec<VehicleKind> = report.rows.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, VehicleKind::all().to_vec());
        // ICE trip cost over the default 100 km
        assert!(almost_eq(report.rows[0].result.trip_cost, 6.0 * 55.0, None));
    }

    #[test]
    fn test_partial_failure() {
        let params = CalcParams::default();
        let mut vehicles = mock_fleet();
        if let PowertrainType::BatteryElectricVehicle(bev) = &mut vehicles[1].powertrain {
            bev.battery_capacity_kwh = None;
        }
        let energy = compare_energy(&vehicles, 50.0, DrivingConditions::City, &params);
        assert_eq!(energy.rows.len(), 3);
        assert_eq!(energy.skipped.len(), 1);
        assert_eq!(energy.skipped[0].kind, VehicleKind::EV);
        assert!(energy.skipped[0].reason.contains("battery_capacity_kwh"));

        // emissions and cost do not need the battery capacity
        let co2 = compare_emissions(&vehicles, &Scenario::default(), &params);
        assert_eq!(co2.rows.len(), 4);
        let tco = compare_tco(&vehicles, None, &params);
        assert!(tco.skipped.is_empty());
    }

    #[test]
    fn test_ranking() {
        let params = CalcParams::default();
        let co2 = compare_emissions(&mock_fleet(), &Scenario::default(), &params);
        let best = co2.best_by(|g| *g).unwrap();
        let ranked = co2.ranked_by(|g| *g);
        assert_eq!(ranked[0], best);
        assert!(ranked.windows(2).all(|w| w[0].result <= w[1].result));
        // ICE burns the most per km under the default grid mix
        assert_eq!(ranked.last().unwrap().kind, VehicleKind::ICE);
    }
}
