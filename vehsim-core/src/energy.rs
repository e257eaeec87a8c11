//! Energy use of a vehicle over a trip: fuel and electricity drawn, their
//! primary energy content, and the fraction turned into useful work.

use crate::imports::*;
use crate::params::{CalcParams, KM_PER_MI, L_PER_GAL, MJ_PER_KWH};
use crate::scenario::DrivingConditions;
use crate::vehicle::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnergyResult {
    pub kind: VehicleKind,
    pub distance_km: f64,
    pub driving_conditions: DrivingConditions,
    /// liters of fuel burned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_liters: Option<f64>,
    /// kWh drawn from the battery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_kwh: Option<f64>,
    /// primary energy of fuel and electricity combined, MJ
    pub total_energy_mj: f64,
    pub useful_energy_mj: f64,
    pub efficiency: f64,
    /// energy drawn as a percentage of battery capacity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_depletion_pct: Option<f64>,
    /// depletion percentage at or above which the battery counts as depleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_depletion_limit_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electric_distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ice_distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electric_distance_share: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ice_share: Option<f64>,
    /// miles per gallon of gasoline equivalent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpge: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recharge_time_h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_depleted: Option<bool>,
}

impl EnergyResult {
    fn new(
        kind: VehicleKind,
        distance_km: f64,
        driving_conditions: DrivingConditions,
        total_energy_mj: f64,
        efficiency: f64,
    ) -> Self {
        Self {
            kind,
            distance_km,
            driving_conditions,
            fuel_liters: None,
            energy_kwh: None,
            total_energy_mj,
            useful_energy_mj: total_energy_mj * efficiency,
            efficiency,
            battery_depletion_pct: None,
            battery_depletion_limit_pct: None,
            electric_distance_km: None,
            ice_distance_km: None,
            electric_distance_share: None,
            ice_share: None,
            mpge: None,
            recharge_time_h: None,
            battery_depleted: None,
        }
    }

    /// Copy with every energy quantity multiplied by `factor`, distance and
    /// ratios unchanged.  Used for seasonal and day-to-day variation.  The
    /// depletion flag is re-evaluated against the scaled percentage.
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |x: Option<f64>| x.map(|x| x * factor);
        let battery_depletion_pct = scale(self.battery_depletion_pct);
        Self {
            fuel_liters: scale(self.fuel_liters),
            energy_kwh: scale(self.energy_kwh),
            total_energy_mj: self.total_energy_mj * factor,
            useful_energy_mj: self.useful_energy_mj * factor,
            battery_depletion_pct,
            battery_depleted: battery_depletion_pct
                .zip(self.battery_depletion_limit_pct)
                .map(|(pct, limit)| pct >= limit)
                .or(self.battery_depleted),
            recharge_time_h: scale(self.recharge_time_h),
            mpge: if factor > 0.0 {
                self.mpge.map(|mpge| mpge / factor)
            } else {
                None
            },
            ..self.clone()
        }
    }
}

/// Computes energy use of `vehicle` over `distance_km` driven under `conditions`
///
/// # Arguments
/// - `vehicle`: vehicle specification
/// - `distance_km`: trip distance, must be non-negative
/// - `conditions`: driving conditions
/// - `params`: engine constants
pub fn compute_energy(
    vehicle: &VehicleSpec,
    distance_km: f64,
    conditions: DrivingConditions,
    params: &CalcParams,
) -> anyhow::Result<EnergyResult> {
    let cons = vehicle
        .consumption(distance_km, conditions, params)
        .with_context(|| format!("energy use of {:?}", vehicle.name))?;
    let kind = vehicle.kind();
    let props = &params.props;

    let res = match &vehicle.powertrain {
        PowertrainType::ConventionalVehicle(_) => EnergyResult {
            fuel_liters: Some(cons.fuel_liters),
            ..EnergyResult::new(
                kind,
                distance_km,
                conditions,
                props.fuel_energy_mj(cons.fuel_liters),
                params.energy.ice_efficiency,
            )
        },
        PowertrainType::BatteryElectricVehicle(bev) => EnergyResult {
            energy_kwh: Some(cons.energy_kwh),
            battery_depletion_pct: Some(bev.battery_depletion_pct(cons.energy_kwh)?),
            ..EnergyResult::new(
                kind,
                distance_km,
                conditions,
                cons.energy_kwh * MJ_PER_KWH,
                params.energy.ev_efficiency,
            )
        },
        PowertrainType::HybridElectricVehicle(hev) => {
            let ice_mj = props.fuel_energy_mj(cons.fuel_liters);
            let mut ev_mj = cons.energy_kwh * MJ_PER_KWH;
            if conditions == DrivingConditions::Highway {
                ev_mj /= hev.charge_path_efficiency()?;
            }
            let battery_depletion_pct = match hev.bev.battery_capacity_kwh {
                Some(cap) if cap > 0.0 => Some(hev.bev.battery_depletion_pct(cons.energy_kwh)?),
                _ => None,
            };
            EnergyResult {
                fuel_liters: Some(cons.fuel_liters),
                energy_kwh: Some(cons.energy_kwh),
                battery_depletion_pct,
                ice_share: Some(cons.ice_share),
                electric_distance_share: Some(1.0 - cons.ice_share),
                ..EnergyResult::new(
                    kind,
                    distance_km,
                    conditions,
                    ice_mj + ev_mj,
                    hev.efficiency(conditions, params),
                )
            }
        }
        PowertrainType::PluginHybridElectricVehicle(phev) => {
            let ice_mj = props.fuel_energy_mj(cons.fuel_liters);
            let ev_mj = cons.energy_kwh * MJ_PER_KWH;
            let total_mj = ice_mj + ev_mj;
            let useful_mj = ice_mj * phev.engine_efficiency + ev_mj * phev.motor_efficiency;
            let efficiency = if total_mj > 0.0 {
                useful_mj / total_mj
            } else {
                phev.motor_efficiency
            };
            let gge = cons.energy_kwh / props.kwh_per_gge + cons.fuel_liters / L_PER_GAL;
            let (battery_depletion_pct, battery_depleted) = match phev.battery_capacity_kwh {
                Some(_) => (
                    Some(phev.battery_depletion_pct(cons.energy_kwh)?),
                    Some(phev.is_depleted(cons.energy_kwh)?),
                ),
                None => (None, None),
            };
            let battery_depletion_limit_pct =
                battery_depleted.map(|_| phev.depletion_limit_pct());
            EnergyResult {
                fuel_liters: Some(cons.fuel_liters),
                energy_kwh: Some(cons.energy_kwh),
                useful_energy_mj: useful_mj,
                battery_depletion_pct,
                battery_depleted,
                battery_depletion_limit_pct,
                electric_distance_km: Some(cons.electric_distance_km),
                ice_distance_km: Some(cons.ice_distance_km),
                electric_distance_share: (distance_km > 0.0)
                    .then(|| cons.electric_distance_km / distance_km),
                ice_share: (distance_km > 0.0).then_some(cons.ice_share),
                mpge: (gge > 0.0).then(|| distance_km / KM_PER_MI / gge),
                recharge_time_h: phev.recharge_time_h(cons.energy_kwh),
                ..EnergyResult::new(kind, distance_km, conditions, total_mj, efficiency)
            }
        }
    };
    Ok(res)
}
