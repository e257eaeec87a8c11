use super::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
/// Battery electric vehicle
pub struct BatteryElectricVehicle {
    /// Usable battery capacity, kWh
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub battery_capacity_kwh: Option<f64>,
    /// Rated energy consumption, kWh/100km
    #[validate(range(min = 0.0))]
    pub energy_consumption_kwh_per_100km: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub motor_efficiency: f64,
    /// Grid-to-battery efficiency
    #[serde(default = "default_charging_efficiency")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub charging_efficiency: f64,
}

pub(crate) fn default_charging_efficiency() -> f64 {
    0.9
}

impl Init for BatteryElectricVehicle {
    fn init(&mut self) -> anyhow::Result<()> {
        validate_fields(self, "EV attributes")
    }
}

impl BatteryElectricVehicle {
    /// Battery energy drawn over `distance_km`, adjusted for `conditions`
    pub fn energy_kwh(
        &self,
        distance_km: f64,
        conditions: DrivingConditions,
        params: &CalcParams,
    ) -> f64 {
        self.energy_consumption_kwh_per_100km
            * params.energy.ev_condition_factors.factor(conditions)
            * distance_km
            / 100.0
    }

    /// Percentage of the battery used by drawing `energy_kwh`
    pub fn battery_depletion_pct(&self, energy_kwh: f64) -> anyhow::Result<f64> {
        battery_depletion_pct(self.battery_capacity_kwh, energy_kwh, "EV")
    }

    pub(crate) fn mean(items: &[&Self]) -> Self {
        Self {
            battery_capacity_kwh: utils::mean(
                items.iter().filter_map(|bev| bev.battery_capacity_kwh),
            ),
            ..mean_fields!(
                items,
                BatteryElectricVehicle {
                    energy_consumption_kwh_per_100km,
                    motor_efficiency,
                    charging_efficiency,
                }
            )
        }
    }
}

/// `energy_kwh` as a percentage of `capacity_kwh`; a missing or zero capacity
/// is a configuration error
pub(crate) fn battery_depletion_pct(
    capacity_kwh: Option<f64>,
    energy_kwh: f64,
    kind: &'static str,
) -> anyhow::Result<f64> {
    let capacity_kwh = capacity_kwh.ok_or(CalcError::MissingAttribute {
        kind,
        attribute: "battery_capacity_kwh",
    })?;
    if capacity_kwh <= 0.0 {
        return Err(CalcError::DivisionByZero {
            quantity: "battery_depletion_pct",
        })
        .context(format!("{kind} battery capacity is {capacity_kwh} kWh"));
    }
    Ok(energy_kwh / capacity_kwh * 100.0)
}

impl EnergyUse for BatteryElectricVehicle {
    fn consumption(
        &self,
        distance_km: f64,
        conditions: DrivingConditions,
        params: &CalcParams,
    ) -> anyhow::Result<Consumption> {
        Ok(Consumption {
            fuel_liters: 0.0,
            energy_kwh: self.energy_kwh(distance_km, conditions, params),
            electric_distance_km: distance_km,
            ice_distance_km: 0.0,
            ice_share: 0.0,
        })
    }
}
