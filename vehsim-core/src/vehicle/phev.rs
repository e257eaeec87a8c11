use super::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
/// Plug-in hybrid: drives on an externally charged battery until its electric
/// range is used up, then on the engine
pub struct PluginHybridElectricVehicle {
    #[validate(range(min = 0.0, max = 1.0))]
    pub engine_efficiency: f64,
    /// Fuel economy in charge-sustaining mode, miles per US gallon
    #[validate(range(min = 0.0))]
    pub mpg_gas_only: f64,
    #[serde(default = "conv::default_co2_g_per_l")]
    #[validate(range(min = 0.0))]
    pub co2_g_per_l: f64,
    #[serde(default)]
    pub fuel_type: FuelType,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub battery_capacity_kwh: Option<f64>,
    /// Energy consumption in charge-depleting mode, kWh/100km
    #[validate(range(min = 0.0))]
    pub kwh_per_100km_battery_only: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub motor_efficiency: f64,
    #[serde(default = "bev::default_charging_efficiency")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub charging_efficiency: f64,
    /// Rated electric-only range, km
    #[serde(alias = "battery_only_range_km")]
    #[validate(range(min = 0.0))]
    pub electric_range_km: f64,
    /// State of charge, as a fraction, below which the battery counts as depleted
    #[serde(default = "default_battery_depletion_threshold")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub battery_depletion_threshold: f64,
    /// On-board charger power, kW
    #[serde(default = "default_charging_power_kw")]
    #[validate(range(min = 0.0))]
    pub charging_power_kw: f64,
}

fn default_battery_depletion_threshold() -> f64 {
    0.2
}

fn default_charging_power_kw() -> f64 {
    7.4
}

impl Init for PluginHybridElectricVehicle {
    fn init(&mut self) -> anyhow::Result<()> {
        validate_fields(self, "PHEV attributes")
    }
}

impl PluginHybridElectricVehicle {
    /// Charge-sustaining fuel consumption converted from MPG
    pub fn fuel_consumption_l_per_100km(&self) -> anyhow::Result<f64> {
        if self.mpg_gas_only <= 0.0 {
            return Err(CalcError::MissingAttribute {
                kind: "PHEV",
                attribute: "mpg_gas_only",
            })
            .context(format_dbg!(self.mpg_gas_only));
        }
        Ok(MPG_TO_L_PER_100KM / self.mpg_gas_only)
    }

    /// Electric range achieved in everyday use
    pub fn effective_electric_range_km(&self, params: &CalcParams) -> f64 {
        self.electric_range_km * params.energy.phev_range_utilisation
    }

    /// Splits `distance_km` into (electric, engine) segments.  The electric
    /// segment comes first and never exceeds the effective range.
    pub fn split_distance(&self, distance_km: f64, params: &CalcParams) -> (f64, f64) {
        let electric_distance_km = distance_km.min(self.effective_electric_range_km(params));
        (electric_distance_km, distance_km - electric_distance_km)
    }

    pub fn battery_depletion_pct(&self, energy_kwh: f64) -> anyhow::Result<f64> {
        bev::battery_depletion_pct(self.battery_capacity_kwh, energy_kwh, "PHEV")
    }

    /// Whether drawing `energy_kwh` from a full battery crosses the depletion threshold
    pub fn is_depleted(&self, energy_kwh: f64) -> anyhow::Result<bool> {
        Ok(self.battery_depletion_pct(energy_kwh)? >= self.depletion_limit_pct())
    }

    /// Depletion percentage at which the remaining charge hits the threshold
    pub fn depletion_limit_pct(&self) -> f64 {
        (1.0 - self.battery_depletion_threshold) * 100.0
    }

    /// Hours needed to put `energy_kwh` back into the battery from the grid
    pub fn recharge_time_h(&self, energy_kwh: f64) -> Option<f64> {
        let grid_kw = self.charging_power_kw * self.charging_efficiency;
        if grid_kw > 0.0 {
            Some(energy_kwh / grid_kw)
        } else {
            None
        }
    }

    pub(crate) fn mean(items: &[&Self]) -> Self {
        Self {
            battery_capacity_kwh: utils::mean(
                items.iter().filter_map(|phev| phev.battery_capacity_kwh),
            ),
            ..mean_fields!(
                items,
                PluginHybridElectricVehicle {
                    engine_efficiency,
                    mpg_gas_only,
                    co2_g_per_l,
                    kwh_per_100km_battery_only,
                    motor_efficiency,
                    charging_efficiency,
                    electric_range_km,
                    battery_depletion_threshold,
                    charging_power_kw,
                }
            )
        }
    }
}

impl EnergyUse for PluginHybridElectricVehicle {
    fn consumption(
        &self,
        distance_km: f64,
        conditions: DrivingConditions,
        params: &CalcParams,
    ) -> anyhow::Result<Consumption> {
        let l_per_100km = self.fuel_consumption_l_per_100km()?;
        let (electric_distance_km, ice_distance_km) = self.split_distance(distance_km, params);
        let energy_kwh = self.kwh_per_100km_battery_only
            * params.energy.ev_condition_factors.factor(conditions)
            * electric_distance_km
            / 100.0;
        let fuel_liters = l_per_100km
            * params.energy.ice_condition_factors.factor(conditions)
            * ice_distance_km
            / 100.0;
        let ice_share = if distance_km > 0.0 {
            ice_distance_km / distance_km
        } else {
            0.0
        };
        Ok(Consumption {
            fuel_liters,
            energy_kwh,
            electric_distance_km,
            ice_distance_km,
            ice_share,
        })
    }
}
