use super::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
/// Hybrid vehicle with an engine and a small battery that is only charged on board
pub struct HybridElectricVehicle {
    #[serde(flatten)]
    pub conv: ConventionalVehicle,
    #[serde(flatten)]
    pub bev: BatteryElectricVehicle,
    /// Share of work done by the engine in mixed driving
    #[serde(default = "default_ice_share")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub ice_share: f64,
    /// Efficiency of the engine-driven generator that charges the battery
    #[serde(default = "default_generator_efficiency")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub generator_efficiency: f64,
}

fn default_ice_share() -> f64 {
    0.5
}

fn default_generator_efficiency() -> f64 {
    0.85
}

impl Init for HybridElectricVehicle {
    fn init(&mut self) -> anyhow::Result<()> {
        self.conv.init()?;
        self.bev.init()?;
        validate_fields(self, "HEV attributes")
    }
}

impl HybridElectricVehicle {
    /// Share of the trip driven on the engine.  City and highway use fixed
    /// fleet-typical splits; mixed driving uses the vehicle's own rating.
    pub fn ice_share(&self, conditions: DrivingConditions, params: &CalcParams) -> f64 {
        match conditions {
            DrivingConditions::City => params.energy.hev_city_ice_share,
            DrivingConditions::Highway => params.energy.hev_highway_ice_share,
            DrivingConditions::Mixed => self.ice_share,
        }
    }

    /// Share-weighted efficiency of engine and motor, less generator losses
    pub fn efficiency(&self, conditions: DrivingConditions, params: &CalcParams) -> f64 {
        let ice_share = self.ice_share(conditions, params);
        (self.conv.engine_efficiency * ice_share + self.bev.motor_efficiency * (1.0 - ice_share))
            * self.generator_efficiency
    }

    /// Loss factor applied to battery energy that was produced by the engine
    /// rather than recovered, i.e. sustained highway driving
    pub fn charge_path_efficiency(&self) -> anyhow::Result<f64> {
        let eff = self.generator_efficiency * self.bev.charging_efficiency;
        if eff <= 0.0 {
            return Err(CalcError::DivisionByZero {
                quantity: "hev_charge_path_efficiency",
            })
            .context(format_dbg!(eff));
        }
        Ok(eff)
    }

    pub(crate) fn mean(items: &[&Self]) -> Self {
        let convs: Vec<&ConventionalVehicle> = items.iter().map(|hev| &hev.conv).collect();
        let bevs: Vec<&BatteryElectricVehicle> = items.iter().map(|hev| &hev.bev).collect();
        Self {
            conv: ConventionalVehicle::mean(&convs),
            bev: BatteryElectricVehicle::mean(&bevs),
            ..mean_fields!(
                items,
                HybridElectricVehicle {
                    ice_share,
                    generator_efficiency,
                }
            )
        }
    }
}

impl EnergyUse for HybridElectricVehicle {
    fn consumption(
        &self,
        distance_km: f64,
        conditions: DrivingConditions,
        params: &CalcParams,
    ) -> anyhow::Result<Consumption> {
        let ice_share = self.ice_share(conditions, params);
        Ok(Consumption {
            fuel_liters: self.conv.fuel_liters(distance_km, conditions, params) * ice_share,
            energy_kwh: self.bev.energy_kwh(distance_km, conditions, params) * (1.0 - ice_share),
            electric_distance_km: distance_km * (1.0 - ice_share),
            ice_distance_km: distance_km * ice_share,
            ice_share,
        })
    }
}
