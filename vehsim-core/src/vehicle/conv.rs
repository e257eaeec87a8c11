use super::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    #[default]
    Petrol,
    Diesel,
}

impl FuelType {
    /// g CO₂ emitted per liter burned
    pub fn co2_g_per_l(&self, params: &EmissionParams) -> f64 {
        match self {
            Self::Petrol => params.petrol_co2_g_per_l,
            Self::Diesel => params.diesel_co2_g_per_l,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
/// Conventional vehicle with only an internal combustion engine as a power source
pub struct ConventionalVehicle {
    /// Rated fuel consumption, L/100km
    #[validate(range(min = 0.0))]
    pub fuel_consumption_l_per_100km: f64,
    /// Engine efficiency, fraction of fuel energy delivered as work
    #[validate(range(min = 0.0, max = 1.0))]
    pub engine_efficiency: f64,
    /// Tailpipe CO₂ per liter of fuel, g/L.  Only read for the engine of an
    /// HEV; a plain ICE vehicle is rated with the fuel-type factor in
    /// `EmissionParams` and ignores this field.
    #[serde(default = "default_co2_g_per_l")]
    #[validate(range(min = 0.0))]
    pub co2_g_per_l: f64,
    #[serde(default = "default_transmission_ratio")]
    #[validate(range(min = 0.0))]
    pub transmission_ratio: f64,
    #[serde(default)]
    pub fuel_type: FuelType,
}

pub(crate) fn default_co2_g_per_l() -> f64 {
    2300.0
}

fn default_transmission_ratio() -> f64 {
    1.0
}

impl Init for ConventionalVehicle {
    fn init(&mut self) -> anyhow::Result<()> {
        validate_fields(self, "ICE attributes")
    }
}

impl ConventionalVehicle {
    /// Fuel burned over `distance_km`, adjusted for `conditions`
    pub fn fuel_liters(
        &self,
        distance_km: f64,
        conditions: DrivingConditions,
        params: &CalcParams,
    ) -> f64 {
        self.fuel_consumption_l_per_100km
            * params.energy.ice_condition_factors.factor(conditions)
            * distance_km
            / 100.0
    }

    pub(crate) fn mean(items: &[&Self]) -> Self {
        mean_fields!(
            items,
            ConventionalVehicle {
                fuel_consumption_l_per_100km,
                engine_efficiency,
                co2_g_per_l,
                transmission_ratio,
            }
        )
    }
}

impl EnergyUse for ConventionalVehicle {
    fn consumption(
        &self,
        distance_km: f64,
        conditions: DrivingConditions,
        params: &CalcParams,
    ) -> anyhow::Result<Consumption> {
        Ok(Consumption {
            fuel_liters: self.fuel_liters(distance_km, conditions, params),
            energy_kwh: 0.0,
            electric_distance_km: 0.0,
            ice_distance_km: distance_km,
            ice_share: 1.0,
        })
    }
}
