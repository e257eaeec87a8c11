use super::*;

/// Fuel and electricity drawn over a trip, split by the share of distance
/// covered by each energy carrier
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Consumption {
    /// liters of liquid fuel burned
    pub fuel_liters: f64,
    /// kWh drawn from the battery
    pub energy_kwh: f64,
    /// distance driven on battery power
    pub electric_distance_km: f64,
    /// distance driven on the engine
    pub ice_distance_km: f64,
    /// fraction of the trip attributed to the engine
    pub ice_share: f64,
}

impl Consumption {
    pub fn distance_km(&self) -> f64 {
        self.electric_distance_km + self.ice_distance_km
    }
}

pub trait EnergyUse {
    /// Returns fuel and electricity used over `distance_km` under `conditions`
    ///
    /// # Arguments
    /// - `distance_km`: trip distance
    /// - `conditions`: driving conditions, selects consumption multipliers
    /// - `params`: engine constants
    fn consumption(
        &self,
        distance_km: f64,
        conditions: DrivingConditions,
        params: &CalcParams,
    ) -> anyhow::Result<Consumption>;
}
