use super::*;

#[derive(PartialEq, Clone, Debug, Serialize, Deserialize, Validate)]
/// Body and road-load attributes shared by every powertrain type
pub struct Chassis {
    /// Vehicle curb mass, kg
    #[validate(range(min = 0.0))]
    pub mass_kg: f64,
    /// Projected frontal area for drag calculations, m²
    #[validate(range(min = 0.0))]
    pub frontal_area_m2: f64,
    /// Aerodynamic drag coefficient
    #[validate(range(min = 0.0))]
    pub drag_coef: f64,
    /// Wheel rolling resistance coefficient for the vehicle (i.e. all wheels included)
    #[serde(alias = "wheel_rr_coef")]
    #[validate(range(min = 0.0))]
    pub rolling_coef: f64,
    /// Peak longitudinal acceleration at full throttle, m/s²
    #[serde(default = "default_max_acceleration_mps2")]
    #[validate(range(min = 0.0))]
    pub max_acceleration_mps2: f64,
    /// Top speed, km/h
    #[serde(default = "default_max_speed_kmh")]
    #[validate(range(min = 0.0))]
    pub max_speed_kmh: f64,
}

fn default_max_acceleration_mps2() -> f64 {
    3.0
}

fn default_max_speed_kmh() -> f64 {
    180.0
}

impl Init for Chassis {
    fn init(&mut self) -> anyhow::Result<()> {
        validate_fields(self, "chassis")
    }
}

impl Chassis {
    pub(crate) fn mean(items: &[&Self]) -> Self {
        mean_fields!(
            items,
            Chassis {
                mass_kg,
                frontal_area_m2,
                drag_coef,
                rolling_coef,
                max_acceleration_mps2,
                max_speed_kmh,
            }
        )
    }
}
