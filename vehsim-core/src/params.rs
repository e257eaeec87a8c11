//! Module containing calculation parameters.
//!
//! Every constant the engines use lives in [CalcParams] so that a partial
//! YAML/JSON file can override any of them; unspecified fields keep their
//! defaults.

use crate::imports::*;
use crate::scenario::{DrivingConditions, EnergySource, Season};
use serde::Deserializer;

/// Unit conversions that should NEVER change
pub const MJ_PER_KWH: f64 = 3.6;
pub const KM_PER_MI: f64 = 1.609344;
pub const L_PER_GAL: f64 = 3.785411784;
/// L/100km = `MPG_TO_L_PER_100KM` / MPG
pub const MPG_TO_L_PER_100KM: f64 = 235.214583;
pub const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Validate)]
#[serde(default)]
pub struct PhysicalProperties {
    /// gasoline density, kg/L
    #[validate(range(min = 0.0))]
    pub fuel_rho_kg_per_l: f64,
    /// lower heating value of gasoline, MJ/kg
    #[validate(range(min = 0.0))]
    pub fuel_lhv_mj_per_kg: f64,
    /// air density at 15 °C, sea level
    #[validate(range(min = 0.0))]
    pub air_density_kg_per_m3: f64,
    #[validate(range(min = 0.0))]
    pub a_grav_mps2: f64,
    /// kWh per gallon of gasoline, used for MPGe
    #[validate(range(min = 0.0))]
    pub kwh_per_gge: f64,
}

impl Default for PhysicalProperties {
    fn default() -> Self {
        Self {
            fuel_rho_kg_per_l: 0.745,
            fuel_lhv_mj_per_kg: 42.0,
            air_density_kg_per_m3: 1.225,
            a_grav_mps2: 9.81,
            kwh_per_gge: 33.7,
        }
    }
}

impl PhysicalProperties {
    /// Chemical energy of `liters` of gasoline, MJ
    pub fn fuel_energy_mj(&self, liters: f64) -> f64 {
        liters * self.fuel_rho_kg_per_l * self.fuel_lhv_mj_per_kg
    }
}

/// Consumption multipliers per driving condition
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Validate)]
pub struct ConditionFactors {
    #[validate(range(min = 0.0))]
    pub city: f64,
    #[validate(range(min = 0.0))]
    pub highway: f64,
    #[validate(range(min = 0.0))]
    pub mixed: f64,
}

/// [ConditionFactors] as written in an override file, any entry may be left out
#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct ConditionFactorsOverride {
    city: Option<f64>,
    highway: Option<f64>,
    mixed: Option<f64>,
}

impl ConditionFactorsOverride {
    fn or(self, base: ConditionFactors) -> ConditionFactors {
        ConditionFactors {
            city: self.city.unwrap_or(base.city),
            highway: self.highway.unwrap_or(base.highway),
            mixed: self.mixed.unwrap_or(base.mixed),
        }
    }
}

fn ice_condition_factors<'de, D: Deserializer<'de>>(d: D) -> Result<ConditionFactors, D::Error> {
    Ok(ConditionFactorsOverride::deserialize(d)?.or(EnergyParams::default().ice_condition_factors))
}

fn ev_condition_factors<'de, D: Deserializer<'de>>(d: D) -> Result<ConditionFactors, D::Error> {
    Ok(ConditionFactorsOverride::deserialize(d)?.or(EnergyParams::default().ev_condition_factors))
}

impl ConditionFactors {
    pub fn factor(&self, conditions: DrivingConditions) -> f64 {
        match conditions {
            DrivingConditions::City => self.city,
            DrivingConditions::Highway => self.highway,
            DrivingConditions::Mixed => self.mixed,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Validate)]
#[serde(default)]
pub struct EnergyParams {
    /// fraction of fuel energy turned into useful work by a generic engine
    #[validate(range(min = 0.0, max = 1.0))]
    pub ice_efficiency: f64,
    /// fraction of battery energy turned into useful work by a generic motor
    #[validate(range(min = 0.0, max = 1.0))]
    pub ev_efficiency: f64,
    #[serde(deserialize_with = "ice_condition_factors")]
    pub ice_condition_factors: ConditionFactors,
    #[serde(deserialize_with = "ev_condition_factors")]
    pub ev_condition_factors: ConditionFactors,
    /// HEV share of distance on the engine in city driving
    #[validate(range(min = 0.0, max = 1.0))]
    pub hev_city_ice_share: f64,
    /// HEV share of distance on the engine on the highway
    #[validate(range(min = 0.0, max = 1.0))]
    pub hev_highway_ice_share: f64,
    /// fraction of the rated PHEV electric range achieved in real use
    #[validate(range(min = 0.0, max = 1.0))]
    pub phev_range_utilisation: f64,
}

impl Default for EnergyParams {
    fn default() -> Self {
        Self {
            ice_efficiency: 0.30,
            ev_efficiency: 0.90,
            ice_condition_factors: ConditionFactors {
                city: 1.2,
                highway: 0.9,
                mixed: 1.0,
            },
            ev_condition_factors: ConditionFactors {
                city: 1.1,
                highway: 0.8,
                mixed: 1.0,
            },
            hev_city_ice_share: 0.4,
            hev_highway_ice_share: 0.8,
            phev_range_utilisation: 0.8,
        }
    }
}

/// Grid carbon intensity per generation mix, g CO₂/kWh
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Validate)]
#[serde(default)]
pub struct GridEmissionFactors {
    #[validate(range(min = 0.0))]
    pub coal: f64,
    #[validate(range(min = 0.0))]
    pub gas: f64,
    #[validate(range(min = 0.0))]
    pub nuclear: f64,
    #[validate(range(min = 0.0))]
    pub hydro: f64,
    #[validate(range(min = 0.0))]
    pub eu_avg: f64,
    #[validate(range(min = 0.0))]
    pub russia_avg: f64,
    #[validate(range(min = 0.0))]
    pub renewables: f64,
}

impl Default for GridEmissionFactors {
    fn default() -> Self {
        Self {
            coal: 900.0,
            gas: 450.0,
            nuclear: 0.0,
            hydro: 0.0,
            eu_avg: 300.0,
            russia_avg: 300.0,
            renewables: 50.0,
        }
    }
}

impl GridEmissionFactors {
    pub fn factor(&self, source: EnergySource) -> f64 {
        match source {
            EnergySource::Coal => self.coal,
            EnergySource::Gas => self.gas,
            EnergySource::Nuclear => self.nuclear,
            EnergySource::Hydro => self.hydro,
            EnergySource::EuAvg => self.eu_avg,
            EnergySource::RussiaAvg => self.russia_avg,
            EnergySource::Renewables => self.renewables,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Validate)]
#[serde(default)]
pub struct EmissionParams {
    /// g CO₂ per liter of gasoline burned
    #[validate(range(min = 0.0))]
    pub petrol_co2_g_per_l: f64,
    /// g CO₂ per liter of diesel burned
    #[validate(range(min = 0.0))]
    pub diesel_co2_g_per_l: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub recuperation_efficiency: f64,
    /// fraction of urban traction energy that braking recovery can offset
    #[validate(range(min = 0.0, max = 1.0))]
    pub recuperation_urban_weight: f64,
    /// HEV highway multiplier for generator and charging losses
    #[validate(range(min = 0.0))]
    pub hev_highway_correction: f64,
    pub grid: GridEmissionFactors,
}

impl Default for EmissionParams {
    fn default() -> Self {
        Self {
            petrol_co2_g_per_l: 2300.0,
            diesel_co2_g_per_l: 2640.0,
            recuperation_efficiency: 0.6,
            recuperation_urban_weight: 0.2,
            hev_highway_correction: 1.15,
            grid: Default::default(),
        }
    }
}

impl EmissionParams {
    /// Fraction of urban energy still drawn from the grid when recuperation is on
    pub fn recuperation_retained(&self) -> f64 {
        1.0 - self.recuperation_urban_weight * self.recuperation_efficiency
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Validate)]
#[serde(default)]
pub struct CostParams {
    #[validate(range(min = 0.0))]
    pub annual_km: f64,
    #[validate(range(min = 1))]
    pub lifetime_years: u32,
    /// insurance premium per year
    #[validate(range(min = 0.0))]
    pub insurance_per_year: f64,
    /// yearly ownership tax as a fraction of production price
    #[validate(range(min = 0.0, max = 1.0))]
    pub tax_rate: f64,
    #[validate(range(min = 0.0))]
    pub maintenance_per_km_ice: f64,
    #[validate(range(min = 0.0))]
    pub maintenance_per_km_ev: f64,
    #[validate(range(min = 0.0))]
    pub disposal_ice: f64,
    #[validate(range(min = 0.0))]
    pub disposal_ev: f64,
    #[validate(range(min = 0.0))]
    pub fuel_price_per_l: f64,
    #[validate(range(min = 0.0))]
    pub electricity_price_per_kwh: f64,
}

impl Default for CostParams {
    fn default() -> Self {
        Self {
            annual_km: 20_000.0,
            lifetime_years: 10,
            insurance_per_year: 30_000.0,
            tax_rate: 0.01,
            maintenance_per_km_ice: 5.0,
            maintenance_per_km_ev: 2.0,
            disposal_ice: 20_000.0,
            disposal_ev: 100_000.0,
            fuel_price_per_l: 55.0,
            electricity_price_per_kwh: 5.0,
        }
    }
}

impl CostParams {
    /// Lifetime distance used when none is given
    pub fn default_distance_km(&self) -> f64 {
        self.annual_km * self.lifetime_years as f64
    }
}

/// Multipliers applied to one quantity per season
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Validate)]
pub struct SeasonMultipliers {
    #[validate(range(min = 0.0))]
    pub winter: f64,
    #[validate(range(min = 0.0))]
    pub summer: f64,
    #[validate(range(min = 0.0))]
    pub shoulder: f64,
}

/// [SeasonMultipliers] as written in an override file
#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct SeasonMultipliersOverride {
    winter: Option<f64>,
    summer: Option<f64>,
    shoulder: Option<f64>,
}

impl SeasonMultipliersOverride {
    fn or(self, base: SeasonMultipliers) -> SeasonMultipliers {
        SeasonMultipliers {
            winter: self.winter.unwrap_or(base.winter),
            summer: self.summer.unwrap_or(base.summer),
            shoulder: self.shoulder.unwrap_or(base.shoulder),
        }
    }
}

fn energy_season<'de, D: Deserializer<'de>>(d: D) -> Result<SeasonMultipliers, D::Error> {
    Ok(SeasonMultipliersOverride::deserialize(d)?.or(SeasonFactors::default().energy))
}

fn emissions_season<'de, D: Deserializer<'de>>(d: D) -> Result<SeasonMultipliers, D::Error> {
    Ok(SeasonMultipliersOverride::deserialize(d)?.or(SeasonFactors::default().emissions))
}

fn cost_season<'de, D: Deserializer<'de>>(d: D) -> Result<SeasonMultipliers, D::Error> {
    Ok(SeasonMultipliersOverride::deserialize(d)?.or(SeasonFactors::default().cost))
}

impl SeasonMultipliers {
    pub fn factor(&self, season: Season) -> f64 {
        match season {
            Season::Winter => self.winter,
            Season::Summer => self.summer,
            Season::Shoulder => self.shoulder,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SeasonFactors {
    #[serde(deserialize_with = "energy_season")]
    pub energy: SeasonMultipliers,
    #[serde(deserialize_with = "emissions_season")]
    pub emissions: SeasonMultipliers,
    #[serde(deserialize_with = "cost_season")]
    pub cost: SeasonMultipliers,
}

impl Default for SeasonFactors {
    fn default() -> Self {
        Self {
            energy: SeasonMultipliers {
                winter: 1.20,
                summer: 0.90,
                shoulder: 1.0,
            },
            emissions: SeasonMultipliers {
                winter: 1.10,
                summer: 0.95,
                shoulder: 1.0,
            },
            cost: SeasonMultipliers {
                winter: 1.15,
                summer: 0.90,
                shoulder: 1.0,
            },
        }
    }
}

/// Struct containing every overridable engine constant
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct CalcParams {
    pub props: PhysicalProperties,
    pub energy: EnergyParams,
    pub emissions: EmissionParams,
    pub cost: CostParams,
    pub season: SeasonFactors,
}

impl Init for CalcParams {
    fn init(&mut self) -> anyhow::Result<()> {
        validate_fields(&self.props, "physical properties")?;
        validate_fields(&self.energy, "energy parameters")?;
        validate_fields(&self.energy.ice_condition_factors, "ICE condition factors")?;
        validate_fields(&self.energy.ev_condition_factors, "EV condition factors")?;
        validate_fields(&self.emissions, "emission parameters")?;
        validate_fields(&self.emissions.grid, "grid emission factors")?;
        validate_fields(&self.cost, "cost parameters")?;
        validate_fields(&self.season.energy, "energy season factors")?;
        validate_fields(&self.season.emissions, "emission season factors")?;
        validate_fields(&self.season.cost, "cost season factors")?;
        Ok(())
    }
}
impl SerdeAPI for CalcParams {}
