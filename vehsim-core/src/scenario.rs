//! Driving scenario inputs shared by the energy, emission and cost engines.

use crate::imports::*;
use chrono::{Datelike, NaiveDate};
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum DrivingConditions {
    City,
    Highway,
    #[default]
    Mixed,
}

impl DrivingConditions {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Highway => "highway",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for DrivingConditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DrivingConditions {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "city" => Ok(Self::City),
            "highway" => Ok(Self::Highway),
            "mixed" => Ok(Self::Mixed),
            _ => bail!("unknown driving conditions {s:?}, must be one of city, highway, mixed"),
        }
    }
}

/// Electricity generation mix used to charge a vehicle
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum EnergySource {
    Coal,
    Gas,
    Nuclear,
    Hydro,
    #[default]
    EuAvg,
    RussiaAvg,
    Renewables,
}

impl EnergySource {
    pub fn all() -> [EnergySource; 7] {
        [
            Self::Coal,
            Self::Gas,
            Self::Nuclear,
            Self::Hydro,
            Self::EuAvg,
            Self::RussiaAvg,
            Self::Renewables,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Coal => "coal",
            Self::Gas => "gas",
            Self::Nuclear => "nuclear",
            Self::Hydro => "hydro",
            Self::EuAvg => "eu_avg",
            Self::RussiaAvg => "russia_avg",
            Self::Renewables => "renewables",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Coal => "Coal power plants",
            Self::Gas => "Gas power plants",
            Self::Nuclear => "Nuclear power plants",
            Self::Hydro => "Hydropower",
            Self::EuAvg => "EU average mix",
            Self::RussiaAvg => "Russia average mix",
            Self::Renewables => "Renewables (solar/wind)",
        }
    }

    /// Resolves a source key, falling back to [EnergySource::EuAvg] for
    /// anything unrecognised
    pub fn from_key_or_default<S: AsRef<str>>(key: S) -> Self {
        let key = key.as_ref();
        key.parse().unwrap_or_else(|_| {
            log::warn!("unknown energy source {key:?}, using {}", Self::default().key());
            Self::default()
        })
    }
}

impl fmt::Display for EnergySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for EnergySource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let s = s.trim().to_lowercase();
        Self::all()
            .into_iter()
            .find(|src| src.key() == s)
            .with_context(|| format!("unknown energy source {s:?}"))
    }
}

/// Calendar season used for seasonal adjustment and condition inference
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Summer,
    Shoulder,
}

impl Season {
    /// `month` is 1-based; anything outside winter and summer is shoulder
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Self::Winter,
            6..=8 => Self::Summer,
            _ => Self::Shoulder,
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self::from_month(date.month())
    }

    /// Conditions assumed when none are prescribed: winter trips are short
    /// urban ones, summer trips are long-distance
    pub fn inferred_conditions(&self) -> DrivingConditions {
        match self {
            Self::Winter => DrivingConditions::City,
            Self::Summer => DrivingConditions::Highway,
            Self::Shoulder => DrivingConditions::Mixed,
        }
    }
}

/// Single trip or lifetime calculation inputs
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Validate)]
#[serde(default)]
pub struct Scenario {
    #[validate(range(min = 0.0))]
    pub distance_km: f64,
    pub driving_conditions: DrivingConditions,
    pub energy_source: EnergySource,
    pub use_recuperation: bool,
    /// fraction of the distance driven in urban traffic
    #[validate(range(min = 0.0, max = 1.0))]
    pub urban_share: f64,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            distance_km: 100.0,
            driving_conditions: DrivingConditions::Mixed,
            energy_source: EnergySource::EuAvg,
            use_recuperation: true,
            urban_share: 0.5,
        }
    }
}

impl Scenario {
    pub fn new(distance_km: f64, driving_conditions: DrivingConditions) -> Self {
        Self {
            distance_km,
            driving_conditions,
            ..Default::default()
        }
    }

    /// Daily distance repeated over `days` days
    pub fn from_daily(daily_km: f64, days: u32, driving_conditions: DrivingConditions) -> Self {
        Self::new(daily_km * days as f64, driving_conditions)
    }
}

impl Init for Scenario {
    fn init(&mut self) -> anyhow::Result<()> {
        validate_fields(self, "scenario")
    }
}
impl SerdeAPI for Scenario {}
