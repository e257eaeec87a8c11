use super::*;
use std::str::FromStr;

/// Powertrain archetype tag.  Every engine dispatches on this, never on which
/// attributes happen to be present.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleKind {
    ICE,
    EV,
    HEV,
    PHEV,
}

impl VehicleKind {
    pub fn all() -> [VehicleKind; 4] {
        [Self::ICE, Self::EV, Self::HEV, Self::PHEV]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ICE => "ICE",
            Self::EV => "EV",
            Self::HEV => "HEV",
            Self::PHEV => "PHEV",
        }
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleKind {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_uppercase();
        Self::all()
            .into_iter()
            .find(|kind| kind.as_str() == tag)
            .ok_or_else(|| CalcError::UnsupportedVehicleKind(s.to_string()))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum PowertrainType {
    #[serde(rename = "ICE")]
    ConventionalVehicle(Box<ConventionalVehicle>),
    #[serde(rename = "EV")]
    BatteryElectricVehicle(Box<BatteryElectricVehicle>),
    #[serde(rename = "HEV")]
    HybridElectricVehicle(Box<HybridElectricVehicle>),
    #[serde(rename = "PHEV")]
    PluginHybridElectricVehicle(Box<PluginHybridElectricVehicle>),
}

impl Init for PowertrainType {
    fn init(&mut self) -> anyhow::Result<()> {
        match self {
            Self::ConventionalVehicle(conv) => conv.init(),
            Self::BatteryElectricVehicle(bev) => bev.init(),
            Self::HybridElectricVehicle(hev) => hev.init(),
            Self::PluginHybridElectricVehicle(phev) => phev.init(),
        }
    }
}

impl EnergyUse for PowertrainType {
    fn consumption(
        &self,
        distance_km: f64,
        conditions: DrivingConditions,
        params: &CalcParams,
    ) -> anyhow::Result<Consumption> {
        match self {
            Self::ConventionalVehicle(v) => v.consumption(distance_km, conditions, params),
            Self::BatteryElectricVehicle(v) => v.consumption(distance_km, conditions, params),
            Self::HybridElectricVehicle(v) => v.consumption(distance_km, conditions, params),
            Self::PluginHybridElectricVehicle(v) => {
                v.consumption(distance_km, conditions, params)
            }
        }
    }
}

impl PowertrainType {
    pub fn kind(&self) -> VehicleKind {
        match self {
            Self::ConventionalVehicle(_) => VehicleKind::ICE,
            Self::BatteryElectricVehicle(_) => VehicleKind::EV,
            Self::HybridElectricVehicle(_) => VehicleKind::HEV,
            Self::PluginHybridElectricVehicle(_) => VehicleKind::PHEV,
        }
    }

    /// Builds the payload for `kind` from its attribute map
    pub(crate) fn from_attrs(
        kind: VehicleKind,
        attrs: serde_json::Map<String, serde_json::Value>,
    ) -> anyhow::Result<Self> {
        let attrs = serde_json::Value::Object(attrs);
        Ok(match kind {
            VehicleKind::ICE => Self::ConventionalVehicle(Box::new(serde_json::from_value(attrs)?)),
            VehicleKind::EV => Self::BatteryElectricVehicle(Box::new(serde_json::from_value(attrs)?)),
            VehicleKind::HEV => Self::HybridElectricVehicle(Box::new(serde_json::from_value(attrs)?)),
            VehicleKind::PHEV => {
                Self::PluginHybridElectricVehicle(Box::new(serde_json::from_value(attrs)?))
            }
        })
    }

    /// Engine attributes, if the powertrain has a combustion engine with a
    /// rated L/100km figure
    pub fn conv(&self) -> Option<&ConventionalVehicle> {
        match self {
            Self::ConventionalVehicle(conv) => Some(conv),
            Self::HybridElectricVehicle(hev) => Some(&hev.conv),
            Self::BatteryElectricVehicle(_) | Self::PluginHybridElectricVehicle(_) => None,
        }
    }

    /// Battery attributes, if the powertrain has a rated kWh/100km figure
    pub fn bev(&self) -> Option<&BatteryElectricVehicle> {
        match self {
            Self::BatteryElectricVehicle(bev) => Some(bev),
            Self::HybridElectricVehicle(hev) => Some(&hev.bev),
            Self::ConventionalVehicle(_) | Self::PluginHybridElectricVehicle(_) => None,
        }
    }

    pub fn battery_capacity_kwh(&self) -> Option<f64> {
        match self {
            Self::ConventionalVehicle(_) => None,
            Self::BatteryElectricVehicle(bev) => bev.battery_capacity_kwh,
            Self::HybridElectricVehicle(hev) => hev.bev.battery_capacity_kwh,
            Self::PluginHybridElectricVehicle(phev) => phev.battery_capacity_kwh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("ice".parse::<VehicleKind>().unwrap(), VehicleKind::ICE);
        assert_eq!(" Phev ".parse::<VehicleKind>().unwrap(), VehicleKind::PHEV);
        assert_eq!(
            "FCEV".parse::<VehicleKind>().unwrap_err(),
            CalcError::UnsupportedVehicleKind("FCEV".into())
        );
    }
}
