use super::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VehicleSpecDef")]
/// Static specification of a single vehicle, immutable once constructed
pub struct VehicleSpec {
    /// Display name
    pub name: String,
    #[serde(flatten)]
    pub chassis: Chassis,
    /// Purchase price, currency units
    pub production_price: f64,
    /// Road type the vehicle is nominally driven on
    #[serde(default)]
    pub road_type: DrivingConditions,
    #[serde(flatten)]
    pub powertrain: PowertrainType,
}

/// Wire form of [VehicleSpec]: the `kind` tag is parsed first so an unknown
/// tag is reported as such rather than as a missing field
#[derive(Deserialize)]
struct VehicleSpecDef {
    #[serde(default)]
    name: String,
    kind: String,
    production_price: f64,
    #[serde(default)]
    road_type: DrivingConditions,
    #[serde(flatten)]
    chassis: Chassis,
    #[serde(flatten)]
    attrs: serde_json::Map<String, serde_json::Value>,
}

impl TryFrom<VehicleSpecDef> for VehicleSpec {
    type Error = anyhow::Error;

    fn try_from(def: VehicleSpecDef) -> anyhow::Result<Self> {
        let kind: VehicleKind = def.kind.parse()?;
        let powertrain = PowertrainType::from_attrs(kind, def.attrs)
            .with_context(|| format!("invalid {kind} attributes for {:?}", def.name))?;
        Ok(Self {
            name: def.name,
            chassis: def.chassis,
            production_price: def.production_price,
            road_type: def.road_type,
            powertrain,
        })
    }
}

impl Init for VehicleSpec {
    fn init(&mut self) -> anyhow::Result<()> {
        ensure!(
            self.production_price >= 0.0,
            CalcError::InvalidParameter {
                name: "production_price",
                value: self.production_price
            }
        );
        self.chassis
            .init()
            .with_context(|| format!("vehicle {:?}", self.name))?;
        self.powertrain
            .init()
            .with_context(|| format!("vehicle {:?}", self.name))
    }
}
impl SerdeAPI for VehicleSpec {}

impl VehicleSpec {
    /// Builds and validates a vehicle
    pub fn new<S: Into<String>>(
        name: S,
        chassis: Chassis,
        production_price: f64,
        road_type: DrivingConditions,
        powertrain: PowertrainType,
    ) -> anyhow::Result<Self> {
        let mut veh = Self {
            name: name.into(),
            chassis,
            production_price,
            road_type,
            powertrain,
        };
        veh.init()?;
        Ok(veh)
    }

    pub fn kind(&self) -> VehicleKind {
        self.powertrain.kind()
    }

    /// Fuel and electricity used over `distance_km`
    pub fn consumption(
        &self,
        distance_km: f64,
        conditions: DrivingConditions,
        params: &CalcParams,
    ) -> anyhow::Result<Consumption> {
        ensure!(
            distance_km >= 0.0 && distance_km.is_finite(),
            CalcError::InvalidParameter {
                name: "distance_km",
                value: distance_km
            }
        );
        self.powertrain.consumption(distance_km, conditions, params)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn mock_chassis() -> Chassis {
        Chassis {
            mass_kg: 1500.0,
            frontal_area_m2: 2.2,
            drag_coef: 0.3,
            rolling_coef: 0.012,
            max_acceleration_mps2: 3.0,
            max_speed_kmh: 180.0,
        }
    }

    pub(crate) fn mock_conv() -> ConventionalVehicle {
        ConventionalVehicle {
            fuel_consumption_l_per_100km: 6.0,
            engine_efficiency: 0.35,
            co2_g_per_l: 2300.0,
            transmission_ratio: 3.5,
            fuel_type: FuelType::Petrol,
        }
    }

    pub(crate) fn mock_bev() -> BatteryElectricVehicle {
        BatteryElectricVehicle {
            battery_capacity_kwh: Some(60.0),
            energy_consumption_kwh_per_100km: 15.0,
            motor_efficiency: 0.92,
            charging_efficiency: 0.9,
        }
    }

    pub(crate) fn mock_ice() -> VehicleSpec {
        VehicleSpec::new(
            "Mock ICE",
            mock_chassis(),
            1_500_000.0,
            DrivingConditions::Mixed,
            PowertrainType::ConventionalVehicle(Box::new(mock_conv())),
        )
        .unwrap()
    }

    pub(crate) fn mock_ev() -> VehicleSpec {
        VehicleSpec::new(
            "Mock EV",
            Chassis {
                mass_kg: 1900.0,
                ..mock_chassis()
            },
            3_000_000.0,
            DrivingConditions::Mixed,
            PowertrainType::BatteryElectricVehicle(Box::new(mock_bev())),
        )
        .unwrap()
    }

    pub(crate) fn mock_hev() -> VehicleSpec {
        VehicleSpec::new(
            "Mock HEV",
            Chassis {
                mass_kg: 1600.0,
                ..mock_chassis()
            },
            2_000_000.0,
            DrivingConditions::Mixed,
            PowertrainType::HybridElectricVehicle(Box::new(HybridElectricVehicle {
                conv: ConventionalVehicle {
                    fuel_consumption_l_per_100km: 4.5,
                    ..mock_conv()
                },
                bev: BatteryElectricVehicle {
                    battery_capacity_kwh: Some(1.5),
                    energy_consumption_kwh_per_100km: 12.0,
                    ..mock_bev()
                },
                ice_share: 0.6,
                generator_efficiency: 0.85,
            })),
        )
        .unwrap()
    }

    pub(crate) fn mock_phev() -> VehicleSpec {
        VehicleSpec::new(
            "Mock PHEV",
            Chassis {
                mass_kg: 1800.0,
                ..mock_chassis()
            },
            2_500_000.0,
            DrivingConditions::Mixed,
            PowertrainType::PluginHybridElectricVehicle(Box::new(PluginHybridElectricVehicle {
                engine_efficiency: 0.36,
                mpg_gas_only: 47.0,
                co2_g_per_l: 2300.0,
                fuel_type: FuelType::Petrol,
                battery_capacity_kwh: Some(13.8),
                kwh_per_100km_battery_only: 18.0,
                motor_efficiency: 0.9,
                charging_efficiency: 0.9,
                electric_range_km: 50.0,
                battery_depletion_threshold: 0.2,
                charging_power_kw: 3.3,
            })),
        )
        .unwrap()
    }

    pub(crate) fn mock_fleet() -> Vec<VehicleSpec> {
        vec![mock_ice(), mock_ev(), mock_hev(), mock_phev()]
    }

    #[test]
    fn test_serde_roundtrip_all_kinds() {
        for veh in mock_fleet() {
            let yaml = veh.to_yaml().unwrap();
            assert!(yaml.contains(&format!("kind: {}", veh.kind())));
            assert_eq!(VehicleSpec::from_yaml(&yaml).unwrap(), veh);
            let json = veh.to_json().unwrap();
            assert_eq!(VehicleSpec::from_json(&json).unwrap(), veh);
        }
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let yaml = "
name: Fuel cell
kind: FCEV
mass_kg: 1900
frontal_area_m2: 2.3
drag_coef: 0.29
rolling_coef: 0.01
production_price: 5000000
";
        let err = VehicleSpec::from_yaml(yaml).unwrap_err();
        assert!(
            format!("{err:#}").contains("unsupported vehicle kind `FCEV`"),
            "{err:#}"
        );
    }

    #[test]
    fn test_kind_is_tag_not_structure() {
        // carries EV attributes but is tagged ICE: must fail on the missing
        // ICE attributes instead of being treated as an EV
        let yaml = "
name: Mislabelled
kind: ICE
mass_kg: 1900
frontal_area_m2: 2.3
drag_coef: 0.29
rolling_coef: 0.01
production_price: 5000000
energy_consumption_kwh_per_100km: 16
motor_efficiency: 0.9
battery_capacity_kwh: 60
";
        assert!(VehicleSpec::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_defaults_applied() {
        let yaml = "
name: Minimal EV
kind: ev
mass_kg: 1700
frontal_area_m2: 2.3
drag_coef: 0.28
rolling_coef: 0.01
production_price: 3000000
energy_consumption_kwh_per_100km: 16
motor_efficiency: 0.9
";
        let veh = VehicleSpec::from_yaml(yaml).unwrap();
        assert_eq!(veh.kind(), VehicleKind::EV);
        assert_eq!(veh.road_type, DrivingConditions::Mixed);
        assert_eq!(veh.chassis.max_speed_kmh, 180.0);
        let bev = veh.powertrain.bev().unwrap();
        assert_eq!(bev.battery_capacity_kwh, None);
        assert_eq!(bev.charging_efficiency, 0.9);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut hev = mock_hev();
        if let PowertrainType::HybridElectricVehicle(h) = &mut hev.powertrain {
            h.ice_share = 1.2;
        }
        assert!(hev.init().is_err());

        let mut ice = mock_ice();
        ice.production_price = -1.0;
        let err = ice.init().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CalcError>(),
            Some(CalcError::InvalidParameter { name: "production_price", .. })
        ));
    }

    #[test]
    fn test_negative_distance_rejected() {
        let params = CalcParams::default();
        assert!(mock_ice()
            .consumption(-1.0, DrivingConditions::Mixed, &params)
            .is_err());
    }

    #[test]
    fn test_hev_consumption_shares() {
        let params = CalcParams::default();
        let hev = mock_hev();
        let city = hev
            .consumption(100.0, DrivingConditions::City, &params)
            .unwrap();
        assert!(almost_eq(city.ice_share, 0.4, None));
        assert!(almost_eq(city.fuel_liters, 4.5 * 1.2 * 0.4, None));
        assert!(almost_eq(city.energy_kwh, 12.0 * 1.1 * 0.6, None));
        let mixed = hev
            .consumption(100.0, DrivingConditions::Mixed, &params)
            .unwrap();
        assert!(almost_eq(mixed.ice_share, 0.6, None));
        assert!(almost_eq(mixed.distance_km(), 100.0, None));
    }

    #[test]
    fn test_phev_missing_mpg() {
        let params = CalcParams::default();
        let mut phev = mock_phev();
        if let PowertrainType::PluginHybridElectricVehicle(p) = &mut phev.powertrain {
            p.mpg_gas_only = 0.0;
        }
        let err = phev
            .consumption(100.0, DrivingConditions::Mixed, &params)
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<CalcError>(),
            Some(&CalcError::MissingAttribute {
                kind: "PHEV",
                attribute: "mpg_gas_only"
            })
        );
    }

    #[test]
    fn test_phev_battery_only_range_alias() {
        let yaml = "
name: Legacy PHEV
kind: PHEV
mass_kg: 1800
frontal_area_m2: 2.3
drag_coef: 0.3
rolling_coef: 0.011
production_price: 2500000
engine_efficiency: 0.35
mpg_gas_only: 40
kwh_per_100km_battery_only: 18
motor_efficiency: 0.9
battery_only_range_km: 60
";
        let veh = VehicleSpec::from_yaml(yaml).unwrap();
        match &veh.powertrain {
            PowertrainType::PluginHybridElectricVehicle(p) => {
                assert_eq!(p.electric_range_km, 60.0);
                assert_eq!(p.charging_power_kw, 7.4);
            }
            other => panic!("{:?}", other.kind()),
        }
    }
}
