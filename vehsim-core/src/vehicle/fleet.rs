//! Synthesis of "average" vehicles for fleet-level comparisons

use super::*;

impl VehicleSpec {
    /// Builds a transient vehicle whose every numeric attribute is the
    /// arithmetic mean across `vehicles`.  Non-numeric attributes are taken
    /// from the first vehicle and the name becomes a generated label.
    ///
    /// Returns `Ok(None)` for an empty collection and an error if the
    /// collection mixes vehicle kinds.
    pub fn average(vehicles: &[VehicleSpec]) -> anyhow::Result<Option<VehicleSpec>> {
        let Some(first) = vehicles.first() else {
            return Ok(None);
        };
        let kind = first.kind();
        if let Some(other) = vehicles.iter().find(|v| v.kind() != kind) {
            return Err(CalcError::MixedFleet {
                expected: kind.as_str(),
                found: other.kind().as_str(),
            })
            .with_context(|| format!("offending vehicle: {:?}", other.name));
        }

        let chassis: Vec<&Chassis> = vehicles.iter().map(|v| &v.chassis).collect();
        let powertrain = match &first.powertrain {
            PowertrainType::ConventionalVehicle(_) => {
                let items: Vec<&ConventionalVehicle> = vehicles
                    .iter()
                    .filter_map(|v| match &v.powertrain {
                        PowertrainType::ConventionalVehicle(conv) => Some(conv.as_ref()),
                        _ => None,
                    })
                    .collect();
                PowertrainType::ConventionalVehicle(Box::new(ConventionalVehicle::mean(&items)))
            }
            PowertrainType::BatteryElectricVehicle(_) => {
                let items: Vec<&BatteryElectricVehicle> = vehicles
                    .iter()
                    .filter_map(|v| match &v.powertrain {
                        PowertrainType::BatteryElectricVehicle(bev) => Some(bev.as_ref()),
                        _ => None,
                    })
                    .collect();
                PowertrainType::BatteryElectricVehicle(Box::new(BatteryElectricVehicle::mean(
                    &items,
                )))
            }
            PowertrainType::HybridElectricVehicle(_) => {
                let items: Vec<&HybridElectricVehicle> = vehicles
                    .iter()
                    .filter_map(|v| match &v.powertrain {
                        PowertrainType::HybridElectricVehicle(hev) => Some(hev.as_ref()),
                        _ => None,
                    })
                    .collect();
                PowertrainType::HybridElectricVehicle(Box::new(HybridElectricVehicle::mean(&items)))
            }
            PowertrainType::PluginHybridElectricVehicle(_) => {
                let items: Vec<&PluginHybridElectricVehicle> = vehicles
                    .iter()
                    .filter_map(|v| match &v.powertrain {
                        PowertrainType::PluginHybridElectricVehicle(phev) => Some(phev.as_ref()),
                        _ => None,
                    })
                    .collect();
                PowertrainType::PluginHybridElectricVehicle(Box::new(
                    PluginHybridElectricVehicle::mean(&items),
                ))
            }
        };

        if vehicles
            .iter()
            .any(|v| v.powertrain.battery_capacity_kwh().is_none())
            && powertrain.battery_capacity_kwh().is_some()
        {
            log::warn!(
                "averaging battery capacity over the {kind} vehicles that report one; \
                some of the {} vehicles have none",
                vehicles.len()
            );
        }

        let production_price =
            vehicles.iter().map(|v| v.production_price).sum::<f64>() / vehicles.len() as f64;

        Ok(Some(VehicleSpec {
            name: format!(
                "Average {kind} Vehicle (based on {} models)",
                vehicles.len()
            ),
            chassis: Chassis::mean(&chassis),
            production_price,
            road_type: first.road_type,
            powertrain,
        }))
    }

    /// One average vehicle per kind present in `vehicles`, in
    /// ICE, EV, HEV, PHEV order
    pub fn average_by_kind(vehicles: &[VehicleSpec]) -> anyhow::Result<Vec<VehicleSpec>> {
        let mut averages = Vec::new();
        for kind in VehicleKind::all() {
            let same_kind: Vec<VehicleSpec> = vehicles
                .iter()
                .filter(|v| v.kind() == kind)
                .cloned()
                .collect();
            if let Some(avg) = Self::average(&same_kind)? {
                averages.push(avg);
            }
        }
        Ok(averages)
    }
}
