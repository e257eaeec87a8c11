//! Tailpipe and grid CO₂ emissions of a trip

use crate::imports::*;
use crate::params::{CalcParams, EmissionParams};
use crate::scenario::{DrivingConditions, EnergySource, Scenario};
use crate::vehicle::*;

/// CO₂ of a trip split by origin, grams
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Co2Breakdown {
    /// burned fuel
    pub fuel_g: f64,
    /// generation of the electricity drawn from the battery
    pub electricity_g: f64,
    pub total_g: f64,
}

/// Grid CO₂ of drawing `energy_kwh`.  With recuperation the urban share of
/// the energy is reduced by the energy recovered while braking.
pub fn electricity_co2_g(
    energy_kwh: f64,
    energy_source: EnergySource,
    use_recuperation: bool,
    urban_share: f64,
    params: &EmissionParams,
) -> f64 {
    let effective_kwh = if use_recuperation {
        energy_kwh * urban_share * params.recuperation_retained()
            + energy_kwh * (1.0 - urban_share)
    } else {
        energy_kwh
    };
    effective_kwh * params.grid.factor(energy_source)
}

/// Computes CO₂ emitted by `vehicle` over `distance_km`, grams
///
/// # Arguments
/// - `energy_source`: generation mix charging the battery
/// - `conditions`: driving conditions
/// - `use_recuperation`: whether regenerative braking is credited
/// - `urban_share`: fraction of the trip in urban traffic, 0 to 1
#[allow(clippy::too_many_arguments)]
pub fn compute_co2(
    vehicle: &VehicleSpec,
    distance_km: f64,
    energy_source: EnergySource,
    conditions: DrivingConditions,
    use_recuperation: bool,
    urban_share: f64,
    params: &CalcParams,
) -> anyhow::Result<f64> {
    Ok(co2_breakdown(
        vehicle,
        distance_km,
        energy_source,
        conditions,
        use_recuperation,
        urban_share,
        params,
    )?
    .total_g)
}

/// [compute_co2] with the inputs taken from `scenario`
pub fn scenario_co2(
    vehicle: &VehicleSpec,
    scenario: &Scenario,
    params: &CalcParams,
) -> anyhow::Result<f64> {
    compute_co2(
        vehicle,
        scenario.distance_km,
        scenario.energy_source,
        scenario.driving_conditions,
        scenario.use_recuperation,
        scenario.urban_share,
        params,
    )
}

/// Same as [compute_co2] but keeps fuel and electricity contributions apart
#[allow(clippy::too_many_arguments)]
pub fn co2_breakdown(
    vehicle: &VehicleSpec,
    distance_km: f64,
    energy_source: EnergySource,
    conditions: DrivingConditions,
    use_recuperation: bool,
    urban_share: f64,
    params: &CalcParams,
) -> anyhow::Result<Co2Breakdown> {
    if !(0.0..=1.0).contains(&urban_share) {
        return Err(CalcError::InvalidParameter {
            name: "urban_share",
            value: urban_share,
        }
        .into());
    }
    let cons = vehicle
        .consumption(distance_km, conditions, params)
        .with_context(|| format!("CO2 of {:?}", vehicle.name))?;
    let ep = &params.emissions;
    let electricity_g = |kwh: f64| {
        electricity_co2_g(kwh, energy_source, use_recuperation, urban_share, ep)
    };

    let (fuel_g, electricity_g, correction) = match &vehicle.powertrain {
        PowertrainType::ConventionalVehicle(ice) => {
            (cons.fuel_liters * ice.fuel_type.co2_g_per_l(ep), 0.0, 1.0)
        }
        PowertrainType::BatteryElectricVehicle(_) => (0.0, electricity_g(cons.energy_kwh), 1.0),
        PowertrainType::HybridElectricVehicle(hev) => (
            cons.fuel_liters * hev.conv.co2_g_per_l,
            electricity_g(cons.energy_kwh),
            match conditions {
                DrivingConditions::Highway => ep.hev_highway_correction,
                _ => 1.0,
            },
        ),
        PowertrainType::PluginHybridElectricVehicle(phev) => (
            cons.fuel_liters * phev.fuel_type.co2_g_per_l(ep),
            electricity_g(cons.energy_kwh),
            1.0,
        ),
    };
    let fuel_g = fuel_g * correction;
    let electricity_g = electricity_g * correction;
    Ok(Co2Breakdown {
        fuel_g,
        electricity_g,
        total_g: fuel_g + electricity_g,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::vehicle_model::tests::*;

    fn co2(veh: &VehicleSpec, d: f64, src: EnergySource, cond: DrivingConditions) -> f64 {
        compute_co2(veh, d, src, cond, false, 0.5, &CalcParams::default()).unwrap()
    }

    #[test]
    fn test_ice_co2() {
        let g = co2(&mock_ice(), 100.0, EnergySource::Coal, DrivingConditions::Mixed);
        assert!(almost_eq(g, 6.0 * 2300.0, None));

        let mut diesel = mock_ice();
        if let PowertrainType::ConventionalVehicle(ice) = &mut diesel.powertrain {
            ice.fuel_type = FuelType::Diesel;
        }
        let g = co2(&diesel, 100.0, EnergySource::Coal, DrivingConditions::Mixed);
        assert!(almost_eq(g, 6.0 * 2640.0, None));
    }

    #[test]
    fn test_ice_ignores_own_co2_rating() {
        let mut ice = mock_ice();
        if let PowertrainType::ConventionalVehicle(conv) = &mut ice.powertrain {
            conv.co2_g_per_l = 9999.0;
        }
        let g = co2(&ice, 100.0, EnergySource::Coal, DrivingConditions::Mixed);
        assert!(almost_eq(g, 6.0 * 2300.0, None));

        let mut hev = mock_hev();
        let base = co2(&hev, 100.0, EnergySource::Coal, DrivingConditions::City);
        if let PowertrainType::HybridElectricVehicle(h) = &mut hev.powertrain {
            h.conv.co2_g_per_l *= 2.0;
        }
        assert!(co2(&hev, 100.0, EnergySource::Coal, DrivingConditions::City) > base);
    }

    #[test]
    fn test_ev_co2_by_source() {
        let ev = mock_ev();
        let coal = co2(&ev, 100.0, EnergySource::Coal, DrivingConditions::Mixed);
        assert!(almost_eq(coal, 15.0 * 900.0, None));
        assert_eq!(
            co2(&ev, 100.0, EnergySource::Nuclear, DrivingConditions::Mixed),
            0.0
        );
        let russia = co2(&ev, 100.0, EnergySource::RussiaAvg, DrivingConditions::Mixed);
        let eu = co2(&ev, 100.0, EnergySource::EuAvg, DrivingConditions::Mixed);
        assert_eq!(russia, eu);
    }

    #[test]
    fn test_unknown_source_falls_back_to_eu_avg() {
        let ev = mock_ev();
        let params = CalcParams::default();
        let unknown = compute_co2(
            &ev,
            100.0,
            EnergySource::from_key_or_default("foo"),
            DrivingConditions::Mixed,
            true,
            0.5,
            &params,
        )
        .unwrap();
        let eu = compute_co2(
            &ev,
            100.0,
            EnergySource::EuAvg,
            DrivingConditions::Mixed,
            true,
            0.5,
            &params,
        )
        .unwrap();
        assert_eq!(unknown, eu);
    }

    #[test]
    fn test_recuperation_discount() {
        let ev = mock_ev();
        let params = CalcParams::default();
        let with = compute_co2(
            &ev,
            100.0,
            EnergySource::EuAvg,
            DrivingConditions::Mixed,
            true,
            0.5,
            &params,
        )
        .unwrap();
        // half the energy is urban and 12 % of it is recovered
        assert!(almost_eq(with, 15.0 * (0.5 * 0.88 + 0.5) * 300.0, None));
        let all_highway = compute_co2(
            &ev,
            100.0,
            EnergySource::EuAvg,
            DrivingConditions::Mixed,
            true,
            0.0,
            &params,
        )
        .unwrap();
        assert!(almost_eq(all_highway, 15.0 * 300.0, None));
    }

    #[test]
    fn test_hev_highway_correction() {
        let hev = mock_hev();
        let mixed = co2(&hev, 100.0, EnergySource::EuAvg, DrivingConditions::Mixed);
        assert!(almost_eq(mixed, 4.5 * 0.6 * 2300.0 + 12.0 * 0.4 * 300.0, None));
        let hwy = co2(&hev, 100.0, EnergySource::EuAvg, DrivingConditions::Highway);
        let expected = (4.5 * 0.9 * 0.8 * 2300.0 + 12.0 * 0.8 * 0.2 * 300.0) * 1.15;
        assert!(almost_eq(hwy, expected, None));
    }

    #[test]
    fn test_phev_segments() {
        let phev = mock_phev();
        let params = CalcParams::default();
        let split = co2_breakdown(
            &phev,
            100.0,
            EnergySource::Coal,
            DrivingConditions::Mixed,
            false,
            0.5,
            &params,
        )
        .unwrap();
        assert!(almost_eq(split.electricity_g, 18.0 * 0.4 * 900.0, None));
        assert!(almost_eq(
            split.fuel_g,
            235.214583 / 47.0 * 0.6 * 2300.0,
            None
        ));
        assert!(almost_eq(split.total_g, split.fuel_g + split.electricity_g, None));
    }

    #[test]
    fn test_invalid_urban_share() {
        let err = compute_co2(
            &mock_ev(),
            100.0,
            EnergySource::EuAvg,
            DrivingConditions::Mixed,
            true,
            1.5,
            &CalcParams::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CalcError>(),
            Some(CalcError::InvalidParameter {
                name: "urban_share",
                ..
            })
        ));
    }

    #[test]
    fn test_linear_and_non_negative() {
        let params = CalcParams::default();
        let scenario = Scenario::new(15.0, DrivingConditions::City);
        let doubled = Scenario::new(30.0, DrivingConditions::City);
        for veh in mock_fleet() {
            let one = scenario_co2(&veh, &scenario, &params).unwrap();
            let two = scenario_co2(&veh, &doubled, &params).unwrap();
            assert!(one >= 0.0);
            assert!(almost_eq(two, 2.0 * one, None));
        }
    }
}
