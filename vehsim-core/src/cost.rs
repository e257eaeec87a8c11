//! Total cost of ownership and per-trip energy cost

use crate::imports::*;
use crate::params::{CalcParams, CostParams, DAYS_PER_YEAR};
use crate::scenario::DrivingConditions;
use crate::vehicle::*;

/// Lifetime cost items.  `production + usage + recycling` is the total and
/// `usage` is the sum of the four running-cost items below it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TcoComponents {
    /// purchase price
    pub production: f64,
    pub usage: f64,
    /// disposal at end of life
    pub recycling: f64,
    /// fuel and electricity
    pub energy: f64,
    pub maintenance: f64,
    pub insurance: f64,
    pub tax: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TcoResult {
    pub total: f64,
    pub per_km: f64,
    pub components: TcoComponents,
    pub distance_km: f64,
    pub lifetime_years: u32,
}

impl SerdeAPI for TcoResult {}
impl Init for TcoResult {}

/// Maintenance cost per km.  Hybrids sit halfway between ICE and EV.
pub fn maintenance_per_km(kind: VehicleKind, params: &CostParams) -> f64 {
    match kind {
        VehicleKind::ICE => params.maintenance_per_km_ice,
        VehicleKind::EV => params.maintenance_per_km_ev,
        VehicleKind::HEV | VehicleKind::PHEV => {
            (params.maintenance_per_km_ice + params.maintenance_per_km_ev) / 2.0
        }
    }
}

/// End-of-life disposal cost.  Hybrids sit halfway between ICE and EV.
pub fn disposal_cost(kind: VehicleKind, params: &CostParams) -> f64 {
    match kind {
        VehicleKind::ICE => params.disposal_ice,
        VehicleKind::EV => params.disposal_ev,
        VehicleKind::HEV | VehicleKind::PHEV => (params.disposal_ice + params.disposal_ev) / 2.0,
    }
}

/// Cost of the fuel and electricity used over `distance_km`
pub fn energy_cost(
    vehicle: &VehicleSpec,
    distance_km: f64,
    conditions: DrivingConditions,
    params: &CalcParams,
) -> anyhow::Result<f64> {
    let cons = vehicle
        .consumption(distance_km, conditions, params)
        .with_context(|| format!("energy cost of {:?}", vehicle.name))?;
    Ok(cons.fuel_liters * params.cost.fuel_price_per_l
        + cons.energy_kwh * params.cost.electricity_price_per_kwh)
}

/// Running cost of one day of driving, energy only
pub fn daily_energy_cost(
    vehicle: &VehicleSpec,
    daily_km: f64,
    conditions: DrivingConditions,
    params: &CalcParams,
) -> anyhow::Result<f64> {
    energy_cost(vehicle, daily_km, conditions, params)
}

/// Insurance, tax and purchase price spread evenly over every day of the
/// vehicle's life
pub fn daily_ownership_cost(vehicle: &VehicleSpec, params: &CostParams) -> f64 {
    let price = vehicle.production_price;
    (params.insurance_per_year + price * params.tax_rate) / DAYS_PER_YEAR
        + price / (params.lifetime_years as f64 * DAYS_PER_YEAR)
}

/// Computes lifetime cost of ownership of `vehicle`
///
/// # Arguments
/// - `distance_km`: lifetime distance, defaults to annual km × lifetime years
/// - `params`: engine constants
pub fn calculate_tco(
    vehicle: &VehicleSpec,
    distance_km: Option<f64>,
    params: &CalcParams,
) -> anyhow::Result<TcoResult> {
    let cp = &params.cost;
    let distance_km = distance_km.unwrap_or_else(|| cp.default_distance_km());
    if distance_km <= 0.0 {
        return Err(CalcError::DivisionByZero {
            quantity: "tco_per_km",
        })
        .with_context(|| format!("{:?}: {}", vehicle.name, format_dbg!(distance_km)));
    }
    let kind = vehicle.kind();
    let years = cp.lifetime_years as f64;

    let energy = energy_cost(vehicle, distance_km, vehicle.road_type, params)?;
    let maintenance = distance_km * maintenance_per_km(kind, cp);
    let insurance = cp.insurance_per_year * years;
    let tax = vehicle.production_price * cp.tax_rate * years;
    let components = TcoComponents {
        production: vehicle.production_price,
        usage: energy + maintenance + insurance + tax,
        recycling: disposal_cost(kind, cp),
        energy,
        maintenance,
        insurance,
        tax,
    };
    let total = components.production + components.usage + components.recycling;
    log::debug!("{} TCO over {distance_km} km: {total:.0}", vehicle.name);

    Ok(TcoResult {
        total,
        per_km: total / distance_km,
        components,
        distance_km,
        lifetime_years: cp.lifetime_years,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::vehicle_model::tests::*;

    #[test]
    fn test_ice_trip_energy_cost() {
        let params = CalcParams::default();
        let cost = energy_cost(&mock_ice(), 1000.0, DrivingConditions::Mixed, &params).unwrap();
        assert!(almost_eq(cost, 3300.0, None));
    }

    #[test]
    fn test_ev_cost_needs_no_capacity() {
        let params = CalcParams::default();
        let mut ev = mock_ev();
        if let PowertrainType::BatteryElectricVehicle(bev) = &mut ev.powertrain {
            bev.battery_capacity_kwh = None;
        }
        let cost = energy_cost(&ev, 100.0, DrivingConditions::Mixed, &params).unwrap();
        assert!(almost_eq(cost, 15.0 * 5.0, None));
    }

    #[test]
    fn test_tco_ice() {
        let params = CalcParams::default();
        let tco = calculate_tco(&mock_ice(), None, &params).unwrap();
        assert_eq!(tco.distance_km, 200_000.0);
        assert_eq!(tco.lifetime_years, 10);
        let c = tco.components;
        assert!(almost_eq(c.energy, 6.0 * 2000.0 * 55.0, None));
        assert!(almost_eq(c.maintenance, 200_000.0 * 5.0, None));
        assert!(almost_eq(c.insurance, 300_000.0, None));
        assert!(almost_eq(c.tax, 1_500_000.0 * 0.01 * 10.0, None));
        assert_eq!(c.production, 1_500_000.0);
        assert_eq!(c.recycling, 20_000.0);
        assert!(almost_eq(
            c.usage,
            c.energy + c.maintenance + c.insurance + c.tax,
            None
        ));
        assert!(almost_eq(tco.total, c.production + c.usage + c.recycling, None));
        assert!(almost_eq(tco.per_km, tco.total / 200_000.0, None));
    }

    #[test]
    fn test_tco_default_distance_matches_explicit() {
        let params = CalcParams::default();
        for veh in mock_fleet() {
            let default = calculate_tco(&veh, None, &params).unwrap();
            let explicit = calculate_tco(&veh, Some(20_000.0 * 10.0), &params).unwrap();
            assert_eq!(default, explicit);
        }
    }

    #[test]
    fn test_hybrid_rates_are_averaged() {
        let params = CalcParams::default();
        for veh in [mock_hev(), mock_phev()] {
            let tco = calculate_tco(&veh, Some(1000.0), &params).unwrap();
            assert_eq!(tco.components.recycling, 60_000.0);
            assert!(almost_eq(tco.components.maintenance, 3500.0, None));
        }
    }

    #[test]
    fn test_zero_distance_is_error() {
        let err = calculate_tco(&mock_ev(), Some(0.0), &CalcParams::default()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CalcError>(),
            Some(&CalcError::DivisionByZero {
                quantity: "tco_per_km"
            })
        );
    }

    #[test]
    fn test_energy_cost_linear() {
        let params = CalcParams::default();
        for veh in mock_fleet() {
            let one = daily_energy_cost(&veh, 12.5, DrivingConditions::Highway, &params).unwrap();
            let two = daily_energy_cost(&veh, 25.0, DrivingConditions::Highway, &params).unwrap();
            assert!(one >= 0.0);
            assert!(almost_eq(two, 2.0 * one, None));
        }
    }

    #[test]
    fn test_daily_ownership_cost() {
        let params = CalcParams::default();
        let daily = daily_ownership_cost(&mock_ice(), &params.cost);
        let expected = (30_000.0 + 15_000.0) / 365.0 + 1_500_000.0 / 3650.0;
        assert!(almost_eq(daily, expected, None));
    }
}
