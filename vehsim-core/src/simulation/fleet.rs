use super::*;
use crate::compare::SkippedVehicle;

/// Simulation results of several vehicles over the same period
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct FleetSimulation {
    pub results: Vec<SimulationResult>,
    /// vehicles whose simulation failed, in input order
    pub skipped: Vec<SkippedVehicle>,
}

impl SerdeAPI for FleetSimulation {}
impl Init for FleetSimulation {}

impl FleetSimulation {
    /// Totals per vehicle, keyed by vehicle name
    pub fn summaries(&self) -> Vec<(&str, SimulationSummary)> {
        self.results
            .iter()
            .map(|res| (res.vehicle_name.as_str(), res.summary()))
            .collect()
    }
}

/// Runs `run` for every vehicle.  A vehicle whose simulation fails is
/// logged and listed in [FleetSimulation::skipped]; a bad run configuration
/// fails the whole call.  With `run.parallelize` the vehicles are spread
/// over the rayon thread pool and each one is simulated serially.
pub fn simulate_fleet(
    vehicles: &[VehicleSpec],
    run: &SimulationRun,
    params: &CalcParams,
) -> anyhow::Result<FleetSimulation> {
    let mut run = run.clone();
    run.init()?;
    let outcomes: Vec<anyhow::Result<SimulationResult>> = if run.parallelize {
        let serial_run = SimulationRun {
            parallelize: false,
            ..run.clone()
        };
        vehicles
            .par_iter()
            .map(|veh| serial_run.simulate(veh, params))
            .collect()
    } else {
        vehicles
            .iter()
            .map(|veh| run.simulate(veh, params))
            .collect()
    };

    let mut fleet = FleetSimulation::default();
    for (idx, (veh, outcome)) in vehicles.iter().zip(outcomes).enumerate() {
        match outcome {
            Ok(res) => fleet.results.push(res),
            Err(err) => {
                log::warn!("skipping vehicle idx {idx} {:?}: {err:#}", veh.name);
                fleet.skipped.push(SkippedVehicle::new(idx, veh, &err));
            }
        }
    }
    Ok(fleet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::vehicle_model::tests::*;
    use crate::vehicle::PowertrainType;

    fn run() -> SimulationRun {
        SimulationRun::new(
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 14).unwrap(),
            50.0,
            ConditionPolicy::ByMonth,
        )
        .unwrap()
    }

    #[test]
    fn test_fleet_all_succeed() {
        let params = CalcParams::default();
        let fleet = simulate_fleet(&mock_fleet(), &run(), &params).unwrap();
        assert_eq!(fleet.results.len(), 4);
        assert!(fleet.skipped.is_empty());
        assert_eq!(fleet.summaries()[1].0, "Mock EV");
    }

    #[test]
    fn test_fleet_skips_failing_vehicle() {
        let params = CalcParams::default();
        let mut vehicles = mock_fleet();
        if let PowertrainType::BatteryElectricVehicle(bev) = &mut vehicles[1].powertrain {
            bev.battery_capacity_kwh = Some(0.0);
        }
        for parallelize in [false, true] {
            let mut run = run();
            run.parallelize = parallelize;
            let fleet = simulate_fleet(&vehicles, &run, &params).unwrap();
            assert_eq!(fleet.results.len(), 3);
            assert_eq!(fleet.skipped.len(), 1);
            assert_eq!(fleet.skipped[0].index, 1);
            assert_eq!(fleet.skipped[0].name, "Mock EV");
            assert!(fleet.skipped[0].reason.contains("battery_depletion_pct"));
        }
    }

    #[test]
    fn test_parallel_matches_serial() {
        let params = CalcParams::default();
        let mut run = run();
        run.noise = Some(NoiseParams::new(0.05, 11));
        let serial = simulate_fleet(&mock_fleet(), &run, &params).unwrap();
        run.parallelize = true;
        assert_eq!(serial, simulate_fleet(&mock_fleet(), &run, &params).unwrap());
    }
}
