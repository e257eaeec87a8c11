//! Day-by-day simulation over a calendar period.  Every day is evaluated
//! independently with the energy, emission and cost engines, adjusted for
//! season and optional random variation, then accumulated into running totals.

pub(crate) use crate::cost::{daily_energy_cost, daily_ownership_cost};
pub(crate) use crate::emissions::compute_co2;
pub(crate) use crate::energy::{compute_energy, EnergyResult};
pub(crate) use crate::imports::*;
pub(crate) use crate::params::CalcParams;
pub(crate) use crate::scenario::{DrivingConditions, EnergySource, Season};
pub(crate) use crate::vehicle::{VehicleKind, VehicleSpec};
pub(crate) use chrono::{Days, NaiveDate};
use rayon::prelude::*;
use std::str::FromStr;

pub mod fleet;
pub mod noise;
pub mod results;

pub use fleet::{simulate_fleet, FleetSimulation};
pub use noise::{NoiseFactors, NoiseParams};
pub use results::{CumulativePoint, DailyResult, SimulationResult, SimulationSummary};

/// How each day's driving conditions are chosen.  Written as `by_month` or
/// as the name of the fixed conditions, e.g. `highway`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub enum ConditionPolicy {
    /// same conditions every day
    Fixed(DrivingConditions),
    /// derived from the season of each day
    ByMonth,
}

impl Default for ConditionPolicy {
    fn default() -> Self {
        Self::Fixed(DrivingConditions::Mixed)
    }
}

impl ConditionPolicy {
    pub fn conditions_on(&self, date: NaiveDate) -> DrivingConditions {
        match self {
            Self::Fixed(conditions) => *conditions,
            Self::ByMonth => Season::from_date(date).inferred_conditions(),
        }
    }
}

impl FromStr for ConditionPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "by_month" | "bymonth" | "auto" => Ok(Self::ByMonth),
            other => Ok(Self::Fixed(other.parse().with_context(|| {
                format!("unknown condition policy {s:?}, expected by_month or fixed conditions")
            })?)),
        }
    }
}

impl TryFrom<String> for ConditionPolicy {
    type Error = anyhow::Error;

    fn try_from(s: String) -> anyhow::Result<Self> {
        s.parse()
    }
}

impl From<ConditionPolicy> for String {
    fn from(policy: ConditionPolicy) -> Self {
        policy.to_string()
    }
}

impl fmt::Display for ConditionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(conditions) => write!(f, "{conditions}"),
            Self::ByMonth => f.write_str("by_month"),
        }
    }
}

/// Settings of one simulation; `start` and `end` are both simulated
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Validate)]
pub struct SimulationRun {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[validate(range(min = 0.0))]
    pub daily_km: f64,
    /// hours spent driving each day
    #[serde(default = "default_daily_hours")]
    #[validate(range(min = 0.0, max = 24.0))]
    pub daily_hours: f64,
    #[serde(default)]
    pub energy_source: EnergySource,
    #[serde(default)]
    pub policy: ConditionPolicy,
    #[serde(default = "default_true")]
    pub use_recuperation: bool,
    #[serde(default = "default_urban_share")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub urban_share: f64,
    /// day-to-day variation, off when `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise: Option<NoiseParams>,
    /// add amortised insurance, tax and purchase price to every day's cost
    #[serde(default)]
    pub include_ownership_costs: bool,
    /// evaluate days on the rayon thread pool
    #[serde(default)]
    pub parallelize: bool,
}

fn default_daily_hours() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_urban_share() -> f64 {
    0.5
}

impl Init for SimulationRun {
    fn init(&mut self) -> anyhow::Result<()> {
        if self.end < self.start {
            return Err(CalcError::InvalidDateRange {
                start: self.start,
                end: self.end,
            }
            .into());
        }
        validate_fields(self, "simulation run")?;
        if let Some(noise) = &self.noise {
            noise.check()?;
        }
        Ok(())
    }
}
impl SerdeAPI for SimulationRun {}

impl SimulationRun {
    /// Noise-free run with default settings
    pub fn new(
        start: NaiveDate,
        end: NaiveDate,
        daily_km: f64,
        policy: ConditionPolicy,
    ) -> anyhow::Result<Self> {
        let mut run = Self {
            start,
            end,
            daily_km,
            daily_hours: default_daily_hours(),
            energy_source: EnergySource::default(),
            policy,
            use_recuperation: true,
            urban_share: default_urban_share(),
            noise: None,
            include_ownership_costs: false,
            parallelize: false,
        };
        run.init()?;
        Ok(run)
    }

    /// Number of simulated days
    pub fn n_days(&self) -> usize {
        ((self.end - self.start).num_days() + 1).max(0) as usize
    }

    /// Runs the simulation for `vehicle`
    pub fn simulate(
        &self,
        vehicle: &VehicleSpec,
        params: &CalcParams,
    ) -> anyhow::Result<SimulationResult> {
        // fields are public, so re-check before stepping
        let mut run = self.clone();
        run.init()?;
        let n_days = run.n_days();
        log::debug!(
            "simulating {:?} for {n_days} days from {}",
            vehicle.name,
            run.start
        );

        let daily = if run.parallelize {
            (0..n_days)
                .into_par_iter()
                .map(|i| run.step(vehicle, i, params))
                .collect::<anyhow::Result<Vec<DailyResult>>>()?
        } else {
            (0..n_days)
                .map(|i| run.step(vehicle, i, params))
                .collect::<anyhow::Result<Vec<DailyResult>>>()?
        };

        let res = SimulationResult::new(vehicle, daily);
        log::debug!("finished simulating {:?}", vehicle.name);
        Ok(res)
    }

    /// Evaluates day `day_index` in isolation
    pub fn step(
        &self,
        vehicle: &VehicleSpec,
        day_index: usize,
        params: &CalcParams,
    ) -> anyhow::Result<DailyResult> {
        let date = self
            .start
            .checked_add_days(Days::new(day_index as u64))
            .with_context(|| format!("date overflow at {}", format_dbg!(day_index)))?;
        let season = Season::from_date(date);
        let conditions = self.policy.conditions_on(date);
        let noise = match &self.noise {
            Some(noise) => noise.factors(day_index as u64)?,
            None => NoiseFactors::unity(),
        };
        let energy_factor = params.season.energy.factor(season) * noise.energy;
        let emissions_factor = params.season.emissions.factor(season) * noise.emissions;
        let cost_factor = params.season.cost.factor(season) * noise.cost;

        let day = || format!("{date}");
        let energy = compute_energy(vehicle, self.daily_km, conditions, params)
            .with_context(day)?
            .scaled(energy_factor);
        let co2_g = compute_co2(
            vehicle,
            self.daily_km,
            self.energy_source,
            conditions,
            self.use_recuperation,
            self.urban_share,
            params,
        )
        .with_context(day)?
            * emissions_factor;
        let energy_cost =
            daily_energy_cost(vehicle, self.daily_km, conditions, params).with_context(day)?
                * cost_factor;
        let ownership_cost = if self.include_ownership_costs {
            daily_ownership_cost(vehicle, &params.cost)
        } else {
            0.0
        };

        Ok(DailyResult {
            date,
            day_index,
            season,
            driving_conditions: conditions,
            distance_km: self.daily_km,
            average_speed_kmh: (self.daily_hours > 0.0).then(|| self.daily_km / self.daily_hours),
            energy,
            co2_g,
            energy_cost,
            ownership_cost,
            cost: energy_cost + ownership_cost,
            energy_factor,
            emissions_factor,
            cost_factor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::vehicle_model::tests::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_three_winter_days_are_identical() {
        let params = CalcParams::default();
        let run = SimulationRun::new(
            date(2024, 1, 1),
            date(2024, 1, 3),
            40.0,
            ConditionPolicy::ByMonth,
        )
        .unwrap();
        for veh in mock_fleet() {
            let res = run.simulate(&veh, &params).unwrap();
            assert_eq!(res.len(), 3);
            assert_eq!(res.daily[0].driving_conditions, DrivingConditions::City);
            assert_eq!(res.daily[0].season, Season::Winter);
            assert_eq!(res.daily[0].energy, res.daily[1].energy);
            assert_eq!(res.daily[1].energy, res.daily[2].energy);
            assert_eq!(res.daily[0].co2_g, res.daily[2].co2_g);
            assert_eq!(res.daily[0].cost, res.daily[2].cost);
            let last = res.cumulative[2];
            assert!(almost_eq(last.energy_mj, 3.0 * res.daily[0].energy.total_energy_mj, None));
            assert!(almost_eq(last.co2_g, 3.0 * res.daily[0].co2_g, None));
            assert!(almost_eq(last.cost, 3.0 * res.daily[0].cost, None));
            assert_eq!(res.cumulative_on(date(2024, 1, 3)), Some(&last));
        }
    }

    #[test]
    fn test_winter_factors_applied() {
        let params = CalcParams::default();
        let veh = mock_ice();
        let run = SimulationRun::new(
            date(2024, 1, 1),
            date(2024, 1, 1),
            100.0,
            ConditionPolicy::Fixed(DrivingConditions::Mixed),
        )
        .unwrap();
        let day = &run.simulate(&veh, &params).unwrap().daily[0];
        assert!(almost_eq(day.energy.fuel_liters.unwrap(), 6.0 * 1.2, None));
        assert!(almost_eq(day.co2_g, 6.0 * 2300.0 * 1.1, None));
        assert!(almost_eq(day.energy_cost, 6.0 * 55.0 * 1.15, None));
        assert_eq!(day.ownership_cost, 0.0);
    }

    #[test]
    fn test_inverted_range_fails_before_stepping() {
        let err = SimulationRun::new(
            date(2024, 2, 1),
            date(2024, 1, 1),
            40.0,
            ConditionPolicy::ByMonth,
        )
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<CalcError>(),
            Some(&CalcError::InvalidDateRange {
                start: date(2024, 2, 1),
                end: date(2024, 1, 1),
            })
        );
    }

    #[test]
    fn test_step_count_spans_year_boundary() {
        let params = CalcParams::default();
        let run = SimulationRun::new(
            date(2023, 12, 30),
            date(2024, 1, 2),
            10.0,
            ConditionPolicy::ByMonth,
        )
        .unwrap();
        let res = run.simulate(&mock_ev(), &params).unwrap();
        assert_eq!(res.len(), 4);
        assert_eq!(res.daily.last().unwrap().date, date(2024, 1, 2));
        assert_eq!(
            res.daily.iter().map(|d| d.day_index).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn test_seeded_noise_reproducible_and_parallel_safe() {
        let params = CalcParams::default();
        let mut run = SimulationRun::new(
            date(2024, 3, 1),
            date(2024, 5, 31),
            35.0,
            ConditionPolicy::ByMonth,
        )
        .unwrap();
        run.noise = Some(NoiseParams::new(0.03, 7));
        let serial = run.simulate(&mock_hev(), &params).unwrap();
        assert_eq!(serial, run.simulate(&mock_hev(), &params).unwrap());
        run.parallelize = true;
        assert_eq!(serial, run.simulate(&mock_hev(), &params).unwrap());
        assert!(serial
            .daily
            .windows(2)
            .any(|w| w[0].energy.total_energy_mj != w[1].energy.total_energy_mj));
        assert!(serial
            .cumulative
            .windows(2)
            .all(|w| w[1].energy_mj >= w[0].energy_mj));
    }

    #[test]
    fn test_ownership_costs_and_speed() {
        let params = CalcParams::default();
        let veh = mock_ev();
        let mut run = SimulationRun::new(
            date(2024, 4, 1),
            date(2024, 4, 10),
            30.0,
            ConditionPolicy::default(),
        )
        .unwrap();
        run.include_ownership_costs = true;
        run.daily_hours = 0.75;
        let res = run.simulate(&veh, &params).unwrap();
        let day = &res.daily[0];
        assert!(almost_eq(
            day.ownership_cost,
            daily_ownership_cost(&veh, &params.cost),
            None
        ));
        assert!(almost_eq(day.cost, day.energy_cost + day.ownership_cost, None));
        assert!(almost_eq(day.average_speed_kmh.unwrap(), 40.0, None));

        run.daily_hours = 0.0;
        let res = run.simulate(&veh, &params).unwrap();
        assert_eq!(res.daily[0].average_speed_kmh, None);

        run.daily_hours = 25.0;
        assert!(run.simulate(&veh, &params).is_err());
    }

    #[test]
    fn test_summary_and_csv() {
        let params = CalcParams::default();
        let run = SimulationRun::new(
            date(2024, 6, 1),
            date(2024, 6, 5),
            20.0,
            ConditionPolicy::ByMonth,
        )
        .unwrap();
        let res = run.simulate(&mock_phev(), &params).unwrap();
        let summary = res.summary();
        assert_eq!(summary.days, 5);
        assert!(almost_eq(summary.distance_km, 100.0, None));
        assert!(almost_eq(summary.co2_g_per_km.unwrap(), summary.co2_g / 100.0, None));

        let csv = res.to_csv_string().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("date,season,driving_conditions,distance_km"));
        assert!(lines[1].starts_with("2024-06-01,summer,highway,20.0"));
    }

    #[test]
    fn test_run_from_yaml() {
        let yaml = "
start: 2024-01-01
end: 2024-01-31
daily_km: 42
policy: by_month
noise:
  seed: 3
";
        let run = SimulationRun::from_yaml(yaml).unwrap();
        assert_eq!(run.n_days(), 31);
        assert_eq!(run.noise, Some(NoiseParams::new(0.03, 3)));
        assert_eq!(run.energy_source, EnergySource::EuAvg);

        let fixed = SimulationRun::from_yaml(
            "
start: 2024-01-01
end: 2024-01-02
daily_km: 10
policy: highway
",
        )
        .unwrap();
        assert_eq!(fixed.policy, ConditionPolicy::Fixed(DrivingConditions::Highway));

        assert_eq!(fixed.policy.to_string(), "highway");
        assert!("rural".parse::<ConditionPolicy>().is_err());

        let err = SimulationRun::from_yaml(
            "
start: 2024-01-01
end: 2024-01-02
daily_km: 10
noise:
  std_dev: -0.05
",
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CalcError>(),
            Some(CalcError::InvalidParameter { name: "std_dev", .. })
        ));

        assert!(SimulationRun::from_yaml(
            "
start: 2024-01-02
end: 2024-01-01
daily_km: 10
"
        )
        .is_err());
    }
}
