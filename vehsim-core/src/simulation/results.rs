use super::*;

/// Figures for one simulated day.  Energy, CO₂ and energy cost already
/// include the seasonal and noise multipliers recorded alongside them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DailyResult {
    pub date: NaiveDate,
    /// 0-based position in the run
    pub day_index: usize,
    pub season: Season,
    pub driving_conditions: DrivingConditions,
    pub distance_km: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_speed_kmh: Option<f64>,
    pub energy: EnergyResult,
    pub co2_g: f64,
    pub energy_cost: f64,
    /// amortised insurance, tax and purchase price
    pub ownership_cost: f64,
    /// `energy_cost + ownership_cost`
    pub cost: f64,
    pub energy_factor: f64,
    pub emissions_factor: f64,
    pub cost_factor: f64,
}

/// Running totals through the end of `date`
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub distance_km: f64,
    pub energy_mj: f64,
    pub co2_g: f64,
    pub cost: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SimulationSummary {
    pub days: usize,
    pub distance_km: f64,
    pub energy_mj: f64,
    pub co2_g: f64,
    pub cost: f64,
    pub co2_g_per_km: Option<f64>,
    pub cost_per_km: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub vehicle_name: String,
    pub kind: VehicleKind,
    pub daily: Vec<DailyResult>,
    /// same length as `daily`, entry `i` includes day `i`
    pub cumulative: Vec<CumulativePoint>,
}

impl SerdeAPI for SimulationResult {}
impl Init for SimulationResult {}

impl SimulationResult {
    pub(crate) fn new(vehicle: &VehicleSpec, daily: Vec<DailyResult>) -> Self {
        let distance_km = utils::cumsum(daily.iter().map(|day| day.distance_km));
        let energy_mj = utils::cumsum(daily.iter().map(|day| day.energy.total_energy_mj));
        let co2_g = utils::cumsum(daily.iter().map(|day| day.co2_g));
        let cost = utils::cumsum(daily.iter().map(|day| day.cost));
        let cumulative = daily
            .iter()
            .enumerate()
            .map(|(i, day)| CumulativePoint {
                date: day.date,
                distance_km: distance_km[i],
                energy_mj: energy_mj[i],
                co2_g: co2_g[i],
                cost: cost[i],
            })
            .collect();
        Self {
            vehicle_name: vehicle.name.clone(),
            kind: vehicle.kind(),
            daily,
            cumulative,
        }
    }

    pub fn len(&self) -> usize {
        self.daily.len()
    }

    pub fn is_empty(&self) -> bool {
        self.daily.is_empty()
    }

    /// Running totals through `date`, if it was simulated
    pub fn cumulative_on(&self, date: NaiveDate) -> Option<&CumulativePoint> {
        self.cumulative
            .binary_search_by_key(&date, |point| point.date)
            .ok()
            .map(|idx| &self.cumulative[idx])
    }

    pub fn summary(&self) -> SimulationSummary {
        let last = self.cumulative.last();
        let distance_km = last.map_or(0.0, |c| c.distance_km);
        let co2_g = last.map_or(0.0, |c| c.co2_g);
        let cost = last.map_or(0.0, |c| c.cost);
        let per_km = |x: f64| (distance_km > 0.0).then(|| x / distance_km);
        SimulationSummary {
            days: self.len(),
            distance_km,
            energy_mj: last.map_or(0.0, |c| c.energy_mj),
            co2_g,
            cost,
            co2_g_per_km: per_km(co2_g),
            cost_per_km: per_km(cost),
        }
    }

    /// Writes one CSV row per day with the daily figures followed by the
    /// running totals
    pub fn to_csv_writer<W: std::io::Write>(&self, wtr: W) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(wtr);
        for (day, cum) in self.daily.iter().zip(&self.cumulative) {
            wtr.serialize(CsvRow {
                date: day.date,
                season: day.season,
                driving_conditions: day.driving_conditions,
                distance_km: day.distance_km,
                average_speed_kmh: day.average_speed_kmh,
                fuel_liters: day.energy.fuel_liters,
                energy_kwh: day.energy.energy_kwh,
                energy_mj: day.energy.total_energy_mj,
                co2_g: day.co2_g,
                cost: day.cost,
                cumulative_distance_km: cum.distance_km,
                cumulative_energy_mj: cum.energy_mj,
                cumulative_co2_g: cum.co2_g,
                cumulative_cost: cum.cost,
            })
            .with_context(|| format!("writing CSV row for {}", day.date))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_csv_file<P: AsRef<Path>>(&self, filepath: P) -> anyhow::Result<()> {
        let filepath = filepath.as_ref();
        let file = File::create(filepath)
            .with_context(|| format!("could not create {filepath:?}"))?;
        self.to_csv_writer(file)
    }

    pub fn to_csv_string(&self) -> anyhow::Result<String> {
        let mut buf = Vec::new();
        self.to_csv_writer(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}

#[derive(Serialize)]
struct CsvRow {
    date: NaiveDate,
    season: Season,
    driving_conditions: DrivingConditions,
    distance_km: f64,
    average_speed_kmh: Option<f64>,
    fuel_liters: Option<f64>,
    energy_kwh: Option<f64>,
    energy_mj: f64,
    co2_g: f64,
    cost: f64,
    cumulative_distance_km: f64,
    cumulative_energy_mj: f64,
    cumulative_co2_g: f64,
    cumulative_cost: f64,
}
