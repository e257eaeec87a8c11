use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};

use std::path::PathBuf;

extern crate vehsim_core;
use chrono::NaiveDate;
use vehsim_core::compare::compare_all;
use vehsim_core::dynamics::AccelSample;
use vehsim_core::prelude::*;
use vehsim_core::simulation::SimulationSummary;

/// Energy, emissions and cost-of-ownership calculator for ICE, EV, HEV and
/// PHEV road vehicles.
/// After running `cargo build --release`, run with
/// ```bash
/// ./target/release/vehsim-cli energy --veh-file vehsim-core/resources/vehicles/ice_sedan.yaml --distance-km 250
/// ```.
/// Day-by-day simulation with seasonal adjustment, written as CSV:
/// ```bash
/// ./target/release/vehsim-cli simulate --resource ev_hatchback.yaml --start 2024-01-01 --end 2024-12-31 --daily-km 40 --policy by_month --csv sim.csv
/// ```
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct VehSimApi {
    /// Increase log verbosity (-v debug, -vv trace)
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    /// YAML or JSON file overriding engine constants
    #[clap(long, global = true, value_parser)]
    params_file: Option<PathBuf>,
    /// Output format of results
    #[clap(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Args)]
#[clap(group(
    ArgGroup::new("vehicle")
    .required(true)
    .args(&["veh", "veh-file", "resource"])
))]
struct VehicleArgs {
    /// Vehicle as json string
    #[clap(long, value_parser)]
    veh: Option<String>,
    /// Path to vehicle file (yaml or json)
    #[clap(long, value_parser)]
    veh_file: Option<PathBuf>,
    /// Name of a bundled sample vehicle, e.g. `ev_hatchback.yaml`
    #[clap(long, value_parser)]
    resource: Option<String>,
}

impl VehicleArgs {
    fn load(&self) -> anyhow::Result<VehicleSpec> {
        if let Some(json) = &self.veh {
            VehicleSpec::from_json(json)
        } else if let Some(path) = &self.veh_file {
            VehicleSpec::from_file(path)
        } else if let Some(name) = &self.resource {
            load_resource(name)
        } else {
            anyhow::bail!("one of --veh, --veh-file or --resource is required")
        }
    }
}

#[cfg(feature = "resources")]
fn load_resource(name: &str) -> anyhow::Result<VehicleSpec> {
    VehicleSpec::from_resource(std::path::Path::new("vehicles").join(name))
}

#[cfg(not(feature = "resources"))]
fn load_resource(name: &str) -> anyhow::Result<VehicleSpec> {
    anyhow::bail!("vehsim-core was built without bundled resources, cannot load {name:?}")
}

#[derive(Args)]
struct TripArgs {
    /// Trip distance, km
    #[clap(long, value_parser, default_value_t = 100.0)]
    distance_km: f64,
    /// city, highway or mixed
    #[clap(long, value_parser, default_value = "mixed")]
    conditions: DrivingConditions,
    /// Generation mix charging the battery; unknown keys fall back to eu_avg
    #[clap(long, value_parser, default_value = "eu_avg")]
    energy_source: String,
    /// Do not credit regenerative braking
    #[clap(long, action)]
    no_recuperation: bool,
    /// Fraction of the trip in urban traffic
    #[clap(long, value_parser, default_value_t = 0.5)]
    urban_share: f64,
}

impl TripArgs {
    fn scenario(&self) -> anyhow::Result<Scenario> {
        let mut scenario = Scenario {
            distance_km: self.distance_km,
            driving_conditions: self.conditions,
            energy_source: EnergySource::from_key_or_default(&self.energy_source),
            use_recuperation: !self.no_recuperation,
            urban_share: self.urban_share,
        };
        scenario.init()?;
        Ok(scenario)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Fuel and electricity use over a trip
    Energy {
        #[clap(flatten)]
        vehicle: VehicleArgs,
        #[clap(flatten)]
        trip: TripArgs,
    },
    /// CO₂ emitted over a trip, grams
    Emissions {
        #[clap(flatten)]
        vehicle: VehicleArgs,
        #[clap(flatten)]
        trip: TripArgs,
    },
    /// Energy, emissions and energy cost of a trip
    Trip {
        #[clap(flatten)]
        vehicle: VehicleArgs,
        #[clap(flatten)]
        trip: TripArgs,
    },
    /// Lifetime total cost of ownership
    Tco {
        #[clap(flatten)]
        vehicle: VehicleArgs,
        /// Lifetime distance, km; defaults to annual km × lifetime years
        #[clap(long, value_parser)]
        distance_km: Option<f64>,
    },
    /// Day-by-day simulation over a date range
    Simulate {
        #[clap(flatten)]
        vehicle: VehicleArgs,
        /// First simulated day, YYYY-MM-DD
        #[clap(long, value_parser)]
        start: NaiveDate,
        /// Last simulated day, YYYY-MM-DD
        #[clap(long, value_parser)]
        end: NaiveDate,
        #[clap(long, value_parser)]
        daily_km: f64,
        /// Hours spent driving each day
        #[clap(long, value_parser, default_value_t = 1.0)]
        daily_hours: f64,
        /// by_month, or fixed conditions: city, highway, mixed
        #[clap(long, value_parser, default_value = "mixed")]
        policy: ConditionPolicy,
        #[clap(long, value_parser, default_value = "eu_avg")]
        energy_source: String,
        /// Enable day-to-day noise with this seed
        #[clap(long, value_parser)]
        noise_seed: Option<u64>,
        /// Standard deviation of day-to-day noise
        #[clap(long, value_parser, default_value_t = 0.03)]
        noise_std_dev: f64,
        /// Add amortised insurance, tax and purchase price to daily cost
        #[clap(long, action)]
        ownership_costs: bool,
        /// Evaluate days in parallel
        #[clap(long, action)]
        parallel: bool,
        /// Write the daily series as CSV to this path, `-` for stdout
        #[clap(long, value_parser)]
        csv: Option<String>,
        /// Print only the totals
        #[clap(long, action)]
        summary: bool,
    },
    /// Road-load force and power at a given speed
    Force {
        #[clap(flatten)]
        vehicle: VehicleArgs,
        #[clap(long, value_parser)]
        velocity_kmh: f64,
        #[clap(long, value_parser, default_value_t = 0.0)]
        acceleration_mps2: f64,
        #[clap(long, value_parser, default_value_t = 0.0)]
        grade_deg: f64,
    },
    /// Acceleration run in 0.1 s steps
    Accel {
        #[clap(flatten)]
        vehicle: VehicleArgs,
        #[clap(long, value_parser, default_value_t = 0.0)]
        initial_kmh: f64,
        #[clap(long, value_parser, default_value_t = 10.0)]
        max_time_s: f64,
        #[clap(long, value_parser, default_value_t = 0.8)]
        throttle: f64,
        #[clap(long, value_parser, default_value_t = 0.0)]
        grade_deg: f64,
    },
    /// One averaged vehicle per kind found in the given files
    Average {
        #[clap(long = "veh-file", value_parser, required = true)]
        veh_files: Vec<PathBuf>,
    },
    /// Compare several vehicles over the same trip, plus lifetime TCO
    Compare {
        #[clap(long = "veh-file", value_parser, required = true)]
        veh_files: Vec<PathBuf>,
        #[clap(flatten)]
        trip: TripArgs,
    },
    /// List the known electricity generation mixes
    Sources,
}

#[derive(Serialize)]
struct TripReport {
    name: String,
    kind: VehicleKind,
    scenario: Scenario,
    energy: EnergyResult,
    co2_g: f64,
    energy_cost: f64,
}

#[derive(Serialize)]
struct SourceInfo {
    key: &'static str,
    name: &'static str,
    g_co2_per_kwh: f64,
}

#[derive(Serialize)]
struct SimulationTotals<'a> {
    vehicle_name: &'a str,
    kind: VehicleKind,
    summary: SimulationSummary,
}

fn print_output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let out = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    println!("{out}");
    Ok(())
}

fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;
    Ok(())
}

fn load_vehicles(paths: &[PathBuf]) -> anyhow::Result<Vec<VehicleSpec>> {
    log::debug!("loading {} vehicle files", paths.len());
    paths.iter().map(VehicleSpec::from_file).collect()
}

pub fn main() -> anyhow::Result<()> {
    let api = VehSimApi::parse();
    init_logging(api.verbose)?;
    let params = match &api.params_file {
        Some(path) => {
            log::info!("loading params from {}", path.display());
            CalcParams::from_file(path)?
        }
        None => CalcParams::default(),
    };
    let format = api.format;

    match api.command {
        Command::Energy { vehicle, trip } => {
            let veh = vehicle.load()?;
            let res = compute_energy(&veh, trip.distance_km, trip.conditions, &params)?;
            print_output(&res, format)
        }
        Command::Emissions { vehicle, trip } => {
            let veh = vehicle.load()?;
            let co2_g = scenario_co2(&veh, &trip.scenario()?, &params)?;
            print_output(&serde_json::json!({ "co2_g": co2_g }), format)
        }
        Command::Trip { vehicle, trip } => {
            let veh = vehicle.load()?;
            let scenario = trip.scenario()?;
            let report = TripReport {
                name: veh.name.clone(),
                kind: veh.kind(),
                energy: compute_energy(
                    &veh,
                    scenario.distance_km,
                    scenario.driving_conditions,
                    &params,
                )?,
                co2_g: scenario_co2(&veh, &scenario, &params)?,
                energy_cost: energy_cost(
                    &veh,
                    scenario.distance_km,
                    scenario.driving_conditions,
                    &params,
                )?,
                scenario,
            };
            print_output(&report, format)
        }
        Command::Tco {
            vehicle,
            distance_km,
        } => {
            let veh = vehicle.load()?;
            print_output(&calculate_tco(&veh, distance_km, &params)?, format)
        }
        Command::Simulate {
            vehicle,
            start,
            end,
            daily_km,
            daily_hours,
            policy,
            energy_source,
            noise_seed,
            noise_std_dev,
            ownership_costs,
            parallel,
            csv,
            summary,
        } => {
            let veh = vehicle.load()?;
            let mut run = SimulationRun::new(start, end, daily_km, policy)?;
            run.daily_hours = daily_hours;
            run.energy_source = EnergySource::from_key_or_default(&energy_source);
            run.noise = noise_seed.map(|seed| NoiseParams::new(noise_std_dev, seed));
            run.include_ownership_costs = ownership_costs;
            run.parallelize = parallel;
            let res = run.simulate(&veh, &params)?;

            match csv.as_deref() {
                Some("-") => return res.to_csv_writer(std::io::stdout()),
                Some(path) => res.to_csv_file(path)?,
                None => {}
            }
            if summary {
                print_output(
                    &SimulationTotals {
                        vehicle_name: &res.vehicle_name,
                        kind: res.kind,
                        summary: res.summary(),
                    },
                    format,
                )
            } else {
                print_output(&res, format)
            }
        }
        Command::Force {
            vehicle,
            velocity_kmh,
            acceleration_mps2,
            grade_deg,
        } => {
            let veh = vehicle.load()?;
            let res = required_force(&veh, velocity_kmh, acceleration_mps2, grade_deg, &params)?;
            print_output(&res, format)
        }
        Command::Accel {
            vehicle,
            initial_kmh,
            max_time_s,
            throttle,
            grade_deg,
        } => {
            let veh = vehicle.load()?;
            let run =
                simulate_acceleration(&veh, initial_kmh, max_time_s, throttle, grade_deg, &params)?;
            let samples: Vec<AccelSample> = run.iter().collect();
            print_output(&samples, format)
        }
        Command::Average { veh_files } => {
            let vehicles = load_vehicles(&veh_files)?;
            print_output(&VehicleSpec::average_by_kind(&vehicles)?, format)
        }
        Command::Compare { veh_files, trip } => {
            let vehicles = load_vehicles(&veh_files)?;
            print_output(&compare_all(&vehicles, &trip.scenario()?, &params), format)
        }
        Command::Sources => {
            let sources: Vec<SourceInfo> = EnergySource::all()
                .into_iter()
                .map(|src| SourceInfo {
                    key: src.key(),
                    name: src.display_name(),
                    g_co2_per_kwh: params.emissions.grid.factor(src),
                })
                .collect();
            print_output(&sources, format)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        VehSimApi::command().debug_assert();
    }

    #[test]
    fn test_verbosity_counts() {
        let api = VehSimApi::try_parse_from(["vehsim-cli", "-vv", "sources"]).unwrap();
        assert_eq!(api.verbose, 2);
        let api = VehSimApi::try_parse_from(["vehsim-cli", "sources"]).unwrap();
        assert_eq!(api.verbose, 0);
    }
}
