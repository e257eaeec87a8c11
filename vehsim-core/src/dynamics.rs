//! Point-mass road-load model: tractive force and power at a given speed,
//! and a fixed-step acceleration run built on it.

use crate::imports::*;
use crate::params::{CalcParams, PhysicalProperties};
use crate::vehicle::{Chassis, VehicleKind, VehicleSpec};

/// Integration time step for [simulate_acceleration], s
pub const TIME_STEP_S: f64 = 0.1;

const MPS_PER_KMH: f64 = 1.0 / 3.6;

/// Drivetrain efficiency rising linearly with speed up to a ceiling
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyCurve {
    /// efficiency at standstill
    pub base: f64,
    /// increase per m/s
    pub slope: f64,
    pub max: f64,
}

impl EfficiencyCurve {
    pub fn for_kind(kind: VehicleKind) -> Self {
        match kind {
            VehicleKind::ICE => Self {
                base: 0.1,
                slope: 0.002,
                max: 0.35,
            },
            VehicleKind::EV => Self {
                base: 0.7,
                slope: 0.003,
                max: 0.9,
            },
            VehicleKind::HEV | VehicleKind::PHEV => Self {
                base: 0.3,
                slope: 0.0025,
                max: 0.5,
            },
        }
    }

    pub fn at(&self, velocity_ms: f64) -> f64 {
        (self.base + self.slope * velocity_ms).min(self.max)
    }
}

/// Road-load forces, N
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Forces {
    pub rolling: f64,
    pub acceleration: f64,
    pub grade: f64,
    pub air: f64,
}

impl Forces {
    pub fn total(&self) -> f64 {
        self.rolling + self.acceleration + self.grade + self.air
    }

    /// Everything opposing motion, i.e. all but the inertial term
    pub fn resistance(&self) -> f64 {
        self.rolling + self.grade + self.air
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForceResult {
    pub forces: Forces,
    pub total_force_n: f64,
    pub power_kw: f64,
    pub velocity_ms: f64,
    pub efficiency: f64,
}

fn road_load(
    chassis: &Chassis,
    kind: VehicleKind,
    velocity_kmh: f64,
    acceleration_mps2: f64,
    road_grade_deg: f64,
    props: &PhysicalProperties,
) -> ForceResult {
    let velocity_ms = velocity_kmh * MPS_PER_KMH;
    let forces = Forces {
        rolling: chassis.rolling_coef * chassis.mass_kg * props.a_grav_mps2,
        acceleration: chassis.mass_kg * acceleration_mps2,
        grade: chassis.mass_kg * props.a_grav_mps2 * road_grade_deg.to_radians().sin(),
        air: 0.5
            * props.air_density_kg_per_m3
            * chassis.drag_coef
            * chassis.frontal_area_m2
            * velocity_ms.powi(2),
    };
    let total_force_n = forces.total();
    ForceResult {
        forces,
        total_force_n,
        power_kw: total_force_n * velocity_ms / 1e3,
        velocity_ms,
        efficiency: EfficiencyCurve::for_kind(kind).at(velocity_ms),
    }
}

/// Computes the tractive force and power needed to hold `acceleration_mps2`
/// at `velocity_kmh` on a road inclined by `road_grade_deg`
pub fn required_force(
    vehicle: &VehicleSpec,
    velocity_kmh: f64,
    acceleration_mps2: f64,
    road_grade_deg: f64,
    params: &CalcParams,
) -> anyhow::Result<ForceResult> {
    if !(velocity_kmh.is_finite() && velocity_kmh >= 0.0) {
        return Err(CalcError::InvalidParameter {
            name: "velocity_kmh",
            value: velocity_kmh,
        }
        .into());
    }
    ensure!(
        acceleration_mps2.is_finite() && road_grade_deg.is_finite(),
        "{}\n{}",
        format_dbg!(acceleration_mps2),
        format_dbg!(road_grade_deg)
    );
    Ok(road_load(
        &vehicle.chassis,
        vehicle.kind(),
        velocity_kmh,
        acceleration_mps2,
        road_grade_deg,
        &params.props,
    ))
}

/// One step of an acceleration run
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccelSample {
    pub time_s: f64,
    pub velocity_kmh: f64,
    pub distance_m: f64,
    pub acceleration_mps2: f64,
    pub power_kw: f64,
}

/// Full-throttle (or partial-throttle) run from a given speed.  Iterating
/// is lazy and each call to [AccelerationRun::iter] starts from the
/// initial state again.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccelerationRun {
    pub chassis: Chassis,
    pub kind: VehicleKind,
    pub props: PhysicalProperties,
    pub initial_velocity_kmh: f64,
    pub max_time_s: f64,
    /// fraction of the rated maximum acceleration demanded
    pub throttle: f64,
    pub road_grade_deg: f64,
}

impl AccelerationRun {
    pub fn iter(&self) -> AccelerationIter<'_> {
        AccelerationIter {
            run: self,
            step: 0,
            n_steps: (self.max_time_s / TIME_STEP_S + 1e-9).floor() as usize,
            velocity_kmh: self.initial_velocity_kmh,
            distance_m: 0.0,
            done: false,
        }
    }

    /// Time to reach `target_kmh`, if reached within the run
    pub fn time_to(&self, target_kmh: f64) -> Option<f64> {
        self.iter()
            .find(|sample| sample.velocity_kmh >= target_kmh)
            .map(|sample| sample.time_s + TIME_STEP_S)
    }
}

impl<'a> IntoIterator for &'a AccelerationRun {
    type Item = AccelSample;
    type IntoIter = AccelerationIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct AccelerationIter<'a> {
    run: &'a AccelerationRun,
    step: usize,
    n_steps: usize,
    velocity_kmh: f64,
    distance_m: f64,
    done: bool,
}

impl Iterator for AccelerationIter<'_> {
    type Item = AccelSample;

    fn next(&mut self) -> Option<AccelSample> {
        if self.done || self.step >= self.n_steps {
            return None;
        }
        let run = self.run;
        let traction_mps2 = run.throttle * run.chassis.max_acceleration_mps2;
        let load = road_load(
            &run.chassis,
            run.kind,
            self.velocity_kmh,
            traction_mps2,
            run.road_grade_deg,
            &run.props,
        );
        let acceleration_mps2 = traction_mps2 - load.forces.resistance() / run.chassis.mass_kg;
        self.velocity_kmh =
            (self.velocity_kmh + acceleration_mps2 * TIME_STEP_S / MPS_PER_KMH).max(0.0);
        self.distance_m += self.velocity_kmh * MPS_PER_KMH * TIME_STEP_S;

        let sample = AccelSample {
            time_s: self.step as f64 * TIME_STEP_S,
            velocity_kmh: self.velocity_kmh,
            distance_m: self.distance_m,
            acceleration_mps2,
            power_kw: load.power_kw,
        };
        self.step += 1;
        if self.velocity_kmh >= run.chassis.max_speed_kmh {
            self.done = true;
        }
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            (0, Some(self.n_steps.saturating_sub(self.step)))
        }
    }
}

/// Sets up an acceleration run for `vehicle`
///
/// # Arguments
/// - `initial_velocity_kmh`: starting speed
/// - `max_time_s`: run length; the run stops earlier at the rated top speed
/// - `throttle`: 0 to 1, fraction of rated maximum acceleration
/// - `road_grade_deg`: road inclination, positive uphill
pub fn simulate_acceleration(
    vehicle: &VehicleSpec,
    initial_velocity_kmh: f64,
    max_time_s: f64,
    throttle: f64,
    road_grade_deg: f64,
    params: &CalcParams,
) -> anyhow::Result<AccelerationRun> {
    if !(0.0..=1.0).contains(&throttle) {
        return Err(CalcError::InvalidParameter {
            name: "throttle",
            value: throttle,
        }
        .into());
    }
    if !(max_time_s.is_finite() && max_time_s >= 0.0) {
        return Err(CalcError::InvalidParameter {
            name: "max_time_s",
            value: max_time_s,
        }
        .into());
    }
    if !(initial_velocity_kmh.is_finite() && initial_velocity_kmh >= 0.0) {
        return Err(CalcError::InvalidParameter {
            name: "initial_velocity_kmh",
            value: initial_velocity_kmh,
        }
        .into());
    }
    if vehicle.chassis.mass_kg <= 0.0 {
        return Err(CalcError::DivisionByZero {
            quantity: "acceleration_mps2",
        })
        .with_context(|| format!("{:?} has no mass", vehicle.name));
    }
    ensure!(road_grade_deg.is_finite(), format_dbg!(road_grade_deg));
    Ok(AccelerationRun {
        chassis: vehicle.chassis.clone(),
        kind: vehicle.kind(),
        props: params.props.clone(),
        initial_velocity_kmh,
        max_time_s,
        throttle,
        road_grade_deg,
    })
}
