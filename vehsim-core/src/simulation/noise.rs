use crate::imports::*;
use rand::prelude::*;
use rand_distr::Normal;

/// Day-to-day multiplicative variation around 1.0
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct NoiseParams {
    /// standard deviation of the multiplier
    #[serde(default = "default_std_dev")]
    pub std_dev: f64,
    #[serde(default)]
    pub seed: u64,
}

fn default_std_dev() -> f64 {
    0.03
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            std_dev: default_std_dev(),
            seed: 0,
        }
    }
}

/// Noise multipliers drawn for one day
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct NoiseFactors {
    pub energy: f64,
    pub emissions: f64,
    pub cost: f64,
}

impl NoiseFactors {
    pub fn unity() -> Self {
        Self {
            energy: 1.0,
            emissions: 1.0,
            cost: 1.0,
        }
    }
}

impl NoiseParams {
    pub fn new(std_dev: f64, seed: u64) -> Self {
        Self { std_dev, seed }
    }

    /// `std_dev` must be finite and non-negative
    pub fn check(&self) -> anyhow::Result<()> {
        ensure!(
            self.std_dev.is_finite() && self.std_dev >= 0.0,
            CalcError::InvalidParameter {
                name: "std_dev",
                value: self.std_dev
            }
        );
        Ok(())
    }

    /// Draws the multipliers for day `day_index`.  Each day has its own
    /// generator derived from the seed and the index, so the result does not
    /// depend on the order days are evaluated in.
    pub fn factors(&self, day_index: u64) -> anyhow::Result<NoiseFactors> {
        self.check()?;
        let normal = Normal::new(1.0, self.std_dev)
            .map_err(|err| anyhow!("invalid noise std_dev {}: {err}", self.std_dev))?;
        let mut rng = StdRng::seed_from_u64(
            self.seed ^ day_index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15),
        );
        let mut draw = || normal.sample(&mut rng).max(0.0);
        Ok(NoiseFactors {
            energy: draw(),
            emissions: draw(),
            cost: draw(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_draws() {
        let noise = NoiseParams::new(0.03, 42);
        assert_eq!(noise.factors(7).unwrap(), noise.factors(7).unwrap());
        assert_ne!(noise.factors(7).unwrap(), noise.factors(8).unwrap());
        assert_ne!(
            noise.factors(7).unwrap(),
            NoiseParams::new(0.03, 43).factors(7).unwrap()
        );
    }

    #[test]
    fn test_zero_std_dev_is_unity() {
        let noise = NoiseParams::new(0.0, 1);
        assert_eq!(noise.factors(3).unwrap(), NoiseFactors::unity());
    }

    #[test]
    fn test_draws_are_near_one() {
        let noise = NoiseParams::default();
        for day in 0..365 {
            let f = noise.factors(day).unwrap();
            for x in [f.energy, f.emissions, f.cost] {
                assert!(x >= 0.0);
                assert!((x - 1.0).abs() < 0.3, "{x}");
            }
        }
    }

    #[test]
    fn test_negative_std_dev_rejected() {
        let err = NoiseParams::new(-0.1, 0).factors(0).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CalcError>(),
            Some(&CalcError::InvalidParameter {
                name: "std_dev",
                value: -0.1
            })
        );
        assert!(NoiseParams::new(f64::NAN, 0).factors(0).is_err());
    }
}
