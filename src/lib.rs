pub mod error;
pub mod noise;
pub mod record;
pub mod sim;
pub mod vehicle;

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

pub use error::{Result, SimError};
pub use noise::{FixedNoise, GaussianNoise, NoiseSource};
pub use sim::{RunSummary, Sample, Simulation};
pub use vehicle::VehicleState;

/// Noise standard deviation as a fraction of max velocity.
pub const NOISE_SCALE: f32 = 0.2;

/// Largest step count whose indices fit the `i32` record field.
pub const MAX_STEPS: u32 = i32::MAX as u32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seconds advanced per step
    pub timestep: f32,
    /// Scales the velocity noise; not a clamp
    pub max_velocity: f32,
    /// Simulated seconds covered by a full run
    pub duration: f32,
    /// Noise seed, OS entropy when unset
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            timestep: 0.02,
            max_velocity: 0.5,
            duration: 10.0,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Load a config file. Values are not validated here so callers can
    /// apply overrides first.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.timestep.is_finite() || self.timestep <= 0.0 {
            return Err(SimError::InvalidTimestep(self.timestep));
        }
        if !self.max_velocity.is_finite() || self.max_velocity < 0.0 {
            return Err(SimError::InvalidMaxVelocity(self.max_velocity));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(SimError::InvalidDuration(self.duration));
        }
        let steps = self.whole_steps();
        if steps > MAX_STEPS as f64 {
            return Err(SimError::TooManySteps(steps));
        }
        Ok(())
    }

    pub fn noise_std_dev(&self) -> f32 {
        NOISE_SCALE * self.max_velocity
    }

    /// Number of whole timesteps that fit in `duration`. Only meaningful
    /// for a config that passed `validate`.
    pub fn total_steps(&self) -> u32 {
        self.whole_steps() as u32
    }

    fn whole_steps(&self) -> f64 {
        let quotient = self.duration as f64 / self.timestep as f64;
        let nearest = quotient.round();
        // Both inputs are f32 approximations of decimal values, so a
        // quotient within that error of an integer counts as exact.
        if (quotient - nearest).abs() <= quotient * f32::EPSILON as f64 {
            nearest
        } else {
            quotient.floor()
        }
    }
}
