use nalgebra::Vector3;
use tracing::debug;

use crate::{
    SimConfig,
    error::{Result, SimError},
    noise::{GaussianNoise, NoiseSource},
};

/// Kinematic state of a single drone doing a random walk in velocity.
///
/// Each `step` adds one noise sample to the velocity, then integrates the
/// position with the updated velocity (semi-implicit Euler). `max_velocity`
/// only scales the noise, so the speed is unbounded.
#[derive(Debug, Clone)]
pub struct VehicleState<N = GaussianNoise> {
    position: Vector3<f32>,
    velocity: Vector3<f32>,
    timestep: f32,
    steps: u64,
    noise: N,
}

impl VehicleState<GaussianNoise> {
    /// Vehicle at rest at the origin.
    pub fn new(config: &SimConfig) -> Result<Self> {
        Self::with_state(config, Vector3::zeros(), Vector3::zeros())
    }

    pub fn with_state(
        config: &SimConfig,
        position: Vector3<f32>,
        velocity: Vector3<f32>,
    ) -> Result<Self> {
        config.validate()?;
        let std_dev = config.noise_std_dev();
        let noise = match config.seed {
            Some(seed) => GaussianNoise::seeded(std_dev, seed)?,
            None => GaussianNoise::from_entropy(std_dev)?,
        };
        Self::with_noise(config, position, velocity, noise)
    }
}

impl<N: NoiseSource> VehicleState<N> {
    /// Vehicle driven by a caller supplied noise source.
    pub fn with_noise(
        config: &SimConfig,
        position: Vector3<f32>,
        velocity: Vector3<f32>,
        noise: N,
    ) -> Result<Self> {
        config.validate()?;
        check_finite("position", &position)?;
        check_finite("velocity", &velocity)?;
        debug!(
            timestep = config.timestep,
            max_velocity = config.max_velocity,
            "vehicle created"
        );
        Ok(VehicleState {
            position,
            velocity,
            timestep: config.timestep,
            steps: 0,
            noise,
        })
    }

    /// Advance the vehicle by one timestep.
    pub fn step(&mut self) {
        self.velocity += self.noise.sample();
        // Must use the velocity updated above.
        self.position += self.velocity * self.timestep;
        self.steps += 1;
    }

    pub fn position(&self) -> &Vector3<f32> {
        &self.position
    }

    pub fn velocity(&self) -> &Vector3<f32> {
        &self.velocity
    }

    pub fn timestep(&self) -> f32 {
        self.timestep
    }

    pub fn noise(&self) -> &N {
        &self.noise
    }

    /// Number of completed steps.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

fn check_finite(field: &'static str, v: &Vector3<f32>) -> Result<()> {
    match v.iter().find(|c| !c.is_finite()) {
        Some(&value) => Err(SimError::NonFiniteState { field, value }),
        None => Ok(()),
    }
}
