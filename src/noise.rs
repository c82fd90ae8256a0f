//! Velocity perturbation sources.

use nalgebra::Vector3;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};

use crate::error::Result;

/// Produces the per-step velocity perturbation, one sample per axis.
pub trait NoiseSource {
    fn sample(&mut self) -> Vector3<f32>;
}

/// Zero-mean Gaussian noise, drawn independently on each axis from a single
/// generator that lives as long as the vehicle.
#[derive(Debug, Clone)]
pub struct GaussianNoise<R = StdRng> {
    rng: R,
    normal: Normal<f32>,
}

impl GaussianNoise<StdRng> {
    /// Reproducible noise: the same seed always yields the same sequence.
    pub fn seeded(std_dev: f32, seed: u64) -> Result<Self> {
        Self::with_rng(std_dev, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(std_dev: f32) -> Result<Self> {
        Self::with_rng(std_dev, StdRng::from_os_rng())
    }
}

impl<R: Rng> GaussianNoise<R> {
    pub fn with_rng(std_dev: f32, rng: R) -> Result<Self> {
        let normal = Normal::new(0.0, std_dev)?;
        Ok(GaussianNoise { rng, normal })
    }

    pub fn std_dev(&self) -> f32 {
        self.normal.std_dev()
    }
}

impl<R: Rng> NoiseSource for GaussianNoise<R> {
    fn sample(&mut self) -> Vector3<f32> {
        Vector3::new(
            self.normal.sample(&mut self.rng),
            self.normal.sample(&mut self.rng),
            self.normal.sample(&mut self.rng),
        )
    }
}

/// Returns the same perturbation on every call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedNoise(pub Vector3<f32>);

impl FixedNoise {
    pub fn zero() -> Self {
        FixedNoise(Vector3::zeros())
    }
}

impl NoiseSource for FixedNoise {
    fn sample(&mut self) -> Vector3<f32> {
        self.0
    }
}
