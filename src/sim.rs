use std::time::{Duration, Instant};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    SimConfig,
    error::Result,
    noise::{GaussianNoise, NoiseSource},
    vehicle::VehicleState,
};

/// State of the vehicle right after step `index`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub index: u32,
    pub position: Vector3<f32>,
    pub velocity: Vector3<f32>,
}

#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub steps: u32,
    /// Simulated seconds covered
    pub simulated: f32,
    /// Wall clock time spent stepping and in the sample callback
    pub elapsed: Duration,
}

/// Fixed-length driver loop around a single vehicle.
pub struct Simulation<N = GaussianNoise> {
    vehicle: VehicleState<N>,
    total_steps: u32,
}

impl Simulation<GaussianNoise> {
    pub fn new(config: &SimConfig) -> Result<Self> {
        Ok(Simulation {
            vehicle: VehicleState::new(config)?,
            total_steps: config.total_steps(),
        })
    }
}

impl<N: NoiseSource> Simulation<N> {
    pub fn from_vehicle(vehicle: VehicleState<N>, total_steps: u32) -> Self {
        Simulation {
            vehicle,
            total_steps,
        }
    }

    pub fn vehicle(&self) -> &VehicleState<N> {
        &self.vehicle
    }

    pub fn total_steps(&self) -> u32 {
        self.total_steps
    }

    /// Step the vehicle `total_steps` times, handing each new state to
    /// `on_sample`. The first callback error aborts the run.
    pub fn run<F>(&mut self, mut on_sample: F) -> Result<RunSummary>
    where
        F: FnMut(&Sample) -> Result<()>,
    {
        info!(steps = self.total_steps, "simulation started");
        let start = Instant::now();

        for index in 0..self.total_steps {
            self.vehicle.step();
            let sample = Sample {
                index,
                position: *self.vehicle.position(),
                velocity: *self.vehicle.velocity(),
            };
            on_sample(&sample)?;
        }

        let summary = RunSummary {
            steps: self.total_steps,
            simulated: self.total_steps as f32 * self.vehicle.timestep(),
            elapsed: start.elapsed(),
        };
        info!(
            steps = summary.steps,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "simulation finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::SimError, noise::FixedNoise};

    #[test]
    fn test_run_visits_every_step() {
        let config = SimConfig {
            duration: 1.0,
            seed: Some(3),
            ..Default::default()
        };
        let mut sim = Simulation::new(&config).unwrap();
        let mut indices = Vec::new();
        let summary = sim
            .run(|s| {
                indices.push(s.index);
                Ok(())
            })
            .unwrap();
        assert_eq!(summary.steps, 50);
        assert_eq!(indices, (0..50).collect::<Vec<_>>());
        assert_eq!(sim.vehicle().steps(), 50);
        assert!((summary.simulated - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_samples_follow_vehicle() {
        let config = SimConfig::default();
        let vehicle = VehicleState::with_noise(
            &config,
            Vector3::zeros(),
            Vector3::zeros(),
            FixedNoise(Vector3::new(0.0, 1.0, 0.0)),
        )
        .unwrap();
        let mut sim = Simulation::from_vehicle(vehicle, 3);
        let mut samples = Vec::new();
        sim.run(|s| {
            samples.push(*s);
            Ok(())
        })
        .unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[2].velocity, Vector3::new(0.0, 3.0, 0.0));
        assert_eq!(samples[2].position, *sim.vehicle().position());
    }

    #[test]
    fn test_callback_error_stops_run() {
        let config = SimConfig {
            seed: Some(5),
            ..Default::default()
        };
        let mut sim = Simulation::new(&config).unwrap();
        let err = sim
            .run(|s| {
                if s.index == 4 {
                    Err(SimError::TruncatedRecord { len: 0 })
                } else {
                    Ok(())
                }
            })
            .unwrap_err();
        assert!(matches!(err, SimError::TruncatedRecord { .. }));
        assert_eq!(sim.vehicle().steps(), 5);
    }

    #[test]
    fn test_zero_duration_runs_nothing() {
        let config = SimConfig {
            duration: 0.0,
            seed: Some(1),
            ..Default::default()
        };
        let mut sim = Simulation::new(&config).unwrap();
        let summary = sim.run(|_| Ok(())).unwrap();
        assert_eq!(summary.steps, 0);
        assert_eq!(*sim.vehicle().position(), Vector3::zeros());
    }
}
