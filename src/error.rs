//! Simulator error types.

use thiserror::Error;

/// Errors raised while configuring a simulation or recording its output.
#[derive(Error, Debug)]
pub enum SimError {
    /// Timestep must be finite and strictly positive
    #[error("invalid timestep {0}: must be finite and > 0")]
    InvalidTimestep(f32),

    /// Max velocity scales the noise, so it must be finite and non-negative
    #[error("invalid max velocity {0}: must be finite and >= 0")]
    InvalidMaxVelocity(f32),

    #[error("invalid duration {0}: must be finite and >= 0")]
    InvalidDuration(f32),

    /// Run would produce indices past the `i32` record field
    #[error("{0} steps exceeds the {max} step limit", max = crate::MAX_STEPS)]
    TooManySteps(f64),

    #[error("step index {0} does not fit a trajectory record")]
    IndexOverflow(u32),

    /// Initial position or velocity holds a NaN or infinity
    #[error("non-finite initial {field}: {value}")]
    NonFiniteState { field: &'static str, value: f32 },

    #[error("noise distribution error: {0}")]
    Noise(#[from] rand_distr::NormalError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Trajectory file ended part way through a record
    #[error("truncated trajectory record: got {len} bytes")]
    TruncatedRecord { len: usize },
}

/// Result type for simulator operations.
pub type Result<T> = std::result::Result<T, SimError>;
