//! Error types for simulation operations.

use cp_controls::ControlError;
use cp_model::ModelError;
use thiserror::Error;

/// Errors encountered during a simulation run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// The integrated state left the finite range.
    #[error("Integration failure at step {step} (t = {time} s): {what}")]
    IntegrationFailure {
        step: usize,
        time: f64,
        what: String,
    },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Control error: {0}")]
    Control(#[from] ControlError),
}

pub type SimResult<T> = Result<T, SimError>;
