//! Error types for controller synthesis.

use cp_model::ModelError;
use thiserror::Error;

/// Result type for controller operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur while synthesizing or applying a controller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Q not positive semidefinite diagonal, or R not positive.
    #[error("Invalid cost weights: {what}")]
    InvalidCost { what: String },

    /// No stabilizing Riccati solution, or the closed loop failed the Hurwitz check.
    #[error("Unstabilizable system: {what}")]
    UnstabilizableSystem { what: String },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}
