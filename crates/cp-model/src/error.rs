//! Error types for plant model operations.

use thiserror::Error;

/// Result type for plant model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while deriving or evaluating the plant model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Parameters or equations do not describe a solvable plant.
    #[error("Invalid model: {what}")]
    InvalidModel { what: String },

    /// A denominator in the closed-form dynamics vanished, or an input was
    /// not finite.
    #[error("Numerical singularity in {what}: {value:e}")]
    NumericalSingularity { what: &'static str, value: f64 },
}
