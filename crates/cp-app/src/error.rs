//! Error types for the cp-app service layer.

use std::fmt;

use cp_controls::ControlError;
use cp_model::ModelError;
use cp_project::ProjectError;
use cp_sim::SimError;

/// Application error type that wraps errors from the backend crates while
/// keeping their distinct kinds visible to frontends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(#[from] ProjectError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Control synthesis error: {0}")]
    Control(#[from] ControlError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] SimError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cp-app operations.
pub type AppResult<T> = Result<T, AppError>;

/// Which stage of the pipeline failed, independent of the crate it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidModel,
    NumericalSingularity,
    InvalidCost,
    UnstabilizableSystem,
    IntegrationFailure,
    InvalidInput,
    Project,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidModel => "invalid model",
            ErrorKind::NumericalSingularity => "numerical singularity",
            ErrorKind::InvalidCost => "invalid cost",
            ErrorKind::UnstabilizableSystem => "unstabilizable system",
            ErrorKind::IntegrationFailure => "integration failure",
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::Project => "project",
            ErrorKind::Io => "i/o",
        };
        f.write_str(s)
    }
}

fn model_kind(err: &ModelError) -> ErrorKind {
    match err {
        ModelError::InvalidModel { .. } => ErrorKind::InvalidModel,
        ModelError::NumericalSingularity { .. } => ErrorKind::NumericalSingularity,
    }
}

fn control_kind(err: &ControlError) -> ErrorKind {
    match err {
        ControlError::InvalidArg { .. } => ErrorKind::InvalidInput,
        ControlError::InvalidCost { .. } => ErrorKind::InvalidCost,
        ControlError::UnstabilizableSystem { .. } => ErrorKind::UnstabilizableSystem,
        ControlError::Model(e) => model_kind(e),
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Project(_) => ErrorKind::Project,
            AppError::Model(e) => model_kind(e),
            AppError::Control(e) => control_kind(e),
            AppError::Simulation(e) => match e {
                SimError::InvalidArg { .. } => ErrorKind::InvalidInput,
                SimError::IntegrationFailure { .. } => ErrorKind::IntegrationFailure,
                SimError::Model(e) => model_kind(e),
                SimError::Control(e) => control_kind(e),
            },
            AppError::InvalidInput(_) => ErrorKind::InvalidInput,
            AppError::Io(_) => ErrorKind::Io,
        }
    }
}
