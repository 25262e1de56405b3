//! Shared application service layer for the cartpole workspace.
//!
//! Centralizes scenario handling and the linearize, synthesize and simulate
//! pipeline so the CLI stays a thin shell.

pub mod compile;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod project_service;
pub mod query;

pub use compile::{PipelineInputs, compile_scenario};
pub use error::{AppError, AppResult, ErrorKind};
pub use pipeline::{
    GainReport, GainSummary, PipelineRequest, PipelineResponse, SweepOutcome, SweepResponse,
    gain_for_scenario, run_pipeline, run_pipeline_with_progress, run_sweep, synthesize_gain,
};
pub use progress::{PipelineProgressEvent, PipelineStage, SimulationProgress};
pub use project_service::{load_scenario, save_scenario, validate_scenario};
pub use query::{TrajectorySummary, summarize, trajectory_to_csv};
