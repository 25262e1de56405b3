//! Progress events emitted while a pipeline runs.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Linearizing,
    Synthesizing,
    Simulating,
    Completed,
    Cancelled,
}

impl PipelineStage {
    pub fn label(&self) -> &'static str {
        match self {
            PipelineStage::Linearizing => "Linearizing",
            PipelineStage::Synthesizing => "Synthesizing LQR gain",
            PipelineStage::Simulating => "Simulating",
            PipelineStage::Completed => "Completed",
            PipelineStage::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationProgress {
    pub sim_time_s: f64,
    pub t_end_s: f64,
    pub fraction_complete: f64,
    pub step: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineProgressEvent {
    pub stage: PipelineStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub simulation: Option<SimulationProgress>,
}

impl PipelineProgressEvent {
    pub fn stage(stage: PipelineStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
            simulation: None,
        }
    }
}
