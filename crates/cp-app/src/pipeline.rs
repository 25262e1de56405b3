//! The linearize, synthesize and simulate pipeline.

use cp_controls::{CostWeights, LqrConfig, LqrSolution, StateFeedback, synthesize};
use cp_core::timing::{PhaseTimings, Timer};
use cp_model::{LinearModel, NonlinearPlant, PlantParameters, State};
use cp_project::Scenario;
use cp_sim::{
    CancelToken, ClosedLoopModel, RunStatus, SimRun, Trajectory, run_batch, run_sim_with_control,
};
use nalgebra::Complex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::compile::{PipelineInputs, compile_scenario};
use crate::error::{AppError, AppResult};
use crate::progress::{PipelineProgressEvent, PipelineStage, SimulationProgress};
use crate::query::{TrajectorySummary, summarize};

/// Request to run one scenario through the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineRequest<'a> {
    pub scenario: &'a Scenario,
    pub lqr: LqrConfig,
    pub cancel: Option<CancelToken>,
}

impl<'a> PipelineRequest<'a> {
    pub fn new(scenario: &'a Scenario) -> Self {
        Self {
            scenario,
            lqr: LqrConfig::default(),
            cancel: None,
        }
    }
}

/// Linear model and synthesized gain for one plant.
#[derive(Debug, Clone)]
pub struct GainReport {
    pub params: PlantParameters,
    pub linear: LinearModel,
    pub solution: LqrSolution,
}

impl GainReport {
    pub fn summary(&self) -> GainSummary {
        GainSummary {
            k: self.solution.gain.to_array(),
            open_loop_poles: pole_pairs(&self.linear.open_loop_poles()),
            closed_loop_poles: pole_pairs(&self.solution.closed_loop_poles),
            spectral_abscissa: self.solution.spectral_abscissa(),
            iterations: self.solution.iterations,
            residual_norm: self.solution.residual_norm,
        }
    }
}

fn pole_pairs(poles: &[Complex<f64>]) -> Vec<[f64; 2]> {
    poles.iter().map(|c| [c.re, c.im]).collect()
}

/// Serializable view of a [`GainReport`]; poles are `[re, im]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GainSummary {
    pub k: [f64; 4],
    pub open_loop_poles: Vec<[f64; 2]>,
    pub closed_loop_poles: Vec<[f64; 2]>,
    pub spectral_abscissa: f64,
    pub iterations: usize,
    pub residual_norm: f64,
}

/// Result of a full pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResponse {
    pub gain: GainReport,
    pub trajectory: Trajectory,
    pub status: RunStatus,
    pub summary: Option<TrajectorySummary>,
    pub timing: PhaseTimings,
}

fn emit(
    progress_cb: &mut Option<&mut dyn FnMut(PipelineProgressEvent)>,
    event: PipelineProgressEvent,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(event);
    }
}

fn linearize_phase(params: &PlantParameters, timing: &mut PhaseTimings) -> AppResult<LinearModel> {
    let timer = Timer::start("linearize");
    let linear = LinearModel::from_params(params)?;
    debug!(phase = timer.label(), a = ?linear.a, b = ?linear.b, "linearized at upright");
    timing.linearize_s = timer.stop();
    Ok(linear)
}

fn synthesize_phase(
    params: &PlantParameters,
    linear: LinearModel,
    weights: &CostWeights,
    lqr: &LqrConfig,
    timing: &mut PhaseTimings,
) -> AppResult<GainReport> {
    let timer = Timer::start("synthesize");
    let solution = synthesize(&linear, weights, lqr)?;
    timing.synthesize_s = timer.stop();

    Ok(GainReport {
        params: *params,
        linear,
        solution,
    })
}

/// Linearize at upright and synthesize the LQR gain, recording phase times.
pub fn synthesize_gain(
    params: &PlantParameters,
    weights: &CostWeights,
    lqr: &LqrConfig,
    timing: &mut PhaseTimings,
) -> AppResult<GainReport> {
    let linear = linearize_phase(params, timing)?;
    synthesize_phase(params, linear, weights, lqr, timing)
}

/// Gain synthesis only, straight from a scenario.
pub fn gain_for_scenario(scenario: &Scenario, lqr: &LqrConfig) -> AppResult<GainReport> {
    let inputs = compile_scenario(scenario)?;
    synthesize_gain(
        &inputs.params,
        &inputs.weights,
        lqr,
        &mut PhaseTimings::default(),
    )
}

fn feedback_for(inputs: &PipelineInputs, gain: &GainReport) -> AppResult<StateFeedback> {
    let feedback = StateFeedback::new(gain.solution.gain, inputs.reference);
    Ok(match inputs.force_limit {
        Some(limit) => feedback.with_force_limit(limit)?,
        None => feedback,
    })
}

/// Run the whole pipeline on a scenario.
pub fn run_pipeline(scenario: &Scenario) -> AppResult<PipelineResponse> {
    run_pipeline_with_progress(&PipelineRequest::new(scenario), None)
}

/// Run the whole pipeline and stream progress events.
pub fn run_pipeline_with_progress(
    request: &PipelineRequest,
    mut progress_cb: Option<&mut dyn FnMut(PipelineProgressEvent)>,
) -> AppResult<PipelineResponse> {
    let started = Timer::start("pipeline");
    let inputs = compile_scenario(request.scenario)?;
    let mut timing = PhaseTimings::default();

    info!(scenario = %request.scenario.name, "running pipeline");

    emit(
        &mut progress_cb,
        PipelineProgressEvent::stage(
            PipelineStage::Linearizing,
            started.elapsed_s(),
            Some("Linearizing at upright".to_string()),
        ),
    );
    let linear = linearize_phase(&inputs.params, &mut timing)?;

    emit(
        &mut progress_cb,
        PipelineProgressEvent::stage(
            PipelineStage::Synthesizing,
            started.elapsed_s(),
            Some(format!(
                "{} unstable open-loop mode(s)",
                linear.unstable_mode_count()
            )),
        ),
    );
    let gain = synthesize_phase(
        &inputs.params,
        linear,
        &inputs.weights,
        &request.lqr,
        &mut timing,
    )?;
    let feedback = feedback_for(&inputs, &gain)?;

    emit(
        &mut progress_cb,
        PipelineProgressEvent::stage(PipelineStage::Simulating, started.elapsed_s(), None),
    );
    let timer = Timer::start("simulate");
    let t_end_s = inputs.sim.grid.end();
    let mut model = ClosedLoopModel::new(NonlinearPlant::new(&inputs.params), feedback, inputs.initial);
    let run: SimRun<State> = run_sim_with_control(
        &mut model,
        &inputs.sim,
        request.cancel.as_ref(),
        |p| {
            emit(
                &mut progress_cb,
                PipelineProgressEvent {
                    stage: PipelineStage::Simulating,
                    elapsed_wall_s: started.elapsed_s(),
                    message: None,
                    simulation: Some(SimulationProgress {
                        sim_time_s: p.t,
                        t_end_s,
                        fraction_complete: p.fraction(),
                        step: p.step,
                    }),
                },
            );
        },
    )?;
    timing.simulate_s = timer.stop();

    let final_stage = match run.status {
        RunStatus::Completed => PipelineStage::Completed,
        RunStatus::Cancelled => {
            warn!(steps = run.steps_taken, "pipeline cancelled during simulation");
            PipelineStage::Cancelled
        }
    };
    emit(
        &mut progress_cb,
        PipelineProgressEvent::stage(final_stage, started.elapsed_s(), None),
    );

    let summary = summarize(&run.record);
    info!(
        status = ?run.status,
        points = run.record.len(),
        rhs_calls = model.evaluations(),
        linearize_s = timing.linearize_s,
        synthesize_s = timing.synthesize_s,
        simulate_s = timing.simulate_s,
        "pipeline finished"
    );

    Ok(PipelineResponse {
        gain,
        trajectory: run.record,
        status: run.status,
        summary,
        timing,
    })
}

/// Outcome of one member of a sweep.
#[derive(Debug)]
pub struct SweepOutcome {
    pub initial_theta_rad: f64,
    pub status: Option<RunStatus>,
    pub result: AppResult<TrajectorySummary>,
}

#[derive(Debug)]
pub struct SweepResponse {
    pub gain: GainReport,
    pub outcomes: Vec<SweepOutcome>,
    pub timing: PhaseTimings,
}

/// Simulate every initial tilt of the scenario's sweep under one gain.
///
/// The scenario's initial state supplies the other three components.
pub fn run_sweep(
    scenario: &Scenario,
    lqr: &LqrConfig,
    cancel: Option<&CancelToken>,
) -> AppResult<SweepResponse> {
    let sweep = scenario
        .sweep
        .as_ref()
        .ok_or_else(|| AppError::InvalidInput("scenario has no sweep section".to_string()))?;
    let inputs = compile_scenario(scenario)?;
    let mut timing = PhaseTimings::default();
    let gain = synthesize_gain(&inputs.params, &inputs.weights, lqr, &mut timing)?;
    let feedback = feedback_for(&inputs, &gain)?;

    let angles = sweep.angles();
    let initials: Vec<State> = angles
        .iter()
        .map(|&theta| State {
            theta,
            ..inputs.initial
        })
        .collect();

    let timer = Timer::start("simulate");
    let results = run_batch(&inputs.params, &feedback, &initials, &inputs.sim, cancel);
    timing.simulate_s = timer.stop();

    let outcomes = angles
        .into_iter()
        .zip(results)
        .map(|(initial_theta_rad, result)| match result {
            Ok(run) => SweepOutcome {
                initial_theta_rad,
                status: Some(run.status),
                result: summarize(&run.record).ok_or_else(|| {
                    AppError::InvalidInput("simulation produced no points".to_string())
                }),
            },
            Err(e) => SweepOutcome {
                initial_theta_rad,
                status: None,
                result: Err(e.into()),
            },
        })
        .collect();

    Ok(SweepResponse {
        gain,
        outcomes,
        timing,
    })
}
