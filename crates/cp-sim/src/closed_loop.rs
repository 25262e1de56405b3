//! Cart-pendulum models driven by a force law.

use crate::cancel::CancelToken;
use crate::error::SimResult;
use crate::model::TransientModel;
use crate::sim::{SimOptions, SimRun, run_sim_with_control};
use cp_controls::StateFeedback;
use cp_model::{NonlinearPlant, Plant, PlantParameters, State};

/// Source of the cart force at each right-hand-side evaluation.
pub trait ForceLaw {
    fn force(&self, t: f64, state: &State) -> f64;
}

impl ForceLaw for StateFeedback {
    fn force(&self, _t: f64, state: &State) -> f64 {
        StateFeedback::force(self, state)
    }
}

/// Fixed force, including zero for the unforced plant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConstantForce(pub f64);

impl ForceLaw for ConstantForce {
    fn force(&self, _t: f64, _state: &State) -> f64 {
        self.0
    }
}

/// Plant plus force law as a transient model.
///
/// The force is recomputed from the stage state at every evaluation, so each
/// RK4 stage sees the control action for its own state.
#[derive(Debug, Clone)]
pub struct ClosedLoopModel<P, L> {
    plant: P,
    law: L,
    initial: State,
    evaluations: usize,
}

impl<P: Plant, L: ForceLaw> ClosedLoopModel<P, L> {
    pub fn new(plant: P, law: L, initial: State) -> Self {
        Self {
            plant,
            law,
            initial,
            evaluations: 0,
        }
    }

    /// Right-hand-side evaluations so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }
}

impl<P: Plant, L: ForceLaw> TransientModel for ClosedLoopModel<P, L> {
    type State = State;

    fn initial_state(&self) -> State {
        self.initial
    }

    fn rhs(&mut self, t: f64, x: &State) -> SimResult<State> {
        self.evaluations += 1;
        let force = self.law.force(t, x);
        Ok(self.plant.derivative(x, force)?)
    }

    fn add(&self, a: &State, b: &State) -> State {
        *a + *b
    }

    fn scale(&self, a: &State, scale: f64) -> State {
        *a * scale
    }

    fn is_finite(&self, x: &State) -> bool {
        x.is_finite()
    }
}

/// Simulate the nonlinear plant under state feedback.
pub fn simulate_closed_loop(
    params: &PlantParameters,
    feedback: &StateFeedback,
    initial: State,
    opts: &SimOptions,
    cancel: Option<&CancelToken>,
) -> SimResult<SimRun<State>> {
    let mut model = ClosedLoopModel::new(NonlinearPlant::new(params), *feedback, initial);
    run_sim_with_control(&mut model, opts, cancel, |_| {})
}

/// Simulate the nonlinear plant under a constant force.
pub fn simulate_open_loop(
    params: &PlantParameters,
    force: f64,
    initial: State,
    opts: &SimOptions,
) -> SimResult<SimRun<State>> {
    let mut model = ClosedLoopModel::new(NonlinearPlant::new(params), ConstantForce(force), initial);
    run_sim_with_control(&mut model, opts, None, |_| {})
}
