//! Simulation runner.

use crate::cancel::CancelToken;
use crate::error::{SimError, SimResult};
use crate::integrator::{ForwardEuler, Integrator, RK4};
use crate::model::TransientModel;
use crate::time::TimeGrid;
use crate::trajectory::SimRecord;
use tracing::{debug, warn};

/// Integrator selection for simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntegratorType {
    /// 4th-order Runge-Kutta (default, 4 rhs calls per step).
    #[default]
    RK4,
    /// Forward Euler (1st-order, 1 rhs call per step).
    ForwardEuler,
}

impl IntegratorType {
    /// Right-hand side evaluations per step.
    pub fn stages(&self) -> usize {
        match self {
            IntegratorType::RK4 => RK4.stages(),
            IntegratorType::ForwardEuler => ForwardEuler.stages(),
        }
    }
}

/// Options for simulation runs.
#[derive(Clone, Debug, PartialEq)]
pub struct SimOptions {
    pub grid: TimeGrid,
    /// Record every N-th step. The initial and final points are always kept.
    pub record_every: usize,
    pub integrator: IntegratorType,
}

impl SimOptions {
    /// One record per grid point, RK4.
    pub fn new(grid: TimeGrid) -> Self {
        Self {
            grid,
            record_every: 1,
            integrator: IntegratorType::default(),
        }
    }

    pub fn with_integrator(mut self, integrator: IntegratorType) -> Self {
        self.integrator = integrator;
        self
    }
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    /// Stopped by a [`CancelToken`]; the record holds every completed step.
    Cancelled,
}

/// Progress snapshot passed to the observer after each step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimProgress {
    pub step: usize,
    pub total_steps: usize,
    pub t: f64,
}

impl SimProgress {
    pub fn fraction(&self) -> f64 {
        self.step as f64 / self.total_steps as f64
    }
}

/// Result of a run: the recorded states and how the run ended.
#[derive(Clone, Debug, PartialEq)]
pub struct SimRun<S> {
    pub record: SimRecord<S>,
    pub status: RunStatus,
    /// Integration steps actually taken.
    pub steps_taken: usize,
}

impl<S> SimRun<S> {
    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

/// Largest number of points reserved before a run starts.
const MAX_RESERVED_POINTS: usize = 1 << 20;

fn reserved_points(total_steps: usize, record_every: usize) -> usize {
    (total_steps / record_every)
        .saturating_add(2)
        .min(MAX_RESERVED_POINTS)
}

/// Run a transient simulation over the whole grid.
pub fn run_sim<M: TransientModel>(model: &mut M, opts: &SimOptions) -> SimResult<SimRun<M::State>> {
    run_sim_with_control(model, opts, None, |_| {})
}

/// Run a transient simulation with optional cancellation and a progress observer.
pub fn run_sim_with_control<M, F>(
    model: &mut M,
    opts: &SimOptions,
    cancel: Option<&CancelToken>,
    mut on_progress: F,
) -> SimResult<SimRun<M::State>>
where
    M: TransientModel,
    F: FnMut(&SimProgress),
{
    if opts.record_every == 0 {
        return Err(SimError::InvalidArg {
            what: "record_every must be positive",
        });
    }

    let grid = &opts.grid;
    let dt = grid.dt();
    let total_steps = grid.steps();

    let mut x = model.initial_state();
    if !model.is_finite(&x) {
        return Err(SimError::IntegrationFailure {
            step: 0,
            time: grid.start(),
            what: "initial state is not finite".to_string(),
        });
    }

    let mut record = SimRecord::with_capacity(reserved_points(total_steps, opts.record_every));
    record.push(grid.start(), x.clone());

    debug!(
        steps = total_steps,
        dt,
        integrator = ?opts.integrator,
        rhs_per_step = opts.integrator.stages(),
        "starting simulation"
    );

    let mut status = RunStatus::Completed;
    let mut step = 0;
    while step < total_steps {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            warn!(step, t = grid.time(step), "simulation cancelled");
            status = RunStatus::Cancelled;
            break;
        }

        let t = grid.time(step);
        x = match opts.integrator {
            IntegratorType::RK4 => RK4.step(model, t, &x, dt)?,
            IntegratorType::ForwardEuler => ForwardEuler.step(model, t, &x, dt)?,
        };
        step += 1;
        let t_next = grid.time(step);

        if !model.is_finite(&x) {
            return Err(SimError::IntegrationFailure {
                step,
                time: t_next,
                what: "state became non-finite".to_string(),
            });
        }

        if step % opts.record_every == 0 || step == total_steps {
            record.push(t_next, x.clone());
        }

        on_progress(&SimProgress {
            step,
            total_steps,
            t: t_next,
        });
    }

    // A cancelled run still ends on the last completed state.
    if status == RunStatus::Cancelled && step % opts.record_every != 0 {
        record.push(grid.time(step), x);
    }

    debug!(steps_taken = step, status = ?status, "simulation finished");

    Ok(SimRun {
        record,
        status,
        steps_taken: step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// x' = 1 from x(0) = 0, so x(t) = t.
    struct Ramp {
        calls: usize,
    }

    impl TransientModel for Ramp {
        type State = f64;

        fn initial_state(&self) -> f64 {
            0.0
        }

        fn rhs(&mut self, _t: f64, _x: &f64) -> SimResult<f64> {
            self.calls += 1;
            Ok(1.0)
        }

        fn add(&self, a: &f64, b: &f64) -> f64 {
            a + b
        }

        fn scale(&self, a: &f64, scale: f64) -> f64 {
            a * scale
        }

        fn is_finite(&self, x: &f64) -> bool {
            x.is_finite()
        }
    }

    /// x' = x^2 from x(0) = 1 blows up at t = 1.
    struct Blowup;

    impl TransientModel for Blowup {
        type State = f64;

        fn initial_state(&self) -> f64 {
            1.0
        }

        fn rhs(&mut self, _t: f64, x: &f64) -> SimResult<f64> {
            Ok(x * x)
        }

        fn add(&self, a: &f64, b: &f64) -> f64 {
            a + b
        }

        fn scale(&self, a: &f64, scale: f64) -> f64 {
            a * scale
        }

        fn is_finite(&self, x: &f64) -> bool {
            x.is_finite()
        }
    }

    fn grid(steps: usize) -> TimeGrid {
        TimeGrid::new(0.0, 1.0, steps).unwrap()
    }

    #[test]
    fn records_every_grid_point() {
        let mut m = Ramp { calls: 0 };
        let run = run_sim(&mut m, &SimOptions::new(grid(10))).unwrap();
        assert!(run.is_complete());
        assert_eq!(run.record.len(), 11);
        assert_eq!(run.steps_taken, 10);
        assert_eq!(m.calls, 10 * IntegratorType::RK4.stages());
        for (t, x) in run.record.iter() {
            assert!((t - x).abs() < 1e-12);
        }
    }

    #[test]
    fn euler_uses_one_call_per_step() {
        let mut m = Ramp { calls: 0 };
        let opts = SimOptions::new(grid(10)).with_integrator(IntegratorType::ForwardEuler);
        run_sim(&mut m, &opts).unwrap();
        assert_eq!(m.calls, 10);
    }

    #[test]
    fn decimation_keeps_final_point() {
        let mut m = Ramp { calls: 0 };
        let opts = SimOptions {
            record_every: 3,
            ..SimOptions::new(grid(10))
        };
        let run = run_sim(&mut m, &opts).unwrap();
        let g = grid(10);
        let expected: Vec<f64> = [0, 3, 6, 9, 10].iter().map(|&i| g.time(i)).collect();
        assert_eq!(run.record.t, expected);
        assert_eq!(run.record.t.last().copied(), Some(1.0));
    }

    #[test]
    fn zero_record_every_rejected() {
        let mut m = Ramp { calls: 0 };
        let opts = SimOptions {
            record_every: 0,
            ..SimOptions::new(grid(10))
        };
        assert!(matches!(
            run_sim(&mut m, &opts),
            Err(SimError::InvalidArg { .. })
        ));
    }

    #[test]
    fn divergence_reports_step() {
        let opts = SimOptions::new(TimeGrid::new(0.0, 5.0, 50).unwrap())
            .with_integrator(IntegratorType::ForwardEuler);
        match run_sim(&mut Blowup, &opts) {
            Err(SimError::IntegrationFailure { step, time, .. }) => {
                assert!(step > 10 && step < 50, "step {step}");
                assert!(time > 0.0);
            }
            other => panic!("expected IntegrationFailure, got {other:?}"),
        }
    }

    #[test]
    fn cancelled_before_start_keeps_initial_point() {
        let token = CancelToken::new();
        token.cancel();
        let mut m = Ramp { calls: 0 };
        let run = run_sim_with_control(&mut m, &SimOptions::new(grid(10)), Some(&token), |_| {})
            .unwrap();
        assert_eq!(run.status, RunStatus::Cancelled);
        assert_eq!(run.record.len(), 1);
        assert_eq!(m.calls, 0);
    }

    #[test]
    fn huge_grid_does_not_reserve_everything_up_front() {
        assert_eq!(reserved_points(10, 1), 12);
        assert_eq!(reserved_points(10, 3), 5);
        assert_eq!(reserved_points(usize::MAX, 1), MAX_RESERVED_POINTS);

        let token = CancelToken::new();
        token.cancel();
        let opts = SimOptions::new(TimeGrid::new(0.0, 1.0, usize::MAX).unwrap());
        let run = run_sim_with_control(&mut Ramp { calls: 0 }, &opts, Some(&token), |_| {}).unwrap();
        assert_eq!(run.status, RunStatus::Cancelled);
        assert_eq!(run.record.len(), 1);
    }

    #[test]
    fn cancel_from_progress_observer() {
        let token = CancelToken::new();
        let observer = token.clone();
        let mut m = Ramp { calls: 0 };
        let run = run_sim_with_control(&mut m, &SimOptions::new(grid(10)), Some(&token), |p| {
            if p.step == 4 {
                observer.cancel();
            }
        })
        .unwrap();
        assert_eq!(run.status, RunStatus::Cancelled);
        assert_eq!(run.steps_taken, 4);
        assert_eq!(run.record.len(), 5);
        let (t, x) = run.record.last().unwrap();
        assert!((t - 0.4).abs() < 1e-12);
        assert!((x - 0.4).abs() < 1e-12);
    }
}
