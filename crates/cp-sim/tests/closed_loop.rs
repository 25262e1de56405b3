//! Closed-loop behavior of the nonlinear cart-pendulum under LQR feedback.

use cp_controls::{CostWeights, LqrConfig, StateFeedback, synthesize};
use cp_model::{LinearModel, ModelError, NonlinearPlant, PlantParameters, State};
use cp_sim::{
    CancelToken, Channel, ClosedLoopModel, IntegratorType, RunStatus, SimError, SimOptions,
    TimeGrid, run_batch, run_sim_with_control, simulate_closed_loop, simulate_open_loop,
};
use proptest::prelude::*;

fn benchmark_feedback(params: &PlantParameters, reference: State) -> StateFeedback {
    let model = LinearModel::from_params(params).unwrap();
    let sol = synthesize(&model, &CostWeights::benchmark(), &LqrConfig::default()).unwrap();
    StateFeedback::new(sol.gain, reference)
}

fn ten_seconds() -> SimOptions {
    SimOptions::new(TimeGrid::new(0.0, 10.0, 1000).unwrap())
}

#[test]
fn benchmark_tilt_is_recovered() {
    let params = PlantParameters::benchmark();
    let fb = benchmark_feedback(&params, State::upright());
    let run = simulate_closed_loop(&params, &fb, State::tilted(0.1), &ten_seconds(), None).unwrap();

    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.record.len(), 1001);
    assert_eq!(run.record.t[0], 0.0);
    assert_eq!(run.record.t[1000], 10.0);

    let last = run.record.final_state().unwrap();
    assert!(last.theta.abs() < 0.01, "theta = {}", last.theta);
    assert!(last.x.abs() < 0.05, "x = {}", last.x);
    assert!(last.max_abs() < 0.01);
}

#[test]
fn euler_agrees_with_rk4_on_fine_grid() {
    let params = PlantParameters::benchmark();
    let fb = benchmark_feedback(&params, State::upright());
    let grid = TimeGrid::new(0.0, 2.0, 2000).unwrap();
    let rk4 = simulate_closed_loop(&params, &fb, State::tilted(0.1), &SimOptions::new(grid), None)
        .unwrap();
    let euler_opts = SimOptions::new(grid).with_integrator(IntegratorType::ForwardEuler);
    let euler = simulate_closed_loop(&params, &fb, State::tilted(0.1), &euler_opts, None).unwrap();

    let a = rk4.record.channel(Channel::Theta);
    let b = euler.record.channel(Channel::Theta);
    let max_diff = a.iter().zip(&b).map(|(x, y)| (x - y).abs()).fold(0.0_f64, f64::max);
    assert!(max_diff < 5e-3, "max diff {max_diff}");
}

#[test]
fn starting_at_reference_stays_there() {
    let params = PlantParameters::benchmark();
    let reference = State::new(0.4, 0.0, 0.0, 0.0);
    let fb = benchmark_feedback(&params, reference);
    assert_eq!(fb.force(&reference), 0.0);

    let run = simulate_closed_loop(&params, &fb, reference, &ten_seconds(), None).unwrap();
    for (_, s) in run.record.iter() {
        assert_eq!(*s, reference);
    }
}

#[test]
fn cart_moves_to_offset_reference() {
    let params = PlantParameters::benchmark();
    let reference = State::new(0.5, 0.0, 0.0, 0.0);
    let fb = benchmark_feedback(&params, reference);
    let run = simulate_closed_loop(&params, &fb, State::upright(), &ten_seconds(), None).unwrap();
    let last = run.record.final_state().unwrap();
    assert!((last.x - 0.5).abs() < 0.01, "x = {}", last.x);
    assert!(last.theta.abs() < 0.01);
}

#[test]
fn unforced_pendulum_falls() {
    let params = PlantParameters::benchmark();
    let opts = SimOptions::new(TimeGrid::new(0.0, 1.0, 100).unwrap());
    let run = simulate_open_loop(&params, 0.0, State::tilted(0.1), &opts).unwrap();
    let theta = run.record.channel(Channel::Theta);
    let first_past = theta.iter().position(|t| t.abs() > 0.2);
    assert!(first_past.is_some(), "peak {}", run.record.peak_angle());
    // It leans further the way it started.
    assert!(theta[first_past.unwrap()] > 0.0);
}

#[test]
fn overflowing_force_is_an_integration_failure() {
    let params = PlantParameters::benchmark();
    let grid = TimeGrid::new(0.0, 1.0, 10).unwrap();
    let opts = SimOptions::new(grid).with_integrator(IntegratorType::ForwardEuler);
    let err = simulate_open_loop(&params, 1e308, State::tilted(0.1), &opts).unwrap_err();
    match err {
        SimError::IntegrationFailure { step, time, .. } => {
            assert_eq!(step, 1);
            assert!((time - 0.1).abs() < 1e-12, "time {time}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn coarse_closed_loop_grid_fails_instead_of_returning_garbage() {
    let params = PlantParameters::benchmark();
    let fb = benchmark_feedback(&params, State::upright());
    let opts = SimOptions::new(TimeGrid::new(0.0, 2500.0, 5000).unwrap());
    let err = simulate_closed_loop(&params, &fb, State::tilted(0.1), &opts, None).unwrap_err();
    // Overflow shows up either after a step or inside an RK4 stage.
    match err {
        SimError::IntegrationFailure { step, time, .. } => {
            assert!(step > 1 && step < 5000, "step {step}");
            assert!((time - step as f64 * 0.5).abs() < 1e-9, "time {time}");
        }
        SimError::Model(ModelError::NumericalSingularity { .. }) => {}
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn starved_actuator_cannot_hold_the_pendulum() {
    let params = PlantParameters::benchmark();
    let fb = benchmark_feedback(&params, State::upright())
        .with_force_limit(1e-3)
        .unwrap();
    let opts = SimOptions::new(TimeGrid::new(0.0, 2.0, 200).unwrap());
    let run = simulate_closed_loop(&params, &fb, State::tilted(0.1), &opts, None).unwrap();
    assert!(run.record.peak_angle() > 0.5);
}

#[test]
fn cancelled_run_is_a_prefix_of_full_run() {
    let params = PlantParameters::benchmark();
    let fb = benchmark_feedback(&params, State::upright());
    let opts = ten_seconds();
    let full = simulate_closed_loop(&params, &fb, State::tilted(0.1), &opts, None).unwrap();

    let token = CancelToken::new();
    let trigger = token.clone();
    let mut model = ClosedLoopModel::new(NonlinearPlant::new(&params), fb, State::tilted(0.1));
    let partial = run_sim_with_control(&mut model, &opts, Some(&token), |p| {
        if p.step == 250 {
            trigger.cancel();
        }
    })
    .unwrap();

    assert_eq!(partial.status, RunStatus::Cancelled);
    assert_eq!(partial.steps_taken, 250);
    assert_eq!(partial.record.len(), 251);
    assert_eq!(model.evaluations(), 250 * 4);
    assert_eq!(partial.record.t[..], full.record.t[..251]);
    assert_eq!(partial.record.x[..], full.record.x[..251]);
}

#[test]
fn batch_matches_sequential_runs_in_order() {
    let params = PlantParameters::benchmark();
    let fb = benchmark_feedback(&params, State::upright());
    let opts = SimOptions::new(TimeGrid::new(0.0, 3.0, 300).unwrap());
    let initials: Vec<State> = (-4..=4).map(|i| State::tilted(0.05 * i as f64)).collect();

    let batch = run_batch(&params, &fb, &initials, &opts, None);
    assert_eq!(batch.len(), initials.len());
    for (initial, result) in initials.iter().zip(&batch) {
        let seq = simulate_closed_loop(&params, &fb, *initial, &opts, None).unwrap();
        let par = result.as_ref().unwrap();
        assert_eq!(par.record.x[0], *initial);
        assert_eq!(par, &seq);
    }
}

#[test]
fn pre_cancelled_batch_returns_initial_points() {
    let params = PlantParameters::benchmark();
    let fb = benchmark_feedback(&params, State::upright());
    let token = CancelToken::new();
    token.cancel();
    let initials = [State::tilted(0.1), State::tilted(-0.1)];
    let batch = run_batch(&params, &fb, &initials, &ten_seconds(), Some(&token));
    for (initial, result) in initials.iter().zip(batch) {
        let run = result.unwrap();
        assert_eq!(run.status, RunStatus::Cancelled);
        assert_eq!(run.record.x, vec![*initial]);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn small_tilts_are_recovered(theta0 in -0.15f64..0.15, omega0 in -0.2f64..0.2) {
        let params = PlantParameters::benchmark();
        let fb = benchmark_feedback(&params, State::upright());
        let initial = State::new(0.0, 0.0, theta0, omega0);
        let run = simulate_closed_loop(&params, &fb, initial, &ten_seconds(), None).unwrap();
        let last = run.record.final_state().unwrap();
        prop_assert!(last.theta.abs() < 0.01);
        prop_assert!(last.x.abs() < 0.05);
    }
}
