//! Parameter-space properties of the plant model.

use cp_model::{
    Linearization, LinearModel, NonlinearPlant, Plant, PlantParameters, State, denominators,
    derive, state_derivative,
};
use proptest::prelude::*;
use std::f64::consts::PI;

fn relative_gap(nl: &State, lin: &State) -> f64 {
    let diff = (*nl - *lin).max_abs();
    diff / lin.max_abs().max(1e-300)
}

#[test]
fn nonlinear_converges_to_linear_near_upright() {
    let params = PlantParameters::benchmark();
    let lin = LinearModel::from_params(&params).unwrap();
    let plant = NonlinearPlant::new(&params);

    let mut previous = f64::INFINITY;
    for &scale in &[1e-1, 1e-2, 1e-3, 1e-4] {
        let state = State::new(0.0, 0.0, scale, 0.5 * scale);
        let nl = plant.derivative(&state, 0.0).unwrap();
        let li = lin.derivative(&state, 0.0).unwrap();
        let gap = relative_gap(&nl, &li);
        assert!(gap < previous, "gap did not shrink at scale {scale}: {gap}");
        previous = gap;
    }
    assert!(previous < 1e-6, "final gap too large: {previous}");
}

#[test]
fn nonlinear_matches_linear_force_response_at_upright() {
    let params = PlantParameters::new(0.7, 0.25, 1.2, 9.81).unwrap();
    let lin = LinearModel::from_params(&params).unwrap();
    let nl = state_derivative(&params, &State::upright(), 2.0).unwrap();
    let li = lin.derivative_of(&State::upright(), 2.0);
    assert!((nl - li).max_abs() < 1e-12);
}

#[test]
fn linear_model_is_consistent_with_small_angle_derivation() {
    let params = PlantParameters::benchmark();
    let lin = LinearModel::from_params(&params).unwrap();
    let theta = 0.03;
    let force = -1.5;
    let acc = derive(&params, theta, force, Linearization::SmallAngle).unwrap();
    let d = lin.derivative_of(&State::new(0.0, 0.0, theta, 0.0), force);
    assert!((d.x_dot - acc.x_ddot).abs() < 1e-12);
    assert!((d.theta_dot - acc.theta_ddot).abs() < 1e-12);
}

proptest! {
    #[test]
    fn denominators_bounded_away_from_zero(
        big_m in 0.01_f64..50.0,
        m in 0.01_f64..50.0,
        l in 0.01_f64..10.0,
        theta in -PI..PI,
    ) {
        let params = PlantParameters::new(big_m, m, l, 9.81).unwrap();
        let (den_x, den_theta) = denominators(&params, theta);
        let tol = 1.0 - 1e-12;
        prop_assert!(den_x >= (14.0 * big_m + 8.0 * m) * tol);
        prop_assert!(-den_theta >= l * (7.0 * big_m + 4.0 * m) * tol);
    }

    #[test]
    fn every_valid_plant_has_one_unstable_mode(
        big_m in 0.05_f64..20.0,
        m in 0.01_f64..5.0,
        l in 0.05_f64..5.0,
        g in 1.0_f64..25.0,
    ) {
        let params = PlantParameters::new(big_m, m, l, g).unwrap();
        let lin = LinearModel::from_params(&params).unwrap();
        prop_assert_eq!(lin.unstable_mode_count(), 1);
        prop_assert!(lin.is_controllable());
    }

    #[test]
    fn closed_form_agrees_with_derivation(
        theta in -PI..PI,
        force in -20.0_f64..20.0,
    ) {
        let params = PlantParameters::benchmark();
        let d = state_derivative(&params, &State::tilted(theta), force).unwrap();
        let acc = derive(&params, theta, force, Linearization::Exact).unwrap();
        prop_assert!((d.x_dot - acc.x_ddot).abs() < 1e-9);
        prop_assert!((d.theta_dot - acc.theta_ddot).abs() < 1e-9);
    }
}
