//! Closed-form nonlinear right-hand side.
//!
//! ```text
//! x_ddot     = (14 F - 3 g m sin(2 theta)) / (14 M - 3 m cos(2 theta) + 11 m)
//! theta_ddot = 6 (F cos(theta) - (M + m) g sin(theta)) / (l (3 m cos^2(theta) - 7 M - 7 m))
//! ```
//!
//! These are the exact-form solution of [`crate::derivation::CoupledSystem`]
//! written out once; tests check the two agree at arbitrary angles.

use crate::derivation::Accelerations;
use crate::error::{ModelError, ModelResult};
use crate::params::PlantParameters;
use crate::state::State;
use cp_core::ensure_finite;

/// Relative threshold for treating a denominator as zero.
const SINGULARITY_REL_TOL: f64 = 1e-9;

/// Anything that maps `(state, force)` to a state derivative.
pub trait Plant {
    fn derivative(&self, state: &State, force: f64) -> ModelResult<State>;
}

/// Denominators of the cart and angular acceleration expressions at `theta`.
///
/// Returns `(14M - 3m cos(2 theta) + 11m, l (3m cos^2(theta) - 7M - 7m))`.
pub fn denominators(params: &PlantParameters, theta: f64) -> (f64, f64) {
    let big_m = params.cart_mass();
    let m = params.pendulum_mass();
    let l = params.pendulum_length();
    let cos_t = theta.cos();

    let den_x = 14.0 * big_m - 3.0 * m * (2.0 * theta).cos() + 11.0 * m;
    let den_theta = l * (3.0 * m * cos_t * cos_t - 7.0 * big_m - 7.0 * m);
    (den_x, den_theta)
}

/// Cart and angular accelerations at any angle.
pub fn accelerations(
    params: &PlantParameters,
    state: &State,
    force: f64,
) -> ModelResult<Accelerations> {
    let theta = finite_input(state.theta, "pendulum angle")?;
    let force = finite_input(force, "cart force")?;

    let big_m = params.cart_mass();
    let m = params.pendulum_mass();
    let l = params.pendulum_length();
    let g = params.gravity();

    let (den_x, den_theta) = denominators(params, theta);
    check_denominator(den_x, 14.0 * (big_m + m), "cart acceleration")?;
    check_denominator(den_theta, 7.0 * l * (big_m + m), "angular acceleration")?;

    let (sin_t, cos_t) = theta.sin_cos();
    let x_ddot = (14.0 * force - 3.0 * g * m * (2.0 * theta).sin()) / den_x;
    let theta_ddot = 6.0 * (force * cos_t - (big_m + m) * g * sin_t) / den_theta;

    Ok(Accelerations { x_ddot, theta_ddot })
}

/// Full state derivative `(x_dot, x_ddot, theta_dot, theta_ddot)`.
pub fn state_derivative(
    params: &PlantParameters,
    state: &State,
    force: f64,
) -> ModelResult<State> {
    let acc = accelerations(params, state, force)?;
    finite_input(state.x_dot, "cart velocity")?;
    finite_input(state.theta_dot, "angular velocity")?;
    Ok(State::new(
        state.x_dot,
        acc.x_ddot,
        state.theta_dot,
        acc.theta_ddot,
    ))
}

fn finite_input(v: f64, what: &'static str) -> ModelResult<f64> {
    ensure_finite(v, what).map_err(|_| ModelError::NumericalSingularity { what, value: v })
}

fn check_denominator(den: f64, scale: f64, what: &'static str) -> ModelResult<()> {
    if !den.is_finite() || den.abs() <= SINGULARITY_REL_TOL * scale {
        return Err(ModelError::NumericalSingularity {
            what,
            value: den,
        });
    }
    Ok(())
}

/// The nonlinear plant, borrowing shared parameters.
#[derive(Debug, Clone, Copy)]
pub struct NonlinearPlant<'a> {
    params: &'a PlantParameters,
}

impl<'a> NonlinearPlant<'a> {
    pub fn new(params: &'a PlantParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &'a PlantParameters {
        self.params
    }
}

impl Plant for NonlinearPlant<'_> {
    fn derivative(&self, state: &State, force: f64) -> ModelResult<State> {
        state_derivative(self.params, state, force)
    }
}
