//! Equations of motion for a cart carrying a uniform-rod pendulum.
//!
//! The plant couples cart translation and rod rotation through
//!
//! ```text
//! (M + m)        * x_ddot + (m l / 2) cos(theta) * theta_ddot = F
//! (m l / 2) cos(theta) * x_ddot + (7/12) m l^2   * theta_ddot = (m g l / 2) sin(theta)
//! ```
//!
//! which is a 2x2 linear system in the accelerations at any fixed
//! `(theta, F)`. Solving it by Cramer's rule gives explicit accelerations as
//! rational functions of `sin(theta)` and `cos(theta)`; the small-angle form
//! replaces `sin(theta)` with `theta` and `cos(theta)` with `1` before solving.
//!
//! The closed-form result is hard-coded in [`crate::dynamics`]. This module is
//! the design-time derivation it must agree with, and the source of the
//! linear model coefficients.

use crate::error::{ModelError, ModelResult};
use crate::params::PlantParameters;
use nalgebra::{Matrix2, Vector2};

/// Rotational inertia coefficient of the rod term, `(7/12) m l^2`.
pub const ROD_INERTIA_FACTOR: f64 = 7.0 / 12.0;

/// Relative threshold below which the mass-matrix determinant counts as zero.
const DEGENERATE_REL_TOL: f64 = 1e-12;

/// Which trigonometric treatment the equations use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Linearization {
    /// Full `sin`/`cos` terms, valid at any angle.
    #[default]
    Exact,
    /// `sin(theta) -> theta`, `cos(theta) -> 1`.
    SmallAngle,
}

/// Cart and angular accelerations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accelerations {
    pub x_ddot: f64,
    pub theta_ddot: f64,
}

/// The coupled system `mass * [x_ddot, theta_ddot]^T = forcing`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoupledSystem {
    pub mass: Matrix2<f64>,
    pub forcing: Vector2<f64>,
}

impl CoupledSystem {
    /// Assemble the coupled relations at a given angle and cart force.
    pub fn assemble(
        params: &PlantParameters,
        theta: f64,
        force: f64,
        form: Linearization,
    ) -> Self {
        let (sin_t, cos_t) = match form {
            Linearization::Exact => theta.sin_cos(),
            Linearization::SmallAngle => (theta, 1.0),
        };

        let big_m = params.cart_mass();
        let m = params.pendulum_mass();
        let l = params.pendulum_length();
        let g = params.gravity();

        let coupling = 0.5 * m * l * cos_t;
        let mass = Matrix2::new(
            big_m + m,
            coupling,
            coupling,
            ROD_INERTIA_FACTOR * m * l * l,
        );
        let forcing = Vector2::new(force, 0.5 * m * g * l * sin_t);

        Self { mass, forcing }
    }

    pub fn determinant(&self) -> f64 {
        self.mass[(0, 0)] * self.mass[(1, 1)] - self.mass[(0, 1)] * self.mass[(1, 0)]
    }

    /// Close the system to explicit accelerations.
    ///
    /// Fails with [`ModelError::InvalidModel`] when the determinant is zero
    /// relative to the diagonal product.
    pub fn solve(&self) -> ModelResult<Accelerations> {
        let det = self.determinant();
        let scale = (self.mass[(0, 0)] * self.mass[(1, 1)]).abs();
        if !det.is_finite() || det.abs() <= DEGENERATE_REL_TOL * scale || scale == 0.0 {
            return Err(ModelError::InvalidModel {
                what: format!("degenerate coupled system (determinant = {det:e})"),
            });
        }

        let f0 = self.forcing[0];
        let f1 = self.forcing[1];
        let x_ddot = (f0 * self.mass[(1, 1)] - self.mass[(0, 1)] * f1) / det;
        let theta_ddot = (self.mass[(0, 0)] * f1 - self.mass[(1, 0)] * f0) / det;

        Ok(Accelerations { x_ddot, theta_ddot })
    }
}

/// Assemble and solve the equations of motion in one call.
pub fn derive(
    params: &PlantParameters,
    theta: f64,
    force: f64,
    form: Linearization,
) -> ModelResult<Accelerations> {
    CoupledSystem::assemble(params, theta, force, form).solve()
}
