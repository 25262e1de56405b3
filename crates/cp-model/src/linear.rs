//! Linear state-space model at the upright equilibrium.

use crate::derivation::{Linearization, derive};
use crate::dynamics::Plant;
use crate::error::ModelResult;
use crate::params::PlantParameters;
use crate::state::State;
use nalgebra::{Complex, Matrix1, Matrix4, RowVector4, Vector4};

/// Relative singular-value threshold for the controllability rank test.
const RANK_REL_EPS: f64 = 1e-10;

/// Real part above which a pole counts as unstable. The double pole at the
/// origin may come back from the Schur solver as `O(1e-8)` noise.
const UNSTABLE_EPS: f64 = 1e-6;

/// `x_dot = A x + B F`, `y = C x + D F` with `y` the pendulum angle.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub a: Matrix4<f64>,
    pub b: Vector4<f64>,
    pub c: RowVector4<f64>,
    pub d: Matrix1<f64>,
}

impl LinearModel {
    /// Linearize the plant about `theta = 0`, all rates zero.
    ///
    /// The small-angle equations are linear in `theta` and `F`, so solving
    /// them once with a unit angle and once with a unit force yields the
    /// exact matrix coefficients.
    pub fn from_params(params: &PlantParameters) -> ModelResult<Self> {
        let per_angle = derive(params, 1.0, 0.0, Linearization::SmallAngle)?;
        let per_force = derive(params, 0.0, 1.0, Linearization::SmallAngle)?;

        #[rustfmt::skip]
        let a = Matrix4::new(
            0.0, 1.0, 0.0,                   0.0,
            0.0, 0.0, per_angle.x_ddot,     0.0,
            0.0, 0.0, 0.0,                   1.0,
            0.0, 0.0, per_angle.theta_ddot, 0.0,
        );
        let b = Vector4::new(0.0, per_force.x_ddot, 0.0, per_force.theta_ddot);
        let c = RowVector4::new(0.0, 0.0, 1.0, 0.0);
        let d = Matrix1::new(0.0);

        Ok(Self { a, b, c, d })
    }

    /// `A x + B F`.
    pub fn derivative_of(&self, state: &State, force: f64) -> State {
        State::from_vector(&(self.a * state.to_vector() + self.b * force))
    }

    /// Observed pendulum angle `C x + D F`.
    pub fn output(&self, state: &State, force: f64) -> f64 {
        (self.c * state.to_vector())[0] + self.d[0] * force
    }

    /// Eigenvalues of `A`.
    pub fn open_loop_poles(&self) -> Vec<Complex<f64>> {
        self.a.complex_eigenvalues().iter().copied().collect()
    }

    /// Number of open-loop eigenvalues with strictly positive real part.
    pub fn unstable_mode_count(&self) -> usize {
        self.open_loop_poles()
            .iter()
            .filter(|p| p.re > UNSTABLE_EPS)
            .count()
    }

    /// `[B, AB, A^2 B, A^3 B]`.
    pub fn controllability_matrix(&self) -> Matrix4<f64> {
        let ab = self.a * self.b;
        let a2b = self.a * ab;
        let a3b = self.a * a2b;
        Matrix4::from_columns(&[self.b, ab, a2b, a3b])
    }

    pub fn is_controllable(&self) -> bool {
        let sv = self.controllability_matrix().singular_values();
        let max = sv.max();
        max > 0.0 && sv.min() > RANK_REL_EPS * max
    }
}

impl Plant for LinearModel {
    fn derivative(&self, state: &State, force: f64) -> ModelResult<State> {
        Ok(self.derivative_of(state, force))
    }
}
