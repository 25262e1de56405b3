//! Continuous algebraic Riccati equation solver.
//!
//! Solves `A^T P + P A - P B R^-1 B^T P + Q = 0` for the stabilizing `P`
//! through the matrix sign function of the Hamiltonian
//!
//! ```text
//! H = [  A   -B R^-1 B^T ]
//!     [ -Q       -A^T    ]
//! ```
//!
//! The stable invariant subspace of `H` is spanned by `[I; P]`, and
//! `W = sign(H)` maps it to `-I`, so `P` is the least-squares solution of
//! `[W12; W22 + I] P = -[W11 + I; W21]`.
//!
//! `sign(H)` is computed by the scaled Newton iteration
//! `Z <- (Z / c + c Z^-1) / 2` with `c = |det Z|^(1/2n)`. A singular iterate
//! means `H` has eigenvalues on the imaginary axis, which happens exactly
//! when no stabilizing solution exists.

use crate::error::{ControlError, ControlResult};
use nalgebra::DMatrix;
use tracing::debug;

/// Relative singular-value floor for `[W12; W22 + I]` to count as full rank.
const GRAPH_REL_TOL: f64 = 1e-10;

/// Relative Riccati residual above which a solution is rejected.
const RESIDUAL_REL_TOL: f64 = 1e-6;

/// Result of a Riccati solve.
#[derive(Debug, Clone)]
pub struct CareSolution {
    /// Symmetric stabilizing solution.
    pub p: DMatrix<f64>,
    /// Sign-function iterations used.
    pub iterations: usize,
    /// Frobenius norm of the Riccati residual at `p`.
    pub residual_norm: f64,
}

/// Solve the continuous algebraic Riccati equation.
///
/// # Arguments
///
/// * `a` - State matrix (n x n)
/// * `b` - Input matrix (n x m)
/// * `q` - State cost (n x n, symmetric PSD)
/// * `r` - Input cost (m x m, symmetric PD)
/// * `max_iterations` - Sign iteration limit
/// * `tolerance` - Relative step size at which the sign iteration stops
pub fn solve_care(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    q: &DMatrix<f64>,
    r: &DMatrix<f64>,
    max_iterations: usize,
    tolerance: f64,
) -> ControlResult<CareSolution> {
    let n = a.nrows();
    if n == 0 || a.ncols() != n {
        return Err(ControlError::InvalidArg {
            what: "A must be square and non-empty",
        });
    }
    if b.nrows() != n || q.shape() != (n, n) || r.shape() != (b.ncols(), b.ncols()) {
        return Err(ControlError::InvalidArg {
            what: "A, B, Q, R dimensions disagree",
        });
    }

    let r_inv = r
        .clone()
        .try_inverse()
        .ok_or_else(|| ControlError::InvalidCost {
            what: "R is singular".to_string(),
        })?;
    let s = b * r_inv * b.transpose();

    let mut h = DMatrix::zeros(2 * n, 2 * n);
    h.view_mut((0, 0), (n, n)).copy_from(a);
    h.view_mut((0, n), (n, n)).copy_from(&(&s * -1.0));
    h.view_mut((n, 0), (n, n)).copy_from(&(q * -1.0));
    h.view_mut((n, n), (n, n)).copy_from(&(a.transpose() * -1.0));

    let (w, iterations) = matrix_sign(h, max_iterations, tolerance)?;

    let identity = DMatrix::<f64>::identity(n, n);
    let mut lhs = DMatrix::zeros(2 * n, n);
    lhs.view_mut((0, 0), (n, n))
        .copy_from(&w.view((0, n), (n, n)));
    lhs.view_mut((n, 0), (n, n))
        .copy_from(&(w.view((n, n), (n, n)) + &identity));

    let mut rhs = DMatrix::zeros(2 * n, n);
    rhs.view_mut((0, 0), (n, n))
        .copy_from(&((w.view((0, 0), (n, n)) + &identity) * -1.0));
    rhs.view_mut((n, 0), (n, n))
        .copy_from(&(w.view((n, 0), (n, n)) * -1.0));

    let svd = lhs.svd(true, true);
    let sv_max = svd.singular_values.max();
    let sv_min = svd.singular_values.min();
    if sv_max <= 0.0 || sv_min <= GRAPH_REL_TOL * sv_max {
        return Err(ControlError::UnstabilizableSystem {
            what: "stable invariant subspace is not a graph: (A, B) not stabilizable or (A, Q) not detectable"
                .to_string(),
        });
    }
    let p = svd
        .solve(&rhs, 1e-14 * sv_max)
        .map_err(|e| ControlError::UnstabilizableSystem {
            what: format!("stable subspace extraction failed: {e}"),
        })?;
    let p = (&p + p.transpose()) * 0.5;

    if p.iter().any(|v| !v.is_finite()) {
        return Err(ControlError::UnstabilizableSystem {
            what: "Riccati solution is not finite".to_string(),
        });
    }

    let residual = a.transpose() * &p + &p * a - &p * &s * &p + q;
    let residual_norm = residual.norm();
    let residual_scale =
        1.0 + q.norm() + 2.0 * a.norm() * p.norm() + p.norm() * p.norm() * s.norm();
    if residual_norm > RESIDUAL_REL_TOL * residual_scale {
        return Err(ControlError::UnstabilizableSystem {
            what: format!("Riccati residual too large ({residual_norm:e})"),
        });
    }
    debug!(iterations, residual_norm, "CARE solved");

    Ok(CareSolution {
        p,
        iterations,
        residual_norm,
    })
}

/// Scaled Newton iteration for the matrix sign function.
fn matrix_sign(
    mut z: DMatrix<f64>,
    max_iterations: usize,
    tolerance: f64,
) -> ControlResult<(DMatrix<f64>, usize)> {
    let dim = z.nrows() as f64;

    for iter in 1..=max_iterations {
        let lu = z.clone().lu();
        let det = lu.determinant();
        let z_inv = lu
            .try_inverse()
            .ok_or_else(|| ControlError::UnstabilizableSystem {
                what: "Hamiltonian has eigenvalues on the imaginary axis".to_string(),
            })?;

        let scale = det.abs().powf(1.0 / dim);
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ControlError::UnstabilizableSystem {
                what: format!("Hamiltonian iterate is singular (det = {det:e})"),
            });
        }

        let next = (&z / scale + &z_inv * scale) * 0.5;
        if next.iter().any(|v| !v.is_finite()) {
            return Err(ControlError::UnstabilizableSystem {
                what: "sign iteration diverged".to_string(),
            });
        }

        let step = (&next - &z).norm();
        z = next;
        if step <= tolerance * z.norm() {
            return Ok((z, iter));
        }
    }

    Err(ControlError::UnstabilizableSystem {
        what: format!("sign iteration did not converge in {max_iterations} iterations"),
    })
}
