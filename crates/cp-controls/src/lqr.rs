//! Linear-quadratic regulator synthesis.
//!
//! Minimizes `integral(x^T Q x + F R F) dt` subject to `x_dot = A x + B F`.
//! The gain is `K = R^-1 B^T P` with `P` the stabilizing Riccati solution, and
//! the closed loop `A - B K` is checked to be Hurwitz before the gain is
//! handed out.

use crate::error::{ControlError, ControlResult};
use crate::riccati::solve_care;
use cp_model::{LinearModel, State};
use nalgebra::{Complex, DMatrix, Matrix4, RowVector4, Vector4};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Quadratic cost weights: `Q = diag(q_diag)`, scalar `R`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostWeights {
    /// Diagonal of Q for `(x, x_dot, theta, theta_dot)`.
    pub q_diag: [f64; 4],
    /// Input weight R.
    pub r: f64,
}

impl CostWeights {
    /// Create validated cost weights.
    ///
    /// # Arguments
    ///
    /// * `q_diag` - Non-negative state penalties
    /// * `r` - Positive input penalty
    pub fn new(q_diag: [f64; 4], r: f64) -> ControlResult<Self> {
        let weights = Self { q_diag, r };
        weights.validate()?;
        Ok(weights)
    }

    /// Q = diag(1, 1, 10, 1), R = 0.1.
    pub fn benchmark() -> Self {
        Self {
            q_diag: [1.0, 1.0, 10.0, 1.0],
            r: 0.1,
        }
    }

    pub fn validate(&self) -> ControlResult<()> {
        for (i, &q) in self.q_diag.iter().enumerate() {
            if !q.is_finite() || q < 0.0 {
                return Err(ControlError::InvalidCost {
                    what: format!("Q[{i}][{i}] must be finite and non-negative (got {q})"),
                });
            }
        }
        if !self.r.is_finite() || self.r <= 0.0 {
            return Err(ControlError::InvalidCost {
                what: format!("R must be finite and positive (got {})", self.r),
            });
        }
        Ok(())
    }

    pub fn q(&self) -> Matrix4<f64> {
        Matrix4::from_diagonal(&Vector4::from(self.q_diag))
    }
}

impl Default for CostWeights {
    fn default() -> Self {
        Self::benchmark()
    }
}

/// Solver settings for [`synthesize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LqrConfig {
    /// Maximum sign-function iterations.
    pub max_iterations: usize,
    /// Relative convergence tolerance of the sign iteration.
    pub tolerance: f64,
    /// Closed-loop poles must satisfy `Re(lambda) < -stability_margin`.
    pub stability_margin: f64,
}

impl Default for LqrConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-10,
            stability_margin: 1e-6,
        }
    }
}

/// Full-state feedback gain `K` (1 x 4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainMatrix {
    k: RowVector4<f64>,
}

impl GainMatrix {
    pub fn new(k: RowVector4<f64>) -> Self {
        Self { k }
    }

    pub fn from_array(k: [f64; 4]) -> Self {
        Self::new(RowVector4::new(k[0], k[1], k[2], k[3]))
    }

    pub fn as_row(&self) -> &RowVector4<f64> {
        &self.k
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.k[0], self.k[1], self.k[2], self.k[3]]
    }

    /// `F = -K e`.
    pub fn force(&self, error: &State) -> f64 {
        -(self.k * error.to_vector())[0]
    }

    /// `A - B K`.
    pub fn closed_loop(&self, model: &LinearModel) -> Matrix4<f64> {
        model.a - model.b * self.k
    }
}

/// Gain plus the artifacts of its synthesis.
#[derive(Debug, Clone)]
pub struct LqrSolution {
    pub gain: GainMatrix,
    /// Stabilizing Riccati solution P.
    pub riccati: Matrix4<f64>,
    /// Eigenvalues of `A - B K`.
    pub closed_loop_poles: Vec<Complex<f64>>,
    pub iterations: usize,
    pub residual_norm: f64,
}

impl LqrSolution {
    /// Largest real part among the closed-loop poles.
    pub fn spectral_abscissa(&self) -> f64 {
        spectral_abscissa(&self.closed_loop_poles)
    }
}

fn spectral_abscissa(poles: &[Complex<f64>]) -> f64 {
    poles
        .iter()
        .map(|p| p.re)
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Synthesize the LQR gain for a linear cart-pendulum model.
pub fn synthesize(
    model: &LinearModel,
    weights: &CostWeights,
    config: &LqrConfig,
) -> ControlResult<LqrSolution> {
    weights.validate()?;
    if config.max_iterations == 0 || !(config.tolerance > 0.0) {
        return Err(ControlError::InvalidArg {
            what: "LQR config needs positive max_iterations and tolerance",
        });
    }
    if !config.stability_margin.is_finite() || config.stability_margin < 0.0 {
        return Err(ControlError::InvalidArg {
            what: "LQR stability_margin must be finite and non-negative",
        });
    }

    let a = DMatrix::from_column_slice(4, 4, model.a.as_slice());
    let b = DMatrix::from_column_slice(4, 1, model.b.as_slice());
    let q = DMatrix::from_column_slice(4, 4, weights.q().as_slice());
    let r = DMatrix::from_element(1, 1, weights.r);

    let care = solve_care(&a, &b, &q, &r, config.max_iterations, config.tolerance)?;
    let p = Matrix4::from_column_slice(care.p.as_slice());

    let k = (model.b.transpose() * p) / weights.r;
    let gain = GainMatrix::new(k);

    let closed_loop_poles: Vec<Complex<f64>> = gain
        .closed_loop(model)
        .complex_eigenvalues()
        .iter()
        .copied()
        .collect();
    let abscissa = spectral_abscissa(&closed_loop_poles);
    debug!(?closed_loop_poles, "closed-loop poles");

    if !(abscissa < -config.stability_margin) {
        return Err(ControlError::UnstabilizableSystem {
            what: format!(
                "closed loop not Hurwitz: max Re(lambda) = {abscissa:e} (margin {:e})",
                config.stability_margin
            ),
        });
    }

    info!(
        k = ?gain.to_array(),
        spectral_abscissa = abscissa,
        iterations = care.iterations,
        "LQR gain synthesized"
    );

    Ok(LqrSolution {
        gain,
        riccati: p,
        closed_loop_poles,
        iterations: care.iterations,
        residual_norm: care.residual_norm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cp_model::PlantParameters;

    fn benchmark_solution() -> LqrSolution {
        let model = LinearModel::from_params(&PlantParameters::benchmark()).unwrap();
        synthesize(&model, &CostWeights::benchmark(), &LqrConfig::default()).unwrap()
    }

    #[test]
    fn benchmark_gain_values() {
        let sol = benchmark_solution();
        let k = sol.gain.to_array();
        // K = R^-1 B^T P for the benchmark plant and weights.
        let expected = [-3.162_277_66, -5.834_812_97, -48.087_197_73, -11.796_211_34];
        for (got, want) in k.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-5, "got {got}, want {want}");
        }
        // Position weight 1 with R = 0.1 fixes |K_x| = sqrt(q_x / R).
        assert!((k[0].abs() - 10f64.sqrt()).abs() < 1e-8);
    }

    #[test]
    fn closed_loop_is_hurwitz() {
        let sol = benchmark_solution();
        assert_eq!(sol.closed_loop_poles.len(), 4);
        assert!(sol.spectral_abscissa() < -1e-6);
    }

    #[test]
    fn riccati_solution_is_symmetric_positive() {
        let sol = benchmark_solution();
        let p = sol.riccati;
        assert!((p - p.transpose()).norm() < 1e-9);
        for i in 0..4 {
            assert!(p[(i, i)] > 0.0);
        }
        assert!(sol.residual_norm < 1e-6);
    }

    #[test]
    fn force_opposes_lean() {
        let sol = benchmark_solution();
        // Leaning toward +x: push the cart toward +x to get under the rod.
        assert!(sol.gain.force(&State::tilted(0.1)) > 0.0);
        assert_eq!(sol.gain.force(&State::upright()), 0.0);
    }

    #[test]
    fn invalid_weights_are_rejected() {
        assert!(matches!(
            CostWeights::new([1.0, 1.0, 10.0, 1.0], 0.0),
            Err(ControlError::InvalidCost { .. })
        ));
        assert!(matches!(
            CostWeights::new([1.0, -1.0, 10.0, 1.0], 0.1),
            Err(ControlError::InvalidCost { .. })
        ));
        assert!(CostWeights::new([f64::NAN, 1.0, 1.0, 1.0], 0.1).is_err());
        assert!(CostWeights::new([0.0, 0.0, 1.0, 0.0], 1.0).is_ok());
    }

    #[test]
    fn synthesize_validates_weights() {
        let model = LinearModel::from_params(&PlantParameters::benchmark()).unwrap();
        let bad = CostWeights {
            q_diag: [1.0, 1.0, 1.0, 1.0],
            r: -1.0,
        };
        let err = synthesize(&model, &bad, &LqrConfig::default()).unwrap_err();
        assert!(matches!(err, ControlError::InvalidCost { .. }));
    }

    #[test]
    fn negative_stability_margin_is_rejected() {
        let model = LinearModel::from_params(&PlantParameters::benchmark()).unwrap();
        for margin in [-0.5, f64::NAN] {
            let config = LqrConfig {
                stability_margin: margin,
                ..LqrConfig::default()
            };
            let err = synthesize(&model, &CostWeights::benchmark(), &config).unwrap_err();
            assert!(matches!(err, ControlError::InvalidArg { .. }));
        }
    }

    #[test]
    fn zero_state_cost_is_not_detectable() {
        let model = LinearModel::from_params(&PlantParameters::benchmark()).unwrap();
        let weights = CostWeights::new([0.0; 4], 1.0).unwrap();
        let err = synthesize(&model, &weights, &LqrConfig::default()).unwrap_err();
        assert!(matches!(err, ControlError::UnstabilizableSystem { .. }));
    }
}
