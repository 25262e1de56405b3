//! Controller synthesis for the cart-pendulum.
//!
//! # Architecture
//!
//! - [`CostWeights`] hold the quadratic state and input penalties `(Q, R)`
//! - [`riccati`] solves the continuous algebraic Riccati equation
//! - [`synthesize`] turns a [`cp_model::LinearModel`] and weights into a
//!   [`GainMatrix`], verifying that the closed loop is Hurwitz
//! - [`StateFeedback`] applies `F = -K (x - x_ref)` with optional saturation
//!
//! Synthesis runs once per configuration; the feedback law is evaluated in the
//! simulation hot loop and is allocation-free.

pub mod error;
pub mod feedback;
pub mod lqr;
pub mod riccati;

pub use error::{ControlError, ControlResult};
pub use feedback::StateFeedback;
pub use lqr::{CostWeights, GainMatrix, LqrConfig, LqrSolution, synthesize};
pub use riccati::{CareSolution, solve_care};
