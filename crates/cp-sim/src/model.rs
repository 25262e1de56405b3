//! Systems the fixed-step runner can integrate.

use crate::error::SimResult;

/// An ODE `x' = f(t, x)` over a state type with vector-space operations.
///
/// The runner only needs to add states, scale them, evaluate `f`, and tell
/// whether a state is still finite.
pub trait TransientModel {
    type State: Clone;

    /// State at the first grid point.
    fn initial_state(&self) -> Self::State;

    /// `f(t, x)`. Takes `&mut self` so a model can count evaluations.
    fn rhs(&mut self, t: f64, x: &Self::State) -> SimResult<Self::State>;

    /// `a + b`
    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State;

    /// `scale * a`
    fn scale(&self, a: &Self::State, scale: f64) -> Self::State;

    fn is_finite(&self, x: &Self::State) -> bool;
}
