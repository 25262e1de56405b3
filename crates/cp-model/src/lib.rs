//! Cart-pendulum plant model.
//!
//! Provides:
//! - Plant parameters (validated, immutable)
//! - The 4-element plant state `(x, x_dot, theta, theta_dot)`
//! - Equations of motion as a coupled 2x2 system (exact and small-angle forms)
//! - Linear state-space model at the upright equilibrium
//! - Closed-form nonlinear right-hand side valid at any angle
//!
//! Angles are radians with `theta = 0` the upright pendulum. Positive `theta`
//! leans the pendulum toward positive `x`.

pub mod derivation;
pub mod dynamics;
pub mod error;
pub mod linear;
pub mod params;
pub mod state;

pub use derivation::{Accelerations, CoupledSystem, Linearization, derive};
pub use dynamics::{NonlinearPlant, Plant, accelerations, denominators, state_derivative};
pub use error::{ModelError, ModelResult};
pub use linear::LinearModel;
pub use params::PlantParameters;
pub use state::State;
