//! Time integration of the cart-pendulum under feedback.
//!
//! Provides:
//! - `TransientModel` trait for pluggable dynamic systems
//! - Fixed-step RK4 and forward Euler integrators
//! - Closed-loop and open-loop cart-pendulum models
//! - Simulation runner with cooperative cancellation and progress callbacks
//! - Parallel batch runs over initial conditions

pub mod batch;
pub mod cancel;
pub mod closed_loop;
pub mod error;
pub mod integrator;
pub mod model;
pub mod sim;
pub mod time;
pub mod trajectory;

pub use batch::run_batch;
pub use cancel::CancelToken;
pub use closed_loop::{
    ClosedLoopModel, ConstantForce, ForceLaw, simulate_closed_loop, simulate_open_loop,
};
pub use error::{SimError, SimResult};
pub use integrator::{ForwardEuler, Integrator, RK4};
pub use model::TransientModel;
pub use sim::{
    IntegratorType, RunStatus, SimOptions, SimProgress, SimRun, run_sim, run_sim_with_control,
};
pub use time::TimeGrid;
pub use trajectory::{Channel, SimRecord, Trajectory};
