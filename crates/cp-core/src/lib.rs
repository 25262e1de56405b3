//! cp-core: shared foundation for the cartpole workspace.
//!
//! Contains:
//! - units (uom SI types + constructors for plant parameters)
//! - numeric (finiteness and positivity checks)
//! - timing (wall-clock timers for pipeline phases)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod timing;
pub mod units;

pub use error::CoreError;
pub use numeric::*;
pub use units::*;
