//! Uniform time grid.

use crate::error::{SimError, SimResult};

/// `steps` equal intervals over `[start, end]`, giving `steps + 1` points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeGrid {
    start: f64,
    end: f64,
    steps: usize,
}

impl TimeGrid {
    pub fn new(start: f64, end: f64, steps: usize) -> SimResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(SimError::InvalidArg {
                what: "time grid bounds must be finite",
            });
        }
        if end <= start {
            return Err(SimError::InvalidArg {
                what: "time grid end must be after start",
            });
        }
        if steps == 0 {
            return Err(SimError::InvalidArg {
                what: "time grid needs at least one step",
            });
        }
        Ok(Self { start, end, steps })
    }

    /// Grid starting at zero with a fixed step size.
    pub fn from_step(duration: f64, dt: f64) -> SimResult<Self> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        let steps = (duration / dt).round();
        if !steps.is_finite() || steps < 1.0 {
            return Err(SimError::InvalidArg {
                what: "duration must cover at least one step",
            });
        }
        Self::new(0.0, duration, steps as usize)
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn dt(&self) -> f64 {
        (self.end - self.start) / self.steps as f64
    }

    /// Number of grid points, including both ends.
    pub fn len(&self) -> usize {
        self.steps + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Time of point `i`, computed directly so rounding does not accumulate.
    pub fn time(&self, i: usize) -> f64 {
        if i >= self.steps {
            self.end
        } else {
            self.start + i as f64 * self.dt()
        }
    }

    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        (0..=self.steps).map(|i| self.time(i))
    }
}
