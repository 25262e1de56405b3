//! Lightweight wall-clock timing for pipeline phases.

use std::time::Instant;

/// A simple timer that measures elapsed time.
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    /// Create and start a new timer with the given label.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Elapsed time in seconds without stopping.
    pub fn elapsed_s(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Stop the timer and return elapsed time in seconds.
    pub fn stop(self) -> f64 {
        self.elapsed_s()
    }
}

/// Per-phase wall-clock totals for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseTimings {
    pub linearize_s: f64,
    pub synthesize_s: f64,
    pub simulate_s: f64,
}

impl PhaseTimings {
    pub fn total_s(&self) -> f64 {
        self.linearize_s + self.synthesize_s + self.simulate_s
    }
}
