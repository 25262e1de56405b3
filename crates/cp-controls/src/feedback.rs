//! Full-state feedback law.

use crate::error::{ControlError, ControlResult};
use crate::lqr::GainMatrix;
use cp_model::State;

/// `F = -K (x - x_ref)`, optionally clamped to `[-limit, limit]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateFeedback {
    gain: GainMatrix,
    reference: State,
    force_limit: Option<f64>,
}

impl StateFeedback {
    pub fn new(gain: GainMatrix, reference: State) -> Self {
        Self {
            gain,
            reference,
            force_limit: None,
        }
    }

    /// Clamp the commanded force magnitude.
    pub fn with_force_limit(mut self, limit: f64) -> ControlResult<Self> {
        if !limit.is_finite() || limit <= 0.0 {
            return Err(ControlError::InvalidArg {
                what: "force limit must be finite and positive",
            });
        }
        self.force_limit = Some(limit);
        Ok(self)
    }

    pub fn gain(&self) -> &GainMatrix {
        &self.gain
    }

    pub fn reference(&self) -> &State {
        &self.reference
    }

    pub fn force_limit(&self) -> Option<f64> {
        self.force_limit
    }

    /// Tracking error `x - x_ref`.
    pub fn error(&self, state: &State) -> State {
        *state - self.reference
    }

    /// Commanded cart force at `state`.
    pub fn force(&self, state: &State) -> f64 {
        let raw = self.gain.force(&self.error(state));
        match self.force_limit {
            Some(limit) => raw.clamp(-limit, limit),
            None => raw,
        }
    }
}
