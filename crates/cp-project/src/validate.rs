//! Scenario validation logic.

use crate::schema::{HorizonDef, Scenario, StateDef};

/// Upper bound on integration steps in one run.
pub const MAX_STEPS: usize = 10_000_000;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: &str, v: f64) -> Result<(), ValidationError> {
    if !v.is_finite() || v <= 0.0 {
        return Err(invalid(field, v, "must be finite and positive"));
    }
    Ok(())
}

fn finite(field: &str, v: f64) -> Result<(), ValidationError> {
    if !v.is_finite() {
        return Err(invalid(field, v, "must be finite"));
    }
    Ok(())
}

/// Structural checks only. Plant and cost values are checked by the
/// `cp-model` and `cp-controls` constructors when the scenario is compiled.
pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }
    if scenario.name.trim().is_empty() {
        return Err(invalid("name", "\"\"", "must not be empty"));
    }

    validate_state("initial", &scenario.initial)?;
    validate_state("reference", &scenario.reference)?;
    validate_horizon(&scenario.horizon)?;

    if let Some(limit) = scenario.force_limit_n {
        positive("force_limit_n", limit)?;
    }

    if let Some(sweep) = &scenario.sweep {
        finite("sweep.theta_min_rad", sweep.theta_min_rad)?;
        finite("sweep.theta_max_rad", sweep.theta_max_rad)?;
        if sweep.theta_max_rad < sweep.theta_min_rad {
            return Err(invalid(
                "sweep.theta_max_rad",
                sweep.theta_max_rad,
                "must not be below theta_min_rad",
            ));
        }
        if sweep.count == 0 {
            return Err(invalid("sweep.count", 0, "must be at least 1"));
        }
    }

    Ok(())
}

fn validate_state(prefix: &str, state: &StateDef) -> Result<(), ValidationError> {
    finite(&format!("{prefix}.x_m"), state.x_m)?;
    finite(&format!("{prefix}.x_dot_mps"), state.x_dot_mps)?;
    finite(&format!("{prefix}.theta_rad"), state.theta_rad)?;
    finite(&format!("{prefix}.theta_dot_radps"), state.theta_dot_radps)
}

fn validate_horizon(horizon: &HorizonDef) -> Result<(), ValidationError> {
    finite("horizon.start_s", horizon.start_s)?;
    finite("horizon.end_s", horizon.end_s)?;
    if horizon.end_s <= horizon.start_s {
        return Err(invalid("horizon.end_s", horizon.end_s, "must be after start_s"));
    }
    if horizon.steps == 0 || horizon.steps > MAX_STEPS {
        return Err(invalid(
            "horizon.steps",
            horizon.steps,
            &format!("must be between 1 and {MAX_STEPS}"),
        ));
    }
    Ok(())
}
