//! Scenario loading, saving and validation for frontends.

use std::path::Path;

use cp_project::Scenario;

use crate::error::AppResult;

/// Load a scenario (YAML or JSON by extension); structure is validated on load.
pub fn load_scenario(path: &Path) -> AppResult<Scenario> {
    Ok(cp_project::load(path)?)
}

/// Save a scenario (YAML or JSON by extension); fully validated before writing.
pub fn save_scenario(path: &Path, scenario: &Scenario) -> AppResult<()> {
    validate_scenario(scenario)?;
    Ok(cp_project::save(path, scenario)?)
}

/// Structural validation plus the checks the pipeline crates apply on construction.
pub fn validate_scenario(scenario: &Scenario) -> AppResult<()> {
    crate::compile::compile_scenario(scenario).map(|_| ())
}
