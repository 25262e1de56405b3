//! Turn a validated scenario into typed pipeline inputs.

use cp_controls::CostWeights;
use cp_core::units::{kg, m, mps2};
use cp_model::{PlantParameters, State};
use cp_project::{IntegratorDef, Scenario, StateDef};
use cp_sim::{IntegratorType, SimOptions, TimeGrid};

use crate::error::AppResult;

/// Everything the pipeline needs, already validated by the owning crates.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineInputs {
    pub params: PlantParameters,
    pub weights: CostWeights,
    pub initial: State,
    pub reference: State,
    pub sim: SimOptions,
    pub force_limit: Option<f64>,
}

pub fn state_from_def(def: &StateDef) -> State {
    State::new(def.x_m, def.x_dot_mps, def.theta_rad, def.theta_dot_radps)
}

pub fn plant_from_scenario(scenario: &Scenario) -> AppResult<PlantParameters> {
    let p = &scenario.plant;
    Ok(PlantParameters::from_si(
        kg(p.cart_mass_kg),
        kg(p.pendulum_mass_kg),
        m(p.pendulum_length_m),
        mps2(p.gravity_mps2),
    )?)
}

pub fn sim_options_from_scenario(scenario: &Scenario) -> AppResult<SimOptions> {
    let h = &scenario.horizon;
    let grid = TimeGrid::new(h.start_s, h.end_s, h.steps)?;
    let integrator = match scenario.integrator {
        IntegratorDef::Rk4 => IntegratorType::RK4,
        IntegratorDef::ForwardEuler => IntegratorType::ForwardEuler,
    };
    Ok(SimOptions::new(grid).with_integrator(integrator))
}

/// Build the typed inputs. Plant and cost go through their own constructors
/// first so a bad value surfaces as `InvalidModel` or `InvalidCost`.
pub fn compile_scenario(scenario: &Scenario) -> AppResult<PipelineInputs> {
    let params = plant_from_scenario(scenario)?;
    let weights = CostWeights::new(scenario.cost.q_diag, scenario.cost.r)?;
    cp_project::validate_scenario(scenario).map_err(cp_project::ProjectError::from)?;

    Ok(PipelineInputs {
        params,
        weights,
        initial: state_from_def(&scenario.initial),
        reference: state_from_def(&scenario.reference),
        sim: sim_options_from_scenario(scenario)?,
        force_limit: scenario.force_limit_n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, ErrorKind};

    #[test]
    fn benchmark_scenario_compiles_to_benchmark_plant() {
        let inputs = compile_scenario(&Scenario::benchmark()).unwrap();
        assert_eq!(inputs.params, PlantParameters::benchmark());
        assert_eq!(inputs.weights, CostWeights::benchmark());
        assert_eq!(inputs.initial, State::tilted(0.1));
        assert_eq!(inputs.reference, State::upright());
        assert_eq!(inputs.sim.grid.len(), 1001);
        assert_eq!(inputs.sim.integrator, IntegratorType::RK4);
    }

    #[test]
    fn bad_plant_and_cost_keep_their_kinds() {
        let mut s = Scenario::benchmark();
        s.plant.cart_mass_kg = 0.0;
        assert_eq!(compile_scenario(&s).unwrap_err().kind(), ErrorKind::InvalidModel);

        let mut s = Scenario::benchmark();
        s.cost.r = 0.0;
        assert_eq!(compile_scenario(&s).unwrap_err().kind(), ErrorKind::InvalidCost);
    }

    #[test]
    fn bad_horizon_is_a_project_error() {
        let mut s = Scenario::benchmark();
        s.horizon.steps = 0;
        let err = compile_scenario(&s).unwrap_err();
        assert!(matches!(err, AppError::Project(_)));
    }

    #[test]
    fn integrator_choice_carries_over() {
        let mut s = Scenario::benchmark();
        s.integrator = IntegratorDef::ForwardEuler;
        let opts = sim_options_from_scenario(&s).unwrap();
        assert_eq!(opts.integrator, IntegratorType::ForwardEuler);
    }
}
