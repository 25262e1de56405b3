//! Scenario schema definitions.

use serde::{Deserialize, Serialize};

/// A complete run description: plant, cost, initial/reference states and horizon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    /// Schema version; files without one load as version 0.
    #[serde(default)]
    pub version: u32,
    pub name: String,
    pub plant: PlantDef,
    #[serde(default)]
    pub cost: CostDef,
    pub initial: StateDef,
    #[serde(default)]
    pub reference: StateDef,
    pub horizon: HorizonDef,
    #[serde(default)]
    pub integrator: IntegratorDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_limit_n: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweep: Option<SweepDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantDef {
    pub cart_mass_kg: f64,
    pub pendulum_mass_kg: f64,
    pub pendulum_length_m: f64,
    #[serde(default = "standard_gravity")]
    pub gravity_mps2: f64,
}

fn standard_gravity() -> f64 {
    9.81
}

/// Diagonal state weight and scalar input weight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostDef {
    /// Weights on (x, x_dot, theta, theta_dot).
    pub q_diag: [f64; 4],
    pub r: f64,
}

impl Default for CostDef {
    fn default() -> Self {
        Self {
            q_diag: [1.0, 1.0, 10.0, 1.0],
            r: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct StateDef {
    #[serde(default)]
    pub x_m: f64,
    #[serde(default)]
    pub x_dot_mps: f64,
    #[serde(default)]
    pub theta_rad: f64,
    #[serde(default)]
    pub theta_dot_radps: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HorizonDef {
    #[serde(default)]
    pub start_s: f64,
    pub end_s: f64,
    pub steps: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorDef {
    #[default]
    Rk4,
    ForwardEuler,
}

/// Batch of initial tilts spread evenly over `[theta_min_rad, theta_max_rad]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SweepDef {
    pub theta_min_rad: f64,
    pub theta_max_rad: f64,
    pub count: usize,
}

impl SweepDef {
    /// Initial angles of the sweep, in order.
    pub fn angles(&self) -> Vec<f64> {
        if self.count == 1 {
            return vec![self.theta_min_rad];
        }
        let span = self.theta_max_rad - self.theta_min_rad;
        (0..self.count)
            .map(|i| self.theta_min_rad + span * i as f64 / (self.count - 1) as f64)
            .collect()
    }
}

impl Scenario {
    /// The canonical benchmark: 0.1 rad tilt, 10 s, 1000 RK4 steps.
    pub fn benchmark() -> Self {
        Self {
            version: crate::migrate::LATEST_VERSION,
            name: "Benchmark".to_string(),
            plant: PlantDef {
                cart_mass_kg: 1.0,
                pendulum_mass_kg: 0.1,
                pendulum_length_m: 0.5,
                gravity_mps2: standard_gravity(),
            },
            cost: CostDef::default(),
            initial: StateDef {
                theta_rad: 0.1,
                ..StateDef::default()
            },
            reference: StateDef::default(),
            horizon: HorizonDef {
                start_s: 0.0,
                end_s: 10.0,
                steps: 1000,
            },
            integrator: IntegratorDef::Rk4,
            force_limit_n: None,
            sweep: None,
        }
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::benchmark()
    }
}
