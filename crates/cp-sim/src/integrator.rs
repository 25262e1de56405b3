//! Fixed-step explicit integrators.

use crate::error::SimResult;
use crate::model::TransientModel;

/// One fixed step of an explicit scheme.
pub trait Integrator {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State>;

    /// Right-hand side evaluations per step.
    fn stages(&self) -> usize;
}

/// Classical fourth-order Runge-Kutta.
#[derive(Clone, Debug)]
pub struct RK4;

impl Integrator for RK4 {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State> {
        let half = 0.5 * dt;
        let t_mid = t + half;

        let d1 = model.rhs(t, x)?;
        let probe = model.add(x, &model.scale(&d1, half));
        let d2 = model.rhs(t_mid, &probe)?;
        let probe = model.add(x, &model.scale(&d2, half));
        let d3 = model.rhs(t_mid, &probe)?;
        let probe = model.add(x, &model.scale(&d3, dt));
        let d4 = model.rhs(t + dt, &probe)?;

        // x + dt/6 (d1 + 2 d2 + 2 d3 + d4)
        let inner = model.add(&d2, &d3);
        let outer = model.add(&d1, &d4);
        let weighted = model.add(&outer, &model.scale(&inner, 2.0));
        Ok(model.add(x, &model.scale(&weighted, dt / 6.0)))
    }

    fn stages(&self) -> usize {
        4
    }
}

/// Explicit first-order Euler.
#[derive(Clone, Debug)]
pub struct ForwardEuler;

impl Integrator for ForwardEuler {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State> {
        let slope = model.rhs(t, x)?;
        Ok(model.add(x, &model.scale(&slope, dt)))
    }

    fn stages(&self) -> usize {
        1
    }
}
