//! Plant state vector.

use nalgebra::Vector4;
use std::ops::{Add, Mul, Sub};

/// Cart-pendulum state `(x, x_dot, theta, theta_dot)`.
///
/// The same layout is used for state derivatives, where the fields hold
/// `(x_dot, x_ddot, theta_dot, theta_ddot)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct State {
    /// Cart position (m)
    pub x: f64,
    /// Cart velocity (m/s)
    pub x_dot: f64,
    /// Pendulum angle from upright (rad)
    pub theta: f64,
    /// Pendulum angular velocity (rad/s)
    pub theta_dot: f64,
}

impl State {
    pub const fn new(x: f64, x_dot: f64, theta: f64, theta_dot: f64) -> Self {
        Self {
            x,
            x_dot,
            theta,
            theta_dot,
        }
    }

    /// Upright pendulum at rest over the origin.
    pub const fn upright() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Upright at rest with the pendulum tilted by `theta`.
    pub const fn tilted(theta: f64) -> Self {
        Self::new(0.0, 0.0, theta, 0.0)
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.x, self.x_dot, self.theta, self.theta_dot]
    }

    pub fn from_array(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }

    pub fn to_vector(&self) -> Vector4<f64> {
        Vector4::new(self.x, self.x_dot, self.theta, self.theta_dot)
    }

    pub fn from_vector(v: &Vector4<f64>) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }

    /// Largest absolute component.
    pub fn max_abs(&self) -> f64 {
        self.to_array().iter().fold(0.0, |acc, v| acc.max(v.abs()))
    }
}

impl Add for State {
    type Output = State;

    fn add(self, rhs: State) -> State {
        State::new(
            self.x + rhs.x,
            self.x_dot + rhs.x_dot,
            self.theta + rhs.theta,
            self.theta_dot + rhs.theta_dot,
        )
    }
}

impl Sub for State {
    type Output = State;

    fn sub(self, rhs: State) -> State {
        State::new(
            self.x - rhs.x,
            self.x_dot - rhs.x_dot,
            self.theta - rhs.theta,
            self.theta_dot - rhs.theta_dot,
        )
    }
}

impl Mul<f64> for State {
    type Output = State;

    fn mul(self, k: f64) -> State {
        State::new(self.x * k, self.x_dot * k, self.theta * k, self.theta_dot * k)
    }
}

impl From<Vector4<f64>> for State {
    fn from(v: Vector4<f64>) -> Self {
        State::from_vector(&v)
    }
}

impl From<State> for Vector4<f64> {
    fn from(s: State) -> Self {
        s.to_vector()
    }
}

impl From<[f64; 4]> for State {
    fn from(v: [f64; 4]) -> Self {
        State::from_array(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_layout_matches_fields() {
        let s = State::new(1.0, 2.0, 3.0, 4.0);
        let v = s.to_vector();
        assert_eq!(v, Vector4::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(State::from(v), s);
        assert_eq!(State::from(s.to_array()), s);
    }

    #[test]
    fn arithmetic() {
        let a = State::new(1.0, 2.0, 3.0, 4.0);
        let b = State::new(0.5, 0.5, 0.5, 0.5);
        assert_eq!(a - b, State::new(0.5, 1.5, 2.5, 3.5));
        assert_eq!(a + b, State::new(1.5, 2.5, 3.5, 4.5));
        assert_eq!(b * 2.0, State::new(1.0, 1.0, 1.0, 1.0));
    }

    #[test]
    fn finiteness_and_magnitude() {
        assert!(State::tilted(0.1).is_finite());
        assert!(!State::new(f64::NAN, 0.0, 0.0, 0.0).is_finite());
        assert_eq!(State::new(-3.0, 1.0, 2.0, 0.0).max_abs(), 3.0);
        assert_eq!(State::upright().max_abs(), 0.0);
    }
}
