//! Recorded simulation output.

use cp_model::State;

/// Record of simulation results.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimRecord<S> {
    /// Time points (seconds)
    pub t: Vec<f64>,
    /// State snapshots
    pub x: Vec<S>,
}

impl<S> SimRecord<S> {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            t: Vec::with_capacity(n),
            x: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, t: f64, x: S) {
        self.t.push(t);
        self.x.push(x);
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, &S)> {
        self.t.iter().copied().zip(self.x.iter())
    }

    pub fn last(&self) -> Option<(f64, &S)> {
        Some((*self.t.last()?, self.x.last()?))
    }
}

/// Cart-pendulum trajectory.
pub type Trajectory = SimRecord<State>;

/// One component of the plant state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    X,
    XDot,
    Theta,
    ThetaDot,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::X,
        Channel::XDot,
        Channel::Theta,
        Channel::ThetaDot,
    ];

    /// CSV column header, with units.
    pub fn column_name(&self) -> &'static str {
        match self {
            Channel::X => "x_m",
            Channel::XDot => "x_dot_mps",
            Channel::Theta => "theta_rad",
            Channel::ThetaDot => "theta_dot_radps",
        }
    }

    pub fn of(&self, state: &State) -> f64 {
        match self {
            Channel::X => state.x,
            Channel::XDot => state.x_dot,
            Channel::Theta => state.theta,
            Channel::ThetaDot => state.theta_dot,
        }
    }
}

impl SimRecord<State> {
    pub fn final_state(&self) -> Option<&State> {
        self.x.last()
    }

    /// Time series of one state component.
    pub fn channel(&self, channel: Channel) -> Vec<f64> {
        self.x.iter().map(|s| channel.of(s)).collect()
    }

    /// Rows of `[t, x, x_dot, theta, theta_dot]`.
    pub fn to_columns(&self) -> Vec<[f64; 5]> {
        self.iter()
            .map(|(t, s)| [t, s.x, s.x_dot, s.theta, s.theta_dot])
            .collect()
    }

    /// Largest |theta| over the run.
    pub fn peak_angle(&self) -> f64 {
        self.x.iter().fold(0.0_f64, |acc, s| acc.max(s.theta.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Trajectory {
        let mut tr = Trajectory::with_capacity(3);
        tr.push(0.0, State::new(0.0, 0.0, 0.1, 0.0));
        tr.push(0.5, State::new(0.1, 0.2, -0.3, 0.4));
        tr.push(1.0, State::new(0.2, 0.0, 0.05, 0.0));
        tr
    }

    #[test]
    fn channels_and_columns() {
        let tr = sample();
        assert_eq!(tr.len(), 3);
        assert_eq!(tr.channel(Channel::Theta), vec![0.1, -0.3, 0.05]);
        let cols = tr.to_columns();
        assert_eq!(cols[1], [0.5, 0.1, 0.2, -0.3, 0.4]);
        assert_eq!(tr.final_state().unwrap().x, 0.2);
        assert_eq!(tr.peak_angle(), 0.3);
    }

    #[test]
    fn column_names_follow_state_order() {
        let names: Vec<_> = Channel::ALL.iter().map(|c| c.column_name()).collect();
        assert_eq!(names, ["x_m", "x_dot_mps", "theta_rad", "theta_dot_radps"]);
    }
}
