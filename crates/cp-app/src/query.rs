//! Summaries and exports of simulated trajectories.

use cp_sim::{Channel, Trajectory};
use serde::Serialize;

/// Band around upright used for the settling time.
pub const SETTLING_BAND_RAD: f64 = 0.01;

/// Headline numbers of one trajectory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectorySummary {
    pub record_count: usize,
    pub time_range: (f64, f64),
    pub final_x_m: f64,
    pub final_theta_rad: f64,
    pub peak_abs_theta_rad: f64,
    pub peak_abs_x_m: f64,
    /// First time after which |theta| stays inside [`SETTLING_BAND_RAD`].
    pub settling_time_s: Option<f64>,
}

pub fn summarize(trajectory: &Trajectory) -> Option<TrajectorySummary> {
    let (t_end, last) = trajectory.last()?;
    let t_start = *trajectory.t.first()?;
    let peak_abs_x_m = trajectory
        .x
        .iter()
        .fold(0.0_f64, |acc, s| acc.max(s.x.abs()));

    Some(TrajectorySummary {
        record_count: trajectory.len(),
        time_range: (t_start, t_end),
        final_x_m: last.x,
        final_theta_rad: last.theta,
        peak_abs_theta_rad: trajectory.peak_angle(),
        peak_abs_x_m,
        settling_time_s: settling_time(trajectory, SETTLING_BAND_RAD),
    })
}

/// Time of the first sample after the last excursion outside `band`.
pub fn settling_time(trajectory: &Trajectory, band: f64) -> Option<f64> {
    let outside = trajectory.x.iter().rposition(|s| s.theta.abs() > band);
    match outside {
        None => trajectory.t.first().copied(),
        Some(i) => trajectory.t.get(i + 1).copied(),
    }
}

/// CSV with one row per time point and a unit-suffixed header.
pub fn trajectory_to_csv(trajectory: &Trajectory) -> String {
    let mut csv = String::from("time_s");
    for channel in Channel::ALL {
        csv.push(',');
        csv.push_str(channel.column_name());
    }
    csv.push('\n');

    for row in trajectory.to_columns() {
        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        csv.push_str(&line.join(","));
        csv.push('\n');
    }
    csv
}
