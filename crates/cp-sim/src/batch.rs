//! Parallel closed-loop runs over many initial conditions.

use crate::cancel::CancelToken;
use crate::closed_loop::simulate_closed_loop;
use crate::error::SimResult;
use crate::sim::{SimOptions, SimRun};
use cp_controls::StateFeedback;
use cp_model::{PlantParameters, State};
use rayon::prelude::*;
use tracing::info;

/// Simulate one closed-loop run per initial state.
///
/// Runs are independent and share `params` and `feedback` read-only. Results
/// come back in the order of `initials`; a failing run does not stop the others.
pub fn run_batch(
    params: &PlantParameters,
    feedback: &StateFeedback,
    initials: &[State],
    opts: &SimOptions,
    cancel: Option<&CancelToken>,
) -> Vec<SimResult<SimRun<State>>> {
    info!(runs = initials.len(), "starting batch simulation");
    let results: Vec<_> = initials
        .par_iter()
        .map(|initial| simulate_closed_loop(params, feedback, *initial, opts, cancel))
        .collect();
    let failed = results.iter().filter(|r| r.is_err()).count();
    info!(runs = results.len(), failed, "batch simulation finished");
    results
}
