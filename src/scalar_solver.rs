//! Scalar engine: backward induction over an explicit transition table.
//!
//! Mirrors the Bellman recursion cell by cell:
//!
//! ```text
//! V_t(s, p) = max_{p1 ≥ p} Σ_{d=0..s} prob(d) · (reward(d, p1) + γ · V_{t+1}(s − d, p1))
//! ```
//!
//! Cost is O(states × actions × outcomes) per period. Each period reads only the
//! finalized table of period t+1, so states within a period are solved in
//! parallel and gathered in index order.

use std::time::Instant;

use rayon::prelude::*;
use tracing::debug;

use crate::constants::*;
use crate::error::{PricingError, Result};
use crate::transitions::TransitionTable;
use crate::types::{ClearanceProblem, PeriodTable, PolicySchedule};

/// Solve one state (s, p) against the next period's values.
///
/// Returns `(value, action)`. Ties go to the first maximizer in ascending p1 order.
#[inline(always)]
pub fn solve_state(
    transitions: &TransitionTable,
    next_values: &[f64],
    discount: f64,
    s: usize,
    p: usize,
) -> (f64, usize) {
    let num_actions = transitions.num_actions;
    let mut best_val = f64::NEG_INFINITY;
    let mut best_action = p;
    for cand in transitions.candidates(s, p) {
        let mut sum = 0.0;
        for o in &cand.outcomes {
            let v = next_values[state_index(o.next_inventory, cand.action, num_actions)];
            sum += o.prob * (o.revenue + discount * v);
        }
        if sum > best_val {
            best_val = sum;
            best_action = cand.action;
        }
    }
    (best_val, best_action)
}

/// Generic backward induction from `terminal` values over `time_steps` periods.
///
/// Returns period tables in forward order: index 0 is the first selling period.
pub fn backward_induction(
    transitions: &TransitionTable,
    terminal: &[f64],
    discount: f64,
    time_steps: usize,
) -> Result<Vec<PeriodTable>> {
    let num_actions = transitions.num_actions;
    if terminal.len() != transitions.num_states() {
        return Err(PricingError::invalid(format!(
            "terminal table has {} states, expected {}",
            terminal.len(),
            transitions.num_states()
        )));
    }

    let mut periods: Vec<PeriodTable> = Vec::with_capacity(time_steps);
    let mut next_values = terminal.to_vec();

    for t in (0..time_steps).rev() {
        let period_start = Instant::now();
        let (values, policy): (Vec<f64>, Vec<usize>) = (0..transitions.num_states())
            .into_par_iter()
            .map(|idx| {
                solve_state(
                    transitions,
                    &next_values,
                    discount,
                    idx / num_actions,
                    idx % num_actions,
                )
            })
            .unzip();

        let table = PeriodTable::from_parts(num_actions, values, policy);
        table.check_finite(t)?;
        debug!(
            period = t,
            elapsed_ms = %format!("{:.3}", period_start.elapsed().as_secs_f64() * 1000.0),
            "scalar period solved"
        );
        next_values.clone_from_slice(table.values());
        periods.push(table);
    }

    periods.reverse();
    Ok(periods)
}

/// Solve a clearance problem with the scalar engine (zero terminal value).
pub fn solve_scalar(problem: &ClearanceProblem) -> Result<PolicySchedule> {
    problem.validate()?;
    let transitions = TransitionTable::build(problem.init_inv(), problem.elasticity())?;
    let terminal = vec![0.0; problem.num_states()];
    let periods = backward_induction(
        &transitions,
        &terminal,
        problem.discount(),
        problem.time_steps(),
    )?;
    Ok(PolicySchedule::new(
        problem.init_inv(),
        problem.num_actions(),
        periods,
    ))
}
