//! Backward induction driver: compute the optimal value function and policy
//! for every period and every (s, p) state.
//!
//! Dispatches to one of two engines that implement the same recursion:
//! [`Engine::Scalar`] walks the explicit transition table, [`Engine::Batched`]
//! uses whole-array arithmetic. Both start from a zero terminal value at period
//! `time_steps` and proceed to period 0, each period reading only the finalized
//! table of the period after it.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

use crate::batched_solver::solve_batched;
use crate::error::{PricingError, Result};
use crate::scalar_solver::solve_scalar;
use crate::types::{ClearanceProblem, PolicySchedule};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Scalar,
    #[default]
    Batched,
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::Scalar => write!(f, "scalar"),
            Engine::Batched => write!(f, "batched"),
        }
    }
}

impl FromStr for Engine {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "scalar" => Ok(Engine::Scalar),
            "batched" | "vectorized" => Ok(Engine::Batched),
            other => Err(PricingError::invalid(format!(
                "unknown engine '{other}' (expected scalar or batched)"
            ))),
        }
    }
}

/// Compute the policy schedule for a problem with the chosen engine.
pub fn solve(problem: &ClearanceProblem, engine: Engine) -> Result<PolicySchedule> {
    let start = Instant::now();
    let schedule = match engine {
        Engine::Scalar => solve_scalar(problem)?,
        Engine::Batched => solve_batched(problem)?,
    };
    let elapsed = start.elapsed().as_secs_f64();
    info!(
        %engine,
        time_steps = problem.time_steps(),
        init_inv = problem.init_inv(),
        num_actions = problem.num_actions(),
        states_per_period = problem.num_states(),
        initial_value = %format!("{:.6}", schedule.initial_value()),
        elapsed_s = %format!("{:.4}", elapsed),
        "policy computed"
    );
    Ok(schedule)
}

/// Side-by-side result of both engines on the same problem.
pub struct EngineComparison {
    pub scalar: PolicySchedule,
    pub batched: PolicySchedule,
    pub scalar_time: Duration,
    pub batched_time: Duration,
    pub max_abs_diff: f64,
    pub same_policy: bool,
}

/// Run both engines and compare their tables.
pub fn compare_engines(problem: &ClearanceProblem) -> Result<EngineComparison> {
    let t0 = Instant::now();
    let scalar = solve(problem, Engine::Scalar)?;
    let scalar_time = t0.elapsed();

    let t1 = Instant::now();
    let batched = solve(problem, Engine::Batched)?;
    let batched_time = t1.elapsed();

    let max_abs_diff = scalar
        .max_abs_diff(&batched)
        .ok_or_else(|| PricingError::numeric("engine outputs differ in shape"))?;
    let same_policy = scalar.same_policy(&batched);
    Ok(EngineComparison {
        scalar,
        batched,
        scalar_time,
        batched_time,
        max_abs_diff,
        same_policy,
    })
}
