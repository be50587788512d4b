//! Explicit transition/reward table for the scalar engine.
//!
//! For every state (s, p) and every permissible next action p1 ≥ p, lists the
//! demand outcomes d = 0..=s as `(next_inventory, probability, revenue)`:
//! - d < s: probability `pmf(d; rate(p1))`, revenue `d × price(p1)`
//! - d = s: probability `P(D ≥ s)` (stockout mass), revenue `s × price(p1)`
//!
//! The next state is always (s − d, p1). The table is stationary, so one table
//! serves every period of the horizon.

use rayon::prelude::*;

use crate::constants::*;
use crate::demand::demand_models;
use crate::error::{PricingError, Result};
use crate::types::ElasticityTable;

/// A single demand outcome under a chosen action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    pub next_inventory: usize,
    pub prob: f64,
    pub revenue: f64,
}

/// All outcomes of choosing `action` from a given state.
#[derive(Debug, Clone)]
pub struct ActionTransitions {
    pub action: usize,
    pub outcomes: Vec<Outcome>,
}

/// Dense table indexed by `state_index(s, p)`, candidates in ascending p1 order.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    pub init_inv: usize,
    pub num_actions: usize,
    entries: Vec<Vec<ActionTransitions>>,
}

impl TransitionTable {
    /// Build the table for inventories 0..=init_inv.
    pub fn build(init_inv: usize, elasticity: &ElasticityTable) -> Result<Self> {
        let num_actions = elasticity.len();
        let models = demand_models(&elasticity.rates())?;
        let prices = elasticity.prices();

        // outcome_probs[p1][s] = probabilities of d = 0..=s under action p1.
        let outcome_probs: Vec<Vec<Vec<f64>>> = models
            .par_iter()
            .map(|m| {
                (0..=init_inv)
                    .map(|s| m.outcome_probabilities(s))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        for (p1, per_inv) in outcome_probs.iter().enumerate() {
            for (s, probs) in per_inv.iter().enumerate() {
                let total: f64 = probs.iter().sum();
                if !is_approx_eq(total, 1.0) {
                    return Err(PricingError::numeric(format!(
                        "outcome mass {total} != 1 at inventory {s}, action {p1}"
                    )));
                }
            }
        }

        let entries: Vec<Vec<ActionTransitions>> = (0..num_states(init_inv, num_actions))
            .into_par_iter()
            .map(|idx| {
                let s = idx / num_actions;
                let p = idx % num_actions;
                (p..num_actions)
                    .map(|p1| ActionTransitions {
                        action: p1,
                        outcomes: outcome_probs[p1][s]
                            .iter()
                            .enumerate()
                            .map(|(d, &prob)| Outcome {
                                next_inventory: s - d,
                                prob,
                                revenue: d as f64 * prices[p1],
                            })
                            .collect(),
                    })
                    .collect()
            })
            .collect();

        Ok(Self {
            init_inv,
            num_actions,
            entries,
        })
    }

    /// Candidate actions and their outcomes for state (s, p).
    #[inline(always)]
    pub fn candidates(&self, s: usize, p: usize) -> &[ActionTransitions] {
        &self.entries[state_index(s, p, self.num_actions)]
    }

    pub fn num_states(&self) -> usize {
        self.entries.len()
    }
}
