//! Trace simulation engine. Plays out selling seasons under an optimal policy.
//!
//! Each period reads the policy table for the current (s, p) state, sells at
//! the chosen price, draws Poisson demand for that action, and moves to
//! (max(0, s − demand), action). Unsold stock at the end is salvage.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

use crate::constants::state_index;
use crate::demand::{demand_models, DemandModel};
use crate::error::{PricingError, Result};
use crate::types::{ElasticityTable, PolicySchedule};

/// One simulated selling season.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Trace {
    /// Total revenue in units of full price.
    pub revenue: f64,
    /// Remaining inventory after each period.
    pub remaining: Vec<usize>,
    /// Action index chosen in each period.
    pub actions: Vec<usize>,
    /// Markdown fraction applied in each period.
    pub markdowns: Vec<f64>,
    /// Selling price in each period.
    pub prices: Vec<f64>,
}

impl Trace {
    /// Inventory left after the last period.
    pub fn salvage(&self) -> usize {
        self.remaining.last().copied().unwrap_or(0)
    }
}

/// Simulates traces for one schedule, elasticity table, and starting inventory.
pub struct TraceSimulator<'a> {
    schedule: &'a PolicySchedule,
    elasticity: &'a ElasticityTable,
    models: Vec<DemandModel>,
    init_inv: usize,
}

impl<'a> TraceSimulator<'a> {
    pub fn new(
        schedule: &'a PolicySchedule,
        elasticity: &'a ElasticityTable,
        init_inv: usize,
    ) -> Result<Self> {
        if elasticity.len() != schedule.num_actions {
            return Err(PricingError::invalid(format!(
                "elasticity table has {} actions, schedule has {}",
                elasticity.len(),
                schedule.num_actions
            )));
        }
        if init_inv > schedule.init_inv {
            return Err(PricingError::invalid(format!(
                "initial inventory {init_inv} exceeds schedule bound {}",
                schedule.init_inv
            )));
        }
        Ok(Self {
            schedule,
            elasticity,
            models: demand_models(&elasticity.rates())?,
            init_inv,
        })
    }

    pub fn init_inv(&self) -> usize {
        self.init_inv
    }

    /// Simulate one season from (init_inv, 0).
    pub fn simulate<R: Rng + ?Sized>(&self, rng: &mut R) -> Trace {
        let time_steps = self.schedule.time_steps();
        let na = self.schedule.num_actions;
        let mut trace = Trace {
            remaining: Vec::with_capacity(time_steps),
            actions: Vec::with_capacity(time_steps),
            markdowns: Vec::with_capacity(time_steps),
            prices: Vec::with_capacity(time_steps),
            ..Trace::default()
        };

        let (mut s, mut p) = (self.init_inv, 0usize);
        for table in self.schedule.periods() {
            let action = table.policy()[state_index(s, p, na)];
            let price_action = self.elasticity.action(action);
            let demand = self.models[action].sample(rng);
            let sold = demand.min(s);

            trace.revenue += sold as f64 * price_action.price();
            s -= sold;
            p = action;

            trace.remaining.push(s);
            trace.actions.push(action);
            trace.markdowns.push(price_action.markdown);
            trace.prices.push(price_action.price());
        }
        trace
    }

    /// Simulate N traces in parallel; trace i uses seed `seed + i`.
    pub fn simulate_batch(&self, num_traces: usize, seed: u64) -> Vec<Trace> {
        (0..num_traces)
            .into_par_iter()
            .map(|i| {
                let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(i as u64));
                self.simulate(&mut rng)
            })
            .collect()
    }
}

/// Simulate one trace with a seeded RNG.
pub fn simulate_trace(
    schedule: &PolicySchedule,
    elasticity: &ElasticityTable,
    init_inv: usize,
    seed: u64,
) -> Result<Trace> {
    let sim = TraceSimulator::new(schedule, elasticity, init_inv)?;
    let mut rng = SmallRng::seed_from_u64(seed);
    Ok(sim.simulate(&mut rng))
}

/// Simulate N traces in parallel.
pub fn simulate_batch(
    schedule: &PolicySchedule,
    elasticity: &ElasticityTable,
    init_inv: usize,
    num_traces: usize,
    seed: u64,
) -> Result<Vec<Trace>> {
    let sim = TraceSimulator::new(schedule, elasticity, init_inv)?;
    Ok(sim.simulate_batch(num_traces, seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_computation::{solve, Engine};
    use crate::types::ClearanceProblem;

    fn setup() -> (PolicySchedule, ElasticityTable) {
        let el = ElasticityTable::from_pairs(&[(0.0, 0.5), (0.3, 1.2), (0.6, 2.5)]).unwrap();
        let problem = ClearanceProblem::new(6, 8, el.clone()).unwrap();
        (solve(&problem, Engine::Batched).unwrap(), el)
    }

    #[test]
    fn test_trace_invariants() {
        let (sched, el) = setup();
        let sim = TraceSimulator::new(&sched, &el, 8).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..200 {
            let trace = sim.simulate(&mut rng);
            assert_eq!(trace.remaining.len(), 6);
            let mut prev_inv = 8;
            let mut prev_action = 0;
            for t in 0..6 {
                assert!(trace.remaining[t] <= prev_inv);
                assert!(trace.actions[t] >= prev_action);
                prev_inv = trace.remaining[t];
                prev_action = trace.actions[t];
            }
            let sold = 8 - trace.salvage();
            assert!(trace.revenue <= sold as f64 + 1e-12);
        }
    }

    #[test]
    fn test_same_seed_same_trace() {
        let (sched, el) = setup();
        let a = simulate_trace(&sched, &el, 8, 123).unwrap();
        let b = simulate_trace(&sched, &el, 8, 123).unwrap();
        assert_eq!(a.remaining, b.remaining);
        assert_eq!(a.actions, b.actions);
        assert_eq!(a.revenue, b.revenue);
    }

    #[test]
    fn test_rejects_mismatched_inputs() {
        let (sched, el) = setup();
        assert!(TraceSimulator::new(&sched, &el, 9).is_err());
        let other = ElasticityTable::from_pairs(&[(0.0, 1.0)]).unwrap();
        assert!(TraceSimulator::new(&sched, &other, 4).is_err());
    }

    #[test]
    fn test_mean_revenue_tracks_optimal_value() {
        let (sched, el) = setup();
        let traces = simulate_batch(&sched, &el, 8, 20_000, 42).unwrap();
        let mean = traces.iter().map(|t| t.revenue).sum::<f64>() / traces.len() as f64;
        let expected = sched.initial_value();
        assert!(
            (mean - expected).abs() < 0.05 * expected.max(1.0),
            "mean={mean} expected={expected}"
        );
    }
}
