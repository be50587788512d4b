//! Vectorized engine: the same Bellman recursion as [`crate::scalar_solver`],
//! computed with whole-array operations per period.
//!
//! Arrays are indexed `[s, d, a]` (starting inventory, demand, action), with
//! S = init_inv + 1 inventory levels and demand truncated at S − 1:
//!
//! | Array | Shape | Content |
//! |-------|-------|---------|
//! | `next_inv` | S × S | `s − d` (clamped at 0 for d > s, where prob is 0) |
//! | `units_sold` | S × S | `d` for d ≤ s, else 0 |
//! | `prob` | S × S × A | `pmf(d)` for d < s, stockout mass for d = s, 0 for d > s |
//! | `reward` | S × S × A | `units_sold × price(a)` |
//!
//! Per period, `q[s, a] = Σ_d prob · (reward + γ · V_{t+1}[next_inv, a])`, then
//! `V_t(s, p) = max_{a ≥ p} q[s, a]` via a suffix scan over the action axis.
//!
//! The demand sum is accumulated slice by slice in ascending d, the same order
//! the scalar engine uses, and the suffix scan keeps the smallest maximizing
//! index. The two engines therefore produce identical tables.

use std::time::Instant;

use ndarray::{Array2, Array3, Axis, Zip};
use tracing::debug;

use crate::demand::{check_probability, demand_models};
use crate::error::Result;
use crate::types::{ClearanceProblem, ElasticityTable, PeriodTable, PolicySchedule};

/// Stationary arrays shared by every period.
pub struct BatchedTensors {
    pub next_inv: Array2<usize>,
    pub prob: Array3<f64>,
    pub reward: Array3<f64>,
}

impl BatchedTensors {
    pub fn build(init_inv: usize, elasticity: &ElasticityTable) -> Result<Self> {
        let n = init_inv + 1;
        let na = elasticity.len();
        let models = demand_models(&elasticity.rates())?;

        let next_inv = Array2::from_shape_fn((n, n), |(s, d)| s.saturating_sub(d));
        let units_sold = Array2::from_shape_fn((n, n), |(s, d)| if d <= s { d as f64 } else { 0.0 });
        let below = Array2::from_shape_fn((n, n), |(s, d)| if d < s { 1.0 } else { 0.0 });
        let at = Array2::from_shape_fn((n, n), |(s, d)| if d == s { 1.0 } else { 0.0 });

        // pmf[d, a] and stockout[s, a]
        let mut pmf = Array2::<f64>::zeros((n, na));
        let mut stockout = Array2::<f64>::zeros((n, na));
        for (a, m) in models.iter().enumerate() {
            for k in 0..n {
                pmf[[k, a]] = check_probability(m.pmf(k))?;
                stockout[[k, a]] = check_probability(m.stockout_mass(k))?;
            }
        }

        let prices = ndarray::Array1::from(elasticity.prices());

        // Broadcast: [s, d, 1] × [1, d, a] + [s, d, 1] × [s, 1, a]
        let below3 = below.insert_axis(Axis(2));
        let at3 = at.insert_axis(Axis(2));
        let pmf3 = pmf.insert_axis(Axis(0));
        let stock3 = stockout.insert_axis(Axis(1));
        let prob = &below3 * &pmf3 + &at3 * &stock3;

        let reward = &units_sold.insert_axis(Axis(2)) * &prices.insert_axis(Axis(0)).insert_axis(Axis(0));

        Ok(Self {
            next_inv,
            prob,
            reward,
        })
    }

    /// Expected value of every (state, action) pair against next-period values.
    pub fn q_values(&self, next_values: &Array2<f64>, discount: f64) -> Array2<f64> {
        let (n, _, na) = self.prob.dim();
        let next_val = Array3::from_shape_fn((n, n, na), |(s, d, a)| {
            next_values[[self.next_inv[[s, d]], a]]
        });
        let terms = &self.prob * &(&self.reward + &(next_val * discount));

        let mut q = Array2::<f64>::zeros((n, na));
        for d in 0..n {
            q += &terms.index_axis(Axis(1), d);
        }
        q
    }
}

/// Constrained max over actions: `values[s, p] = max_{a ≥ p} q[s, a]` with the
/// smallest maximizing index as the policy.
pub fn monotone_max(q: &Array2<f64>) -> (Array2<f64>, Array2<usize>) {
    let (n, na) = q.dim();
    let mut values = Array2::<f64>::zeros((n, na));
    let mut policy = Array2::<usize>::zeros((n, na));

    Zip::from(q.rows())
        .and(values.rows_mut())
        .and(policy.rows_mut())
        .par_for_each(|q_row, mut v_row, mut pol_row| {
            let mut best = na - 1;
            for p in (0..na).rev() {
                if q_row[p] >= q_row[best] {
                    best = p;
                }
                v_row[p] = q_row[best];
                pol_row[p] = best;
            }
        });

    (values, policy)
}

/// Solve a clearance problem with the vectorized engine (zero terminal value).
pub fn solve_batched(problem: &ClearanceProblem) -> Result<PolicySchedule> {
    problem.validate()?;
    let tensors = BatchedTensors::build(problem.init_inv(), problem.elasticity())?;
    let n = problem.init_inv() + 1;
    let na = problem.num_actions();

    let mut periods: Vec<PeriodTable> = Vec::with_capacity(problem.time_steps());
    let mut vf = Array2::<f64>::zeros((n, na));

    for t in (0..problem.time_steps()).rev() {
        let period_start = Instant::now();
        let q = tensors.q_values(&vf, problem.discount());
        let (vf_new, pol) = monotone_max(&q);

        let table = PeriodTable::from_parts(
            na,
            vf_new.iter().copied().collect(),
            pol.iter().copied().collect(),
        );
        table.check_finite(t)?;
        debug!(
            period = t,
            elapsed_ms = %format!("{:.3}", period_start.elapsed().as_secs_f64() * 1000.0),
            "batched period solved"
        );
        periods.push(table);
        vf = vf_new;
    }

    periods.reverse();
    Ok(PolicySchedule::new(problem.init_inv(), na, periods))
}
