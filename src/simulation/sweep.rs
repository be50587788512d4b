//! Parameter sweeps: performance across initial inventories and the
//! optimal-price heatmap over (inventory, horizon).
//!
//! Both sweeps solve the DP once at the largest parameters. States with less
//! inventory only transition to states with even less, so the table for a
//! smaller initial inventory is a sub-table of the larger one. Transitions are
//! stationary, so the first period of a horizon-h problem is period H − h of a
//! horizon-H problem.

use serde::Serialize;
use tracing::info;

use crate::error::{PricingError, Result};
use crate::state_computation::{solve, Engine};
use crate::types::{ClearanceProblem, ElasticityTable};

use super::engine::TraceSimulator;
use super::statistics::summarize;

/// Revenue split for one initial inventory, in percent of initial value.
#[derive(Clone, Debug, Serialize)]
pub struct SweepPoint {
    pub init_inv: usize,
    pub optimal_value: f64,
    pub revenue_pct: f64,
    pub a_markdown_pct: f64,
    pub salvage_pct: f64,
}

/// Simulate the optimal policy from each initial inventory.
pub fn inventory_sweep(
    time_steps: usize,
    inventories: &[usize],
    elasticity: &ElasticityTable,
    num_traces: usize,
    seed: u64,
    engine: Engine,
) -> Result<Vec<SweepPoint>> {
    let max_inv = match inventories.iter().max() {
        Some(&m) => m,
        None => return Err(PricingError::invalid("no inventories to sweep")),
    };
    if inventories.contains(&0) {
        return Err(PricingError::invalid("swept inventories must be positive"));
    }
    let problem = ClearanceProblem::new(time_steps as i64, max_inv as i64, elasticity.clone())?;
    let schedule = solve(&problem, engine)?;

    inventories
        .iter()
        .map(|&inv| {
            let sim = TraceSimulator::new(&schedule, elasticity, inv)?;
            let traces = sim.simulate_batch(num_traces, seed);
            let optimal_value = schedule.value(0, inv, 0).unwrap_or(0.0);
            let summary = summarize(&traces, inv, optimal_value)?;
            info!(
                init_inv = inv,
                revenue = %format!("{:.4}", summary.mean_revenue),
                salvage = %format!("{:.4}", summary.mean_salvage),
                "sweep point"
            );
            Ok(SweepPoint {
                init_inv: inv,
                optimal_value,
                revenue_pct: summary.mean_revenue * 100.0,
                a_markdown_pct: summary.mean_a_markdown * 100.0,
                salvage_pct: summary.mean_salvage * 100.0,
            })
        })
        .collect()
}

/// Optimal first-period price for every (inventory, horizon) pair.
#[derive(Clone, Debug, Serialize)]
pub struct PriceHeatmap {
    /// Column labels: horizons 1..=max_horizon.
    pub horizons: Vec<usize>,
    /// Row labels: inventories 1..=max_inv.
    pub inventories: Vec<usize>,
    /// `prices[i][h]` for inventory `inventories[i]`, horizon `horizons[h]`.
    pub prices: Vec<Vec<f64>>,
}

impl PriceHeatmap {
    pub fn price(&self, inventory: usize, horizon: usize) -> Option<f64> {
        if inventory == 0 || horizon == 0 {
            return None;
        }
        self.prices
            .get(inventory - 1)
            .and_then(|row| row.get(horizon - 1))
            .copied()
    }
}

/// Build the optimal-price heatmap from a single solve at (max_horizon, max_inv).
pub fn price_heatmap(
    max_horizon: usize,
    max_inv: usize,
    elasticity: &ElasticityTable,
    engine: Engine,
) -> Result<PriceHeatmap> {
    if max_inv == 0 {
        return Err(PricingError::invalid("heatmap needs max_inv >= 1"));
    }
    let problem = ClearanceProblem::new(max_horizon as i64, max_inv as i64, elasticity.clone())?;
    let schedule = solve(&problem, engine)?;

    let horizons: Vec<usize> = (1..=max_horizon).collect();
    let inventories: Vec<usize> = (1..=max_inv).collect();
    let prices = inventories
        .iter()
        .map(|&inv| {
            horizons
                .iter()
                .map(|&h| {
                    let action = schedule.action(max_horizon - h, inv, 0).unwrap_or(0);
                    elasticity.action(action).price()
                })
                .collect()
        })
        .collect();

    Ok(PriceHeatmap {
        horizons,
        inventories,
        prices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elasticity() -> ElasticityTable {
        ElasticityTable::from_pairs(&[(0.3, 0.5), (0.5, 1.1), (0.7, 1.4)]).unwrap()
    }

    #[test]
    fn test_heatmap_matches_direct_solves() {
        let el = elasticity();
        let heat = price_heatmap(4, 5, &el, Engine::Batched).unwrap();
        assert_eq!(heat.prices.len(), 5);
        assert_eq!(heat.prices[0].len(), 4);
        for inv in 1..=5 {
            for h in 1..=4 {
                let p = ClearanceProblem::new(h as i64, inv as i64, el.clone()).unwrap();
                let sched = solve(&p, Engine::Scalar).unwrap();
                let expected = el.action(sched.initial_action()).price();
                assert_eq!(heat.price(inv, h), Some(expected), "inv={inv} h={h}");
            }
        }
        assert_eq!(heat.price(0, 1), None);
    }

    #[test]
    fn test_sweep_fractions_add_up() {
        let el = elasticity();
        let points = inventory_sweep(6, &[2, 6, 10], &el, 500, 3, Engine::Batched).unwrap();
        assert_eq!(points.len(), 3);
        for pt in &points {
            let total = pt.revenue_pct + pt.a_markdown_pct + pt.salvage_pct;
            assert!((total - 100.0).abs() < 1e-9, "total={total}");
            assert!(pt.salvage_pct >= 0.0 && pt.revenue_pct >= 0.0);
        }
        // More stock to clear in the same season leaves more unsold on average.
        assert!(points[2].salvage_pct > points[0].salvage_pct);
    }

    #[test]
    fn test_sweep_rejects_empty_or_zero() {
        let el = elasticity();
        assert!(inventory_sweep(3, &[], &el, 10, 0, Engine::Scalar).is_err());
        assert!(inventory_sweep(3, &[0, 2], &el, 10, 0, Engine::Scalar).is_err());
    }
}
