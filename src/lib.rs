//! # Clearance Pricing — Optimal Markdown Policy Solver
//!
//! Computes the optimal dynamic markdown policy for selling a fixed,
//! non-replenishable inventory over a finite horizon, using **backward
//! induction** over states (remaining inventory, current markdown index) with
//! Poisson demand.
//!
//! ## Algorithm overview
//!
//! | Step | Rust module | Description |
//! |------|-------------|-------------|
//! | 0 | [`types`], [`demand`] | Validate the problem; build one Poisson demand model per price action |
//! | 1 | [`transitions`] / [`batched_solver::BatchedTensors`] | Stationary transition/reward structure (explicit table or dense tensors) |
//! | 2 | [`scalar_solver`] / [`batched_solver`] | Backward induction from period T−1 down to 0 against a zero terminal value |
//! | 3 | [`simulation`] | Trace simulation, performance summaries, sweeps, heatmaps |
//!
//! [`state_computation::solve`] is the entry point for step 2 and dispatches to
//! either engine; the two produce identical tables.
//!
//! ## Model
//!
//! - Demand in a period under action p1 is D ~ Poisson(rate(p1)).
//! - Revenue is `min(D, s) × (1 − markdown(p1))`; demand at or above `s`
//!   collapses into a single stockout outcome with probability P(D ≥ s).
//! - Markdowns are irreversible: from floor p only actions p1 ≥ p are allowed.
//! - Unsold stock at the end of the horizon is worth 0.
//!
//! ## State representation
//!
//! Flat index: `state_index(s, p) = s * num_actions + p`, giving
//! `(init_inv + 1) × num_actions` dense slots per period.

#![allow(clippy::needless_range_loop)]

pub mod batched_solver;
pub mod constants;
pub mod demand;
pub mod env_config;
pub mod error;
pub mod scalar_solver;
pub mod simulation;
pub mod state_computation;
pub mod transitions;
pub mod types;

pub use error::{PricingError, Result};
pub use state_computation::{solve, Engine};
pub use types::{
    ClearanceProblem, ElasticityTable, PeriodTable, PolicySchedule, PriceAction, PricingState,
};
