//! Numeric constants and dense state-indexing functions.
//!
//! A pricing state is S = (s, p) where:
//! - `s` ∈ [0, init_inv]: remaining inventory
//! - `p` ∈ [0, num_actions): index of the most aggressive markdown applied so far
//!
//! Flat index: `state_index(s, p, num_actions) = s * num_actions + p`, so all
//! price variants of the same inventory level are contiguous. Both engines and
//! every [`crate::types::PeriodTable`] use this layout.

/// Absolute tolerance for value-function and probability comparisons.
pub const EPSILON: f64 = 1e-8;

/// Full (unmarked) price. Prices are `FULL_PRICE - markdown`.
pub const FULL_PRICE: f64 = 1.0;

/// Default scale of the exponential demand curve `alpha * exp(-beta * price)`.
pub const DEFAULT_ALPHA: f64 = 1.0;

/// Default price sensitivity of the exponential demand curve.
pub const DEFAULT_BETA: f64 = 5.0;

/// Default number of price steps used by the binaries.
pub const DEFAULT_NUM_PRICES: usize = 50;

/// Default selling horizon used by the binaries.
pub const DEFAULT_TIME_STEPS: usize = 20;

/// Default initial inventory used by the binaries.
pub const DEFAULT_INIT_INV: usize = 18;

/// Approximate equality with absolute tolerance [`EPSILON`].
#[inline(always)]
pub fn is_approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}

/// Flat index for state (s, p).
#[inline(always)]
pub fn state_index(inventory: usize, action: usize, num_actions: usize) -> usize {
    inventory * num_actions + action
}

/// Number of dense state slots for a problem.
#[inline(always)]
pub fn num_states(init_inv: usize, num_actions: usize) -> usize {
    (init_inv + 1) * num_actions
}
