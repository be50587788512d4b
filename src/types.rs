//! Core data structures: price actions, problem definition, and DP result tables.
//!
//! The central output type is [`PolicySchedule`], one [`PeriodTable`] per period
//! holding the optimal value-to-go and the optimal action for every dense state
//! (s, p). It is produced once by either engine and never mutated afterwards.

use serde::Serialize;

use crate::constants::*;
use crate::error::{PricingError, Result};

/// One selectable price: a markdown fraction and the Poisson demand rate it induces.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PriceAction {
    pub markdown: f64,
    pub rate: f64,
}

impl PriceAction {
    pub fn new(markdown: f64, rate: f64) -> Self {
        Self { markdown, rate }
    }

    /// Selling price as a fraction of full price.
    #[inline(always)]
    pub fn price(&self) -> f64 {
        FULL_PRICE - self.markdown
    }
}

/// Ordered price/elasticity table. Index 0 is the smallest markdown.
///
/// The order is caller-supplied and never re-sorted. Action indices double as
/// the markdown floor tracked in the state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ElasticityTable {
    actions: Vec<PriceAction>,
}

impl ElasticityTable {
    /// Validate and wrap a list of actions.
    pub fn new(actions: Vec<PriceAction>) -> Result<Self> {
        if actions.is_empty() {
            return Err(PricingError::invalid("elasticity table is empty"));
        }
        for (i, a) in actions.iter().enumerate() {
            if !a.markdown.is_finite() || a.markdown < 0.0 || a.markdown >= 1.0 {
                return Err(PricingError::invalid(format!(
                    "action {i}: markdown {} outside [0, 1)",
                    a.markdown
                )));
            }
            if !a.rate.is_finite() || a.rate < 0.0 {
                return Err(PricingError::invalid(format!(
                    "action {i}: demand rate {} must be finite and >= 0",
                    a.rate
                )));
            }
        }
        Ok(Self { actions })
    }

    /// Build from `(markdown, rate)` pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self> {
        Self::new(pairs.iter().map(|&(m, r)| PriceAction::new(m, r)).collect())
    }

    /// Exponential demand curve over an evenly spaced price grid.
    ///
    /// Prices run from full price down to zero in `n_prices` steps:
    /// `p_k = 1 - k / n_prices`, action k = (1 - p_k, alpha * e^(-beta * p_k)).
    /// The zero-price endpoint has markdown 1.0, which falls outside the
    /// selectable range, so it is dropped: the table has `n_prices` actions.
    pub fn exponential(n_prices: usize, alpha: f64, beta: f64) -> Result<Self> {
        if n_prices == 0 {
            return Err(PricingError::invalid("n_prices must be positive"));
        }
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(PricingError::invalid(format!(
                "alpha {alpha} must be finite and >= 0"
            )));
        }
        if !beta.is_finite() {
            return Err(PricingError::invalid(format!("beta {beta} must be finite")));
        }
        let actions = (0..n_prices)
            .map(|k| {
                let price = FULL_PRICE - k as f64 / n_prices as f64;
                PriceAction::new(FULL_PRICE - price, alpha * (-beta * price).exp())
            })
            .collect();
        Self::new(actions)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    #[inline(always)]
    pub fn action(&self, p: usize) -> &PriceAction {
        &self.actions[p]
    }

    pub fn actions(&self) -> &[PriceAction] {
        &self.actions
    }

    pub fn prices(&self) -> Vec<f64> {
        self.actions.iter().map(PriceAction::price).collect()
    }

    pub fn rates(&self) -> Vec<f64> {
        self.actions.iter().map(|a| a.rate).collect()
    }
}

/// A clearance problem: horizon, starting stock, price menu, and discount.
///
/// Only constructible through [`ClearanceProblem::new`]; both engines call
/// [`ClearanceProblem::validate`] again before allocating any table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClearanceProblem {
    pub(crate) time_steps: usize,
    pub(crate) init_inv: usize,
    pub(crate) elasticity: ElasticityTable,
    pub(crate) discount: f64,
}

impl ClearanceProblem {
    /// Validate the horizon and inventory. Non-positive `time_steps` or negative
    /// `init_inv` is an `InvalidParameter`.
    pub fn new(time_steps: i64, init_inv: i64, elasticity: ElasticityTable) -> Result<Self> {
        if time_steps <= 0 {
            return Err(PricingError::invalid(format!(
                "time_steps must be positive, got {time_steps}"
            )));
        }
        if init_inv < 0 {
            return Err(PricingError::invalid(format!(
                "init_inv must be non-negative, got {init_inv}"
            )));
        }
        if elasticity.is_empty() {
            return Err(PricingError::invalid("elasticity table is empty"));
        }
        Ok(Self {
            time_steps: time_steps as usize,
            init_inv: init_inv as usize,
            elasticity,
            discount: 1.0,
        })
    }

    /// Discount applied to the value-to-go of the next period, in (0, 1].
    pub fn with_discount(mut self, discount: f64) -> Result<Self> {
        check_discount(discount)?;
        self.discount = discount;
        Ok(self)
    }

    /// Re-check the invariants established by `new` and `with_discount`.
    pub fn validate(&self) -> Result<()> {
        if self.time_steps == 0 {
            return Err(PricingError::invalid("time_steps must be positive, got 0"));
        }
        if self.elasticity.is_empty() {
            return Err(PricingError::invalid("elasticity table is empty"));
        }
        check_discount(self.discount)
    }

    pub fn time_steps(&self) -> usize {
        self.time_steps
    }

    pub fn init_inv(&self) -> usize {
        self.init_inv
    }

    pub fn elasticity(&self) -> &ElasticityTable {
        &self.elasticity
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }

    #[inline(always)]
    pub fn num_actions(&self) -> usize {
        self.elasticity.len()
    }

    #[inline(always)]
    pub fn num_states(&self) -> usize {
        num_states(self.init_inv, self.num_actions())
    }
}

fn check_discount(discount: f64) -> Result<()> {
    if !discount.is_finite() || discount <= 0.0 || discount > 1.0 {
        return Err(PricingError::invalid(format!(
            "discount {discount} outside (0, 1]"
        )));
    }
    Ok(())
}

/// State S = (s, p): remaining inventory and current markdown floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct PricingState {
    pub inventory: usize,
    pub action: usize,
}

impl PricingState {
    pub fn new(inventory: usize, action: usize) -> Self {
        Self { inventory, action }
    }
}

/// Value-to-go and optimal action for every state of one period.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PeriodTable {
    num_actions: usize,
    values: Vec<f64>,
    policy: Vec<usize>,
}

impl PeriodTable {
    pub(crate) fn from_parts(num_actions: usize, values: Vec<f64>, policy: Vec<usize>) -> Self {
        debug_assert_eq!(values.len(), policy.len());
        Self {
            num_actions,
            values,
            policy,
        }
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    /// Largest inventory level covered by the table.
    pub fn max_inventory(&self) -> usize {
        self.values.len() / self.num_actions - 1
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn policy(&self) -> &[usize] {
        &self.policy
    }

    fn index(&self, s: usize, p: usize) -> Option<usize> {
        if p >= self.num_actions || s > self.max_inventory() {
            return None;
        }
        Some(state_index(s, p, self.num_actions))
    }

    pub fn value(&self, s: usize, p: usize) -> Option<f64> {
        self.index(s, p).map(|i| self.values[i])
    }

    pub fn action(&self, s: usize, p: usize) -> Option<usize> {
        self.index(s, p).map(|i| self.policy[i])
    }

    /// Fail on the first non-finite value so corruption never reaches earlier periods.
    pub fn check_finite(&self, period: usize) -> Result<()> {
        match self.values.iter().position(|v| !v.is_finite()) {
            None => Ok(()),
            Some(i) => Err(PricingError::numeric(format!(
                "non-finite value {} at period {period}, inventory {}, action {}",
                self.values[i],
                i / self.num_actions,
                i % self.num_actions
            ))),
        }
    }

    /// `(value, action)` for a state.
    pub fn get(&self, state: PricingState) -> Option<(f64, usize)> {
        self.index(state.inventory, state.action)
            .map(|i| (self.values[i], self.policy[i]))
    }
}

/// Optimal value function and policy for periods `0..time_steps`.
///
/// Period `time_steps` (terminal) is implicit with value 0 for every state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PolicySchedule {
    pub init_inv: usize,
    pub num_actions: usize,
    periods: Vec<PeriodTable>,
}

impl PolicySchedule {
    /// Built only by the engines from a validated problem, so `periods` is
    /// non-empty and every table covers inventories `0..=init_inv`.
    pub(crate) fn new(init_inv: usize, num_actions: usize, periods: Vec<PeriodTable>) -> Self {
        debug_assert!(!periods.is_empty());
        debug_assert!(periods
            .iter()
            .all(|tab| tab.num_actions == num_actions && tab.max_inventory() == init_inv));
        Self {
            init_inv,
            num_actions,
            periods,
        }
    }

    pub fn time_steps(&self) -> usize {
        self.periods.len()
    }

    pub fn periods(&self) -> &[PeriodTable] {
        &self.periods
    }

    pub fn period(&self, t: usize) -> Option<&PeriodTable> {
        self.periods.get(t)
    }

    pub fn value(&self, t: usize, s: usize, p: usize) -> Option<f64> {
        self.period(t).and_then(|tab| tab.value(s, p))
    }

    pub fn action(&self, t: usize, s: usize, p: usize) -> Option<usize> {
        self.period(t).and_then(|tab| tab.action(s, p))
    }

    /// Optimal expected revenue from the initial state (init_inv, 0).
    ///
    /// Always present: a schedule has at least one period covering `init_inv`.
    pub fn initial_value(&self) -> f64 {
        self.value(0, self.init_inv, 0).unwrap_or(0.0)
    }

    /// Optimal first action from the initial state (init_inv, 0).
    pub fn initial_action(&self) -> usize {
        self.action(0, self.init_inv, 0).unwrap_or(0)
    }

    /// Largest absolute value difference against another schedule of the same shape.
    /// Returns `None` if the shapes differ.
    pub fn max_abs_diff(&self, other: &PolicySchedule) -> Option<f64> {
        if self.init_inv != other.init_inv
            || self.num_actions != other.num_actions
            || self.time_steps() != other.time_steps()
        {
            return None;
        }
        let diff = self
            .periods
            .iter()
            .zip(&other.periods)
            .flat_map(|(a, b)| a.values.iter().zip(&b.values))
            .map(|(x, y)| (x - y).abs())
            .fold(0.0f64, f64::max);
        Some(diff)
    }

    /// True if both schedules pick the same action in every period and state.
    pub fn same_policy(&self, other: &PolicySchedule) -> bool {
        self.time_steps() == other.time_steps()
            && self
                .periods
                .iter()
                .zip(&other.periods)
                .all(|(a, b)| a.policy == b.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_tables() {
        assert!(ElasticityTable::from_pairs(&[]).is_err());
        assert!(ElasticityTable::from_pairs(&[(1.0, 1.0)]).is_err());
        assert!(ElasticityTable::from_pairs(&[(-0.1, 1.0)]).is_err());
        assert!(ElasticityTable::from_pairs(&[(0.2, -1.0)]).is_err());
        assert!(ElasticityTable::from_pairs(&[(0.2, f64::NAN)]).is_err());
        assert!(ElasticityTable::from_pairs(&[(0.0, 0.0), (0.5, 2.0)]).is_ok());
    }

    #[test]
    fn test_rejects_bad_problems() {
        let el = ElasticityTable::from_pairs(&[(0.0, 1.0)]).unwrap();
        let err = ClearanceProblem::new(0, 5, el.clone()).unwrap_err();
        assert!(matches!(err, PricingError::InvalidParameter(_)));
        assert!(ClearanceProblem::new(-1, 5, el.clone()).is_err());
        assert!(ClearanceProblem::new(3, -1, el.clone()).is_err());
        assert!(ClearanceProblem::new(3, 0, el.clone()).is_ok());

        let p = ClearanceProblem::new(3, 2, el).unwrap();
        assert!(p.clone().with_discount(0.0).is_err());
        assert!(p.clone().with_discount(1.5).is_err());
        assert_eq!(p.with_discount(0.9).unwrap().discount, 0.9);
    }

    #[test]
    fn test_exponential_table_is_monotone() {
        let el = ElasticityTable::exponential(20, DEFAULT_ALPHA, DEFAULT_BETA).unwrap();
        assert_eq!(el.len(), 20);
        assert_eq!(el.action(0).markdown, 0.0);
        assert!(is_approx_eq(el.action(0).rate, (-5.0f64).exp()));
        for w in el.actions().windows(2) {
            assert!(w[1].markdown > w[0].markdown);
            assert!(w[1].rate > w[0].rate);
        }
        assert!(ElasticityTable::exponential(0, 1.0, 5.0).is_err());
    }

    #[test]
    fn test_period_table_bounds() {
        let tab = PeriodTable::from_parts(2, vec![0.0, 0.0, 1.0, 2.0], vec![0, 1, 1, 1]);
        assert_eq!(tab.max_inventory(), 1);
        assert_eq!(tab.get(PricingState::new(1, 0)), Some((1.0, 1)));
        assert_eq!(tab.value(2, 0), None);
        assert_eq!(tab.action(0, 2), None);
        assert!(tab.check_finite(0).is_ok());

        let bad = PeriodTable::from_parts(2, vec![0.0, f64::NAN], vec![0, 1]);
        assert!(matches!(
            bad.check_finite(3),
            Err(PricingError::NumericDomain(_))
        ));
    }
}
