//! Poisson demand model shared by both engines and the trace simulator.
//!
//! A rate of 0 is valid and yields a point mass at zero demand. statrs and
//! rand_distr both reject a zero rate, so that case is handled explicitly.

use rand::Rng;
use rand_distr::Distribution;
use statrs::distribution::{Discrete, DiscreteCDF, Poisson};

use crate::constants::EPSILON;
use crate::error::{PricingError, Result};

#[derive(Clone, Debug)]
enum Kind {
    PointMass,
    Poisson {
        dist: Poisson,
        sampler: rand_distr::Poisson<f64>,
    },
}

/// Per-period demand D ~ Poisson(rate).
#[derive(Clone, Debug)]
pub struct DemandModel {
    rate: f64,
    kind: Kind,
}

impl DemandModel {
    pub fn new(rate: f64) -> Result<Self> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(PricingError::invalid(format!(
                "demand rate {rate} must be finite and >= 0"
            )));
        }
        if rate == 0.0 {
            return Ok(Self {
                rate,
                kind: Kind::PointMass,
            });
        }
        let dist = Poisson::new(rate)
            .map_err(|e| PricingError::invalid(format!("demand rate {rate}: {e}")))?;
        let sampler = rand_distr::Poisson::new(rate)
            .map_err(|e| PricingError::invalid(format!("demand rate {rate}: {e}")))?;
        Ok(Self {
            rate,
            kind: Kind::Poisson { dist, sampler },
        })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// P(D = d).
    pub fn pmf(&self, d: usize) -> f64 {
        match &self.kind {
            Kind::PointMass => {
                if d == 0 {
                    1.0
                } else {
                    0.0
                }
            }
            Kind::Poisson { dist, .. } => dist.pmf(d as u64),
        }
    }

    /// P(D <= d).
    pub fn cdf(&self, d: usize) -> f64 {
        match &self.kind {
            Kind::PointMass => 1.0,
            Kind::Poisson { dist, .. } => dist.cdf(d as u64),
        }
    }

    /// P(D >= s) = 1 - P(D <= s - 1), the mass collapsed onto full depletion.
    /// Unclamped; run it through [`check_probability`] before use.
    pub fn stockout_mass(&self, s: usize) -> f64 {
        if s == 0 {
            1.0
        } else {
            1.0 - self.cdf(s - 1)
        }
    }

    /// Outcome probabilities for d = 0..=s starting from inventory s:
    /// pmf for d < s, stockout mass at d = s. Sums to 1.
    pub fn outcome_probabilities(&self, s: usize) -> Result<Vec<f64>> {
        let mut probs = Vec::with_capacity(s + 1);
        for d in 0..s {
            probs.push(check_probability(self.pmf(d))?);
        }
        probs.push(check_probability(self.stockout_mass(s))?);
        Ok(probs)
    }

    /// Draw one demand realization.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match &self.kind {
            Kind::PointMass => 0,
            Kind::Poisson { sampler, .. } => {
                let d: f64 = sampler.sample(rng);
                d as usize
            }
        }
    }
}

/// Accept a probability within [`EPSILON`] of [0, 1] and clamp it into range.
pub fn check_probability(p: f64) -> Result<f64> {
    if !p.is_finite() || p < -EPSILON || p > 1.0 + EPSILON {
        return Err(PricingError::numeric(format!(
            "probability {p} outside [0, 1]"
        )));
    }
    Ok(p.clamp(0.0, 1.0))
}

/// One demand model per action of an elasticity table.
pub fn demand_models(rates: &[f64]) -> Result<Vec<DemandModel>> {
    rates.iter().map(|&r| DemandModel::new(r)).collect()
}
