//! Performance summary over simulated traces.
//!
//! All quantities are fractions of the initial inventory value (init_inv units
//! at full price), except `optimal_value` which is the raw model value and the
//! per-period markdown statistics which are markdown fractions.

use serde::Serialize;
use statrs::statistics::Statistics;

use crate::error::{PricingError, Result};

use super::engine::Trace;

#[derive(Clone, Debug, Serialize)]
pub struct PerformanceSummary {
    pub num_traces: usize,
    pub init_inv: usize,
    pub optimal_value: f64,
    pub mean_revenue: f64,
    pub stdev_revenue: f64,
    /// Revenue given up to markdowns: 1 − salvage − revenue.
    pub mean_a_markdown: f64,
    pub stdev_a_markdown: f64,
    pub mean_salvage: f64,
    pub stdev_salvage: f64,
    pub mean_remaining: Vec<f64>,
    pub stdev_remaining: Vec<f64>,
    pub mean_markdown: Vec<f64>,
    pub stdev_markdown: Vec<f64>,
}

fn mean_and_stdev<I>(values: I) -> (f64, f64)
where
    I: Iterator<Item = f64> + Clone,
{
    (values.clone().mean(), values.population_std_dev())
}

/// Aggregate traces that all started from `init_inv`.
pub fn summarize(traces: &[Trace], init_inv: usize, optimal_value: f64) -> Result<PerformanceSummary> {
    if traces.is_empty() {
        return Err(PricingError::invalid("no traces to summarize"));
    }
    if init_inv == 0 {
        return Err(PricingError::invalid(
            "initial inventory must be positive to normalize revenue",
        ));
    }
    let time_steps = traces[0].remaining.len();
    if traces.iter().any(|t| t.remaining.len() != time_steps) {
        return Err(PricingError::invalid("traces have different horizons"));
    }
    let scale = init_inv as f64;

    let (mean_revenue, stdev_revenue) = mean_and_stdev(traces.iter().map(|t| t.revenue / scale));

    let mut mean_remaining = Vec::with_capacity(time_steps);
    let mut stdev_remaining = Vec::with_capacity(time_steps);
    let mut mean_markdown = Vec::with_capacity(time_steps);
    let mut stdev_markdown = Vec::with_capacity(time_steps);
    for t in 0..time_steps {
        let (m, s) = mean_and_stdev(traces.iter().map(|tr| tr.remaining[t] as f64 / scale));
        mean_remaining.push(m);
        stdev_remaining.push(s);
        let (m, s) = mean_and_stdev(traces.iter().map(|tr| tr.markdowns[t]));
        mean_markdown.push(m);
        stdev_markdown.push(s);
    }

    let (mean_salvage, stdev_salvage) = match (mean_remaining.last(), stdev_remaining.last()) {
        (Some(&m), Some(&s)) => (m, s),
        _ => (1.0, 0.0),
    };

    Ok(PerformanceSummary {
        num_traces: traces.len(),
        init_inv,
        optimal_value,
        mean_revenue,
        stdev_revenue,
        mean_a_markdown: 1.0 - mean_salvage - mean_revenue,
        stdev_a_markdown: (stdev_salvage.powi(2) + stdev_revenue.powi(2)).sqrt(),
        mean_salvage,
        stdev_salvage,
        mean_remaining,
        stdev_remaining,
        mean_markdown,
        stdev_markdown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::is_approx_eq;

    fn trace(revenue: f64, remaining: Vec<usize>, markdowns: Vec<f64>) -> Trace {
        Trace {
            revenue,
            remaining,
            markdowns,
            ..Trace::default()
        }
    }

    #[test]
    fn test_summary_by_hand() {
        let traces = vec![
            trace(2.0, vec![3, 2], vec![0.0, 0.0]),
            trace(3.0, vec![2, 0], vec![0.0, 0.5]),
        ];
        let s = summarize(&traces, 4, 2.6).unwrap();
        assert!(is_approx_eq(s.mean_revenue, 0.625));
        assert!(is_approx_eq(s.stdev_revenue, 0.125));
        assert!(is_approx_eq(s.mean_salvage, 0.25));
        assert!(is_approx_eq(s.stdev_salvage, 0.25));
        assert!(is_approx_eq(s.mean_a_markdown, 0.125));
        assert!(is_approx_eq(
            s.stdev_a_markdown,
            (0.125f64.powi(2) + 0.25f64.powi(2)).sqrt()
        ));
        assert!(is_approx_eq(s.mean_remaining[0], 0.625));
        assert!(is_approx_eq(s.mean_markdown[1], 0.25));
        assert!(is_approx_eq(s.stdev_markdown[1], 0.25));
        assert_eq!(s.optimal_value, 2.6);
    }

    #[test]
    fn test_summary_rejects_bad_input() {
        assert!(summarize(&[], 4, 0.0).is_err());
        let traces = vec![trace(0.0, vec![0], vec![0.0])];
        assert!(summarize(&traces, 0, 0.0).is_err());
        let ragged = vec![trace(0.0, vec![1], vec![0.0]), trace(0.0, vec![], vec![])];
        assert!(summarize(&ragged, 2, 0.0).is_err());
    }
}
