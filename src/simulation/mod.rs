//! Trace simulation and reporting on top of a computed policy schedule.
//!
//! - [`engine`]: play out selling seasons under the optimal policy
//! - [`statistics`]: revenue / markdown / salvage summary over many traces
//! - [`sweep`]: inventory sweeps and the optimal-price heatmap

pub mod engine;
pub mod statistics;
pub mod sweep;

pub use engine::{simulate_batch, simulate_trace, Trace, TraceSimulator};
pub use statistics::{summarize, PerformanceSummary};
pub use sweep::{inventory_sweep, price_heatmap, PriceHeatmap, SweepPoint};
