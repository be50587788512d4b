//! Shared environment configuration for the clearance binaries.
//!
//! Consolidates `RAYON_NUM_THREADS` and `RUST_LOG` reads shared by all binaries.

use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber. `RUST_LOG` overrides the default `info` filter.
/// Tolerates a subscriber that is already installed.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Read `RAYON_NUM_THREADS` (fallback `OMP_NUM_THREADS`, default 8).
pub fn rayon_threads_from_env() -> usize {
    std::env::var("RAYON_NUM_THREADS")
        .or_else(|_| std::env::var("OMP_NUM_THREADS"))
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|&n| n > 0)
        .unwrap_or(8)
}

/// Build the rayon global pool from the environment, tolerating an
/// already-initialized pool. Returns thread count.
pub fn init_rayon_threads() -> usize {
    let num_threads = rayon_threads_from_env();
    if rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .is_err()
    {
        info!("rayon pool already initialized");
    }
    info!(threads = num_threads, "rayon threads");
    num_threads
}
