//! Monte Carlo simulation engine.
//!
//! Pure but CPU-heavy: path generation is O(num_paths × hands/Δh) and runs
//! inside the execution host's worker task, never inline on the caller.
//!
//! Components:
//! - `rng`: seeded Gaussian source (SmallRng + Box-Muller)
//! - `engine`: sample-path generation with running peak/drawdown
//! - `stats`: cross-path aggregation (downswings, percentile bands)

pub mod engine;
pub mod rng;
pub mod stats;

pub use engine::{
    SimulationConfig, SimulationRun, simulate_paths, simulate_paths_observed,
    simulate_paths_observed_with_progress, simulate_paths_with_progress,
};
pub use rng::GaussianRng;
pub use stats::{downswing_stats, percentile_bands};
