//! Domain layer - the pure probability model.
//!
//! Closed-form variance statistics and Bayesian winrate inference for the
//! poker-results-as-a-random-walk model. No async, no I/O, no external
//! state (hexagonal architecture inner ring); every operation is a pure
//! function over caller-supplied values.

pub mod bayes;
pub mod error;
pub mod model;
pub mod normal;
pub mod types;

// Re-export core types for convenience
pub use error::EngineError;
pub use types::{
    BankrollRequirement, BayesianAnalysis, CredibleInterval, DownswingBucket,
    DownswingStats, NormalPoint, ObservedResults, PercentileBand, PercentileBands,
    SimulationPath, VarianceParameters,
};
