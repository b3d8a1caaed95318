//! Engine error taxonomy.
//!
//! Only malformed input and execution failure are errors. Numerical edge
//! cases with a well-defined mathematical answer (certain ruin, infinite
//! bankroll) are ordinary results and never appear here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the variance engine.
///
/// Serializable because `EngineFailure` and `InvalidParameter` travel as
/// terminal error messages on the host protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "code", content = "detail", rename_all = "snake_case")]
pub enum EngineError {
    /// Malformed input detected before any computation starts.
    ///
    /// Covers non-positive standard deviation, probabilities outside (0, 1),
    /// zero hands where a positive horizon is required, and simulation
    /// requests exceeding the host's work budget.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The simulation worker failed mid-run (panic, resource exhaustion).
    ///
    /// Delivered as the terminal error message on the host protocol.
    #[error("simulation failed: {0}")]
    EngineFailure(String),
}

impl EngineError {
    /// Shorthand for an `InvalidParameter` with a formatted message.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}

/// Rejects a non-positive standard deviation.
///
/// Every ratio-based formula in the model divides by `std_dev`, so this
/// check runs before any of them.
pub fn ensure_positive_std_dev(std_dev: f64) -> Result<(), EngineError> {
    if std_dev.is_finite() && std_dev > 0.0 {
        Ok(())
    } else {
        Err(EngineError::invalid(format!(
            "standard deviation must be positive, got {std_dev}"
        )))
    }
}
