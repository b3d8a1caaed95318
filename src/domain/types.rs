//! Core value types of the variance engine.
//!
//! Every type here is an immutable value: created fresh per calculation
//! request, serialized for presentation, and discarded. Nothing owns
//! anything else and nothing is mutated in place after construction.
//!
//! All fields are plain numbers, strings, or ordered sequences thereof, so
//! every type serializes directly to JSON with no cyclic references.

use serde::{Deserialize, Serialize};

use super::error::{EngineError, ensure_positive_std_dev};

/// Input parameters for cash-game variance calculations.
///
/// Winrate and standard deviation are in bb/100, bankroll in big blinds,
/// `stake_value` converts big blinds to currency for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarianceParameters {
    /// Winrate in bb/100. Any sign, including zero.
    pub winrate: f64,
    /// Standard deviation in bb/100. Must be positive.
    pub std_dev: f64,
    /// Horizon in hands.
    pub hands: u64,
    /// Bankroll in big blinds. Must be non-negative.
    pub bankroll: f64,
    /// Currency value of one big blind.
    pub stake_value: f64,
}

impl VarianceParameters {
    /// Validates the parameter invariants shared by all model operations.
    pub fn validate(&self) -> Result<(), EngineError> {
        ensure_positive_std_dev(self.std_dev)?;
        if !self.bankroll.is_finite() || self.bankroll < 0.0 {
            return Err(EngineError::invalid(format!(
                "bankroll must be non-negative, got {}",
                self.bankroll
            )));
        }
        if !self.winrate.is_finite() {
            return Err(EngineError::invalid("winrate must be finite"));
        }
        Ok(())
    }
}

/// Observed session results, the input variant for Bayesian calls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservedResults {
    /// Total observed winnings in big blinds.
    pub observed_winnings: f64,
    /// Hands the sample covers. Must be positive.
    pub hands_played: u64,
    /// Assumed per-100-hand standard deviation in bb/100.
    pub std_dev: f64,
}

impl ObservedResults {
    /// Observed winrate in bb/100.
    pub fn observed_winrate(&self) -> f64 {
        self.observed_winnings / self.hands_played as f64 * 100.0
    }

    /// Validates that the sample is usable for inference.
    pub fn validate(&self) -> Result<(), EngineError> {
        ensure_positive_std_dev(self.std_dev)?;
        if self.hands_played == 0 {
            return Err(EngineError::invalid(
                "observed results require at least one hand",
            ));
        }
        if !self.observed_winnings.is_finite() {
            return Err(EngineError::invalid("observed winnings must be finite"));
        }
        Ok(())
    }
}

/// One `(x, density)` sample on a probability curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalPoint {
    /// Winrate value in bb/100.
    pub x: f64,
    /// Posterior density at `x`.
    pub density: f64,
}

/// A two-sided credible interval around the observed winrate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredibleInterval {
    /// Interval mass, in (0, 1).
    pub probability: f64,
    /// Lower bound in bb/100.
    pub lower: f64,
    /// Upper bound in bb/100.
    pub upper: f64,
    /// Display label, e.g. "95% credible interval".
    pub label: String,
}

/// Full Bayesian winrate analysis for one observed sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BayesianAnalysis {
    /// P(true winrate > 0).
    pub probability_winner: f64,
    /// P(true winrate > `target_winrate`).
    pub probability_above_target: f64,
    /// The comparison target in bb/100.
    pub target_winrate: f64,
    /// Observed winrate in bb/100.
    pub observed_winrate: f64,
    /// Sample size in hands.
    pub hands_played: u64,
    /// Standard error of the observed winrate in bb/100.
    pub standard_error: f64,
    /// Credible intervals at the configured probabilities, narrowest first.
    pub credible_intervals: Vec<CredibleInterval>,
    /// Sampled posterior density curve, ordered by x.
    pub posterior_curve: Vec<NormalPoint>,
}

/// One simulated sample path of cumulative winnings.
///
/// Invariants (checked by construction, verified in tests):
/// `winnings[0] == 0`, `hands` strictly increasing, all four sequences the
/// same length, `peaks` non-decreasing with `peaks[i] >= winnings[i]`, and
/// `drawdowns[i] == peaks[i] - winnings[i] >= 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationPath {
    /// Hand counts at each step, starting at 0.
    pub hands: Vec<u64>,
    /// Cumulative winnings in big blinds at each step.
    pub winnings: Vec<f64>,
    /// Running maximum of `winnings`.
    pub peaks: Vec<f64>,
    /// `peaks[i] - winnings[i]` at each step.
    pub drawdowns: Vec<f64>,
    /// Largest drawdown over the whole path.
    pub max_drawdown: f64,
    /// Winnings at the end of the horizon.
    pub final_winnings: f64,
}

impl SimulationPath {
    /// Number of recorded steps (including the zero origin).
    pub fn steps(&self) -> usize {
        self.hands.len()
    }

    /// True when the path holds only the trivial origin point.
    pub fn is_trivial(&self) -> bool {
        self.hands.len() <= 1
    }
}

/// One row of the downswing-probability distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DownswingBucket {
    /// Drawdown threshold in big blinds.
    pub threshold: f64,
    /// Fraction of simulated paths whose max drawdown reached the threshold.
    pub probability: f64,
    /// Expected occurrences across the configured number of sessions.
    pub expected_count: f64,
}

/// Aggregate downswing statistics over a simulated population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownswingStats {
    /// Mean of per-path maximum drawdowns, in big blinds.
    pub average_max_drawdown: f64,
    /// Largest drawdown seen in any path.
    pub worst_max_drawdown: f64,
    /// Mean hands from trough back to the prior peak, recovered paths only.
    pub average_recovery_hands: f64,
    /// Longest observed recovery in hands, recovered paths only.
    pub longest_recovery: u64,
    /// Fraction of paths whose deepest downswing never recovered in-horizon.
    pub unrecovered_fraction: f64,
    /// Per-threshold probabilities and expected counts, threshold-ordered.
    pub buckets: Vec<DownswingBucket>,
}

/// One percentile envelope across the simulated population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileBand {
    /// Percentile in (0, 100).
    pub percentile: f64,
    /// Winnings value of this percentile at each step.
    pub winnings: Vec<f64>,
}

/// Cross-path percentile bands, sharing one hands axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileBands {
    /// Hand counts at each step.
    pub hands: Vec<u64>,
    /// Bands ordered by ascending percentile.
    pub bands: Vec<PercentileBand>,
}

/// Bankroll required for a target risk of ruin.
///
/// `Infinite` is the distinguishable "no finite bankroll survives" sentinel
/// for non-positive winrates. Callers render it as a state, never as a
/// numeric overflow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "big_blinds", rename_all = "snake_case")]
pub enum BankrollRequirement {
    /// A finite bankroll, in big blinds.
    Finite(f64),
    /// No finite bankroll achieves the target (winrate <= 0).
    Infinite,
}

impl BankrollRequirement {
    /// The finite value, if any.
    pub fn as_finite(&self) -> Option<f64> {
        match self {
            Self::Finite(bb) => Some(*bb),
            Self::Infinite => None,
        }
    }

    /// True for the infinite sentinel.
    pub fn is_infinite(&self) -> bool {
        matches!(self, Self::Infinite)
    }
}

impl std::fmt::Display for BankrollRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finite(bb) => write!(f, "{bb:.1} bb"),
            Self::Infinite => write!(f, "infinite"),
        }
    }
}
