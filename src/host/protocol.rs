//! Execution host wire contract.
//!
//! The only boundary between interactive callers and the simulation worker:
//! a tagged union of request kinds and a tagged union of response kinds,
//! each carrying plain value payloads. Closed sum types matched
//! exhaustively — no stringly-typed discriminators.
//!
//! Per request the host delivers zero or more `Progress` messages with
//! non-decreasing fractions, then exactly one terminal (`Result` or
//! `Error`). Nothing follows a terminal.

use serde::{Deserialize, Serialize};

use crate::domain::error::EngineError;
use crate::domain::types::{
    DownswingStats, ObservedResults, PercentileBands, SimulationPath, VarianceParameters,
};
use crate::sim::engine::SimulationConfig;

/// Tournament-mode parameters.
///
/// Tournament results are modeled on the same random walk with one step per
/// tournament: each event adds Normal(`roi_percent/100 · buyin`,
/// `std_dev_buyins · buyin`) to cumulative winnings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TournamentParameters {
    /// Return on investment as a percentage of the buy-in.
    pub roi_percent: f64,
    /// Per-tournament standard deviation in buy-ins. Must be positive.
    pub std_dev_buyins: f64,
    /// Buy-in in currency units.
    pub buyin: f64,
    /// Number of tournaments in the horizon.
    pub tournaments: u64,
}

/// One simulation request. Stateless and self-contained: the seed travels
/// with the request, so two in-flight requests never share random state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulationRequest {
    /// A small display batch of representative sample paths.
    Simulate {
        params: VarianceParameters,
        config: SimulationConfig,
    },
    /// A display batch driven by observed results: the drift is the
    /// observed winrate, the volatility the sample's standard deviation.
    SimulateObserved {
        observed: ObservedResults,
        config: SimulationConfig,
    },
    /// A large estimation batch aggregated into downswing statistics and
    /// percentile bands.
    DownswingProbability {
        params: VarianceParameters,
        config: SimulationConfig,
        /// Drawdown thresholds in big blinds, ascending.
        thresholds: Vec<f64>,
        /// Independent sessions of this horizon used for expected counts.
        sessions: f64,
        /// Percentile envelopes to report, in (0, 100).
        percentiles: Vec<f64>,
    },
    /// Tournament-mode sample paths.
    SimulateTournament {
        params: TournamentParameters,
        /// Path count and seed; the step grid is one step per tournament.
        num_paths: usize,
        seed: u64,
    },
}

impl SimulationRequest {
    /// Short name for log spans.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Simulate { .. } => "simulate",
            Self::SimulateObserved { .. } => "simulate_observed",
            Self::DownswingProbability { .. } => "downswing_probability",
            Self::SimulateTournament { .. } => "simulate_tournament",
        }
    }
}

/// Terminal payloads, one shape per request kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulationOutcome {
    /// Display sample paths.
    Paths { paths: Vec<SimulationPath> },
    /// Downswing distribution plus percentile envelope.
    Downswing {
        stats: DownswingStats,
        bands: PercentileBands,
    },
    /// Tournament sample paths; the hands axis counts 100 per tournament.
    Tournament { paths: Vec<SimulationPath> },
}

/// One message from the worker back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulationResponse {
    /// Completed fraction in [0, 1], non-decreasing, coarse-grained.
    Progress { fraction: f64 },
    /// Successful terminal.
    Result { outcome: SimulationOutcome },
    /// Failed terminal.
    Error { error: EngineError },
}

impl SimulationResponse {
    /// True for `Result` and `Error`; the host sends exactly one of these.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }
}
