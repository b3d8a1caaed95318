//! Configuration Module - TOML-based Engine Configuration
//!
//! Loads and validates configuration from `config.toml`. Simulation
//! sizing, bankroll targets, and the scenario to report on are all
//! externalized here - nothing numeric is hardcoded in the domain layer.

pub mod loader;

use serde::Deserialize;

/// Top-level engine configuration.
///
/// Loaded from `config.toml` at startup and validated before any
/// computation starts.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Application identity and logging.
  pub app: AppSettings,
  /// Simulation sizing and seeding.
  pub simulation: SimulationSettings,
  /// Bankroll sizing targets.
  pub bankroll: BankrollSettings,
  /// The scenario the binary reports on.
  pub scenario: ScenarioSettings,
}

/// Application identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
  /// Human-readable application name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

/// Simulation engine sizing.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationSettings {
  /// Paths in the interactive display batch (tens, not thousands).
  #[serde(default = "default_display_paths")]
  pub display_paths: usize,
  /// Paths in the probability-estimation batch.
  #[serde(default = "default_estimation_paths")]
  pub estimation_paths: usize,
  /// Hands per discretization step. Finer = slower but closer to the
  /// continuous drawdown statistics.
  #[serde(default = "default_hands_per_step")]
  pub hands_per_step: u64,
  /// Host budget: maximum paths × steps per request.
  #[serde(default = "default_max_cells")]
  pub max_cells: u64,
  /// Base PRNG seed. Absent = drawn from OS entropy at startup (and
  /// logged, so any run stays reproducible).
  pub seed: Option<u64>,
  /// Drawdown thresholds in big blinds, ascending.
  pub downswing_thresholds: Vec<f64>,
  /// Independent horizons per year used for expected downswing counts.
  #[serde(default = "default_sessions")]
  pub sessions: f64,
  /// Percentile envelopes reported with downswing results.
  #[serde(default = "default_percentiles")]
  pub percentiles: Vec<f64>,
}

/// Bankroll sizing targets.
#[derive(Debug, Clone, Deserialize)]
pub struct BankrollSettings {
  /// Target risk of ruin for bankroll recommendations (e.g. 0.05).
  #[serde(default = "default_target_ror")]
  pub target_risk_of_ruin: f64,
  /// Two-sided confidence level for sample-size answers.
  #[serde(default = "default_confidence")]
  pub confidence: f64,
}

/// The scenario the report binary computes.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioSettings {
  /// Assumed winrate in bb/100.
  pub winrate: f64,
  /// Assumed standard deviation in bb/100.
  pub std_dev: f64,
  /// Horizon in hands.
  pub hands: u64,
  /// Current bankroll in big blinds.
  pub bankroll: f64,
  /// Currency value of one big blind.
  pub stake_value: f64,
  /// Observed winnings in big blinds, enables the Bayesian section.
  pub observed_winnings: Option<f64>,
  /// Hands behind the observed winnings.
  pub observed_hands: Option<u64>,
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_display_paths() -> usize {
  30
}

fn default_estimation_paths() -> usize {
  5000
}

fn default_hands_per_step() -> u64 {
  500
}

fn default_max_cells() -> u64 {
  20_000_000
}

fn default_sessions() -> f64 {
  12.0
}

fn default_percentiles() -> Vec<f64> {
  vec![5.0, 25.0, 50.0, 75.0, 95.0]
}

fn default_target_ror() -> f64 {
  0.05
}

fn default_confidence() -> f64 {
  0.95
}
