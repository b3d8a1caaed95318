//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config: AppConfig = toml::from_str(&content)
    .with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;

  info!(
    display_paths = config.simulation.display_paths,
    estimation_paths = config.simulation.estimation_paths,
    hands_per_step = config.simulation.hands_per_step,
    target_ror = config.bankroll.target_risk_of_ruin,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  // Simulation validation
  anyhow::ensure!(
    config.simulation.display_paths > 0,
    "display_paths must be positive"
  );
  anyhow::ensure!(
    config.simulation.estimation_paths > 0,
    "estimation_paths must be positive"
  );
  anyhow::ensure!(
    config.simulation.hands_per_step > 0,
    "hands_per_step must be positive"
  );
  anyhow::ensure!(config.simulation.max_cells > 0, "max_cells must be positive");
  anyhow::ensure!(
    !config.simulation.downswing_thresholds.is_empty(),
    "at least one downswing threshold must be configured"
  );
  anyhow::ensure!(
    config
      .simulation
      .downswing_thresholds
      .windows(2)
      .all(|w| w[1] > w[0]),
    "downswing_thresholds must be strictly ascending"
  );
  anyhow::ensure!(
    config
      .simulation
      .percentiles
      .iter()
      .all(|&p| p > 0.0 && p < 100.0),
    "percentiles must be in (0, 100)"
  );
  anyhow::ensure!(
    config.simulation.sessions >= 0.0,
    "sessions must be non-negative, got {}",
    config.simulation.sessions
  );

  // Bankroll validation
  anyhow::ensure!(
    config.bankroll.target_risk_of_ruin > 0.0
      && config.bankroll.target_risk_of_ruin < 1.0,
    "target_risk_of_ruin must be in (0, 1), got {}",
    config.bankroll.target_risk_of_ruin
  );
  anyhow::ensure!(
    config.bankroll.confidence > 0.0 && config.bankroll.confidence < 1.0,
    "confidence must be in (0, 1), got {}",
    config.bankroll.confidence
  );

  // Scenario validation
  anyhow::ensure!(
    config.scenario.std_dev > 0.0,
    "scenario std_dev must be positive, got {}",
    config.scenario.std_dev
  );
  anyhow::ensure!(
    config.scenario.hands >= 1,
    "scenario hands must be at least 1"
  );
  anyhow::ensure!(
    config.scenario.bankroll >= 0.0,
    "scenario bankroll must be non-negative"
  );
  anyhow::ensure!(
    config.scenario.observed_winnings.is_none()
      || config.scenario.observed_hands.is_some_and(|h| h > 0),
    "observed_winnings requires observed_hands >= 1"
  );

  Ok(())
}
