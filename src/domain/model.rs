//! Closed-form variance model.
//!
//! Models cumulative winnings after `h` hands as Normal with mean
//! `winrate · h/100` and standard deviation `std_dev · sqrt(h/100)` — the
//! Brownian-motion approximation of a poker result series, where variance
//! scales linearly with hands.
//!
//! Ruin formulas are the classical gambler's-ruin result for a
//! drift-diffusion process with an absorbing barrier at zero:
//! `RoR = exp(-2 · winrate · bankroll / std_dev²)`.
//!
//! Every operation is pure. Non-positive `std_dev` is rejected; a
//! non-positive winrate in the ruin formulas is a defined degenerate result
//! (certain ruin / infinite bankroll), not an error.

use super::error::{EngineError, ensure_positive_std_dev};
use super::normal::{normal_cdf, normal_inverse_cdf};
use super::types::{BankrollRequirement, ObservedResults};

/// Expected cumulative winnings in big blinds after `hands` hands.
pub fn expected_winnings(hands: u64, winrate: f64) -> f64 {
    winrate * hands as f64 / 100.0
}

/// Standard deviation of cumulative winnings after `hands` hands.
///
/// # Errors
/// `InvalidParameter` when `std_dev <= 0`.
pub fn winnings_std_dev(hands: u64, std_dev: f64) -> Result<f64, EngineError> {
    ensure_positive_std_dev(std_dev)?;
    Ok(std_dev * (hands as f64 / 100.0).sqrt())
}

/// Probability that cumulative winnings are negative after `hands` hands.
pub fn probability_of_loss(
    hands: u64,
    winrate: f64,
    std_dev: f64,
) -> Result<f64, EngineError> {
    ensure_positive_std_dev(std_dev)?;
    if hands == 0 {
        return Err(EngineError::invalid("probability of loss requires hands >= 1"));
    }
    let mu = expected_winnings(hands, winrate);
    let sigma = winnings_std_dev(hands, std_dev)?;
    Ok(normal_cdf(-mu / sigma))
}

/// Complement of [`probability_of_loss`].
pub fn probability_of_profit(
    hands: u64,
    winrate: f64,
    std_dev: f64,
) -> Result<f64, EngineError> {
    Ok(1.0 - probability_of_loss(hands, winrate, std_dev)?)
}

/// The `percentile`-th outcome of cumulative winnings, percentile in (0, 100).
pub fn percentile_outcome(
    percentile: f64,
    hands: u64,
    winrate: f64,
    std_dev: f64,
) -> Result<f64, EngineError> {
    ensure_positive_std_dev(std_dev)?;
    let z = normal_inverse_cdf(percentile / 100.0)?;
    let mu = expected_winnings(hands, winrate);
    let sigma = winnings_std_dev(hands, std_dev)?;
    Ok(mu + sigma * z)
}

/// Probability cumulative winnings exceed `goal` big blinds at exactly `hands`.
pub fn goal_probability(
    goal: f64,
    hands: u64,
    winrate: f64,
    std_dev: f64,
) -> Result<f64, EngineError> {
    ensure_positive_std_dev(std_dev)?;
    if hands == 0 {
        return Err(EngineError::invalid("goal probability requires hands >= 1"));
    }
    let mu = expected_winnings(hands, winrate);
    let sigma = winnings_std_dev(hands, std_dev)?;
    Ok(1.0 - normal_cdf((goal - mu) / sigma))
}

/// Risk of ruin for a bankroll of `bankroll` big blinds.
///
/// `winrate <= 0` yields exactly `1.0`: under zero or negative drift with an
/// unbounded horizon, ruin is certain. That is a result, not an error.
pub fn risk_of_ruin(
    winrate: f64,
    bankroll: f64,
    std_dev: f64,
) -> Result<f64, EngineError> {
    ensure_positive_std_dev(std_dev)?;
    if !bankroll.is_finite() || bankroll < 0.0 {
        return Err(EngineError::invalid(format!(
            "bankroll must be non-negative, got {bankroll}"
        )));
    }
    if winrate <= 0.0 {
        return Ok(1.0);
    }
    Ok((-2.0 * winrate * bankroll / (std_dev * std_dev)).exp())
}

/// Minimum bankroll achieving a target risk of ruin, inverse of
/// [`risk_of_ruin`].
///
/// Returns [`BankrollRequirement::Infinite`] when `winrate <= 0`.
pub fn minimum_bankroll(
    winrate: f64,
    std_dev: f64,
    target_ror: f64,
) -> Result<BankrollRequirement, EngineError> {
    ensure_positive_std_dev(std_dev)?;
    if !(target_ror > 0.0 && target_ror < 1.0) {
        return Err(EngineError::invalid(format!(
            "target risk of ruin must be in (0, 1), got {target_ror}"
        )));
    }
    if winrate <= 0.0 {
        return Ok(BankrollRequirement::Infinite);
    }
    let bankroll = -(std_dev * std_dev) * target_ror.ln() / (2.0 * winrate);
    Ok(BankrollRequirement::Finite(bankroll))
}

/// Bankroll sized for a target risk fraction (e.g. 0.05 for 5%).
///
/// Alias of [`minimum_bankroll`] kept for callers that phrase the question
/// as "how big a roll for X% risk".
pub fn bankroll_for_ror(
    winrate: f64,
    std_dev: f64,
    risk_fraction: f64,
) -> Result<BankrollRequirement, EngineError> {
    minimum_bankroll(winrate, std_dev, risk_fraction)
}

/// Ruin probability of an existing bankroll under a hypothetical winrate.
///
/// The sensitivity / "what if my real winrate is lower" analysis: same
/// formula as [`risk_of_ruin`], parameterized bankroll-first.
pub fn downswing_probability(
    bankroll: f64,
    winrate: f64,
    std_dev: f64,
) -> Result<f64, EngineError> {
    risk_of_ruin(winrate, bankroll, std_dev)
}

/// Hands needed to pin the winrate within `target_margin` bb/100 at the
/// given two-sided confidence level.
///
/// Solves `margin = z · std_dev / sqrt(h/100)` for `h`, rounded up.
pub fn hands_for_accuracy(
    std_dev: f64,
    target_margin: f64,
    confidence: f64,
) -> Result<u64, EngineError> {
    ensure_positive_std_dev(std_dev)?;
    if !(target_margin > 0.0) {
        return Err(EngineError::invalid(format!(
            "target margin must be positive, got {target_margin}"
        )));
    }
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(EngineError::invalid(format!(
            "confidence must be in (0, 1), got {confidence}"
        )));
    }
    let z = normal_inverse_cdf((1.0 + confidence) / 2.0)?;
    let ratio = z * std_dev / target_margin;
    Ok((100.0 * ratio * ratio).ceil() as u64)
}

/// Standard error of the observed winrate in bb/100 after `hands` hands.
pub fn standard_error(hands: u64, std_dev: f64) -> Result<f64, EngineError> {
    ensure_positive_std_dev(std_dev)?;
    if hands == 0 {
        return Err(EngineError::invalid("standard error requires hands >= 1"));
    }
    Ok(std_dev / (hands as f64 / 100.0).sqrt())
}

/// Probability the true winrate exceeds `threshold` bb/100 given an
/// observed sample.
pub fn probability_true_winrate_above(
    observed: &ObservedResults,
    threshold: f64,
) -> Result<f64, EngineError> {
    observed.validate()?;
    let se = standard_error(observed.hands_played, observed.std_dev)?;
    let z = (threshold - observed.observed_winrate()) / se;
    Ok(1.0 - normal_cdf(z))
}
