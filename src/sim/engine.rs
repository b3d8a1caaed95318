//! Monte Carlo path simulator.
//!
//! Generates pseudo-random sample paths of cumulative winnings and tracks
//! the running peak and drawdown per path. This is the estimator for
//! quantities the closed-form model cannot express: the running maximum
//! drawdown over a finite horizon is a first-passage property of the random
//! walk, not a single end-point Normal calculation.
//!
//! ## Step granularity
//!
//! Paths advance in fixed increments of `hands_per_step`; each increment
//! adds Normal(`winrate·Δh/100`, `std_dev·sqrt(Δh/100)`) to the cumulative
//! winnings. Coarser steps are cheaper but under-sample the continuous
//! Brownian drawdown extremes between grid points, so coarse-grained
//! drawdown probabilities are biased slightly low. That bias is a known
//! approximation error of the discretization, not a defect; callers trade
//! fidelity against cost through the step parameter.

use serde::{Deserialize, Serialize};

use crate::domain::error::{EngineError, ensure_positive_std_dev};
use crate::domain::types::{ObservedResults, SimulationPath};

use super::rng::GaussianRng;

/// Sizing and seeding of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of independent paths.
    pub num_paths: usize,
    /// Horizon in hands. Zero yields trivial all-zero paths.
    pub hands: u64,
    /// Hands per discretization step.
    pub hands_per_step: u64,
    /// PRNG seed; the whole run is a deterministic function of it.
    pub seed: u64,
}

impl SimulationConfig {
    /// Steps per path at this granularity (excluding the zero origin).
    pub fn steps_per_path(&self) -> u64 {
        if self.hands == 0 {
            0
        } else {
            self.hands.div_ceil(self.hands_per_step)
        }
    }

    /// Total work units (`num_paths × steps`) for budget checks.
    pub fn total_cells(&self) -> u64 {
        (self.num_paths as u64).saturating_mul(self.steps_per_path().max(1))
    }

    /// Validates sizing before any sampling begins.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.num_paths == 0 {
            return Err(EngineError::invalid("num_paths must be at least 1"));
        }
        if self.hands_per_step == 0 {
            return Err(EngineError::invalid("hands_per_step must be at least 1"));
        }
        Ok(())
    }
}

/// Outcome of a progress-reporting run.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationRun {
    /// All paths generated.
    Completed(Vec<SimulationPath>),
    /// The progress sink went away; work stopped early, output discarded.
    Cancelled,
}

/// Simulates all paths, reporting batch progress through `on_progress`.
///
/// `on_progress` receives a monotone non-decreasing fraction in [0, 1] at
/// coarse intervals (per batch of paths, not per step). Returning `false`
/// stops the run — the structural cancellation used when the consumer has
/// dropped its receiver.
///
/// A fixed `(seed, config, winrate, std_dev)` tuple yields bit-identical
/// paths on every invocation.
///
/// # Errors
/// `InvalidParameter` when `std_dev <= 0` or the config is malformed;
/// detected before any sampling.
pub fn simulate_paths_with_progress(
    winrate: f64,
    std_dev: f64,
    config: &SimulationConfig,
    mut on_progress: impl FnMut(f64) -> bool,
) -> Result<SimulationRun, EngineError> {
    ensure_positive_std_dev(std_dev)?;
    config.validate()?;

    let mut rng = GaussianRng::new(config.seed);
    let mut paths = Vec::with_capacity(config.num_paths);

    // Coarse progress: ~20 reports per run regardless of path count.
    let stride = (config.num_paths / 20).max(1);

    for i in 0..config.num_paths {
        paths.push(simulate_one_path(winrate, std_dev, config, &mut rng));

        if (i + 1) % stride == 0 || i + 1 == config.num_paths {
            let fraction = (i + 1) as f64 / config.num_paths as f64;
            if !on_progress(fraction) {
                return Ok(SimulationRun::Cancelled);
            }
        }
    }

    Ok(SimulationRun::Completed(paths))
}

/// Simulates all paths without progress reporting.
pub fn simulate_paths(
    winrate: f64,
    std_dev: f64,
    config: &SimulationConfig,
) -> Result<Vec<SimulationPath>, EngineError> {
    match simulate_paths_with_progress(winrate, std_dev, config, |_| true)? {
        SimulationRun::Completed(paths) => Ok(paths),
        // The sink above never cancels.
        SimulationRun::Cancelled => unreachable!("progress sink always continues"),
    }
}

/// Simulates paths for an observed sample, reporting progress.
///
/// The drift is the observed winrate and the volatility the sample's
/// standard deviation, so the generated paths answer "what could the next
/// `config.hands` hands look like for the player behind these results".
///
/// # Errors
/// `InvalidParameter` when the observed sample or the config is malformed.
pub fn simulate_paths_observed_with_progress(
    observed: &ObservedResults,
    config: &SimulationConfig,
    on_progress: impl FnMut(f64) -> bool,
) -> Result<SimulationRun, EngineError> {
    observed.validate()?;
    simulate_paths_with_progress(
        observed.observed_winrate(),
        observed.std_dev,
        config,
        on_progress,
    )
}

/// Simulates paths for an observed sample without progress reporting.
pub fn simulate_paths_observed(
    observed: &ObservedResults,
    config: &SimulationConfig,
) -> Result<Vec<SimulationPath>, EngineError> {
    match simulate_paths_observed_with_progress(observed, config, |_| true)? {
        SimulationRun::Completed(paths) => Ok(paths),
        SimulationRun::Cancelled => unreachable!("progress sink always continues"),
    }
}

fn simulate_one_path(
    winrate: f64,
    std_dev: f64,
    config: &SimulationConfig,
    rng: &mut GaussianRng,
) -> SimulationPath {
    let steps = config.steps_per_path() as usize;

    let mut hands = Vec::with_capacity(steps + 1);
    let mut winnings = Vec::with_capacity(steps + 1);
    let mut peaks = Vec::with_capacity(steps + 1);
    let mut drawdowns = Vec::with_capacity(steps + 1);

    hands.push(0);
    winnings.push(0.0);
    peaks.push(0.0);
    drawdowns.push(0.0);

    let mut hand: u64 = 0;
    let mut total: f64 = 0.0;
    let mut peak: f64 = 0.0;
    let mut max_drawdown: f64 = 0.0;

    while hand < config.hands {
        // Final increment truncates to the horizon.
        let dh = config.hands_per_step.min(config.hands - hand);
        let dh_100 = dh as f64 / 100.0;
        total += rng.next_normal(winrate * dh_100, std_dev * dh_100.sqrt());
        hand += dh;

        peak = peak.max(total);
        let drawdown = peak - total;
        max_drawdown = max_drawdown.max(drawdown);

        hands.push(hand);
        winnings.push(total);
        peaks.push(peak);
        drawdowns.push(drawdown);
    }

    SimulationPath {
        hands,
        winnings,
        peaks,
        drawdowns,
        max_drawdown,
        final_winnings: total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(num_paths: usize, hands: u64, step: u64, seed: u64) -> SimulationConfig {
        SimulationConfig {
            num_paths,
            hands,
            hands_per_step: step,
            seed,
        }
    }

    #[test]
    fn test_fixed_seed_bit_identical() {
        let cfg = config(25, 10_000, 500, 1234);
        let a = simulate_paths(2.5, 80.0, &cfg).unwrap();
        let b = simulate_paths(2.5, 80.0, &cfg).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_path_invariants() {
        let cfg = config(50, 20_000, 1000, 9);
        for path in simulate_paths(1.5, 90.0, &cfg).unwrap() {
            let n = path.hands.len();
            assert_eq!(path.winnings.len(), n);
            assert_eq!(path.peaks.len(), n);
            assert_eq!(path.drawdowns.len(), n);
            assert_eq!(path.winnings[0], 0.0);
            assert!(path.hands.windows(2).all(|w| w[1] > w[0]));
            for i in 0..n {
                assert!(path.peaks[i] >= path.winnings[i]);
                assert!(path.drawdowns[i] >= 0.0);
                if i > 0 {
                    assert!(path.peaks[i] >= path.peaks[i - 1]);
                }
            }
            let worst = path
                .drawdowns
                .iter()
                .fold(0.0_f64, |acc, &d| acc.max(d));
            assert_eq!(path.max_drawdown, worst);
            assert_eq!(path.final_winnings, *path.winnings.last().unwrap());
        }
    }

    #[test]
    fn test_horizon_not_divisible_by_step() {
        let cfg = config(3, 1050, 500, 4);
        for path in simulate_paths(2.0, 75.0, &cfg).unwrap() {
            assert_eq!(path.hands, vec![0, 500, 1000, 1050]);
        }
    }

    #[test]
    fn test_zero_hands_trivial_path() {
        let cfg = config(5, 0, 500, 4);
        for path in simulate_paths(2.0, 75.0, &cfg).unwrap() {
            assert_eq!(path.hands, vec![0]);
            assert_eq!(path.winnings, vec![0.0]);
            assert_eq!(path.max_drawdown, 0.0);
            assert_eq!(path.final_winnings, 0.0);
        }
    }

    #[test]
    fn test_rejects_bad_inputs_before_sampling() {
        let cfg = config(10, 1000, 100, 1);
        assert!(simulate_paths(2.0, 0.0, &cfg).is_err());
        assert!(simulate_paths(2.0, -5.0, &cfg).is_err());
        assert!(simulate_paths(2.0, 80.0, &config(0, 1000, 100, 1)).is_err());
        assert!(simulate_paths(2.0, 80.0, &config(10, 1000, 0, 1)).is_err());
    }

    #[test]
    fn test_progress_monotone_and_terminal_one() {
        let cfg = config(100, 1000, 100, 77);
        let mut fractions = Vec::new();
        let run = simulate_paths_with_progress(2.0, 80.0, &cfg, |f| {
            fractions.push(f);
            true
        })
        .unwrap();
        assert!(matches!(run, SimulationRun::Completed(_)));
        assert!(!fractions.is_empty());
        assert!(fractions.windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(*fractions.last().unwrap(), 1.0);
    }

    #[test]
    fn test_progress_false_cancels() {
        let cfg = config(1000, 1000, 100, 77);
        let mut calls = 0;
        let run = simulate_paths_with_progress(2.0, 80.0, &cfg, |_| {
            calls += 1;
            calls < 3
        })
        .unwrap();
        assert_eq!(run, SimulationRun::Cancelled);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_observed_entry_matches_derived_winrate() {
        // 1250 bb over 50k hands is a 2.5 bb/100 winrate; the observed
        // entry must sample the exact same stream as the explicit one.
        let observed = ObservedResults {
            observed_winnings: 1250.0,
            hands_played: 50_000,
            std_dev: 75.0,
        };
        let cfg = config(20, 10_000, 500, 321);
        let from_observed = simulate_paths_observed(&observed, &cfg).unwrap();
        let from_explicit = simulate_paths(2.5, 75.0, &cfg).unwrap();
        assert_eq!(from_observed, from_explicit);
    }

    #[test]
    fn test_observed_entry_rejects_bad_sample() {
        let cfg = config(5, 1000, 100, 1);
        let no_hands = ObservedResults {
            observed_winnings: 100.0,
            hands_played: 0,
            std_dev: 75.0,
        };
        assert!(simulate_paths_observed(&no_hands, &cfg).is_err());

        let bad_sd = ObservedResults {
            observed_winnings: 100.0,
            hands_played: 1000,
            std_dev: 0.0,
        };
        assert!(simulate_paths_observed(&bad_sd, &cfg).is_err());
    }

    #[test]
    fn test_drift_dominates_long_run() {
        // Over a long horizon the mean final result should be near μ(h).
        let cfg = config(400, 100_000, 5000, 11);
        let paths = simulate_paths(5.0, 60.0, &cfg).unwrap();
        let mean = paths.iter().map(|p| p.final_winnings).sum::<f64>()
            / paths.len() as f64;
        // μ = 5000 bb, σ per path = 60·sqrt(1000) ≈ 1897 bb, SE ≈ 95 bb.
        assert!((mean - 5000.0).abs() < 400.0, "mean final winnings {mean}");
    }
}
