//! Cross-path aggregation of simulated populations.
//!
//! Turns a batch of sample paths into the empirical distributions the
//! closed-form model cannot produce: downswing-probability buckets,
//! recovery-time statistics, and per-step percentile envelopes.

use crate::domain::error::EngineError;
use crate::domain::types::{
    DownswingBucket, DownswingStats, PercentileBand, PercentileBands, SimulationPath,
};

/// Aggregates downswing statistics over a simulated population.
///
/// For each threshold, `probability` is the fraction of paths whose maximum
/// drawdown reached it, and `expected_count` scales that by `sessions` (the
/// number of independent horizons of this length a player expects to face).
///
/// Recovery is measured from the trough of a path's deepest downswing to
/// the first later step where winnings regain the prior peak. Paths that
/// never recover inside the horizon are excluded from the average and
/// reported in `unrecovered_fraction`; paths with zero drawdown contribute
/// to neither.
///
/// # Errors
/// `InvalidParameter` on an empty population.
pub fn downswing_stats(
    paths: &[SimulationPath],
    thresholds: &[f64],
    sessions: f64,
) -> Result<DownswingStats, EngineError> {
    if paths.is_empty() {
        return Err(EngineError::invalid("downswing stats need at least one path"));
    }
    let n = paths.len() as f64;

    let average_max_drawdown = paths.iter().map(|p| p.max_drawdown).sum::<f64>() / n;
    let worst_max_drawdown = paths
        .iter()
        .map(|p| p.max_drawdown)
        .fold(0.0_f64, f64::max);

    let buckets = thresholds
        .iter()
        .map(|&threshold| {
            let hit = paths.iter().filter(|p| p.max_drawdown >= threshold).count();
            let probability = hit as f64 / n;
            DownswingBucket {
                threshold,
                probability,
                expected_count: probability * sessions,
            }
        })
        .collect();

    let mut recoveries: Vec<u64> = Vec::new();
    let mut unrecovered = 0usize;
    for path in paths {
        match deepest_recovery(path) {
            Recovery::Recovered(hands) => recoveries.push(hands),
            Recovery::Censored => unrecovered += 1,
            Recovery::NoDrawdown => {}
        }
    }

    let average_recovery_hands = if recoveries.is_empty() {
        0.0
    } else {
        recoveries.iter().sum::<u64>() as f64 / recoveries.len() as f64
    };
    let longest_recovery = recoveries.iter().copied().max().unwrap_or(0);

    Ok(DownswingStats {
        average_max_drawdown,
        worst_max_drawdown,
        average_recovery_hands,
        longest_recovery,
        unrecovered_fraction: unrecovered as f64 / n,
        buckets,
    })
}

enum Recovery {
    /// Hands from the trough back to the prior peak.
    Recovered(u64),
    /// Still underwater at the end of the horizon.
    Censored,
    /// The path never left its peak.
    NoDrawdown,
}

/// Recovery time of a path's deepest downswing.
fn deepest_recovery(path: &SimulationPath) -> Recovery {
    if path.max_drawdown <= 0.0 {
        return Recovery::NoDrawdown;
    }

    // Trough: the step where the maximum drawdown occurred.
    let trough = path
        .drawdowns
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let prior_peak = path.peaks[trough];

    for i in trough + 1..path.winnings.len() {
        if path.winnings[i] >= prior_peak {
            return Recovery::Recovered(path.hands[i] - path.hands[trough]);
        }
    }
    Recovery::Censored
}

/// Per-step percentile envelope across the population.
///
/// Each band holds the `percentile`-th value of cumulative winnings at every
/// step, linearly interpolated between order statistics. All paths must
/// share the same step grid (they do when generated by one config).
///
/// # Errors
/// `InvalidParameter` on an empty population, mismatched grids, or a
/// percentile outside (0, 100).
pub fn percentile_bands(
    paths: &[SimulationPath],
    percentiles: &[f64],
) -> Result<PercentileBands, EngineError> {
    let Some(first) = paths.first() else {
        return Err(EngineError::invalid("percentile bands need at least one path"));
    };
    let steps = first.hands.len();
    if paths.iter().any(|p| p.hands != first.hands) {
        return Err(EngineError::invalid(
            "percentile bands require paths on a common step grid",
        ));
    }
    for &p in percentiles {
        if !(p > 0.0 && p < 100.0) {
            return Err(EngineError::invalid(format!(
                "percentile must be in (0, 100), got {p}"
            )));
        }
    }

    let mut bands: Vec<PercentileBand> = percentiles
        .iter()
        .map(|&percentile| PercentileBand {
            percentile,
            winnings: Vec::with_capacity(steps),
        })
        .collect();

    let mut column = vec![0.0_f64; paths.len()];
    for step in 0..steps {
        for (slot, path) in column.iter_mut().zip(paths) {
            *slot = path.winnings[step];
        }
        column.sort_by(f64::total_cmp);
        for band in &mut bands {
            band.winnings.push(interpolated(&column, band.percentile));
        }
    }

    bands.sort_by(|a, b| a.percentile.total_cmp(&b.percentile));
    Ok(PercentileBands {
        hands: first.hands.clone(),
        bands,
    })
}

/// Percentile of a sorted slice, linear interpolation between neighbors.
fn interpolated(sorted: &[f64], percentile: f64) -> f64 {
    let rank = percentile / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let weight = rank - lo as f64;
        sorted[lo] * (1.0 - weight) + sorted[hi] * weight
    }
}
