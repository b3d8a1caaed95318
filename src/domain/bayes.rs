//! Bayesian winrate inference.
//!
//! Treats the observed per-hand result as a sufficient statistic and
//! approximates the posterior over the true winrate as
//! Normal(observed winrate, standard error) under a flat prior. Under that
//! prior the credible intervals coincide numerically with the frequentist
//! confidence intervals built from the closed-form model.

use super::error::EngineError;
use super::model::{hands_for_accuracy, probability_true_winrate_above, standard_error};
use super::normal::{normal_inverse_cdf, normal_pdf};
use super::types::{BayesianAnalysis, CredibleInterval, NormalPoint, ObservedResults};

/// Default sample count for posterior curves.
pub const DEFAULT_CURVE_POINTS: usize = 100;

/// Default credible-interval masses, narrowest first.
pub const DEFAULT_INTERVALS: [f64; 4] = [0.50, 0.70, 0.90, 0.95];

/// The posterior density sampled at `num_points` over observed ± 4·SE.
///
/// The curve is fully materialized, ordered by x, and recomputed per call;
/// nothing is cached between requests.
pub fn posterior_distribution(
    observed: &ObservedResults,
    num_points: usize,
) -> Result<Vec<NormalPoint>, EngineError> {
    observed.validate()?;
    if num_points < 2 {
        return Err(EngineError::invalid("posterior curve needs at least 2 points"));
    }
    let mean = observed.observed_winrate();
    let se = standard_error(observed.hands_played, observed.std_dev)?;
    let lo = mean - 4.0 * se;
    let step = 8.0 * se / (num_points - 1) as f64;

    let curve = (0..num_points)
        .map(|i| {
            let x = lo + step * i as f64;
            NormalPoint {
                x,
                density: normal_pdf(x, mean, se),
            }
        })
        .collect();
    Ok(curve)
}

/// Credible intervals at each requested probability mass.
///
/// Half-width is `z((1+p)/2) · SE`, centered on the observed winrate.
pub fn multiple_credible_intervals(
    observed: &ObservedResults,
    probabilities: &[f64],
) -> Result<Vec<CredibleInterval>, EngineError> {
    observed.validate()?;
    let mean = observed.observed_winrate();
    let se = standard_error(observed.hands_played, observed.std_dev)?;

    probabilities
        .iter()
        .map(|&p| {
            if !(p > 0.0 && p < 1.0) {
                return Err(EngineError::invalid(format!(
                    "interval probability must be in (0, 1), got {p}"
                )));
            }
            let half_width = normal_inverse_cdf((1.0 + p) / 2.0)? * se;
            Ok(CredibleInterval {
                probability: p,
                lower: mean - half_width,
                upper: mean + half_width,
                label: format!("{:.0}% credible interval", p * 100.0),
            })
        })
        .collect()
}

/// Full winner analysis: posterior curve, credible intervals, and the
/// probabilities of beating zero and the target winrate.
pub fn bayesian_winner_analysis(
    observed: &ObservedResults,
    target_winrate: f64,
) -> Result<BayesianAnalysis, EngineError> {
    observed.validate()?;
    Ok(BayesianAnalysis {
        probability_winner: probability_true_winrate_above(observed, 0.0)?,
        probability_above_target: probability_true_winrate_above(observed, target_winrate)?,
        target_winrate,
        observed_winrate: observed.observed_winrate(),
        hands_played: observed.hands_played,
        standard_error: standard_error(observed.hands_played, observed.std_dev)?,
        credible_intervals: multiple_credible_intervals(observed, &DEFAULT_INTERVALS)?,
        posterior_curve: posterior_distribution(observed, DEFAULT_CURVE_POINTS)?,
    })
}

/// Qualitative read of an analysis for display.
///
/// Maps `probability_winner` into one of seven confidence bands; each band
/// quotes the additional hands needed for 95% confidence at ±1 bb/100.
/// Pure text generation — no numerical content beyond band selection.
pub fn generate_bayesian_insight(
    analysis: &BayesianAnalysis,
    std_dev: f64,
) -> Result<String, EngineError> {
    let target_hands = hands_for_accuracy(std_dev, 1.0, 0.95)?;
    let more_hands = target_hands.saturating_sub(analysis.hands_played);
    let p = analysis.probability_winner;

    let verdict = if p >= 0.99 {
        "You are virtually certain to be a winner at this game."
    } else if p >= 0.95 {
        "You are very likely a winning player."
    } else if p >= 0.80 {
        "You are probably a winning player, but the sample leaves room for doubt."
    } else if p >= 0.60 {
        "The evidence leans toward you being a winner, weakly."
    } else if p >= 0.40 {
        "Your results so far are consistent with break-even play."
    } else if p >= 0.20 {
        "The evidence leans toward you being a losing player."
    } else {
        "You are most likely a losing player at this game."
    };

    Ok(format!(
        "{verdict} Observed {:.2} bb/100 over {} hands (standard error {:.2}). \
         About {more_hands} more hands would pin your winrate within ±1 bb/100 \
         at 95% confidence.",
        analysis.observed_winrate, analysis.hands_played, analysis.standard_error,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ObservedResults {
        ObservedResults {
            observed_winnings: 1250.0,
            hands_played: 50_000,
            std_dev: 75.0,
        }
    }

    #[test]
    fn test_posterior_curve_shape() {
        let curve = posterior_distribution(&sample(), 100).unwrap();
        assert_eq!(curve.len(), 100);
        // Ordered by x, spanning observed ± 4 SE.
        assert!(curve.windows(2).all(|w| w[1].x > w[0].x));
        let se = standard_error(50_000, 75.0).unwrap();
        assert!((curve[0].x - (2.5 - 4.0 * se)).abs() < 1e-9);
        assert!((curve[99].x - (2.5 + 4.0 * se)).abs() < 1e-9);
        // Peak near the center.
        let peak = curve
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.density.total_cmp(&b.1.density))
            .map(|(i, _)| i)
            .unwrap();
        assert!((49..=50).contains(&peak));
    }

    #[test]
    fn test_credible_intervals_widen_with_mass() {
        let intervals =
            multiple_credible_intervals(&sample(), &DEFAULT_INTERVALS).unwrap();
        assert_eq!(intervals.len(), 4);
        for pair in intervals.windows(2) {
            let narrow = pair[0].upper - pair[0].lower;
            let wide = pair[1].upper - pair[1].lower;
            assert!(wide > narrow);
        }
        // Centered on the observed winrate.
        for ci in &intervals {
            assert!(((ci.lower + ci.upper) / 2.0 - 2.5).abs() < 1e-9);
        }
        assert_eq!(intervals[3].label, "95% credible interval");
    }

    #[test]
    fn test_interval_rejects_bad_probability() {
        assert!(multiple_credible_intervals(&sample(), &[0.0]).is_err());
        assert!(multiple_credible_intervals(&sample(), &[1.0]).is_err());
    }

    #[test]
    fn test_winner_analysis_composes() {
        let analysis = bayesian_winner_analysis(&sample(), 2.0).unwrap();
        assert!(analysis.probability_winner > 0.95);
        assert!(analysis.probability_above_target < analysis.probability_winner);
        assert!((analysis.observed_winrate - 2.5).abs() < 1e-12);
        assert_eq!(analysis.posterior_curve.len(), DEFAULT_CURVE_POINTS);
        assert_eq!(analysis.credible_intervals.len(), 4);
    }

    #[test]
    fn test_insight_band_selection() {
        let mut analysis = bayesian_winner_analysis(&sample(), 0.0).unwrap();

        analysis.probability_winner = 0.995;
        let text = generate_bayesian_insight(&analysis, 75.0).unwrap();
        assert!(text.contains("virtually certain"));

        analysis.probability_winner = 0.95;
        let text = generate_bayesian_insight(&analysis, 75.0).unwrap();
        assert!(text.contains("very likely"));

        analysis.probability_winner = 0.50;
        let text = generate_bayesian_insight(&analysis, 75.0).unwrap();
        assert!(text.contains("break-even"));

        analysis.probability_winner = 0.05;
        let text = generate_bayesian_insight(&analysis, 75.0).unwrap();
        assert!(text.contains("losing player"));
    }
}
