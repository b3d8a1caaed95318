//! Property-Based Tests — Domain Layer Invariants
//!
//! Uses `proptest` to verify that the probability model maintains
//! mathematical invariants across random inputs.

use proptest::prelude::*;

use variance_engine::domain::model;
use variance_engine::domain::normal::{normal_cdf, normal_inverse_cdf};
use variance_engine::sim::engine::{SimulationConfig, simulate_paths};
use variance_engine::sim::stats::downswing_stats;

// ── Normal Kernel Properties ────────────────────────────────

proptest! {
    /// CDF and inverse CDF must round-trip within 1e-6 on (0.0001, 0.9999).
    #[test]
    fn normal_cdf_inverse_round_trip(p in 0.0001f64..0.9999) {
        let z = normal_inverse_cdf(p).unwrap();
        let back = normal_cdf(z);
        prop_assert!(
            (back - p).abs() < 1e-6,
            "round trip at p={p} gave {back}"
        );
    }

    /// The CDF is monotone non-decreasing and bounded in [0, 1].
    #[test]
    fn normal_cdf_monotone_and_bounded(
        z1 in -10.0f64..10.0,
        delta in 0.0f64..5.0,
    ) {
        let lo = normal_cdf(z1);
        let hi = normal_cdf(z1 + delta);
        prop_assert!((0.0..=1.0).contains(&lo));
        prop_assert!(hi >= lo, "cdf({z1})={lo} > cdf({})={hi}", z1 + delta);
    }
}

// ── Closed-Form Model Properties ────────────────────────────

proptest! {
    /// Loss and profit probabilities are complementary.
    #[test]
    fn loss_plus_profit_is_one(
        hands in 1u64..1_000_000,
        winrate in -20.0f64..20.0,
        std_dev in 1.0f64..300.0,
    ) {
        let loss = model::probability_of_loss(hands, winrate, std_dev).unwrap();
        let profit = model::probability_of_profit(hands, winrate, std_dev).unwrap();
        prop_assert!((loss + profit - 1.0).abs() < 1e-12);
    }

    /// Risk of ruin is a probability, certain for non-positive winrates,
    /// and decreasing in bankroll.
    #[test]
    fn risk_of_ruin_bounds(
        winrate in -10.0f64..10.0,
        bankroll in 0.0f64..100_000.0,
        std_dev in 1.0f64..300.0,
    ) {
        let ror = model::risk_of_ruin(winrate, bankroll, std_dev).unwrap();
        prop_assert!((0.0..=1.0).contains(&ror), "risk of ruin {ror}");
        if winrate <= 0.0 {
            prop_assert!((ror - 1.0).abs() < f64::EPSILON);
        } else {
            let deeper = model::risk_of_ruin(winrate, bankroll + 1000.0, std_dev).unwrap();
            prop_assert!(deeper <= ror);
        }
    }

    /// minimum_bankroll round-trips through risk_of_ruin.
    #[test]
    fn minimum_bankroll_round_trip(
        winrate in 0.1f64..15.0,
        std_dev in 10.0f64..200.0,
        target in 0.001f64..0.5,
    ) {
        let roll = model::minimum_bankroll(winrate, std_dev, target)
            .unwrap()
            .as_finite()
            .unwrap();
        let ror = model::risk_of_ruin(winrate, roll, std_dev).unwrap();
        prop_assert!(
            (ror - target).abs() < 1e-9,
            "target {target} round-tripped to {ror}"
        );
    }

    /// Percentile outcomes are monotone in the percentile.
    #[test]
    fn percentile_outcome_monotone(
        hands in 1u64..500_000,
        winrate in -10.0f64..10.0,
        std_dev in 1.0f64..300.0,
        p1 in 1.0f64..50.0,
        p2 in 50.0f64..99.0,
    ) {
        let lo = model::percentile_outcome(p1, hands, winrate, std_dev).unwrap();
        let hi = model::percentile_outcome(p2, hands, winrate, std_dev).unwrap();
        prop_assert!(hi >= lo);
    }

    /// hands_for_accuracy produces a margin no worse than requested.
    #[test]
    fn hands_for_accuracy_meets_margin(
        std_dev in 10.0f64..200.0,
        margin in 0.5f64..10.0,
    ) {
        let hands = model::hands_for_accuracy(std_dev, margin, 0.95).unwrap();
        let se = model::standard_error(hands, std_dev).unwrap();
        let z = normal_inverse_cdf(0.975).unwrap();
        prop_assert!(z * se <= margin * (1.0 + 1e-9));
    }
}

// ── Simulation Engine Properties ────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Every simulated path maintains the peak/drawdown invariants.
    #[test]
    fn simulated_paths_maintain_invariants(
        winrate in -10.0f64..10.0,
        std_dev in 10.0f64..200.0,
        seed in any::<u64>(),
    ) {
        let config = SimulationConfig {
            num_paths: 10,
            hands: 5_000,
            hands_per_step: 250,
            seed,
        };
        for path in simulate_paths(winrate, std_dev, &config).unwrap() {
            prop_assert_eq!(path.winnings[0], 0.0);
            prop_assert!(path.hands.windows(2).all(|w| w[1] > w[0]));
            for i in 0..path.steps() {
                prop_assert!(path.peaks[i] >= path.winnings[i]);
                prop_assert!(path.drawdowns[i] >= 0.0);
                prop_assert!(
                    (path.drawdowns[i] - (path.peaks[i] - path.winnings[i])).abs()
                        < 1e-12
                );
            }
            prop_assert!(path.peaks.windows(2).all(|w| w[1] >= w[0]));
        }
    }

    /// Downswing probabilities never increase with the threshold.
    #[test]
    fn downswing_probabilities_non_increasing(seed in any::<u64>()) {
        let config = SimulationConfig {
            num_paths: 100,
            hands: 20_000,
            hands_per_step: 1000,
            seed,
        };
        let paths = simulate_paths(2.0, 90.0, &config).unwrap();
        let thresholds = [250.0, 500.0, 1000.0, 2000.0, 4000.0];
        let stats = downswing_stats(&paths, &thresholds, 1.0).unwrap();
        for pair in stats.buckets.windows(2) {
            prop_assert!(pair[1].probability <= pair[0].probability);
        }
    }
}
