//! Variance Engine — Entry Point
//!
//! Computes a full variance report for the scenario in `config.toml` and
//! prints it as one JSON document on stdout.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Resolve the base seed (config or OS entropy, logged either way)
//! 4. Closed-form section (inline — cheap and pure)
//! 5. Bayesian section when observed results are configured
//! 6. Simulation host: display batch + downswing estimation batch,
//!    progress streamed to the log
//! 7. Print the assembled report

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use variance_engine::config::{self, AppConfig};
use variance_engine::domain::bayes::{bayesian_winner_analysis, generate_bayesian_insight};
use variance_engine::domain::types::{
    BankrollRequirement, BayesianAnalysis, DownswingStats, ObservedResults,
    PercentileBands, SimulationPath, VarianceParameters,
};
use variance_engine::domain::{EngineError, model};
use variance_engine::host::{
    self, SimulationHost, SimulationOutcome, SimulationRequest, SimulationResponse,
};
use variance_engine::ports::SimulationService;
use variance_engine::sim::SimulationConfig;

/// Closed-form section of the report.
#[derive(Debug, Serialize)]
struct ClosedFormReport {
    expected_winnings: f64,
    winnings_std_dev: f64,
    probability_of_loss: f64,
    probability_of_profit: f64,
    percentile_5: f64,
    percentile_50: f64,
    percentile_95: f64,
    risk_of_ruin: f64,
    minimum_bankroll: BankrollRequirement,
    standard_error: f64,
    hands_for_1bb_accuracy: u64,
}

/// Bayesian section, present when observed results are configured.
#[derive(Debug, Serialize)]
struct BayesianReport {
    analysis: BayesianAnalysis,
    insight: String,
}

/// The full report printed to stdout.
#[derive(Debug, Serialize)]
struct VarianceReport {
    scenario: VarianceParameters,
    seed: u64,
    closed_form: ClosedFormReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    bayesian: Option<BayesianReport>,
    sample_paths: Vec<SimulationPath>,
    downswings: DownswingStats,
    percentile_bands: PercentileBands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let config = config::loader::load_config("config.toml")
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.app.log_level)
                }),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    info!(
        name = %config.app.name,
        version = env!("CARGO_PKG_VERSION"),
        "Starting variance engine"
    );

    // ── 3. Resolve the base seed ────────────────────────────
    let seed = config.simulation.seed.unwrap_or_else(rand::random);
    info!(seed, "Simulation seed resolved");

    let report = build_report(&config, seed).await?;

    // ── 7. Print the report ─────────────────────────────────
    let json = serde_json::to_string_pretty(&report)
        .context("Failed to serialize report")?;
    println!("{json}");
    Ok(())
}

async fn build_report(config: &AppConfig, seed: u64) -> Result<VarianceReport> {
    let scenario = &config.scenario;
    let params = VarianceParameters {
        winrate: scenario.winrate,
        std_dev: scenario.std_dev,
        hands: scenario.hands,
        bankroll: scenario.bankroll,
        stake_value: scenario.stake_value,
    };
    params.validate()?;

    // ── 4. Closed-form section ──────────────────────────────
    let closed_form = closed_form_report(&params, config)?;
    info!(
        expected = closed_form.expected_winnings,
        ruin = closed_form.risk_of_ruin,
        "Closed-form model evaluated"
    );

    // ── 5. Bayesian section ─────────────────────────────────
    let bayesian = match (scenario.observed_winnings, scenario.observed_hands) {
        (Some(winnings), Some(hands)) => {
            let observed = ObservedResults {
                observed_winnings: winnings,
                hands_played: hands,
                std_dev: scenario.std_dev,
            };
            let analysis = bayesian_winner_analysis(&observed, 0.0)?;
            let insight = generate_bayesian_insight(&analysis, scenario.std_dev)?;
            info!(
                probability_winner = analysis.probability_winner,
                "Bayesian analysis complete"
            );
            Some(BayesianReport { analysis, insight })
        }
        _ => None,
    };

    // ── 6. Simulation batches ───────────────────────────────
    let host = SimulationHost::new(host::HostConfig {
        max_cells: config.simulation.max_cells,
        ..host::HostConfig::default()
    });

    // Display batch and estimation batch are independent runs: few
    // representative paths for drawing, many for probability estimates.
    let display = SimulationRequest::Simulate {
        params,
        config: SimulationConfig {
            num_paths: config.simulation.display_paths,
            hands: params.hands,
            hands_per_step: config.simulation.hands_per_step,
            seed,
        },
    };
    let estimation = SimulationRequest::DownswingProbability {
        params,
        config: SimulationConfig {
            num_paths: config.simulation.estimation_paths,
            hands: params.hands,
            hands_per_step: config.simulation.hands_per_step,
            seed: seed.wrapping_add(1),
        },
        thresholds: config.simulation.downswing_thresholds.clone(),
        sessions: config.simulation.sessions,
        percentiles: config.simulation.percentiles.clone(),
    };

    let sample_paths = match host.run_to_completion(display).await? {
        SimulationOutcome::Paths { paths } => paths,
        other => anyhow::bail!("unexpected outcome for display batch: {other:?}"),
    };

    let (downswings, percentile_bands) = match run_logged(&host, estimation).await? {
        SimulationOutcome::Downswing { stats, bands } => (stats, bands),
        other => anyhow::bail!("unexpected outcome for estimation batch: {other:?}"),
    };
    info!(
        average_max_drawdown = downswings.average_max_drawdown,
        worst = downswings.worst_max_drawdown,
        "Downswing estimation complete"
    );

    Ok(VarianceReport {
        scenario: params,
        seed,
        closed_form,
        bayesian,
        sample_paths,
        downswings,
        percentile_bands,
    })
}

fn closed_form_report(
    params: &VarianceParameters,
    config: &AppConfig,
) -> Result<ClosedFormReport, EngineError> {
    let confidence = config.bankroll.confidence;
    Ok(ClosedFormReport {
        expected_winnings: model::expected_winnings(params.hands, params.winrate),
        winnings_std_dev: model::winnings_std_dev(params.hands, params.std_dev)?,
        probability_of_loss: model::probability_of_loss(
            params.hands,
            params.winrate,
            params.std_dev,
        )?,
        probability_of_profit: model::probability_of_profit(
            params.hands,
            params.winrate,
            params.std_dev,
        )?,
        percentile_5: model::percentile_outcome(
            5.0,
            params.hands,
            params.winrate,
            params.std_dev,
        )?,
        percentile_50: model::percentile_outcome(
            50.0,
            params.hands,
            params.winrate,
            params.std_dev,
        )?,
        percentile_95: model::percentile_outcome(
            95.0,
            params.hands,
            params.winrate,
            params.std_dev,
        )?,
        risk_of_ruin: model::risk_of_ruin(
            params.winrate,
            params.bankroll,
            params.std_dev,
        )?,
        minimum_bankroll: model::minimum_bankroll(
            params.winrate,
            params.std_dev,
            config.bankroll.target_risk_of_ruin,
        )?,
        standard_error: model::standard_error(params.hands, params.std_dev)?,
        hands_for_1bb_accuracy: model::hands_for_accuracy(
            params.std_dev,
            1.0,
            confidence,
        )?,
    })
}

/// Runs a request, logging progress messages as they stream in.
async fn run_logged(
    host: &SimulationHost,
    request: SimulationRequest,
) -> Result<SimulationOutcome, EngineError> {
    let mut rx = host.submit(request);
    while let Some(message) = rx.recv().await {
        match message {
            SimulationResponse::Progress { fraction } => {
                debug!(fraction, "Simulation progress");
            }
            SimulationResponse::Result { outcome } => return Ok(outcome),
            SimulationResponse::Error { error } => return Err(error),
        }
    }
    Err(EngineError::EngineFailure(
        "worker closed the channel without a terminal message".into(),
    ))
}
