//! Per-request simulation workers.
//!
//! `SimulationHost` implements the `SimulationService` port: each request
//! runs on its own `spawn_blocking` task with its own seeded generator and
//! its own response channel. Workers share nothing; isolation is
//! structural, not lock-based.
//!
//! Message discipline per request:
//! - progress messages carry non-decreasing fractions and always precede
//!   the terminal;
//! - exactly one terminal (`Result` or `Error`) is sent;
//! - a send attempted after the terminal is a protocol violation — logged
//!   and dropped, never delivered;
//! - when the caller drops its receiver, the next send fails and the
//!   worker abandons the run without producing anything.

use std::panic::{AssertUnwindSafe, catch_unwind};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::domain::error::EngineError;
use crate::sim::engine::{
    SimulationConfig, SimulationRun, simulate_paths_observed_with_progress,
    simulate_paths_with_progress,
};
use crate::sim::stats::{downswing_stats, percentile_bands};

use super::protocol::{SimulationOutcome, SimulationRequest, SimulationResponse};
use crate::ports::simulation::SimulationService;

/// Host sizing limits.
#[derive(Debug, Clone, Copy)]
pub struct HostConfig {
    /// Upper bound on `num_paths × steps` per request.
    ///
    /// Oversized requests are rejected with a terminal error before any
    /// sampling starts, so a single request can never block the blocking
    /// pool unboundedly.
    pub max_cells: u64,
    /// Response channel capacity. Progress messages beyond a full buffer
    /// are dropped (the fraction stream stays monotone); terminals are
    /// never dropped.
    pub channel_capacity: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_cells: 20_000_000,
            channel_capacity: 64,
        }
    }
}

/// Simulation execution host. Stateless between requests.
#[derive(Debug, Clone, Default)]
pub struct SimulationHost {
    config: HostConfig,
}

impl SimulationHost {
    /// Creates a host with the given limits.
    pub fn new(config: HostConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SimulationService for SimulationHost {
    fn submit(&self, request: SimulationRequest) -> mpsc::Receiver<SimulationResponse> {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let request_id = Uuid::new_v4();
        let max_cells = self.config.max_cells;

        tokio::task::spawn_blocking(move || {
            let span = info_span!(
                "simulation_request",
                request_id = %request_id,
                kind = request.kind_name(),
            );
            let _enter = span.enter();
            run_request(&request, max_cells, &tx);
        });

        rx
    }
}

/// Executes one request and enforces the terminal discipline.
fn run_request(
    request: &SimulationRequest,
    max_cells: u64,
    tx: &mpsc::Sender<SimulationResponse>,
) {
    // Panics inside the engine become EngineFailure terminals instead of
    // silently killing the worker.
    let result = catch_unwind(AssertUnwindSafe(|| execute(request, max_cells, tx)));

    let terminal = match result {
        Ok(Ok(Some(outcome))) => SimulationResponse::Result { outcome },
        Ok(Ok(None)) => {
            // Receiver gone mid-run: nothing left to tell anyone.
            debug!("request cancelled by caller, discarding partial work");
            return;
        }
        Ok(Err(error)) => SimulationResponse::Error { error },
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(ToString::to_string)
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "worker panicked".into());
            SimulationResponse::Error {
                error: EngineError::EngineFailure(message),
            }
        }
    };

    if tx.blocking_send(terminal).is_err() {
        debug!("caller dropped receiver before terminal message");
    } else {
        info!("simulation request finished");
    }
}

/// Runs the requested simulation kind.
///
/// `Ok(None)` means the caller cancelled (receiver dropped) and the run
/// stopped early.
fn execute(
    request: &SimulationRequest,
    max_cells: u64,
    tx: &mpsc::Sender<SimulationResponse>,
) -> Result<Option<SimulationOutcome>, EngineError> {
    match request {
        SimulationRequest::Simulate { params, config } => {
            params.validate()?;
            ensure_budget(config, max_cells)?;
            let run = simulate_paths_with_progress(
                params.winrate,
                params.std_dev,
                config,
                progress_sink(tx),
            )?;
            Ok(match run {
                SimulationRun::Completed(paths) => {
                    Some(SimulationOutcome::Paths { paths })
                }
                SimulationRun::Cancelled => None,
            })
        }

        SimulationRequest::SimulateObserved { observed, config } => {
            ensure_budget(config, max_cells)?;
            let run =
                simulate_paths_observed_with_progress(observed, config, progress_sink(tx))?;
            Ok(match run {
                SimulationRun::Completed(paths) => {
                    Some(SimulationOutcome::Paths { paths })
                }
                SimulationRun::Cancelled => None,
            })
        }

        SimulationRequest::DownswingProbability {
            params,
            config,
            thresholds,
            sessions,
            percentiles,
        } => {
            params.validate()?;
            ensure_budget(config, max_cells)?;
            if !(sessions.is_finite() && *sessions >= 0.0) {
                return Err(EngineError::invalid(format!(
                    "sessions must be non-negative, got {sessions}"
                )));
            }
            let run = simulate_paths_with_progress(
                params.winrate,
                params.std_dev,
                config,
                progress_sink(tx),
            )?;
            let paths = match run {
                SimulationRun::Completed(paths) => paths,
                SimulationRun::Cancelled => return Ok(None),
            };
            let stats = downswing_stats(&paths, thresholds, *sessions)?;
            let bands = percentile_bands(&paths, percentiles)?;
            Ok(Some(SimulationOutcome::Downswing { stats, bands }))
        }

        SimulationRequest::SimulateTournament {
            params,
            num_paths,
            seed,
        } => {
            // One walk step per tournament: the engine's 100-hand unit maps
            // to one event, so mean/sd per step are the per-tournament
            // currency values.
            let config = SimulationConfig {
                num_paths: *num_paths,
                hands: params.tournaments.saturating_mul(100),
                hands_per_step: 100,
                seed: *seed,
            };
            ensure_budget(&config, max_cells)?;
            if !(params.buyin.is_finite() && params.buyin > 0.0) {
                return Err(EngineError::invalid(format!(
                    "buyin must be positive, got {}",
                    params.buyin
                )));
            }
            let winrate = params.roi_percent / 100.0 * params.buyin;
            let std_dev = params.std_dev_buyins * params.buyin;
            let run =
                simulate_paths_with_progress(winrate, std_dev, &config, progress_sink(tx))?;
            Ok(match run {
                SimulationRun::Completed(paths) => {
                    Some(SimulationOutcome::Tournament { paths })
                }
                SimulationRun::Cancelled => None,
            })
        }
    }
}

/// Rejects requests whose work volume exceeds the host budget.
fn ensure_budget(config: &SimulationConfig, max_cells: u64) -> Result<(), EngineError> {
    config.validate()?;
    let cells = config.total_cells();
    if cells > max_cells {
        return Err(EngineError::invalid(format!(
            "simulation of {cells} path-steps exceeds the host budget of {max_cells}"
        )));
    }
    Ok(())
}

/// Bridges engine progress callbacks onto the response channel.
///
/// Full buffer: the fraction is dropped (progress is advisory and the next
/// report supersedes it). Closed channel: returns `false`, which the engine
/// treats as cancellation.
fn progress_sink(
    tx: &mpsc::Sender<SimulationResponse>,
) -> impl FnMut(f64) -> bool + '_ {
    move |fraction| match tx.try_send(SimulationResponse::Progress { fraction }) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!(fraction, "progress buffer full, dropping report");
            true
        }
        Err(mpsc::error::TrySendError::Closed(_)) => false,
    }
}
