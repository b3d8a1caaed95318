//! Simulation service port.
//!
//! The boundary trait interactive callers program against. An
//! implementation accepts a self-contained request and hands back a
//! receiver carrying progress messages followed by exactly one terminal.
//!
//! Cancellation is structural: dropping the receiver is the only
//! cancellation mechanism — the worker notices its channel is gone and
//! stops. No cooperative handshake exists, deliberately.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::error::EngineError;
use crate::host::protocol::{SimulationOutcome, SimulationRequest, SimulationResponse};

/// Asynchronous simulation execution boundary.
#[async_trait]
pub trait SimulationService: Send + Sync {
    /// Dispatches a request to an isolated worker.
    ///
    /// Returns immediately; all results, including validation failures,
    /// arrive as messages on the returned channel.
    fn submit(&self, request: SimulationRequest) -> mpsc::Receiver<SimulationResponse>;

    /// Submits and awaits the terminal message, discarding progress.
    ///
    /// # Errors
    /// The terminal `Error` payload, or `EngineFailure` when the worker
    /// vanished without sending a terminal at all.
    async fn run_to_completion(
        &self,
        request: SimulationRequest,
    ) -> Result<SimulationOutcome, EngineError> {
        let mut rx = self.submit(request);
        while let Some(message) = rx.recv().await {
            match message {
                SimulationResponse::Progress { .. } => {}
                SimulationResponse::Result { outcome } => return Ok(outcome),
                SimulationResponse::Error { error } => return Err(error),
            }
        }
        Err(EngineError::EngineFailure(
            "worker closed the channel without a terminal message".into(),
        ))
    }
}
