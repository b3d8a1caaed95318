//! Execution host — the worker boundary.
//!
//! Runs the simulation engine off the interactive path. Callers talk to it
//! exclusively through message passing: a request in, a stream of progress
//! messages and one terminal out. No shared mutable state crosses the
//! boundary.

pub mod protocol;
pub mod worker;

pub use protocol::{
    SimulationOutcome, SimulationRequest, SimulationResponse, TournamentParameters,
};
pub use worker::{HostConfig, SimulationHost};
