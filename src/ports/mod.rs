//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) the caller-facing side of the engine
//! programs against. The host layer implements them.
//!
//! Port categories:
//! - `SimulationService`: asynchronous Monte Carlo execution boundary

pub mod simulation;

pub use simulation::SimulationService;
