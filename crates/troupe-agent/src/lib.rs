//! # Troupe Agent
//!
//! The [`Orchestrator`] keeps a registry of agents and named workflows and
//! runs them singly, as concurrent batches, or as context-threading
//! pipelines. Every run produces [`AgentResult`](troupe_core::AgentResult)s;
//! lookup misses and processor failures are reported in results, never as
//! errors or panics.

pub mod error;
pub mod orchestrator;

pub use error::OrchestrationError;
pub use orchestrator::{Orchestrator, OrchestratorStatus, ParallelTask, ParseParallelTaskError};
