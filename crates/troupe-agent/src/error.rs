//! Error types for orchestration.

use thiserror::Error;

/// Lookup failures raised by the orchestrator.
///
/// These never surface as `Err`; the orchestrator turns them into failed
/// [`AgentResult`](troupe_core::AgentResult)s using the `Display` text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestrationError {
    /// No agent is registered under the name.
    #[error("Agent '{0}' not found")]
    AgentNotFound(String),

    /// No workflow is registered under the name.
    #[error("Workflow '{0}' not found")]
    WorkflowNotFound(String),
}

impl OrchestrationError {
    /// Stable code suitable for structured logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            OrchestrationError::AgentNotFound(_) => "AGENT_NOT_FOUND",
            OrchestrationError::WorkflowNotFound(_) => "WORKFLOW_NOT_FOUND",
        }
    }
}
