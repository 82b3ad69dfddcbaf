//! Error types shared across the Troupe core.
//!
//! Task failures are returned by [`TaskProcessor`](crate::processor::TaskProcessor)
//! implementations and converted into failed
//! [`AgentResult`](crate::result::AgentResult)s at the agent boundary. They
//! never escape `Agent::run`.

use thiserror::Error;

/// Failure reported by a task processor.
///
/// The `Display` output is the textual description carried by the failed
/// `AgentResult`, so variants keep their messages short and self-contained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// Generic processing failure with a free-form description.
    #[error("{0}")]
    Failed(String),

    /// The task or its context could not be interpreted.
    #[error("Invalid task input: {0}")]
    InvalidInput(String),

    /// A tool invoked during processing failed and the processor gave up.
    #[error("Tool '{tool}' failed: {reason}")]
    ToolFailed { tool: String, reason: String },

    /// The processor exhausted the agent's iteration budget.
    #[error("Iteration limit of {limit} reached")]
    IterationLimit { limit: u32 },

    /// Unexpected internal state.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TaskError {
    /// Shorthand for [`TaskError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        TaskError::Failed(message.into())
    }

    /// Stable code suitable for structured logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            TaskError::Failed(_) => "TASK_FAILED",
            TaskError::InvalidInput(_) => "INVALID_INPUT",
            TaskError::ToolFailed { .. } => "TOOL_FAILED",
            TaskError::IterationLimit { .. } => "ITERATION_LIMIT",
            TaskError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Errors raised while converting memory to or from its JSON form.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// The snapshot could not be rendered as JSON.
    #[error("Failed to serialize memory: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The input was not a valid memory snapshot.
    #[error("Failed to deserialize memory: {0}")]
    Deserialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_displays_bare_message() {
        let err = TaskError::failed("boom");
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn tool_failure_mentions_tool() {
        let err = TaskError::ToolFailed {
            tool: "file_read".to_string(),
            reason: "missing path".to_string(),
        };
        assert_eq!(err.to_string(), "Tool 'file_read' failed: missing path");
        assert_eq!(err.error_code(), "TOOL_FAILED");
    }

    #[test]
    fn memory_error_wraps_serde() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = MemoryError::Deserialize(source);
        assert!(err.to_string().starts_with("Failed to deserialize memory"));
    }
}
