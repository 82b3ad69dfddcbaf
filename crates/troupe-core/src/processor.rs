//! # Task Processing
//!
//! The pluggable seam between the agent lifecycle and whatever actually
//! produces an answer. [`Agent::run`](crate::agent::Agent::run) owns status,
//! timing and memory bookkeeping; a [`TaskProcessor`] only turns a task into
//! an output or a [`TaskError`].

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Duration;

use crate::agent::AgentProfile;
use crate::error::TaskError;
use crate::memory::Memory;
use crate::result::ToolCallRecord;
use crate::tool::ToolSet;

/// Free-form context passed alongside a task.
pub type TaskContext = HashMap<String, Value>;

/// Well-known context keys.
pub struct ContextKeys;

impl ContextKeys {
    /// Output of the preceding workflow step.
    pub const PREVIOUS_RESULT: &'static str = "previous_result";
}

/// Everything a processor may look at while handling one task.
#[derive(Debug, Clone, Copy)]
pub struct TaskRequest<'a> {
    pub agent: &'a AgentProfile,
    pub task: &'a str,
    pub context: &'a TaskContext,
    pub tools: &'a ToolSet,
    pub memory: &'a Memory,
}

/// Successful processor output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskOutput {
    pub output: Value,
    pub tool_calls: Vec<ToolCallRecord>,
}

impl TaskOutput {
    pub fn new(output: impl Into<Value>) -> Self {
        Self {
            output: output.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCallRecord>) -> Self {
        self.tool_calls = tool_calls;
        self
    }
}

impl From<Value> for TaskOutput {
    fn from(output: Value) -> Self {
        Self::new(output)
    }
}

/// Turns a task into an output.
///
/// Implementations must not panic for ordinary failures; return
/// [`TaskError`] instead and the agent records a failed result.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use serde_json::json;
/// use troupe_core::{TaskError, TaskOutput, TaskProcessor, TaskRequest};
///
/// struct Shout;
///
/// #[async_trait]
/// impl TaskProcessor for Shout {
///     async fn process(&self, request: TaskRequest<'_>) -> Result<TaskOutput, TaskError> {
///         if request.task.is_empty() {
///             return Err(TaskError::InvalidInput("empty task".to_string()));
///         }
///         Ok(json!(request.task.to_uppercase()).into())
///     }
/// }
/// ```
#[async_trait]
pub trait TaskProcessor: Send + Sync {
    async fn process(&self, request: TaskRequest<'_>) -> Result<TaskOutput, TaskError>;
}

/// Default processor: acknowledges the task after a simulated latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoProcessor {
    latency: Duration,
}

impl EchoProcessor {
    pub const DEFAULT_LATENCY: Duration = Duration::from_millis(100);

    pub fn new() -> Self {
        Self {
            latency: Self::DEFAULT_LATENCY,
        }
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }

    /// Echo processor with no simulated latency.
    pub fn instant() -> Self {
        Self::with_latency(Duration::ZERO)
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

impl Default for EchoProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskProcessor for EchoProcessor {
    async fn process(&self, request: TaskRequest<'_>) -> Result<TaskOutput, TaskError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        Ok(json!({
            "task": request.task,
            "status": "completed",
            "message": format!("Agent {} processed task successfully", request.agent.name),
            "tools_available": request.tools.names(),
        })
        .into())
    }
}
