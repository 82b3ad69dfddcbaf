//! Execution outcome records.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::tool::{ToolParams, ToolResult};

/// One tool invocation made while processing a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub tool: String,
    pub parameters: ToolParams,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolCallRecord {
    pub fn new(tool: impl Into<String>, parameters: ToolParams, result: &ToolResult) -> Self {
        Self {
            tool: tool.into(),
            parameters,
            success: result.is_success(),
            data: result.data().cloned(),
            error: result.error_message(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Success(Value),
    Failure(String),
}

/// Immutable record of one agent execution.
///
/// Only [`AgentResult::success`] and [`AgentResult::failure`] construct a
/// result, so a successful result never carries an error and a failed one
/// never carries output.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentResult {
    outcome: Outcome,
    execution_time: Duration,
    tool_calls: Vec<ToolCallRecord>,
    metadata: HashMap<String, Value>,
}

impl AgentResult {
    /// Metadata key holding the acting agent's identifier.
    pub const AGENT_ID_KEY: &'static str = "agent_id";
    /// Metadata key holding the acting agent's name.
    pub const AGENT_NAME_KEY: &'static str = "agent_name";

    pub fn success(output: impl Into<Value>, execution_time: Duration) -> Self {
        Self {
            outcome: Outcome::Success(output.into()),
            execution_time,
            tool_calls: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn failure(error: impl Into<String>, execution_time: Duration) -> Self {
        Self {
            outcome: Outcome::Failure(error.into()),
            execution_time,
            tool_calls: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCallRecord>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    pub fn output(&self) -> Option<&Value> {
        match &self.outcome {
            Outcome::Success(output) => Some(output),
            Outcome::Failure(_) => None,
        }
    }

    pub fn into_output(self) -> Option<Value> {
        match self.outcome {
            Outcome::Success(output) => Some(output),
            Outcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Failure(error) => Some(error),
        }
    }

    /// Wall-clock time spent inside the run.
    pub fn execution_time(&self) -> Duration {
        self.execution_time
    }

    pub fn tool_calls(&self) -> &[ToolCallRecord] {
        &self.tool_calls
    }

    pub fn metadata(&self) -> &HashMap<String, Value> {
        &self.metadata
    }

    pub fn agent_id(&self) -> Option<&str> {
        self.metadata.get(Self::AGENT_ID_KEY).and_then(Value::as_str)
    }

    pub fn agent_name(&self) -> Option<&str> {
        self.metadata
            .get(Self::AGENT_NAME_KEY)
            .and_then(Value::as_str)
    }

    pub fn to_representation(&self) -> AgentResultSnapshot {
        AgentResultSnapshot {
            success: self.is_success(),
            output: self.output().cloned(),
            error: self.error().map(str::to_string),
            execution_time: self.execution_time.as_secs_f64(),
            tool_calls: self.tool_calls.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

impl Serialize for AgentResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_representation().serialize(serializer)
    }
}

/// Structural form of an [`AgentResult`]; `execution_time` is in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResultSnapshot {
    pub success: bool,
    pub output: Option<Value>,
    pub error: Option<String>,
    pub execution_time: f64,
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRecord>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}
