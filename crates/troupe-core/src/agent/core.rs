//! # Agent Core
//!
//! The agent execution lifecycle: status transitions, timing, memory
//! bookkeeping and conversion of processor failures into results.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::status::AgentStatus;
use crate::config::LlmConfig;
use crate::memory::{Memory, MemoryKeys, MemorySnapshot};
use crate::processor::{EchoProcessor, TaskContext, TaskOutput, TaskProcessor, TaskRequest};
use crate::result::AgentResult;
use crate::tool::{Tool, ToolSet};

/// Descriptive settings of an agent, handed to processors with each task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: String,
    pub name: String,
    pub model: String,
    pub system_prompt: String,
    pub max_iterations: u32,
    pub temperature: f32,
}

/// Named execution unit.
///
/// # Example
///
/// ```rust
/// use troupe_core::{Agent, AgentStatus, EchoProcessor, TaskContext};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let agent = Agent::new("researcher").with_processor(EchoProcessor::instant());
///
/// let result = agent.run("find sources", &TaskContext::new()).await;
///
/// assert!(result.is_success());
/// assert_eq!(agent.status(), AgentStatus::Completed);
/// # }
/// ```
///
/// Running one agent concurrently with itself is not prevented, but status
/// and memory then reflect whichever run finished last.
pub struct Agent {
    profile: AgentProfile,
    memory: Memory,
    tools: ToolSet,
    status: RwLock<AgentStatus>,
    processor: Arc<dyn TaskProcessor>,
}

impl Agent {
    pub const DEFAULT_MODEL: &'static str = "gpt-4";
    pub const DEFAULT_MAX_ITERATIONS: u32 = 10;
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
    pub const MIN_TEMPERATURE: f32 = 0.0;
    pub const MAX_TEMPERATURE: f32 = 2.0;

    /// Create an idle agent with default settings and the echo processor.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            profile: AgentProfile {
                id: Uuid::new_v4().to_string(),
                system_prompt: format!("You are {}, an AI agent.", name),
                name,
                model: Self::DEFAULT_MODEL.to_string(),
                max_iterations: Self::DEFAULT_MAX_ITERATIONS,
                temperature: Self::DEFAULT_TEMPERATURE,
            },
            memory: Memory::new(),
            tools: ToolSet::new(),
            status: RwLock::new(AgentStatus::Idle),
            processor: Arc::new(EchoProcessor::new()),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.profile.model = model.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.profile.system_prompt = prompt.into();
        self
    }

    /// Replace the agent's memory, typically with a clone of a shared handle.
    pub fn with_memory(mut self, memory: Memory) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.profile.max_iterations = max_iterations;
        self
    }

    /// Set the sampling temperature, clamped into `[0.0, 2.0]`.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.profile.temperature = Self::clamp_temperature(&self.profile.name, temperature);
        self
    }

    pub fn with_processor(mut self, processor: impl TaskProcessor + 'static) -> Self {
        self.processor = Arc::new(processor);
        self
    }

    /// Share an existing processor between agents.
    pub fn with_shared_processor(mut self, processor: Arc<dyn TaskProcessor>) -> Self {
        self.processor = processor;
        self
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.add_tool(tool);
        self
    }

    /// Take model and temperature from an LLM configuration section.
    pub fn with_llm_config(self, config: &LlmConfig) -> Self {
        self.with_model(config.model.clone())
            .with_temperature(config.temperature)
    }

    /// Register a tool under its own name; a tool with the same name is
    /// replaced.
    pub fn add_tool(&mut self, tool: Arc<dyn Tool>) -> &mut Self {
        let name = tool.name().to_string();
        if self.tools.insert(tool).is_some() {
            debug!(agent = %self.profile.name, tool = %name, "Replaced existing tool");
        }
        self
    }

    /// Remove a tool by name. Unknown names are ignored.
    pub fn remove_tool(&mut self, name: &str) -> &mut Self {
        self.tools.remove(name);
        self
    }

    pub fn id(&self) -> &str {
        &self.profile.id
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn model(&self) -> &str {
        &self.profile.model
    }

    pub fn system_prompt(&self) -> &str {
        &self.profile.system_prompt
    }

    pub fn max_iterations(&self) -> u32 {
        self.profile.max_iterations
    }

    pub fn temperature(&self) -> f32 {
        self.profile.temperature
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    pub fn status(&self) -> AgentStatus {
        *self.status.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Execute one task and record the outcome.
    ///
    /// Never returns an error and never leaves the agent `Running`: a
    /// processor failure becomes a failed [`AgentResult`] and the status
    /// becomes `Failed`. The task is written to memory before processing;
    /// the output is written only on success.
    pub async fn run(&self, task: &str, context: &TaskContext) -> AgentResult {
        let start = Instant::now();
        self.set_status(AgentStatus::Running);
        self.memory.store(MemoryKeys::CURRENT_TASK, task);

        let request = TaskRequest {
            agent: &self.profile,
            task,
            context,
            tools: &self.tools,
            memory: &self.memory,
        };

        let result = match self.processor.process(request).await {
            Ok(TaskOutput { output, tool_calls }) => {
                self.set_status(AgentStatus::Completed);
                self.memory.store(MemoryKeys::LAST_RESULT, output.clone());
                let elapsed = start.elapsed();
                info!(
                    agent = %self.profile.name,
                    elapsed = ?elapsed,
                    tool_calls = tool_calls.len(),
                    "Agent run completed"
                );
                AgentResult::success(output, elapsed).with_tool_calls(tool_calls)
            }
            Err(err) => {
                self.set_status(AgentStatus::Failed);
                let elapsed = start.elapsed();
                warn!(
                    agent = %self.profile.name,
                    error_code = err.error_code(),
                    error = %err,
                    "Agent run failed"
                );
                AgentResult::failure(err.to_string(), elapsed)
            }
        };

        result
            .with_metadata(AgentResult::AGENT_ID_KEY, self.profile.id.clone())
            .with_metadata(AgentResult::AGENT_NAME_KEY, self.profile.name.clone())
    }

    pub fn to_representation(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.profile.id.clone(),
            name: self.profile.name.clone(),
            model: self.profile.model.clone(),
            system_prompt: self.profile.system_prompt.clone(),
            max_iterations: self.profile.max_iterations,
            temperature: self.profile.temperature,
            tools: self.tools.names(),
            memory: self.memory.to_representation(),
            status: self.status(),
        }
    }

    fn set_status(&self, status: AgentStatus) {
        let mut current = self.status.write().unwrap_or_else(PoisonError::into_inner);
        let previous = *current;
        *current = status;
        debug!(agent = %self.profile.name, from = %previous, to = %status, "Agent status changed");
    }

    fn clamp_temperature(agent: &str, temperature: f32) -> f32 {
        if temperature.is_nan() {
            warn!(agent, "Temperature is not a number, using default");
            return Self::DEFAULT_TEMPERATURE;
        }
        let clamped = temperature.clamp(Self::MIN_TEMPERATURE, Self::MAX_TEMPERATURE);
        if clamped != temperature {
            warn!(agent, requested = temperature, clamped, "Temperature out of range");
        }
        clamped
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("profile", &self.profile)
            .field("memory", &self.memory.id())
            .field("tools", &self.tools)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

/// Structural form of an [`Agent`]. Tool names are sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: String,
    pub name: String,
    pub model: String,
    pub system_prompt: String,
    pub max_iterations: u32,
    pub temperature: f32,
    pub tools: Vec<String>,
    pub memory: MemorySnapshot,
    pub status: AgentStatus,
}
