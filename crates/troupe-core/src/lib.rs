//! # Troupe Core
//!
//! Core types for the Troupe agent orchestration framework: the shared
//! memory store, the agent execution lifecycle, execution results, the task
//! processor seam and the tool contract.

pub mod agent;
pub mod config;
pub mod error;
pub mod memory;
pub mod processor;
pub mod result;
pub mod tool;

pub use agent::{Agent, AgentProfile, AgentSnapshot, AgentStatus};
pub use config::{Config, ConfigError, LlmConfig, LogFormat, MemoryConfig, TelemetryConfig};
pub use error::{MemoryError, TaskError};
pub use memory::{Memory, MemoryKeys, MemorySnapshot};
pub use processor::{
    ContextKeys, EchoProcessor, TaskContext, TaskOutput, TaskProcessor, TaskRequest,
};
pub use result::{AgentResult, AgentResultSnapshot, ToolCallRecord};
pub use tool::{FailureReason, Tool, ToolCategory, ToolParameter, ToolParams, ToolResult, ToolSet};
