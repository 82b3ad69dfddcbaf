//! # Troupe
//!
//! Agent orchestration runtime. This crate re-exports the workspace:
//!
//! - [`core`](troupe_core): memory, agents, results, processors, tools, config
//! - [`orchestration`]: the [`Orchestrator`]
//! - [`tools`]: [`ToolRegistry`](tools::ToolRegistry), function and file tools
//! - [`observability`]: tracing initialisation
//! - `testing` (feature `testing`): mock processors and tools
//!
//! ```rust
//! use troupe::{Agent, EchoProcessor, Orchestrator, ParallelTask, TaskContext};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let orchestrator = Orchestrator::default();
//! orchestrator
//!     .add_agent(Agent::new("a").with_processor(EchoProcessor::instant()))
//!     .add_agent(Agent::new("b").with_processor(EchoProcessor::instant()));
//!
//! let results = orchestrator
//!     .run_parallel(
//!         &[ParallelTask::new("a", "first"), ParallelTask::new("b", "second")],
//!         &TaskContext::new(),
//!     )
//!     .await;
//! assert_eq!(results.len(), 2);
//! # }
//! ```

pub use troupe_agent as orchestration;
pub use troupe_core::{agent, config, error, memory, processor, result, tool};
pub use troupe_observability as observability;
#[cfg(feature = "testing")]
pub use troupe_testing as testing;
pub use troupe_tools as tools;

pub use troupe_agent::{Orchestrator, OrchestratorStatus, ParallelTask};
pub use troupe_core::{
    Agent, AgentResult, AgentStatus, Config, ContextKeys, EchoProcessor, Memory, MemoryKeys,
    TaskContext, TaskError, TaskOutput, TaskProcessor, TaskRequest, Tool, ToolResult, ToolSet,
};
