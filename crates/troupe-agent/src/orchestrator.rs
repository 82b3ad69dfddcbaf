//! # Orchestrator
//!
//! Registry of agents and workflows, and the three execution modes:
//!
//! - **Single**: [`Orchestrator::run_agent`] runs one agent by name
//! - **Parallel**: [`Orchestrator::run_parallel`] fans out a batch of
//!   agent/task pairs and returns results in input order
//! - **Workflow**: [`Orchestrator::run_workflow`] runs a named sequence,
//!   passing each output to the next step and stopping at the first failure

use dashmap::DashMap;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use troupe_core::{Agent, AgentResult, AgentStatus, ContextKeys, Memory, TaskContext};
use uuid::Uuid;

use crate::error::OrchestrationError;

/// One entry of a parallel batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelTask {
    pub agent: String,
    #[serde(default)]
    pub task: String,
}

impl ParallelTask {
    pub fn new(agent: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            task: task.into(),
        }
    }
}

/// Error parsing an `agent=task` pair.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected 'agent=task', got '{0}'")]
pub struct ParseParallelTaskError(String);

impl FromStr for ParallelTask {
    type Err = ParseParallelTaskError;

    /// Parses `agent=task`. The task may itself contain `=`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((agent, task)) if !agent.trim().is_empty() => Ok(Self::new(agent.trim(), task)),
            _ => Err(ParseParallelTaskError(s.to_string())),
        }
    }
}

/// Point-in-time view of an orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorStatus {
    pub id: String,
    pub name: String,
    pub total_agents: usize,
    pub agents: BTreeMap<String, AgentStatus>,
    pub workflows: Vec<String>,
}

/// Coordinates registered agents.
///
/// Registries are concurrent maps, so agents and workflows can be added or
/// removed through `&self` while runs are in flight. A run holds its own
/// `Arc<Agent>` and is unaffected by a concurrent removal.
///
/// # Example
///
/// ```rust
/// use troupe_agent::Orchestrator;
/// use troupe_core::{Agent, EchoProcessor, TaskContext};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let orchestrator = Orchestrator::default();
/// orchestrator
///     .add_agent(Agent::new("researcher").with_processor(EchoProcessor::instant()))
///     .add_agent(Agent::new("writer").with_processor(EchoProcessor::instant()))
///     .create_workflow("article", ["researcher", "writer"]);
///
/// let results = orchestrator
///     .run_workflow("article", "rust async", TaskContext::new())
///     .await;
/// assert_eq!(results.len(), 2);
/// assert!(results.iter().all(|r| r.is_success()));
/// # }
/// ```
pub struct Orchestrator {
    id: String,
    name: String,
    agents: DashMap<String, Arc<Agent>>,
    workflows: DashMap<String, Vec<String>>,
    memory: Memory,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NAME)
    }
}

impl Orchestrator {
    pub const DEFAULT_NAME: &'static str = "Troupe Orchestrator";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            agents: DashMap::new(),
            workflows: DashMap::new(),
            memory: Memory::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Memory shared across this orchestrator's agents.
    pub fn shared_memory(&self) -> &Memory {
        &self.memory
    }

    /// New agent whose memory is the shared memory.
    pub fn new_agent(&self, name: impl Into<String>) -> Agent {
        Agent::new(name).with_memory(self.memory.clone())
    }

    /// Register an agent under its name, replacing any agent already there.
    pub fn add_agent(&self, agent: impl Into<Arc<Agent>>) -> &Self {
        let agent = agent.into();
        let name = agent.name().to_string();
        if self.agents.insert(name.clone(), agent).is_some() {
            debug!(orchestrator = %self.name, agent = %name, "Replaced registered agent");
        } else {
            debug!(orchestrator = %self.name, agent = %name, "Registered agent");
        }
        self
    }

    /// Remove an agent. Unknown names are ignored.
    pub fn remove_agent(&self, name: &str) -> &Self {
        if self.agents.remove(name).is_some() {
            debug!(orchestrator = %self.name, agent = %name, "Removed agent");
        }
        self
    }

    pub fn agent(&self, name: &str) -> Option<Arc<Agent>> {
        self.agents.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Registered agent names, sorted.
    pub fn agent_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.agents.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Store a named sequence of agent names, replacing any previous one.
    ///
    /// Names are not checked here; a missing agent fails the workflow when
    /// its step is reached.
    pub fn create_workflow<I, S>(&self, name: impl Into<String>, sequence: I) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let sequence: Vec<String> = sequence.into_iter().map(Into::into).collect();
        debug!(orchestrator = %self.name, workflow = %name, steps = sequence.len(), "Created workflow");
        self.workflows.insert(name, sequence);
        self
    }

    /// Remove a workflow. Unknown names are ignored.
    pub fn remove_workflow(&self, name: &str) -> &Self {
        self.workflows.remove(name);
        self
    }

    pub fn workflow(&self, name: &str) -> Option<Vec<String>> {
        self.workflows.get(name).map(|entry| entry.value().clone())
    }

    /// Registered workflow names, sorted.
    pub fn workflow_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.workflows.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Run one agent by name.
    ///
    /// An unknown name yields a failed result with zero execution time and
    /// no metadata.
    pub async fn run_agent(&self, name: &str, task: &str, context: &TaskContext) -> AgentResult {
        let Some(agent) = self.agent(name) else {
            let err = OrchestrationError::AgentNotFound(name.to_string());
            warn!(orchestrator = %self.name, error_code = err.error_code(), "{}", err);
            return AgentResult::failure(err.to_string(), Duration::ZERO);
        };

        agent.run(task, context).await
    }

    /// Run a batch concurrently. Results are in input order regardless of
    /// completion order; one failure does not affect the others.
    pub async fn run_parallel(
        &self,
        tasks: &[ParallelTask],
        context: &TaskContext,
    ) -> Vec<AgentResult> {
        debug!(orchestrator = %self.name, tasks = tasks.len(), "Executing parallel batch");

        let futures: Vec<_> = tasks
            .iter()
            .map(|t| self.run_agent(&t.agent, &t.task, context))
            .collect();
        let results = join_all(futures).await;

        info!(
            orchestrator = %self.name,
            tasks = results.len(),
            succeeded = results.iter().filter(|r| r.is_success()).count(),
            "Parallel batch completed"
        );
        results
    }

    /// Run a named workflow.
    ///
    /// Every step receives `initial_task`. After each successful step its
    /// output is stored in the context under
    /// [`ContextKeys::PREVIOUS_RESULT`]. The first failure ends the
    /// workflow and is the last result returned.
    pub async fn run_workflow(
        &self,
        name: &str,
        initial_task: &str,
        mut context: TaskContext,
    ) -> Vec<AgentResult> {
        let Some(sequence) = self.workflow(name) else {
            let err = OrchestrationError::WorkflowNotFound(name.to_string());
            warn!(orchestrator = %self.name, error_code = err.error_code(), "{}", err);
            return vec![AgentResult::failure(err.to_string(), Duration::ZERO)];
        };

        let start = Instant::now();
        let mut results = Vec::with_capacity(sequence.len());

        for (idx, agent_name) in sequence.iter().enumerate() {
            debug!(
                orchestrator = %self.name,
                workflow = %name,
                step = idx,
                agent = %agent_name,
                "Executing workflow step"
            );

            let result = self.run_agent(agent_name, initial_task, &context).await;

            match result.output() {
                Some(output) if result.is_success() => {
                    context.insert(ContextKeys::PREVIOUS_RESULT.to_string(), output.clone());
                    results.push(result);
                }
                _ => {
                    warn!(
                        orchestrator = %self.name,
                        workflow = %name,
                        step = idx,
                        agent = %agent_name,
                        error = result.error().unwrap_or_default(),
                        "Workflow stopped at failed step"
                    );
                    results.push(result);
                    return results;
                }
            }
        }

        info!(
            orchestrator = %self.name,
            workflow = %name,
            steps = results.len(),
            elapsed = ?start.elapsed(),
            "Workflow completed"
        );
        results
    }

    pub fn get_status(&self) -> OrchestratorStatus {
        let agents: BTreeMap<String, AgentStatus> = self
            .agents
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().status()))
            .collect();

        OrchestratorStatus {
            id: self.id.clone(),
            name: self.name.clone(),
            total_agents: agents.len(),
            agents,
            workflows: self.workflow_names(),
        }
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("agents", &self.agent_names())
            .field("workflows", &self.workflow_names())
            .field("memory", &self.memory.id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};
    use troupe_core::{EchoProcessor, MemoryKeys};

    fn echo(name: &str) -> Agent {
        Agent::new(name).with_processor(EchoProcessor::instant())
    }

    #[test]
    fn default_name() {
        assert_eq!(Orchestrator::default().name(), "Troupe Orchestrator");
    }

    #[test]
    fn add_agent_overwrites_by_name() {
        let orchestrator = Orchestrator::default();
        let first = echo("a");
        let first_id = first.id().to_string();
        orchestrator.add_agent(first).add_agent(echo("a"));

        assert_eq!(orchestrator.agent_names(), vec!["a"]);
        assert_ne!(orchestrator.agent("a").map(|a| a.id().to_string()), Some(first_id));
    }

    #[test]
    fn removals_of_unknown_names_are_noops() {
        let orchestrator = Orchestrator::default();
        orchestrator
            .add_agent(echo("a"))
            .create_workflow("w", ["a"])
            .remove_agent("zzz")
            .remove_workflow("zzz");

        assert_eq!(orchestrator.agent_names(), vec!["a"]);
        assert_eq!(orchestrator.workflow_names(), vec!["w"]);
    }

    #[tokio::test]
    async fn run_agent_missing_name_fails_without_metadata() {
        let orchestrator = Orchestrator::default();
        let result = orchestrator
            .run_agent("ghost", "task", &TaskContext::new())
            .await;

        assert!(!result.is_success());
        assert_eq!(result.error(), Some("Agent 'ghost' not found"));
        assert!(result.metadata().is_empty());
        assert_eq!(result.execution_time(), Duration::ZERO);
    }

    #[tokio::test]
    async fn missing_workflow_yields_single_failure() {
        let orchestrator = Orchestrator::default();
        let results = orchestrator
            .run_workflow("nightly", "t", TaskContext::new())
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].error(), Some("Workflow 'nightly' not found"));
    }

    #[tokio::test]
    async fn empty_workflow_returns_no_results() {
        let orchestrator = Orchestrator::default();
        orchestrator.create_workflow("empty", Vec::<String>::new());

        let results = orchestrator.run_workflow("empty", "t", TaskContext::new()).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn workflow_with_unregistered_step_stops_there() {
        let orchestrator = Orchestrator::default();
        orchestrator
            .add_agent(echo("a"))
            .add_agent(echo("c"))
            .create_workflow("w", ["a", "b", "c"]);

        let results = orchestrator.run_workflow("w", "t", TaskContext::new()).await;

        assert_eq!(results.len(), 2);
        assert!(results[0].is_success());
        assert_eq!(results[1].error(), Some("Agent 'b' not found"));
        assert_eq!(orchestrator.agent("c").unwrap().status(), AgentStatus::Idle);
    }

    #[tokio::test]
    async fn shared_memory_is_visible_to_agents() {
        let orchestrator = Orchestrator::default();
        let agent = orchestrator
            .new_agent("scribe")
            .with_processor(EchoProcessor::instant());
        orchestrator.add_agent(agent);

        orchestrator
            .run_agent("scribe", "take notes", &TaskContext::new())
            .await;

        assert_eq!(
            orchestrator.shared_memory().get(MemoryKeys::CURRENT_TASK),
            Some(json!("take notes"))
        );
    }

    #[tokio::test]
    async fn status_reports_agents_and_sorted_workflows() {
        let orchestrator = Orchestrator::new("ops");
        orchestrator
            .add_agent(echo("b"))
            .add_agent(echo("a"))
            .create_workflow("zeta", ["a"])
            .create_workflow("alpha", ["b"]);
        orchestrator.run_agent("a", "t", &TaskContext::new()).await;

        let status = orchestrator.get_status();

        assert_eq!(status.name, "ops");
        assert_eq!(status.total_agents, 2);
        assert_eq!(status.agents["a"], AgentStatus::Completed);
        assert_eq!(status.agents["b"], AgentStatus::Idle);
        assert_eq!(status.workflows, vec!["alpha", "zeta"]);

        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["agents"]["a"], json!("completed"));
    }

    #[rstest]
    #[case("writer=draft intro", "writer", "draft intro")]
    #[case("calc=x=1+1", "calc", "x=1+1")]
    #[case(" spaced =task", "spaced", "task")]
    #[case("idle=", "idle", "")]
    fn parses_parallel_task(#[case] input: &str, #[case] agent: &str, #[case] task: &str) {
        let parsed = assert_ok!(input.parse::<ParallelTask>());
        assert_eq!(parsed, ParallelTask::new(agent, task));
    }

    #[rstest]
    #[case("no-separator")]
    #[case("=task")]
    fn rejects_malformed_parallel_task(#[case] input: &str) {
        assert_err!(input.parse::<ParallelTask>());
    }

    #[test]
    fn parallel_task_defaults_missing_task() {
        let task: ParallelTask = serde_json::from_value(json!({"agent": "a"})).unwrap();
        assert_eq!(task, ParallelTask::new("a", ""));
    }
}
