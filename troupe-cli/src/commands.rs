use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;
use tracing::info;
use troupe::testing::MockProcessor;
use troupe::tools::ToolRegistry;
use troupe::{Agent, Config, EchoProcessor, Orchestrator, ParallelTask, TaskContext};

use crate::error::CliError;

/// Name under which the `workflow` command registers its sequence.
pub const CLI_WORKFLOW: &str = "cli";

/// How the CLI builds its agents.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub latency: Duration,
    pub file_tools: bool,
}

/// JSON to print, and whether every agent run succeeded.
#[derive(Debug)]
pub struct CommandOutput {
    pub body: Value,
    pub success: bool,
}

impl CommandOutput {
    fn ok(body: Value) -> Self {
        Self {
            body,
            success: true,
        }
    }
}

fn build_agent(
    orchestrator: &Orchestrator,
    name: &str,
    config: &Config,
    settings: &AgentSettings,
    fail: bool,
) -> Agent {
    let agent = orchestrator.new_agent(name).with_llm_config(&config.llm);
    let mut agent = if fail {
        agent.with_processor(MockProcessor::failing(format!(
            "Agent {name} was configured to fail"
        )))
    } else {
        agent.with_processor(EchoProcessor::with_latency(settings.latency))
    };

    if settings.file_tools {
        for tool in ToolRegistry::with_standard_tools().list_tools(None) {
            agent.add_tool(tool);
        }
    }
    agent
}

fn build_orchestrator<'a, I>(
    names: I,
    config: &Config,
    settings: &AgentSettings,
    fail_at: Option<&str>,
) -> Orchestrator
where
    I: IntoIterator<Item = &'a str>,
{
    let orchestrator = Orchestrator::default();
    for name in names {
        let agent = build_agent(&orchestrator, name, config, settings, fail_at == Some(name));
        orchestrator.add_agent(agent);
    }
    orchestrator
}

/// `troupe run <agent> <task>`
pub async fn run_single(
    agent: &str,
    task: &str,
    config: &Config,
    settings: &AgentSettings,
) -> Result<CommandOutput, CliError> {
    let orchestrator = build_orchestrator([agent], config, settings, None);
    let result = orchestrator
        .run_agent(agent, task, &TaskContext::new())
        .await;

    Ok(CommandOutput {
        success: result.is_success(),
        body: serde_json::to_value(&result)?,
    })
}

/// `troupe parallel <agent=task>...`
pub async fn run_parallel(
    tasks: &[ParallelTask],
    config: &Config,
    settings: &AgentSettings,
) -> Result<CommandOutput, CliError> {
    if tasks.is_empty() {
        return Err(CliError::InvalidArguments(
            "at least one agent=task pair is required".to_string(),
        ));
    }

    let names: BTreeSet<&str> = tasks.iter().map(|t| t.agent.as_str()).collect();
    let orchestrator = build_orchestrator(names, config, settings, None);
    let results = orchestrator
        .run_parallel(tasks, &TaskContext::new())
        .await;

    info!(tasks = results.len(), "Parallel command finished");
    Ok(CommandOutput {
        success: results.iter().all(|r| r.is_success()),
        body: serde_json::to_value(&results)?,
    })
}

/// `troupe workflow <task> --agents a,b,c [--fail-at b]`
pub async fn run_workflow(
    task: &str,
    agents: &[String],
    fail_at: Option<&str>,
    config: &Config,
    settings: &AgentSettings,
) -> Result<CommandOutput, CliError> {
    if agents.is_empty() {
        return Err(CliError::InvalidArguments(
            "--agents needs at least one name".to_string(),
        ));
    }

    let orchestrator =
        build_orchestrator(agents.iter().map(String::as_str), config, settings, fail_at);
    orchestrator.create_workflow(CLI_WORKFLOW, agents.iter().cloned());

    let results = orchestrator
        .run_workflow(CLI_WORKFLOW, task, TaskContext::new())
        .await;

    Ok(CommandOutput {
        success: results.len() == agents.len() && results.iter().all(|r| r.is_success()),
        body: json!({
            "results": results,
            "status": orchestrator.get_status(),
        }),
    })
}

/// `troupe config show`
pub fn show_config(config: &Config) -> Result<CommandOutput, CliError> {
    Ok(CommandOutput::ok(serde_json::to_value(config)?))
}

/// `troupe config init [PATH] [--force]`
pub fn init_config(path: &Path, force: bool) -> Result<CommandOutput, CliError> {
    if path.exists() && !force {
        return Err(CliError::AlreadyExists(path.to_path_buf()));
    }
    Config::default().save(path)?;
    info!(path = %path.display(), "Wrote default config");
    Ok(CommandOutput::ok(json!({ "written": path.display().to_string() })))
}
