use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use troupe::observability::init_tracing;
use troupe::{Config, ParallelTask};

mod commands;
mod error;

use commands::{AgentSettings, CommandOutput};
use error::CliError;

#[derive(Parser, Debug)]
#[command(name = "troupe", version)]
#[command(about = "Troupe CLI - run agents singly, in parallel, or as workflows")]
struct Cli {
    /// Config file (default: ./troupe.toml, ./troupe.json, ~/.troupe/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Simulated processing latency of each echo agent, in milliseconds
    #[arg(long, global = true, default_value_t = 100)]
    latency_ms: u64,

    /// Give every agent the standard file tools
    #[arg(long, global = true)]
    file_tools: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one agent
    Run {
        /// Agent name
        agent: String,
        /// Task text
        task: String,
    },
    /// Run several agents concurrently
    Parallel {
        /// Pairs of the form agent=task
        #[arg(required = true)]
        tasks: Vec<ParallelTask>,
    },
    /// Run agents in sequence, passing each output to the next
    Workflow {
        /// Task given to every step
        task: String,
        /// Comma-separated agent names, in order
        #[arg(long, value_delimiter = ',', required = true)]
        agents: Vec<String>,
        /// Make the named agent fail
        #[arg(long)]
        fail_at: Option<String>,
    },
    /// Inspect or create configuration
    Config {
        #[command(subcommand)]
        config_command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Output path
        #[arg(default_value = "troupe.toml")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn load_config(path: Option<&Path>) -> Result<Config, CliError> {
    let mut config = match path {
        Some(path) => Config::load(path)?,
        None => Config::discover()?,
    };
    config.apply_env_overrides()?;
    config.validate()?;
    Ok(config)
}

async fn dispatch(cli: Cli, config: &Config) -> Result<CommandOutput, CliError> {
    let settings = AgentSettings {
        latency: Duration::from_millis(cli.latency_ms),
        file_tools: cli.file_tools,
    };

    match cli.command {
        Commands::Run { agent, task } => {
            commands::run_single(&agent, &task, config, &settings).await
        }
        Commands::Parallel { tasks } => commands::run_parallel(&tasks, config, &settings).await,
        Commands::Workflow {
            task,
            agents,
            fail_at,
        } => commands::run_workflow(&task, &agents, fail_at.as_deref(), config, &settings).await,
        Commands::Config { config_command } => match config_command {
            ConfigCommands::Show => commands::show_config(config),
            ConfigCommands::Init { path, force } => commands::init_config(&path, force),
        },
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(&config.telemetry) {
        eprintln!("Warning: logging not initialised: {}", e);
    }

    match dispatch(cli, &config).await {
        Ok(output) => {
            match serde_json::to_string_pretty(&output.body) {
                Ok(text) => println!("{text}"),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to render output");
                    return ExitCode::FAILURE;
                }
            }
            if output.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
