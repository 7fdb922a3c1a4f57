use crate::{error::CliError, shutdown::{ExitCode, ShutdownCoordinator}};
use clap::Parser;
use commands::Commands;
use connectors::TopicConnectionsRegistry;
use engine_config::PodConfiguration;
use engine_core::AgentRegistry;
use engine_runtime::Runner;
use std::process;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod agents;
mod commands;
mod error;
mod output;
mod shutdown;

#[derive(Parser)]
#[command(name = "pod-runtime", version = "0.1.0", about = "Per-pod agent runtime")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let exit_code = match run_cli().await {
        Ok(()) => ExitCode::Success,
        Err(CliError::ShutdownRequested) => {
            info!("pod shut down gracefully on operator signal");
            ExitCode::ShutdownRequested
        }
        Err(err) => {
            tracing::error!(error = %err, "pod run failed");
            ExitCode::GeneralError
        }
    };

    process::exit(exit_code.as_i32());
}

async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            max_loops,
            agent,
        } => run_pod(&config, max_loops, &agent).await,
        Commands::Validate { config } => validate(&config),
    }
}

async fn run_pod(config_path: &str, max_loops: i64, agent_tag: &str) -> Result<(), CliError> {
    let configuration = PodConfiguration::from_file(config_path)?;

    let cancel = CancellationToken::new();
    let shutdown_coordinator = ShutdownCoordinator::new(cancel.clone());
    shutdown_coordinator.register_handlers();

    let agent = agents::build_registry()
        .build(agent_tag)
        .map_err(|_| CliError::UnknownAgent(agent_tag.to_string()))?;

    let runner = Runner::new(AgentRegistry::new(), TopicConnectionsRegistry::with_memory_default());
    let snapshot = runner
        .run(configuration, Some(agent), max_loops, cancel.clone())
        .await?;

    output::print_metrics_report(snapshot)?;

    if shutdown_coordinator.is_shutdown_requested() {
        warn!("run interrupted by shutdown signal before max_loops was reached");
        return Err(CliError::ShutdownRequested);
    }

    Ok(())
}

fn validate(config_path: &str) -> Result<(), CliError> {
    let configuration = PodConfiguration::from_file(config_path)?;
    let validated = configuration.validate()?;

    let report = serde_json::json!({
        "agentId": validated.agent_id,
        "inputTopics": validated.input_topics,
        "outputTopics": validated.output_topics,
        "errorHandler": {
            "retries": validated.error_handler.retries,
            "onFailure": validated.error_handler.on_failure.to_string(),
        },
    });
    let json = serde_json::to_string_pretty(&report).map_err(CliError::JsonSerialize)?;
    println!("{json}");
    Ok(())
}
