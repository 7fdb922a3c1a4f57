use thiserror::Error;

use connectors::ConnectorError;
use engine_config::ConfigError;
use engine_core::RegistryError;
use model::AgentError;

/// Everything that can abort a pod before or during the main loop.
/// Configuration failures (`ConfigError`) are distinct from everything
/// else: they are caught before any collaborator is started, never
/// surfaced once the loop is running.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("invalid pod configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("messaging substrate error: {0}")]
    Connector(#[from] ConnectorError),

    #[error("agent registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("no agent instance was injected and the configuration names no agent class")]
    NoAgent,

    #[error(transparent)]
    Agent(#[from] AgentError),
}
