use engine_config::ConfigError;
use engine_runtime::RunnerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("invalid pod configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("no agent is registered under tag '{0}'")]
    UnknownAgent(String),

    #[error("pod run failed: {0}")]
    Runner(#[from] RunnerError),

    #[error("failed to serialize the metrics report: {0}")]
    JsonSerialize(serde_json::Error),

    #[error("shutdown requested")]
    ShutdownRequested,
}
