use thiserror::Error;

/// Configuration errors are fatal at startup and surface before any
/// collaborator is constructed; they are a distinct error family from
/// runtime (`RunnerError`) failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration is missing required field '{0}'")]
    MissingField(String),

    #[error("configuration field '{0}' has an unsupported value: '{1}'")]
    InvalidValue(String, String),

    #[error("failed to parse pod configuration as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse pod configuration as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
}
