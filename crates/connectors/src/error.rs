use thiserror::Error;

/// Failures raised by the messaging substrate: the topic consumer/producer
/// implementations and the registry that resolves a `streamingCluster`
/// configuration to one.
#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("no streaming runtime registered for cluster kind '{0}'")]
    UnknownClusterKind(String),

    #[error("streaming cluster configuration is missing required field '{0}'")]
    MissingField(String),

    #[error("topic channel closed: {0}")]
    Closed(String),

    #[error("{0}")]
    Message(String),
}
