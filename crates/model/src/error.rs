use thiserror::Error;

/// The error type produced by agent-supplied code: a processor's
/// `process`, a sink's `write`, or a source's `read`.
///
/// The runtime never inspects the contents of an `AgentError` beyond
/// logging it and handing it to the [`crate`] error-handling policy; it is
/// deliberately a thin wrapper so agent authors are not forced to adopt the
/// runtime's own error hierarchy.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl AgentError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}
