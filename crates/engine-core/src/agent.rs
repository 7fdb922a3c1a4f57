use std::sync::Arc;

use async_trait::async_trait;
use model::{AgentError, Batch, ProcessingResult, Record};

use crate::collaborators::CommitCallback;

/// Which of the three roles a user agent implements.
///
/// Capability probing in the originating runtime was structural (`hasattr`
/// on a Python object); here it is an explicit bitset an agent declares
/// once at construction, and the [`crate::agent::Agent`] adapter consults
/// it instead of attempting every method and catching failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    source: bool,
    processor: bool,
    sink: bool,
}

impl Capabilities {
    pub const NONE: Capabilities = Capabilities {
        source: false,
        processor: false,
        sink: false,
    };

    pub fn with_source(mut self) -> Self {
        self.source = true;
        self
    }

    pub fn with_processor(mut self) -> Self {
        self.processor = true;
        self
    }

    pub fn with_sink(mut self) -> Self {
        self.sink = true;
        self
    }

    pub fn has_source(self) -> bool {
        self.source
    }

    pub fn has_processor(self) -> bool {
        self.processor
    }

    pub fn has_sink(self) -> bool {
        self.sink
    }
}

/// The full surface a user agent may implement.
///
/// An agent declares its [`Capabilities`] and only the methods matching
/// declared roles are ever invoked by the [adapter](crate) — the default
/// bodies here exist so a single `Box<dyn Agent>` can be projected onto
/// whichever subset of source/processor/sink it actually supports, without
/// three separate trait objects.
#[async_trait]
pub trait Agent: Send {
    fn capabilities(&self) -> Capabilities;

    async fn init(&mut self, _config: &serde_json::Value) -> Result<(), AgentError> {
        Ok(())
    }

    async fn start(&mut self) -> Result<(), AgentError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), AgentError> {
        Ok(())
    }

    async fn read(&mut self) -> Result<Batch, AgentError> {
        Err(AgentError::msg("agent does not declare the source capability"))
    }

    async fn commit(&mut self, _batch: &Batch) -> Result<(), AgentError> {
        Ok(())
    }

    async fn permanent_failure(&mut self, _record: &Record, _error: &AgentError) -> Result<(), AgentError> {
        Ok(())
    }

    async fn process(&mut self, _batch: Batch) -> Result<Vec<ProcessingResult>, AgentError> {
        Err(AgentError::msg(
            "agent does not declare the processor capability",
        ))
    }

    async fn write(&mut self, _batch: &Batch) -> Result<(), AgentError> {
        Err(AgentError::msg("agent does not declare the sink capability"))
    }

    /// Only meaningful for an agent acting as the sink: registers the
    /// callback the agent must invoke once it considers a write durably
    /// acknowledged. An agent that ignores this will simply never advance
    /// its source records' outstanding counts to zero via the write path.
    async fn set_commit_callback(&mut self, _callback: Arc<dyn CommitCallback>) {}
}
