use std::sync::Arc;

use async_trait::async_trait;
use model::{AgentError, Batch, ProcessingResult, Record};

/// Invoked by a [`Sink`] once it has durably written a set of records, so
/// the [source record tracker](crate) can decrement outstanding counts and
/// commit upstream when a source record's derived records are all
/// acknowledged.
#[async_trait]
pub trait CommitCallback: Send + Sync {
    async fn commit(&self, records: &[Record]);
}

/// Reads batches from wherever the pipeline's input comes from (the user
/// agent directly, or a wrapper over the messaging substrate) and commits
/// them once the runtime is done with them.
#[async_trait]
pub trait Source: Send {
    async fn start(&mut self) -> Result<(), AgentError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), AgentError> {
        Ok(())
    }

    async fn read(&mut self) -> Result<Batch, AgentError>;

    /// Commits a batch of source records once it is safe to advance past
    /// them. A no-op default is provided for sources with nothing to
    /// acknowledge.
    async fn commit(&mut self, _batch: &Batch) -> Result<(), AgentError> {
        Ok(())
    }

    /// Reports a record that the error-handling policy gave up on.
    async fn permanent_failure(&mut self, _record: &Record, _error: &AgentError) -> Result<(), AgentError> {
        Ok(())
    }
}

/// Writes derived batches to wherever the pipeline's output goes.
#[async_trait]
pub trait Sink: Send {
    async fn start(&mut self) -> Result<(), AgentError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), AgentError> {
        Ok(())
    }

    /// Registers the callback to invoke once a write is durably
    /// acknowledged. The main loop calls this once, before the loop
    /// starts, with the source record tracker as the callback.
    async fn set_commit_callback(&mut self, callback: Arc<dyn CommitCallback>);

    async fn write(&mut self, batch: &Batch) -> Result<(), AgentError>;
}

/// Transforms a batch of source records into a [`ProcessingResult`] per
/// input record.
#[async_trait]
pub trait Processor: Send {
    async fn start(&mut self) -> Result<(), AgentError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), AgentError> {
        Ok(())
    }

    async fn process(&mut self, batch: Batch) -> Result<Vec<ProcessingResult>, AgentError>;
}
