use async_trait::async_trait;
use model::{AgentError, Batch, Record};

use crate::error::ConnectorError;

/// Reads batches off a topic. The default (non-injected) `Source` role in
/// `engine-processing::adapter` wraps one of these.
#[async_trait]
pub trait TopicConsumer: Send {
    async fn start(&mut self) -> Result<(), ConnectorError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ConnectorError> {
        Ok(())
    }

    async fn read(&mut self) -> Result<Batch, ConnectorError>;

    /// Advances the consumer's committed offset past `batch`.
    async fn commit(&mut self, _batch: &Batch) -> Result<(), ConnectorError> {
        Ok(())
    }
}

/// Writes batches to a topic. The default (non-injected) `Sink` role wraps
/// one of these.
#[async_trait]
pub trait TopicProducer: Send {
    async fn start(&mut self) -> Result<(), ConnectorError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ConnectorError> {
        Ok(())
    }

    async fn write(&mut self, batch: &Batch) -> Result<(), ConnectorError>;
}

/// Routes records the pipeline has given up on to a dead-letter topic.
/// Only ever invoked by the default source wrapper's `permanent_failure`
/// handling, never by the core driver directly.
#[async_trait]
pub trait DlqProducer: Send {
    async fn start(&mut self) -> Result<(), ConnectorError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ConnectorError> {
        Ok(())
    }

    async fn send(&mut self, record: &Record, error: &AgentError) -> Result<(), ConnectorError>;
}

/// A resolved messaging runtime for one `streamingCluster`: a factory for
/// the three collaborator kinds the Runner needs.
///
/// Every factory takes the *entire* configured topic list, not a single
/// name: a pod's `input`/`output` configuration is a sequence (§6), and how
/// several topics are consumed from or produced to (fan-in, fan-out by
/// record routing, ...) is a concrete messaging substrate's decision, not
/// the Runner's.
#[async_trait]
pub trait TopicConnectionsRuntime: Send + Sync {
    async fn create_topic_consumer(
        &self,
        topics: &[String],
    ) -> Result<Box<dyn TopicConsumer>, ConnectorError>;

    async fn create_topic_producer(
        &self,
        topics: &[String],
    ) -> Result<Box<dyn TopicProducer>, ConnectorError>;

    async fn create_dlq_producer(
        &self,
        topics: &[String],
    ) -> Result<Box<dyn DlqProducer>, ConnectorError>;
}
