use std::time::Duration;

use async_trait::async_trait;
use model::{AgentError, Batch, Record};

use crate::{
    error::ConnectorError,
    traits::{DlqProducer, TopicConsumer, TopicProducer},
};

/// Installed in place of a real topic consumer when no input topic is
/// configured. Idles for a second and returns an empty batch, matching the
/// single documented suspension point contributed by a no-op collaborator.
#[derive(Debug, Default)]
pub struct NoopConsumer;

#[async_trait]
impl TopicConsumer for NoopConsumer {
    async fn read(&mut self) -> Result<Batch, ConnectorError> {
        tokio::time::sleep(Duration::from_secs(1)).await;
        Ok(Batch::empty())
    }
}

/// Installed in place of a real topic producer when no output topic is
/// configured, or as the DLQ sink for a source wrapper with no DLQ
/// producer of its own.
#[derive(Debug, Default)]
pub struct NoopProducer;

#[async_trait]
impl TopicProducer for NoopProducer {
    async fn write(&mut self, _batch: &Batch) -> Result<(), ConnectorError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct NoopDlqProducer;

#[async_trait]
impl DlqProducer for NoopDlqProducer {
    async fn send(&mut self, _record: &Record, _error: &AgentError) -> Result<(), ConnectorError> {
        Ok(())
    }
}
