use std::sync::Arc;

use async_trait::async_trait;
use connectors::{DlqProducer, TopicConsumer, TopicProducer};
use engine_core::{Agent, CommitCallback, Processor, Sink, Source};
use model::{AgentError, Batch, ProcessingResult, Record};
use tokio::sync::Mutex as AsyncMutex;
use tracing::warn;

type SharedAgent = Arc<AsyncMutex<Box<dyn Agent>>>;

/// The three collaborators the main loop drives, projected from a single
/// user agent per §4.2: whichever roles the agent declares are served
/// directly by it (through a shared handle, since one `Agent` instance
/// backs all three trait objects); any role it does not declare falls
/// back to a wrapper over the messaging substrate.
pub struct AgentAdapter {
    pub source: Box<dyn Source>,
    pub processor: Box<dyn Processor>,
    pub sink: Box<dyn Sink>,
}

impl AgentAdapter {
    pub fn new(
        agent: Box<dyn Agent>,
        consumer: Box<dyn TopicConsumer>,
        dlq: Box<dyn DlqProducer>,
        producer: Box<dyn TopicProducer>,
    ) -> Self {
        let capabilities = agent.capabilities();
        let shared: SharedAgent = Arc::new(AsyncMutex::new(agent));

        let source: Box<dyn Source> = if capabilities.has_source() {
            Box::new(AgentSource {
                agent: shared.clone(),
            })
        } else {
            Box::new(TopicConsumerSource { consumer, dlq })
        };

        let processor: Box<dyn Processor> = if capabilities.has_processor() {
            Box::new(AgentProcessor {
                agent: shared.clone(),
            })
        } else {
            Box::new(PassThroughProcessor)
        };

        let sink: Box<dyn Sink> = if capabilities.has_sink() {
            Box::new(AgentSink { agent: shared })
        } else {
            Box::new(TopicProducerSink::new(producer))
        };

        Self {
            source,
            processor,
            sink,
        }
    }
}

/// Source role served directly by the agent.
struct AgentSource {
    agent: SharedAgent,
}

#[async_trait]
impl Source for AgentSource {
    async fn start(&mut self) -> Result<(), AgentError> {
        self.agent.lock().await.start().await
    }

    async fn close(&mut self) -> Result<(), AgentError> {
        self.agent.lock().await.close().await
    }

    async fn read(&mut self) -> Result<Batch, AgentError> {
        self.agent.lock().await.read().await
    }

    async fn commit(&mut self, batch: &Batch) -> Result<(), AgentError> {
        self.agent.lock().await.commit(batch).await
    }

    async fn permanent_failure(&mut self, record: &Record, error: &AgentError) -> Result<(), AgentError> {
        self.agent.lock().await.permanent_failure(record, error).await
    }
}

/// Source role for an agent with no `read` capability: reads from the
/// topic consumer and routes terminally-failed records to the DLQ
/// producer (or a no-op producer if none was configured).
struct TopicConsumerSource {
    consumer: Box<dyn TopicConsumer>,
    dlq: Box<dyn DlqProducer>,
}

#[async_trait]
impl Source for TopicConsumerSource {
    async fn start(&mut self) -> Result<(), AgentError> {
        self.consumer.start().await.map_err(to_agent_error)?;
        self.dlq.start().await.map_err(to_agent_error)
    }

    async fn close(&mut self) -> Result<(), AgentError> {
        self.consumer.close().await.map_err(to_agent_error)?;
        self.dlq.close().await.map_err(to_agent_error)
    }

    async fn read(&mut self) -> Result<Batch, AgentError> {
        self.consumer.read().await.map_err(to_agent_error)
    }

    async fn commit(&mut self, batch: &Batch) -> Result<(), AgentError> {
        self.consumer.commit(batch).await.map_err(to_agent_error)
    }

    async fn permanent_failure(&mut self, record: &Record, error: &AgentError) -> Result<(), AgentError> {
        self.dlq.send(record, error).await.map_err(to_agent_error)
    }
}

/// Processor role served directly by the agent.
struct AgentProcessor {
    agent: SharedAgent,
}

#[async_trait]
impl Processor for AgentProcessor {
    async fn start(&mut self) -> Result<(), AgentError> {
        self.agent.lock().await.start().await
    }

    async fn close(&mut self) -> Result<(), AgentError> {
        self.agent.lock().await.close().await
    }

    async fn process(&mut self, batch: Batch) -> Result<Vec<ProcessingResult>, AgentError> {
        self.agent.lock().await.process(batch).await
    }
}

/// Processor role for an agent with no `process` capability: emits every
/// input record unchanged.
struct PassThroughProcessor;

#[async_trait]
impl Processor for PassThroughProcessor {
    async fn process(&mut self, batch: Batch) -> Result<Vec<ProcessingResult>, AgentError> {
        Ok(batch
            .into_vec()
            .into_iter()
            .map(|record| {
                let derived = Batch::new(vec![record.clone()]);
                ProcessingResult::derived(record, derived)
            })
            .collect())
    }
}

/// Sink role served directly by the agent.
struct AgentSink {
    agent: SharedAgent,
}

#[async_trait]
impl Sink for AgentSink {
    async fn start(&mut self) -> Result<(), AgentError> {
        self.agent.lock().await.start().await
    }

    async fn close(&mut self) -> Result<(), AgentError> {
        self.agent.lock().await.close().await
    }

    async fn set_commit_callback(&mut self, callback: Arc<dyn CommitCallback>) {
        self.agent.lock().await.set_commit_callback(callback).await
    }

    async fn write(&mut self, batch: &Batch) -> Result<(), AgentError> {
        self.agent.lock().await.write(batch).await
    }
}

/// Sink role for an agent with no `write` capability: writes to the topic
/// producer. The topic producer has no acknowledgment hook of its own, so
/// a successful `write` is treated as an immediate acknowledgment of the
/// whole batch: the commit callback is invoked in line before `write`
/// returns.
struct TopicProducerSink {
    producer: Box<dyn TopicProducer>,
    callback: Option<Arc<dyn CommitCallback>>,
}

impl TopicProducerSink {
    fn new(producer: Box<dyn TopicProducer>) -> Self {
        Self {
            producer,
            callback: None,
        }
    }
}

#[async_trait]
impl Sink for TopicProducerSink {
    async fn start(&mut self) -> Result<(), AgentError> {
        self.producer.start().await.map_err(to_agent_error)
    }

    async fn close(&mut self) -> Result<(), AgentError> {
        self.producer.close().await.map_err(to_agent_error)
    }

    async fn set_commit_callback(&mut self, callback: Arc<dyn CommitCallback>) {
        self.callback = Some(callback);
    }

    async fn write(&mut self, batch: &Batch) -> Result<(), AgentError> {
        self.producer.write(batch).await.map_err(to_agent_error)?;
        if let Some(callback) = &self.callback {
            callback.commit(batch.as_slice()).await;
        } else {
            warn!("topic producer sink wrote a batch with no commit callback registered");
        }
        Ok(())
    }
}

fn to_agent_error(error: connectors::ConnectorError) -> AgentError {
    AgentError::msg(error.to_string())
}
