use connectors::{DlqProducer, NoopConsumer, NoopDlqProducer, NoopProducer, TopicConnectionsRegistry, TopicConsumer, TopicProducer};
use engine_config::PodConfiguration;
use engine_core::{Agent, AgentRegistry, ErrorsHandler, Metrics, MetricsSnapshot};
use engine_processing::{AgentAdapter, MainLoop};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::RunnerError;

/// Bootstraps one pod's collaborators from configuration and drives its
/// main loop to completion (§4.1). Holds the two registries a binary
/// assembles once at process start: which agent classes it knows how to
/// build, and which messaging substrates it can resolve a `streamingCluster`
/// kind against.
pub struct Runner {
    agent_registry: AgentRegistry,
    topic_registry: TopicConnectionsRegistry,
}

impl Runner {
    pub fn new(agent_registry: AgentRegistry, topic_registry: TopicConnectionsRegistry) -> Self {
        Self {
            agent_registry,
            topic_registry,
        }
    }

    /// Runs one pod to completion. `agent` lets a caller (tests, or a
    /// binary that already holds a concrete agent instance) inject one
    /// directly instead of going through the build-time registry.
    /// `max_loops` is the testing knob described in §4.1: negative runs
    /// forever, positive runs that many iterations, zero does nothing.
    /// `cancel` is the operator shutdown signal (§4.11); the main loop
    /// checks it between iterations. Returns the metrics snapshot taken
    /// right after the loop closes every collaborator, so a caller can
    /// report on the run without reaching into the loop's internals.
    pub async fn run(
        &self,
        configuration: PodConfiguration,
        agent: Option<Box<dyn Agent>>,
        max_loops: i64,
        cancel: CancellationToken,
    ) -> Result<MetricsSnapshot, RunnerError> {
        let validated = configuration.validate()?;
        info!(agent_id = %validated.agent_id, "validated pod configuration");

        let runtime = self.topic_registry.get(&validated.streaming_cluster)?;

        let (consumer, dlq): (Box<dyn TopicConsumer>, Box<dyn DlqProducer>) =
            if validated.input_topics.is_empty() {
                (Box::new(NoopConsumer), Box::new(NoopDlqProducer))
            } else {
                let dlq_topics: Vec<String> = validated
                    .input_topics
                    .iter()
                    .map(|topic| format!("{topic}-dlq"))
                    .collect();
                (
                    runtime.create_topic_consumer(&validated.input_topics).await?,
                    runtime.create_dlq_producer(&dlq_topics).await?,
                )
            };

        let producer: Box<dyn TopicProducer> = if validated.output_topics.is_empty() {
            Box::new(NoopProducer)
        } else {
            runtime.create_topic_producer(&validated.output_topics).await?
        };

        let agent = match agent {
            Some(agent) => agent,
            None => {
                let class_name = validated.class_name.as_deref().ok_or(RunnerError::NoAgent)?;
                let mut built = self.agent_registry.build(class_name)?;
                built.init(&validated.agent_settings).await?;
                built
            }
        };

        let adapter = AgentAdapter::new(agent, consumer, dlq, producer);
        let errors = ErrorsHandler::new(validated.error_handler);
        let metrics = Metrics::new();

        let main_loop = MainLoop::new(adapter.source, adapter.processor, adapter.sink, errors, metrics).await?;
        Ok(main_loop.run(max_loops, cancel).await?)
    }
}
