use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use connectors::{MemoryBroker, TopicConnectionsRegistry};
use engine_config::PodConfiguration;
use engine_core::{Agent, Capabilities};
use model::{AgentError, Batch, ProcessingResult, Record};

/// A topic registry whose `"memory"` kind always resolves to the given
/// broker instance, so a test can publish input and read output through
/// the exact broker the Runner's messaging substrate will use.
pub fn memory_registry(broker: &MemoryBroker) -> TopicConnectionsRegistry {
    let mut registry = TopicConnectionsRegistry::new();
    let broker = broker.clone();
    registry.register("memory", move |_config| Ok(Arc::new(broker.clone())));
    registry
}

/// A pod configuration naming `input`/`output` topics and an error
/// handler policy, with no `className` (tests always inject the agent
/// directly).
pub fn pod_config(input: &str, output: &str, retries: u64, on_failure: &str) -> PodConfiguration {
    let yaml = format!(
        r#"
streamingCluster:
  kind: memory
input:
  - {input}
output:
  - {output}
agent:
  applicationId: app
  agentId: agent1
  configuration: {{}}
  errorHandlerConfiguration:
    retries: {retries}
    onFailure: {on_failure}
"#
    );
    serde_yaml::from_str(&yaml).unwrap()
}

/// A pod configuration with no input/output topics at all, exercising the
/// no-op consumer/producer fallback.
pub fn topicless_pod_config(retries: u64, on_failure: &str) -> PodConfiguration {
    let yaml = format!(
        r#"
streamingCluster:
  kind: memory
agent:
  applicationId: app
  agentId: agent1
  configuration: {{}}
  errorHandlerConfiguration:
    retries: {retries}
    onFailure: {on_failure}
"#
    );
    serde_yaml::from_str(&yaml).unwrap()
}

/// A processor-only agent. Every record whose integer payload is in
/// `bad` fails on its *first* attempt only (so retries succeed); every
/// other record passes through doubled. `attempts` counts every call
/// made to `process`, across every record, to exercise the shared retry
/// budget (§8 item 7).
pub struct SelectiveFailProcessor {
    bad: Vec<i64>,
    seen_once: std::sync::Mutex<Vec<i64>>,
    pub attempts: Arc<AtomicUsize>,
}

impl SelectiveFailProcessor {
    pub fn new(bad: Vec<i64>) -> Self {
        Self {
            bad,
            seen_once: std::sync::Mutex::new(Vec::new()),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Agent for SelectiveFailProcessor {
    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE.with_processor()
    }

    async fn process(&mut self, batch: Batch) -> Result<Vec<ProcessingResult>, AgentError> {
        self.attempts.fetch_add(batch.len(), Ordering::SeqCst);
        Ok(batch
            .into_vec()
            .into_iter()
            .map(|record| {
                let value = record.payload.as_i64().unwrap_or(0);
                let already_failed_once = {
                    let mut seen = self.seen_once.lock().unwrap();
                    if seen.contains(&value) {
                        true
                    } else {
                        seen.push(value);
                        false
                    }
                };
                if self.bad.contains(&value) && !already_failed_once {
                    ProcessingResult::error(record, AgentError::msg(format!("transient failure on {value}")))
                } else {
                    let derived = Record::new(serde_json::json!(value * 2));
                    ProcessingResult::derived(record, Batch::new(vec![derived]))
                }
            })
            .collect())
    }
}

/// A processor-only agent that fails every record it ever sees, every
/// time. Used to exercise `onFailure=fail`/`skip`/`dead-letter` with
/// zero retries.
pub struct AlwaysFailProcessor {
    pub attempts: Arc<AtomicUsize>,
}

impl AlwaysFailProcessor {
    pub fn new() -> Self {
        Self {
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Agent for AlwaysFailProcessor {
    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE.with_processor()
    }

    async fn process(&mut self, batch: Batch) -> Result<Vec<ProcessingResult>, AgentError> {
        self.attempts.fetch_add(batch.len(), Ordering::SeqCst);
        Ok(batch
            .into_vec()
            .into_iter()
            .map(|record| ProcessingResult::error(record, AgentError::msg("permanent failure")))
            .collect())
    }
}

/// A processor-only agent emitting two derived records per source record,
/// to verify that the commit count tracks source records, not sink
/// records (§8 item 3).
pub struct FanOutProcessor;

#[async_trait]
impl Agent for FanOutProcessor {
    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE.with_processor()
    }

    async fn process(&mut self, batch: Batch) -> Result<Vec<ProcessingResult>, AgentError> {
        Ok(batch
            .into_vec()
            .into_iter()
            .map(|record| {
                let value = record.payload.clone();
                let derived = Batch::new(vec![Record::new(value.clone()), Record::new(value)]);
                ProcessingResult::derived(record, derived)
            })
            .collect())
    }
}

/// A processor-only agent that counts how many times `start`/`close` are
/// invoked, to verify the lifecycle pairing guarantee (§8 item 8) at the
/// assembled-pipeline level.
#[derive(Default)]
pub struct LifecycleCountingAgent {
    pub starts: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
}

#[async_trait]
impl Agent for LifecycleCountingAgent {
    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE.with_processor()
    }

    async fn start(&mut self) -> Result<(), AgentError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), AgentError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

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
