use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex},
    time::Duration,
};

use async_trait::async_trait;
use model::{AgentError, Batch, Record};
use tokio::sync::{Mutex, mpsc};

use crate::{
    error::ConnectorError,
    traits::{DlqProducer, TopicConnectionsRuntime, TopicConsumer, TopicProducer},
};

const POLL_INTERVAL: Duration = Duration::from_millis(200);
const MAX_BATCH: usize = 100;

struct TopicChannel {
    sender: mpsc::UnboundedSender<Record>,
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<Record>>>,
}

/// A process-local, channel-backed messaging substrate: no broker
/// dependency, so the pod runtime can be driven end to end by the CLI's
/// local-run mode and by the integration test harness. Topics are created
/// lazily on first use and shared by name.
#[derive(Clone, Default)]
pub struct MemoryBroker {
    topics: Arc<StdMutex<HashMap<String, TopicChannel>>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn channel_for(&self, topic: &str) -> (mpsc::UnboundedSender<Record>, Arc<Mutex<mpsc::UnboundedReceiver<Record>>>) {
        let mut topics = self.topics.lock().expect("memory broker mutex poisoned");
        let entry = topics.entry(topic.to_string()).or_insert_with(|| {
            let (sender, receiver) = mpsc::unbounded_channel();
            TopicChannel {
                sender,
                receiver: Arc::new(Mutex::new(receiver)),
            }
        });
        (entry.sender.clone(), entry.receiver.clone())
    }

    /// Publishes records directly onto a topic, bypassing the producer
    /// role. Used by tests and the CLI's local-run mode to seed input.
    pub fn publish(&self, topic: &str, records: impl IntoIterator<Item = Record>) {
        let (sender, _receiver) = self.channel_for(topic);
        for record in records {
            let _ = sender.send(record);
        }
    }
}

#[async_trait]
impl TopicConnectionsRuntime for MemoryBroker {
    async fn create_topic_consumer(
        &self,
        topics: &[String],
    ) -> Result<Box<dyn TopicConsumer>, ConnectorError> {
        let receivers = topics
            .iter()
            .map(|topic| self.channel_for(topic).1)
            .collect();
        Ok(Box::new(MemoryConsumer { receivers }))
    }

    async fn create_topic_producer(
        &self,
        topics: &[String],
    ) -> Result<Box<dyn TopicProducer>, ConnectorError> {
        Ok(Box::new(MemoryProducer {
            routes: self.routes_for(topics)?,
        }))
    }

    async fn create_dlq_producer(
        &self,
        topics: &[String],
    ) -> Result<Box<dyn DlqProducer>, ConnectorError> {
        Ok(Box::new(MemoryDlqProducer {
            routes: self.routes_for(topics)?,
        }))
    }
}

/// Per-topic senders plus the topic a record with no (or unmatched) topic
/// hint is routed to: the first topic in the configured list, matching how
/// a single-topic configuration behaves unchanged.
struct Routes {
    default_topic: String,
    senders: HashMap<String, mpsc::UnboundedSender<Record>>,
}

impl Routes {
    fn sender_for(&self, topic: Option<&str>) -> &mpsc::UnboundedSender<Record> {
        topic
            .and_then(|t| self.senders.get(t))
            .unwrap_or_else(|| &self.senders[&self.default_topic])
    }
}

impl MemoryBroker {
    fn routes_for(&self, topics: &[String]) -> Result<Routes, ConnectorError> {
        let default_topic = topics
            .first()
            .ok_or_else(|| ConnectorError::MissingField("topics".into()))?
            .clone();
        let senders = topics
            .iter()
            .map(|topic| (topic.clone(), self.channel_for(topic).0))
            .collect();
        Ok(Routes {
            default_topic,
            senders,
        })
    }
}

/// Fans in across every configured input topic, round-robin, so a
/// multi-topic `input` list is consumed the way a real broker's consumer
/// group would merge several partitions/topics into one read.
struct MemoryConsumer {
    receivers: Vec<Arc<Mutex<mpsc::UnboundedReceiver<Record>>>>,
}

impl MemoryConsumer {
    async fn try_recv_any(&self) -> Result<Option<Record>, ConnectorError> {
        for receiver in &self.receivers {
            let mut guard = receiver.lock().await;
            match guard.try_recv() {
                Ok(record) => return Ok(Some(record)),
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    return Err(ConnectorError::Closed("consumer channel closed".into()));
                }
                Err(mpsc::error::TryRecvError::Empty) => continue,
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl TopicConsumer for MemoryConsumer {
    async fn read(&mut self) -> Result<Batch, ConnectorError> {
        let deadline = tokio::time::Instant::now() + POLL_INTERVAL;
        let mut records = Vec::new();

        loop {
            if let Some(record) = self.try_recv_any().await? {
                records.push(record);
                break;
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(Batch::empty());
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        while records.len() < MAX_BATCH {
            match self.try_recv_any().await? {
                Some(record) => records.push(record),
                None => break,
            }
        }
        Ok(Batch::new(records))
    }
}

/// Fans out over every configured output topic: a record is routed by its
/// own `topic` field when that names one of the configured topics, and
/// falls back to the first configured topic otherwise.
struct MemoryProducer {
    routes: Routes,
}

#[async_trait]
impl TopicProducer for MemoryProducer {
    async fn write(&mut self, batch: &Batch) -> Result<(), ConnectorError> {
        for record in batch.iter() {
            self.routes
                .sender_for(record.topic.as_deref())
                .send(record.clone())
                .map_err(|_| ConnectorError::Closed("producer channel closed".into()))?;
        }
        Ok(())
    }
}

struct MemoryDlqProducer {
    routes: Routes,
}

#[async_trait]
impl DlqProducer for MemoryDlqProducer {
    async fn send(&mut self, record: &Record, error: &AgentError) -> Result<(), ConnectorError> {
        let dead_lettered = record.clone().with_header("dlq.error", error.to_string());
        self.routes
            .sender_for(record.topic.as_deref())
            .send(dead_lettered)
            .map_err(|_| ConnectorError::Closed("dlq channel closed".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn publish_then_read_round_trips_a_batch() {
        let broker = MemoryBroker::new();
        broker.publish("in", vec![Record::new(serde_json::json!(1))]);

        let mut consumer = broker.create_topic_consumer(&topics(&["in"])).await.unwrap();
        let batch = consumer.read().await.unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[tokio::test]
    async fn read_on_empty_topic_times_out_to_empty_batch() {
        let broker = MemoryBroker::new();
        let mut consumer = broker.create_topic_consumer(&topics(&["empty"])).await.unwrap();
        let batch = consumer.read().await.unwrap();
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn producer_write_is_visible_to_a_consumer_on_the_same_topic() {
        let broker = MemoryBroker::new();
        let mut producer = broker.create_topic_producer(&topics(&["out"])).await.unwrap();
        producer
            .write(&Batch::new(vec![Record::new(serde_json::json!("x"))]))
            .await
            .unwrap();

        let mut consumer = broker.create_topic_consumer(&topics(&["out"])).await.unwrap();
        let batch = consumer.read().await.unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[tokio::test]
    async fn consumer_fans_in_across_several_input_topics() {
        let broker = MemoryBroker::new();
        broker.publish("a", vec![Record::new(serde_json::json!("from-a"))]);
        broker.publish("b", vec![Record::new(serde_json::json!("from-b"))]);

        let mut consumer = broker.create_topic_consumer(&topics(&["a", "b"])).await.unwrap();
        let mut seen = Vec::new();
        for _ in 0..2 {
            let batch = consumer.read().await.unwrap();
            seen.extend(batch.as_slice().iter().map(|r| r.payload.clone()));
        }
        seen.sort_by_key(|v| v.to_string());
        assert_eq!(
            seen,
            vec![serde_json::json!("from-a"), serde_json::json!("from-b")]
        );
    }

    #[tokio::test]
    async fn producer_fans_out_by_record_topic_and_falls_back_to_default() {
        let broker = MemoryBroker::new();
        let mut producer = broker
            .create_topic_producer(&topics(&["out-1", "out-2"]))
            .await
            .unwrap();
        producer
            .write(&Batch::new(vec![
                Record::new(serde_json::json!("routed")).with_topic("out-2"),
                Record::new(serde_json::json!("default")),
            ]))
            .await
            .unwrap();

        let mut out1 = broker.create_topic_consumer(&topics(&["out-1"])).await.unwrap();
        let mut out2 = broker.create_topic_consumer(&topics(&["out-2"])).await.unwrap();

        let batch1 = out1.read().await.unwrap();
        assert_eq!(batch1.as_slice()[0].payload, serde_json::json!("default"));

        let batch2 = out2.read().await.unwrap();
        assert_eq!(batch2.as_slice()[0].payload, serde_json::json!("routed"));
    }
}
