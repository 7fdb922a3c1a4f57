use std::{collections::HashMap, sync::Arc};

use crate::{error::ConnectorError, memory::MemoryBroker, traits::TopicConnectionsRuntime};

/// The opaque `streamingCluster` configuration block from the pod
/// configuration. The core never inspects its contents; only a registered
/// factory does, keyed by the `kind` field.
#[derive(Debug, Clone)]
pub struct StreamingClusterConfig {
    pub kind: String,
    pub settings: serde_json::Value,
}

impl StreamingClusterConfig {
    pub fn new(kind: impl Into<String>, settings: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            settings,
        }
    }
}

type Factory = Box<dyn Fn(&StreamingClusterConfig) -> Result<Arc<dyn TopicConnectionsRuntime>, ConnectorError> + Send + Sync>;

/// Resolves a `streamingCluster` configuration to a
/// [`TopicConnectionsRuntime`]. Populated at process start with whichever
/// concrete messaging substrates the binary was built with; the core only
/// ever calls `get`.
pub struct TopicConnectionsRegistry {
    factories: HashMap<String, Factory>,
}

impl TopicConnectionsRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A registry pre-populated with the in-memory broker under the
    /// `"memory"` kind. This is the only concrete substrate the core ships
    /// with; real deployments register additional kinds (Kafka, Pulsar,
    /// ...) the same way before handing the registry to the Runner.
    pub fn with_memory_default() -> Self {
        let mut registry = Self::new();
        registry.register("memory", |_config| Ok(Arc::new(MemoryBroker::new())));
        registry
    }

    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&StreamingClusterConfig) -> Result<Arc<dyn TopicConnectionsRuntime>, ConnectorError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(kind.into(), Box::new(factory));
    }

    pub fn get(
        &self,
        config: &StreamingClusterConfig,
    ) -> Result<Arc<dyn TopicConnectionsRuntime>, ConnectorError> {
        self.factories
            .get(&config.kind)
            .ok_or_else(|| ConnectorError::UnknownClusterKind(config.kind.clone()))
            .and_then(|factory| factory(config))
    }
}

impl Default for TopicConnectionsRegistry {
    fn default() -> Self {
        Self::with_memory_default()
    }
}
