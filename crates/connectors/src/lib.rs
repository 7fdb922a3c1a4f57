//! The messaging substrate: topic consumer/producer/DLQ-producer
//! interfaces behind a cluster registry, plus the concrete no-op and
//! in-memory implementations the runtime needs to be runnable end to end
//! without a live broker.

pub mod error;
pub mod memory;
pub mod noop;
pub mod registry;
pub mod traits;

pub use error::ConnectorError;
pub use memory::MemoryBroker;
pub use noop::{NoopConsumer, NoopDlqProducer, NoopProducer};
pub use registry::{StreamingClusterConfig, TopicConnectionsRegistry};
pub use traits::{DlqProducer, TopicConnectionsRuntime, TopicConsumer, TopicProducer};
