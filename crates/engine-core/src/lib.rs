//! Ambient runtime contracts shared by every collaborator in the pod: the
//! agent capability surface, the source/processor/sink traits the main
//! loop drives, the error-handling policy, the agent registry, and the
//! metrics surface.

pub mod agent;
pub mod collaborators;
pub mod errors;
pub mod metrics;
pub mod registry;

pub use agent::{Agent, Capabilities};
pub use collaborators::{CommitCallback, Processor, Sink, Source};
pub use errors::{ErrorHandlerConfiguration, ErrorsHandler, ErrorsProcessingOutcome, OnFailure};
pub use metrics::{Metrics, MetricsSnapshot};
pub use registry::{AgentRegistry, RegistryError};
