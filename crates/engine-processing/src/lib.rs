//! The agent execution loop: projects one user agent onto source,
//! processor and sink roles, then drives them through the
//! read/process/dispatch/commit cycle with the pipeline's error-handling
//! policy applied at every stage.

pub mod adapter;
pub mod main_loop;
pub mod processor_driver;
pub mod sink_writer;
pub mod tracker;

pub use adapter::AgentAdapter;
pub use main_loop::MainLoop;
pub use processor_driver::{ProcessorDriver, SourceHandle};
pub use sink_writer::SinkWriter;
pub use tracker::SourceRecordTracker;
