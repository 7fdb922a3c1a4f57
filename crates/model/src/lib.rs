//! Shared data model for the pod agent runtime: the record/batch contract
//! the runner, adapter, driver, writer and tracker all speak in terms of.

pub mod batch;
pub mod error;
pub mod record;
pub mod result;

pub use batch::Batch;
pub use error::AgentError;
pub use record::{Record, RecordId};
pub use result::{Outcome, ProcessingResult};
