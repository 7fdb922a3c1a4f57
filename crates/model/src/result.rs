use crate::{batch::Batch, error::AgentError, record::Record};

/// The outcome of processing a single source record: either the records it
/// expanded into (possibly none), or the error that occurred.
#[derive(Debug)]
pub enum Outcome {
    Derived(Batch),
    Error(AgentError),
}

impl Outcome {
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }
}

/// `(source_record, outcome)`, as produced by the processor driver for
/// every record in its input batch, in input order.
#[derive(Debug)]
pub struct ProcessingResult {
    pub source_record: Record,
    pub outcome: Outcome,
}

impl ProcessingResult {
    pub fn derived(source_record: Record, derived: Batch) -> Self {
        Self {
            source_record,
            outcome: Outcome::Derived(derived),
        }
    }

    pub fn error(source_record: Record, error: AgentError) -> Self {
        Self {
            source_record,
            outcome: Outcome::Error(error),
        }
    }
}
