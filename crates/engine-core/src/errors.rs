use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

/// The three terminal-or-not dispositions the error-handling policy can
/// hand back for a single failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorsProcessingOutcome {
    Skip,
    Retry,
    Fail,
}

/// What happens to a record whose processing exhausts retries (or whose
/// collaborator raises a non-retryable error outright).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnFailure {
    #[default]
    Fail,
    Skip,
    DeadLetter,
}

impl OnFailure {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "fail" => Some(Self::Fail),
            "skip" => Some(Self::Skip),
            "dead-letter" => Some(Self::DeadLetter),
            _ => None,
        }
    }
}

impl std::fmt::Display for OnFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OnFailure::Fail => "fail",
            OnFailure::Skip => "skip",
            OnFailure::DeadLetter => "dead-letter",
        };
        f.write_str(s)
    }
}

/// Configuration for [`ErrorsHandler`], mirroring
/// `agent.errorHandlerConfiguration` in the pod configuration.
#[derive(Debug, Clone)]
pub struct ErrorHandlerConfiguration {
    pub retries: u64,
    pub on_failure: OnFailure,
}

impl Default for ErrorHandlerConfiguration {
    fn default() -> Self {
        Self {
            retries: 0,
            on_failure: OnFailure::default(),
        }
    }
}

/// Stateful policy object deciding SKIP / RETRY / FAIL for every failure
/// the runtime observes.
///
/// The failure counter is process-wide, not per-record: it is a pipeline
/// failure odometer shared across every record that ever fails in this
/// pod's lifetime, matching the upstream runtime's retry semantics
/// exactly. A pod that sees many distinct failing records will exhaust its
/// retry budget faster than one failing record retried in isolation would
/// suggest — this is intentional, not a bug to be designed away.
#[derive(Debug)]
pub struct ErrorsHandler {
    failures: AtomicU64,
    retries: u64,
    on_failure: OnFailure,
}

impl ErrorsHandler {
    pub fn new(config: ErrorHandlerConfiguration) -> Self {
        Self {
            failures: AtomicU64::new(0),
            retries: config.retries,
            on_failure: config.on_failure,
        }
    }

    /// Increments the shared failure counter and returns the disposition
    /// for this particular failure.
    pub fn handle_errors(&self, error: &(dyn std::error::Error + 'static)) -> ErrorsProcessingOutcome {
        let failures = self.failures.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            error = %error,
            failures,
            max_retries = self.retries,
            "handling error from agent collaborator"
        );
        if failures < self.retries {
            ErrorsProcessingOutcome::Retry
        } else if self.on_failure == OnFailure::Skip {
            ErrorsProcessingOutcome::Skip
        } else {
            ErrorsProcessingOutcome::Fail
        }
    }

    /// True iff a FAIL disposition must abort the loop outright, rather
    /// than being reported to the source as a permanent failure and then
    /// treated as a skip.
    pub fn fail_processing_on_permanent_errors(&self) -> bool {
        !matches!(self.on_failure, OnFailure::Skip | OnFailure::DeadLetter)
    }

    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::SeqCst)
    }

    pub fn on_failure(&self) -> OnFailure {
        self.on_failure
    }
}
