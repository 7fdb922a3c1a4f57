use engine_core::{CommitCallback, ErrorsHandler, ErrorsProcessingOutcome, Metrics, Sink};
use model::{AgentError, Batch, Record};
use tracing::{info, warn};

use crate::{processor_driver::SourceHandle, tracker::SourceRecordTracker};

/// Writes one source record's derived batch to the sink, applying the
/// error-handling policy at batch granularity on failure (§4.5).
pub struct SinkWriter;

impl SinkWriter {
    pub async fn write(
        sink: &mut dyn Sink,
        source_record: &Record,
        derived: &Batch,
        errors: &ErrorsHandler,
        source: &SourceHandle,
        tracker: &SourceRecordTracker,
        metrics: &Metrics,
    ) -> Result<(), AgentError> {
        loop {
            match sink.write(derived).await {
                Ok(()) => return Ok(()),
                Err(error) => match errors.handle_errors(&error) {
                    ErrorsProcessingOutcome::Skip => {
                        warn!(
                            record = %source_record.id(),
                            %error,
                            "sink write failed terminally: skip, committing derived batch unwritten"
                        );
                        metrics.increment_skips(1);
                        tracker.commit(derived.as_slice()).await;
                        return Ok(());
                    }
                    ErrorsProcessingOutcome::Retry => {
                        info!(record = %source_record.id(), %error, "sink write failed: retry");
                        metrics.increment_retries(1);
                        continue;
                    }
                    ErrorsProcessingOutcome::Fail => {
                        warn!(record = %source_record.id(), %error, "sink write failed terminally: fail");
                        metrics.increment_failures(1);
                        source
                            .lock()
                            .await
                            .permanent_failure(source_record, &error)
                            .await?;
                        if errors.fail_processing_on_permanent_errors() {
                            return Err(error);
                        }
                        tracker.commit(derived.as_slice()).await;
                        return Ok(());
                    }
                },
            }
        }
    }
}
