use std::{collections::HashMap, sync::Arc};

use engine_core::{ErrorsHandler, ErrorsProcessingOutcome, Metrics, Processor, Source};
use model::{AgentError, Batch, Outcome, ProcessingResult, Record, RecordId};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

/// Shared handle to the main loop's source, so the driver and the sink
/// writer can report permanent failures without taking ownership away
/// from the loop that also reads and commits through it.
pub type SourceHandle = Arc<AsyncMutex<Box<dyn Source>>>;

/// Applies the error-handling policy per source record across retry
/// trials until every input record has a terminal outcome (§4.4).
pub struct ProcessorDriver;

impl ProcessorDriver {
    pub async fn run(
        processor: &mut dyn Processor,
        batch: Batch,
        errors: &ErrorsHandler,
        source: &SourceHandle,
        metrics: &Metrics,
    ) -> Result<Vec<ProcessingResult>, AgentError> {
        let order: Vec<RecordId> = batch.iter().map(Record::id).collect();
        let mut pending: Vec<Record> = batch.into_vec();
        let mut finals: HashMap<RecordId, ProcessingResult> = HashMap::new();
        let mut trial: u32 = 0;

        while !pending.is_empty() {
            trial += 1;
            let results = Self::invoke(processor, Batch::new(pending.clone())).await;
            pending = Self::apply_outcomes(results, trial, errors, source, metrics, &mut finals).await?;
        }

        Ok(order
            .into_iter()
            .map(|id| {
                finals
                    .remove(&id)
                    .expect("every input record must have a final result")
            })
            .collect())
    }

    /// Invokes the processor and converts a whole-batch failure into a
    /// per-record error result, so the rest of the driver never has to
    /// distinguish "processor raised" from "processor returned an error
    /// per record" (§4.4 edge case).
    async fn invoke(processor: &mut dyn Processor, batch: Batch) -> Vec<ProcessingResult> {
        let records: Vec<Record> = batch.as_slice().to_vec();
        match processor.process(batch).await {
            Ok(results) => results,
            Err(error) => {
                let message = error.to_string();
                records
                    .into_iter()
                    .map(|record| ProcessingResult::error(record, AgentError::msg(message.clone())))
                    .collect()
            }
        }
    }

    async fn apply_outcomes(
        results: Vec<ProcessingResult>,
        trial: u32,
        errors: &ErrorsHandler,
        source: &SourceHandle,
        metrics: &Metrics,
        finals: &mut HashMap<RecordId, ProcessingResult>,
    ) -> Result<Vec<Record>, AgentError> {
        let mut next_pending = Vec::new();

        for result in results {
            let src = result.source_record;
            match result.outcome {
                Outcome::Derived(derived) => {
                    metrics.increment_records(1);
                    finals.insert(src.id(), ProcessingResult::derived(src, derived));
                }
                Outcome::Error(error) => match errors.handle_errors(&error) {
                    ErrorsProcessingOutcome::Skip => {
                        info!(record = %src.id(), trial, %error, "processor error terminal: skip");
                        metrics.increment_skips(1);
                        finals.insert(src.id(), ProcessingResult::error(src, error));
                    }
                    ErrorsProcessingOutcome::Retry => {
                        info!(record = %src.id(), trial, %error, "processor error: retry");
                        metrics.increment_retries(1);
                        next_pending.push(src);
                    }
                    ErrorsProcessingOutcome::Fail => {
                        warn!(record = %src.id(), trial, %error, "processor error terminal: fail");
                        metrics.increment_failures(1);
                        source.lock().await.permanent_failure(&src, &error).await?;
                        if errors.fail_processing_on_permanent_errors() {
                            return Err(error);
                        }
                        finals.insert(src.id(), ProcessingResult::error(src, error));
                    }
                },
            }
        }

        Ok(next_pending)
    }
}
