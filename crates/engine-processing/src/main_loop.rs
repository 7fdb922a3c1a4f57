use std::sync::Arc;

use engine_core::{ErrorsHandler, Metrics, MetricsSnapshot, Processor, Sink, Source};
use model::{AgentError, Batch, Outcome};
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;

use crate::{
    processor_driver::{ProcessorDriver, SourceHandle},
    sink_writer::SinkWriter,
    tracker::SourceRecordTracker,
};

/// Drives one pod's source/processor/sink through the read, process,
/// dispatch, commit cycle (§4.3). Owns the lifecycle guarantee: every
/// collaborator that was started is closed exactly once, on every exit
/// path.
pub struct MainLoop {
    source: SourceHandle,
    processor: Box<dyn Processor>,
    sink: Box<dyn Sink>,
    errors: ErrorsHandler,
    tracker: Arc<SourceRecordTracker>,
    metrics: Metrics,
}

impl MainLoop {
    pub async fn new(
        source: Box<dyn Source>,
        mut processor: Box<dyn Processor>,
        mut sink: Box<dyn Sink>,
        errors: ErrorsHandler,
        metrics: Metrics,
    ) -> Result<Self, AgentError> {
        let source: SourceHandle = Arc::new(AsyncMutex::new(source));
        let tracker = Arc::new(SourceRecordTracker::new(source.clone(), metrics.clone()));

        source.lock().await.start().await?;
        processor.start().await?;
        sink.set_commit_callback(tracker.clone()).await;
        sink.start().await?;

        Ok(Self {
            source,
            processor,
            sink,
            errors,
            tracker,
            metrics,
        })
    }

    /// Runs up to `max_loops` iterations (negative runs forever, zero does
    /// nothing) and always closes every collaborator before returning,
    /// whichever path the loop body exits by. `max_loops` is the only
    /// in-band termination mechanism the core defines; `cancel` lets an
    /// operator-driven shutdown stop the loop between iterations without
    /// losing in-flight commit bookkeeping.
    pub async fn run(mut self, max_loops: i64, cancel: CancellationToken) -> Result<MetricsSnapshot, AgentError> {
        let loop_result = self.drive(max_loops, &cancel).await;
        let close_result = self.close_all().await;
        loop_result.and(close_result)?;
        Ok(self.metrics.snapshot())
    }

    async fn drive(&mut self, max_loops: i64, cancel: &CancellationToken) -> Result<(), AgentError> {
        let mut iterations: i64 = 0;
        loop {
            if max_loops >= 0 && iterations >= max_loops {
                return Ok(());
            }
            if cancel.is_cancelled() {
                return Ok(());
            }
            iterations += 1;

            let batch = self.source.lock().await.read().await?;
            if batch.is_empty() {
                continue;
            }
            self.metrics.increment_batches(1);

            let results = ProcessorDriver::run(
                self.processor.as_mut(),
                batch,
                &self.errors,
                &self.source,
                &self.metrics,
            )
            .await?;

            self.tracker.track(&results).await?;

            for result in results {
                match result.outcome {
                    Outcome::Error(_) => {
                        // SKIP terminal: never reaches the sink, committed
                        // directly, bypassing the tracker entirely.
                        self.source
                            .lock()
                            .await
                            .commit(&Batch::new(vec![result.source_record]))
                            .await?;
                        self.metrics.increment_commits(1);
                    }
                    Outcome::Derived(derived) => {
                        if derived.is_empty() {
                            // Already committed by the tracker in `track`.
                            continue;
                        }
                        SinkWriter::write(
                            self.sink.as_mut(),
                            &result.source_record,
                            &derived,
                            &self.errors,
                            &self.source,
                            &self.tracker,
                            &self.metrics,
                        )
                        .await?;
                    }
                }
            }
        }
    }

    async fn close_all(&mut self) -> Result<(), AgentError> {
        let source_result = self.source.lock().await.close().await;
        let processor_result = self.processor.close().await;
        let sink_result = self.sink.close().await;
        source_result.and(processor_result).and(sink_result)
    }
}
