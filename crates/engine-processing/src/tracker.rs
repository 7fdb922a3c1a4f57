use std::collections::HashMap;

use async_trait::async_trait;
use engine_core::{CommitCallback, Metrics};
use model::{AgentError, Batch, Outcome, ProcessingResult, Record, RecordId};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, info};

use crate::processor_driver::SourceHandle;

#[derive(Default)]
struct TrackerState {
    /// sink record identity -> originating source record identity.
    owner: HashMap<RecordId, RecordId>,
    /// source record identity -> the source record itself, kept alive so
    /// it can be committed once its outstanding count reaches zero.
    source_records: HashMap<RecordId, Record>,
    /// source record identity -> count of derived sink records not yet
    /// acknowledged.
    outstanding: HashMap<RecordId, usize>,
}

/// Maps sink-bound records back to their originating source records and
/// commits a source record upstream only once every derived sink record
/// has been acknowledged (§4.6).
pub struct SourceRecordTracker {
    source: SourceHandle,
    metrics: Metrics,
    state: AsyncMutex<TrackerState>,
}

impl SourceRecordTracker {
    pub fn new(source: SourceHandle, metrics: Metrics) -> Self {
        Self {
            source,
            metrics,
            state: AsyncMutex::new(TrackerState::default()),
        }
    }

    /// Registers the driver's non-error outcomes. A source record whose
    /// derived batch is empty has nothing to wait for and is committed
    /// immediately; error outcomes are not registered here at all — the
    /// main loop commits those source records directly, bypassing the
    /// tracker's accounting (see the open question this resolves).
    pub async fn track(&self, results: &[ProcessingResult]) -> Result<(), AgentError> {
        for result in results {
            let Outcome::Derived(derived) = &result.outcome else {
                continue;
            };
            if derived.is_empty() {
                self.commit_upstream(result.source_record.clone()).await?;
                continue;
            }
            self.register(&result.source_record, derived).await;
        }
        Ok(())
    }

    async fn register(&self, source_record: &Record, derived: &Batch) {
        let mut state = self.state.lock().await;
        state
            .outstanding
            .insert(source_record.id(), derived.len());
        state
            .source_records
            .insert(source_record.id(), source_record.clone());
        for sink_record in derived.iter() {
            state.owner.insert(sink_record.id(), source_record.id());
        }
    }

    async fn commit_upstream(&self, record: Record) -> Result<(), AgentError> {
        info!(record = %record.id(), "committing source record upstream");
        self.source.lock().await.commit(&Batch::new(vec![record])).await?;
        self.metrics.increment_commits(1);
        Ok(())
    }

    async fn acknowledge(&self, sink_record: &Record) -> Result<(), AgentError> {
        let finished_source_record = {
            let mut state = self.state.lock().await;
            let Some(source_id) = state.owner.remove(&sink_record.id()) else {
                debug!(record = %sink_record.id(), "commit callback for an untracked record, ignoring");
                return Ok(());
            };
            let remaining = state.outstanding.entry(source_id).or_insert(0);
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                state.outstanding.remove(&source_id);
                state.source_records.remove(&source_id)
            } else {
                None
            }
        };

        if let Some(source_record) = finished_source_record {
            self.commit_upstream(source_record).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl CommitCallback for SourceRecordTracker {
    async fn commit(&self, records: &[Record]) {
        for record in records {
            if let Err(err) = self.acknowledge(record).await {
                error!(record = %record.id(), error = %err, "failed to commit source record upstream");
            }
        }
    }
}
