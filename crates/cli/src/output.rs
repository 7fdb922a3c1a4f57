use engine_core::MetricsSnapshot;

use crate::error::CliError;

/// Renders a pod run's final [`MetricsSnapshot`] (§4.10) as pretty JSON on
/// stdout, so an operator driving a pod from the command line gets the same
/// counters a health/readiness endpoint would expose.
pub fn print_metrics_report(snapshot: MetricsSnapshot) -> Result<(), CliError> {
    let report = serde_json::json!({
        "recordsProcessed": snapshot.records_processed,
        "batchesProcessed": snapshot.batches_processed,
        "recordsCommitted": snapshot.records_committed,
        "recordsSkipped": snapshot.records_skipped,
        "failureCount": snapshot.failure_count,
        "retryCount": snapshot.retry_count,
    });
    let json = serde_json::to_string_pretty(&report).map_err(CliError::JsonSerialize)?;
    println!("{json}");
    Ok(())
}
