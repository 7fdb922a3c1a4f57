use std::sync::atomic::Ordering;

use connectors::MemoryBroker;
use engine_core::AgentRegistry;
use engine_runtime::{Runner, RunnerError};
use model::Record;
use tokio_util::sync::CancellationToken;
use tracing_test::traced_test;

use crate::utils::{
    AlwaysFailProcessor, FanOutProcessor, LifecycleCountingAgent, SelectiveFailProcessor,
    memory_registry, pod_config, topicless_pod_config,
};

async fn drain(broker: &MemoryBroker, topic: &str) -> Vec<serde_json::Value> {
    let mut consumer = broker
        .create_topic_consumer(&[topic.to_string()])
        .await
        .unwrap();
    let batch = consumer.read().await.unwrap();
    batch.as_slice().iter().map(|r| r.payload.clone()).collect()
}

/// S1: a healthy record flows from input to output and is committed
/// exactly once (§8 items 1, 2, 3).
#[tokio::test]
async fn s1_healthy_records_flow_end_to_end_and_commit() {
    let broker = MemoryBroker::new();
    broker.publish(
        "in",
        vec![
            Record::new(serde_json::json!(1)),
            Record::new(serde_json::json!(2)),
            Record::new(serde_json::json!(3)),
        ],
    );

    let runner = Runner::new(AgentRegistry::new(), memory_registry(&broker));
    let agent = SelectiveFailProcessor::new(vec![]);
    let snapshot = runner
        .run(
            pod_config("in", "out", 0, "fail"),
            Some(Box::new(agent)),
            1,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(snapshot.records_processed, 3);
    assert_eq!(snapshot.records_committed, 3);
    assert_eq!(snapshot.batches_processed, 1);

    let mut output = drain(&broker, "out").await;
    output.sort_by_key(|v| v.as_i64().unwrap());
    assert_eq!(output, vec![serde_json::json!(2), serde_json::json!(4), serde_json::json!(6)]);
}

/// §8 item 9: a read that returns nothing commits nothing and writes
/// nothing, but still counts as a loop iteration.
#[tokio::test]
async fn empty_input_topic_is_a_no_op() {
    let broker = MemoryBroker::new();
    let runner = Runner::new(AgentRegistry::new(), memory_registry(&broker));
    let agent = LifecycleCountingAgent::default();
    let starts = agent.starts.clone();
    let closes = agent.closes.clone();

    let snapshot = runner
        .run(
            pod_config("in", "out", 0, "fail"),
            Some(Box::new(agent)),
            2,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(snapshot.records_processed, 0);
    assert_eq!(snapshot.records_committed, 0);
    assert_eq!(snapshot.batches_processed, 0);
    // §8 item 8: start/close exactly once each, even across several empty iterations.
    assert_eq!(starts.load(Ordering::SeqCst), 1);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

/// §8 item 5 / S-scenario: with `onFailure=skip`, a record that exhausts
/// its retries is committed upstream and nothing reaches the sink for it,
/// while healthy records alongside it are unaffected.
#[tokio::test]
async fn skip_policy_commits_failed_record_without_writing_output() {
    let broker = MemoryBroker::new();
    broker.publish(
        "in",
        vec![
            Record::new(serde_json::json!(1)),
            Record::new(serde_json::json!(2)),
            Record::new(serde_json::json!(3)),
        ],
    );

    let runner = Runner::new(AgentRegistry::new(), memory_registry(&broker));
    let agent = SelectiveFailProcessor::new(vec![2]);
    let snapshot = runner
        .run(
            pod_config("in", "out", 0, "skip"),
            Some(Box::new(agent)),
            1,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(snapshot.records_committed, 3);
    assert_eq!(snapshot.records_skipped, 1);

    let mut output = drain(&broker, "out").await;
    output.sort_by_key(|v| v.as_i64().unwrap());
    assert_eq!(output, vec![serde_json::json!(2), serde_json::json!(6)]);
}

/// §8 item 4: with `onFailure=fail` and zero retries, the first failure
/// aborts the loop and never commits the failing record, but still
/// reports it via `permanent_failure` (routed to the DLQ topic by the
/// default source wrapper).
#[tokio::test]
#[traced_test]
async fn fail_policy_aborts_without_committing() {
    let broker = MemoryBroker::new();
    broker.publish("in", vec![Record::new(serde_json::json!(42))]);

    let runner = Runner::new(AgentRegistry::new(), memory_registry(&broker));
    let agent = AlwaysFailProcessor::new();
    let result = runner
        .run(
            pod_config("in", "out", 0, "fail"),
            Some(Box::new(agent)),
            1,
            CancellationToken::new(),
        )
        .await;

    assert!(matches!(result, Err(RunnerError::Agent(_))));
    assert!(drain(&broker, "out").await.is_empty());
    assert_eq!(drain(&broker, "in-dlq").await.len(), 1);
}

/// §8 item 6: with `onFailure=dead-letter`, a terminal failure is
/// reported via `permanent_failure` but the loop keeps going and the
/// record is still committed upstream like a skip.
#[tokio::test]
async fn dead_letter_policy_continues_the_loop() {
    let broker = MemoryBroker::new();
    broker.publish(
        "in",
        vec![Record::new(serde_json::json!(1)), Record::new(serde_json::json!(2))],
    );

    let runner = Runner::new(AgentRegistry::new(), memory_registry(&broker));
    let agent = AlwaysFailProcessor::new();
    let snapshot = runner
        .run(
            pod_config("in", "out", 0, "dead-letter"),
            Some(Box::new(agent)),
            1,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(snapshot.records_committed, 2);
    assert!(drain(&broker, "out").await.is_empty());
    assert_eq!(drain(&broker, "in-dlq").await.len(), 2);
}

/// §8 item 7: the retry budget is a single counter shared across every
/// record in a batch, not a per-record allowance. Two records failing
/// every trial exhaust a budget of 3 after two trials rather than each
/// getting 3 retries of their own.
#[tokio::test]
async fn retry_budget_is_shared_across_records_in_a_batch() {
    let broker = MemoryBroker::new();
    broker.publish(
        "in",
        vec![Record::new(serde_json::json!(10)), Record::new(serde_json::json!(20))],
    );

    let runner = Runner::new(AgentRegistry::new(), memory_registry(&broker));
    let agent = AlwaysFailProcessor::new();
    let attempts = agent.attempts.clone();
    let snapshot = runner
        .run(
            pod_config("in", "out", 3, "skip"),
            Some(Box::new(agent)),
            1,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    // trial 1: both records retry (shared count 1, 2); trial 2: both
    // exhaust the budget of 3 (shared count 3, 4) and are skipped.
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
    assert_eq!(snapshot.retry_count, 2);
    assert_eq!(snapshot.records_skipped, 2);
    assert_eq!(snapshot.records_committed, 2);
}

/// §8 item 3 at the assembled-pipeline level: a source record producing
/// several derived records is committed exactly once, not once per
/// derived record.
#[tokio::test]
async fn commit_count_tracks_source_records_not_derived_records() {
    let broker = MemoryBroker::new();
    broker.publish(
        "in",
        vec![Record::new(serde_json::json!(1)), Record::new(serde_json::json!(2))],
    );

    let runner = Runner::new(AgentRegistry::new(), memory_registry(&broker));
    let snapshot = runner
        .run(
            pod_config("in", "out", 0, "fail"),
            Some(Box::new(FanOutProcessor)),
            1,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(snapshot.records_committed, 2);
    assert_eq!(drain(&broker, "out").await.len(), 4);
}

/// The messaging-substrate fallback (§4.8): with no input/output topics
/// configured, the loop runs against the no-op consumer/producer and
/// still pairs start/close exactly once.
#[tokio::test]
async fn topicless_configuration_falls_back_to_noop_collaborators() {
    let broker = MemoryBroker::new();
    let runner = Runner::new(AgentRegistry::new(), memory_registry(&broker));
    let agent = LifecycleCountingAgent::default();
    let starts = agent.starts.clone();
    let closes = agent.closes.clone();

    let snapshot = runner
        .run(
            topicless_pod_config(0, "fail"),
            Some(Box::new(agent)),
            1,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(snapshot.records_processed, 0);
    assert_eq!(starts.load(Ordering::SeqCst), 1);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

/// A shutdown signal checked between iterations stops the loop without
/// requiring every configured iteration to run (§4.11).
#[tokio::test]
async fn cancellation_stops_the_loop_before_max_loops() {
    let broker = MemoryBroker::new();
    let runner = Runner::new(AgentRegistry::new(), memory_registry(&broker));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let snapshot = runner
        .run(
            pod_config("in", "out", 0, "fail"),
            Some(Box::new(LifecycleCountingAgent::default())),
            1_000_000,
            cancel,
        )
        .await
        .unwrap();

    assert_eq!(snapshot.batches_processed, 0);
}
