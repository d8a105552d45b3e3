use std::sync::Arc;
use std::time::Duration;

use bulkget_core::{FailureKind, FetchOutcome, KeyFetchTask};
use bulkget_exec::executor::{ConcurrencyLimiter, FetchDispatcher, NoOpEventSink};
use bulkget_exec::MemoryClient;
use futures_util::StreamExt;
use serde_json::json;
use uuid::Uuid;

async fn seeded(client: MemoryClient, keys: &[&str]) -> Arc<MemoryClient> {
    for k in keys {
        client.upsert(*k, json!({ "key": k })).await;
    }
    Arc::new(client)
}

fn dispatcher(client: Arc<MemoryClient>, limiter: ConcurrencyLimiter) -> FetchDispatcher {
    FetchDispatcher::new(Uuid::new_v4(), client, limiter, Arc::new(NoOpEventSink))
}

#[tokio::test(start_paused = true)]
async fn outcomes_arrive_in_completion_order() {
    let client = seeded(
        MemoryClient::new()
            .with_key_latency("a", Duration::from_millis(300))
            .with_key_latency("b", Duration::from_millis(100))
            .with_key_latency("c", Duration::from_millis(200)),
        &["a", "b", "c"],
    )
    .await;
    let d = dispatcher(client, ConcurrencyLimiter::new(3));

    let tasks = ["a", "b", "c"]
        .iter()
        .map(|k| KeyFetchTask::new(*k, Duration::from_secs(1)))
        .collect();
    let outcomes: Vec<FetchOutcome> = d.dispatch(tasks).collect().await;

    let keys: Vec<&str> = outcomes.iter().map(|o| o.key()).collect();
    assert_eq!(keys, vec!["b", "c", "a"]);
    assert!(outcomes.iter().all(|o| o.is_success()));
}

#[tokio::test(start_paused = true)]
async fn missing_key_is_a_not_found_failure() {
    let client = seeded(MemoryClient::new(), &["present"]).await;
    let d = dispatcher(client, ConcurrencyLimiter::new(2));

    let tasks = vec![
        KeyFetchTask::new("present", Duration::from_secs(1)),
        KeyFetchTask::new("absent", Duration::from_secs(1)),
    ];
    let outcomes: Vec<FetchOutcome> = d.dispatch(tasks).collect().await;
    assert_eq!(outcomes.len(), 2);

    let absent = outcomes.iter().find(|o| o.key() == "absent").unwrap();
    match absent {
        FetchOutcome::Failure { kind, .. } => assert_eq!(*kind, FailureKind::NotFound),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn delay_beyond_timeout_yields_timeout() {
    let client = seeded(MemoryClient::new(), &["slow", "fast"]).await;
    let limiter = ConcurrencyLimiter::new(2);
    let d = dispatcher(client, limiter.clone());

    let tasks = vec![
        KeyFetchTask::new("slow", Duration::from_secs(1)).with_delay(Duration::from_secs(2)),
        KeyFetchTask::new("fast", Duration::from_secs(1)),
    ];
    let outcomes: Vec<FetchOutcome> = d.dispatch(tasks).collect().await;

    assert_eq!(outcomes[0].key(), "fast");
    assert!(outcomes[0].is_success());
    assert_eq!(outcomes[1], FetchOutcome::Timeout { key: "slow".to_string() });
    assert_eq!(limiter.in_flight(), 0);
}

#[tokio::test(start_paused = true)]
async fn success_carries_revision_and_latency() {
    let client = MemoryClient::new().with_latency(Duration::from_millis(40));
    let revision = client.upsert("doc", json!({ "item": 1 })).await;
    let d = dispatcher(Arc::new(client), ConcurrencyLimiter::new(1));

    let mut stream = d.dispatch(vec![KeyFetchTask::new("doc", Duration::from_secs(1))]);
    match stream.next().await {
        Some(FetchOutcome::Success { value, metadata, .. }) => {
            assert_eq!(value, json!({ "item": 1 }));
            assert_eq!(metadata.revision, Some(revision));
            assert!(metadata.latency >= Duration::from_millis(40));
        }
        other => panic!("expected success, got {other:?}"),
    }
    assert!(stream.next().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_stream_releases_in_flight_permits() {
    let client = seeded(
        MemoryClient::new().with_latency(Duration::from_secs(1)),
        &["a", "b", "c"],
    )
    .await;
    let limiter = ConcurrencyLimiter::new(2);
    let d = dispatcher(client.clone(), limiter.clone());

    let tasks = ["a", "b", "c"]
        .iter()
        .map(|k| KeyFetchTask::new(*k, Duration::from_secs(5)))
        .collect();
    let mut stream = d.dispatch(tasks);
    assert!(stream.next().await.is_some());
    drop(stream);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(limiter.in_flight(), 0);
    assert_eq!(limiter.available(), 2);
    assert!(client.calls() <= 3);
}
