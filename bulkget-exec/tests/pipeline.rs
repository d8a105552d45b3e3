use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bulkget_core::{
    BatchStatus, ClientError, ConfigError, Document, FailureKind, FetchOptions, FetchOutcome,
    KeyValueClient,
};
use bulkget_exec::{bulk_fetch, BulkFetchPipeline, MemoryClient};
use serde_json::json;

async fn seeded_client(keys: &[String]) -> Arc<MemoryClient> {
    let client = MemoryClient::new();
    for k in keys {
        client.upsert(k.clone(), json!({ "item": "A bulk get test value" })).await;
    }
    Arc::new(client)
}

fn numbered_keys(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("k{i}")).collect()
}

// Tracks how many gets are running at once.
struct TrackingClient {
    current: AtomicUsize,
    peak: AtomicUsize,
    latency: Duration,
}

#[async_trait]
impl KeyValueClient for TrackingClient {
    async fn get(&self, key: &str, _timeout: Duration) -> Result<Document, ClientError> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(Document::new(json!({ "key": key })))
    }
}

#[tokio::test(start_paused = true)]
async fn one_slow_key_bounds_elapsed_time() {
    let keys = numbered_keys(10);
    let client = seeded_client(&keys).await;
    let mut options = FetchOptions {
        concurrency: 5,
        per_task_timeout: Duration::from_secs(5),
        overall_deadline: Duration::from_secs(10),
        ..Default::default()
    };
    options.delays.insert("k3".to_string(), Duration::from_secs(3));

    let report = bulk_fetch(&keys, client, options).await.unwrap();

    assert_eq!(report.status(), BatchStatus::Completed);
    assert_eq!(report.len(), 10);
    assert_eq!(report.succeeded_count(), 10);
    assert!(report.all_succeeded());
    assert_eq!(report.completion_rank("k3"), Some(9));
    assert!(report.elapsed() >= Duration::from_secs(3));
    assert!(report.elapsed() < Duration::from_millis(3500));
}

#[tokio::test(start_paused = true)]
async fn never_exceeds_configured_concurrency() {
    let client = Arc::new(TrackingClient {
        current: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
        latency: Duration::from_millis(10),
    });
    let options = FetchOptions {
        concurrency: 3,
        ..Default::default()
    };

    let report = bulk_fetch(&numbered_keys(20), client.clone(), options).await.unwrap();

    assert_eq!(report.succeeded_count(), 20);
    assert_eq!(client.peak.load(Ordering::SeqCst), 3);
    // 20 keys in waves of 3.
    assert!(report.elapsed() >= Duration::from_millis(70));
}

#[tokio::test(start_paused = true)]
async fn deadline_cancels_slow_key_and_returns_promptly() {
    let keys = numbered_keys(4);
    let client = seeded_client(&keys).await;
    let mut options = FetchOptions {
        concurrency: 4,
        per_task_timeout: Duration::from_secs(30),
        overall_deadline: Duration::from_secs(1),
        ..Default::default()
    };
    options.delays.insert("k2".to_string(), Duration::from_secs(10));

    let report = bulk_fetch(&keys, client, options).await.unwrap();

    assert_eq!(report.status(), BatchStatus::Cancelled);
    assert_eq!(report.get("k2"), Some(&FetchOutcome::Cancelled { key: "k2".to_string() }));
    assert_eq!(report.succeeded_count(), 3);
    assert!(report.elapsed() >= Duration::from_secs(1));
    assert!(report.elapsed() < Duration::from_millis(1100));
}

#[tokio::test(start_paused = true)]
async fn per_task_timeout_is_independent_of_other_keys() {
    let keys = numbered_keys(3);
    let client = seeded_client(&keys).await;
    let mut options = FetchOptions {
        concurrency: 3,
        per_task_timeout: Duration::from_secs(1),
        overall_deadline: Duration::from_secs(10),
        ..Default::default()
    };
    options.delays.insert("k1".to_string(), Duration::from_secs(2));

    let report = bulk_fetch(&keys, client, options).await.unwrap();

    assert_eq!(report.status(), BatchStatus::Completed);
    assert_eq!(report.get("k1"), Some(&FetchOutcome::Timeout { key: "k1".to_string() }));
    assert_eq!(report.succeeded_count(), 2);
    assert_eq!(report.timed_out_count(), 1);
    assert_eq!(report.failed_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn timeout_override_applies_to_one_key() {
    let keys = numbered_keys(2);
    let client = seeded_client(&keys).await;
    let mut options = FetchOptions::default();
    options.delays.insert("k0".to_string(), Duration::from_millis(500));
    options.delays.insert("k1".to_string(), Duration::from_millis(500));
    options.timeout_overrides.insert("k0".to_string(), Duration::from_millis(100));

    let report = bulk_fetch(&keys, client, options).await.unwrap();

    assert_eq!(report.get("k0"), Some(&FetchOutcome::Timeout { key: "k0".to_string() }));
    assert!(report.get("k1").is_some_and(|o| o.is_success()));
}

#[tokio::test(start_paused = true)]
async fn per_key_errors_never_abort_the_batch() {
    let client = MemoryClient::new()
        .with_failure("broken", ClientError::Connection("reset by peer".to_string()));
    client.upsert("ok", json!(1)).await;

    let report = bulk_fetch(&["ok", "broken", "missing"], Arc::new(client), FetchOptions::default())
        .await
        .unwrap();

    assert_eq!(report.len(), 3);
    assert_eq!(report.succeeded_count(), 1);
    match report.get("broken") {
        Some(FetchOutcome::Failure { kind, .. }) => assert_eq!(*kind, FailureKind::Connection),
        other => panic!("expected connection failure, got {other:?}"),
    }
    match report.get("missing") {
        Some(FetchOutcome::Failure { kind, .. }) => assert_eq!(*kind, FailureKind::NotFound),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn duplicate_keys_collapse_to_one_fetch() {
    let client = MemoryClient::new();
    client.upsert("a", json!(1)).await;
    client.upsert("b", json!(2)).await;
    let client = Arc::new(client);

    let report = bulk_fetch(&["a", "b", "a", "a"], client.clone(), FetchOptions::default())
        .await
        .unwrap();

    assert_eq!(report.len(), 2);
    assert_eq!(report.duplicate_keys(), &["a".to_string()]);
    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn zero_concurrency_fails_before_any_fetch() {
    let client = Arc::new(MemoryClient::new());
    let options = FetchOptions {
        concurrency: 0,
        ..Default::default()
    };

    let err = bulk_fetch(&["a", "b"], client.clone(), options).await.unwrap_err();

    assert_eq!(err, ConfigError::InvalidConcurrency(0));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn empty_inputs_are_rejected() {
    let pipeline = BulkFetchPipeline::new(Arc::new(MemoryClient::new()), FetchOptions::default());

    let no_keys: [&str; 0] = [];
    assert_eq!(pipeline.bulk_fetch(&no_keys).await.unwrap_err(), ConfigError::EmptyKeys);
    assert_eq!(pipeline.bulk_fetch(&["a", ""]).await.unwrap_err(), ConfigError::EmptyKey(1));
}

#[tokio::test(start_paused = true)]
async fn unbounded_concurrency_runs_the_batch() {
    let keys = numbered_keys(3);
    let client = seeded_client(&keys).await;
    let options = FetchOptions {
        concurrency: usize::MAX,
        ..Default::default()
    };

    let report = bulk_fetch(&keys, client, options).await.unwrap();

    assert_eq!(report.status(), BatchStatus::Completed);
    assert_eq!(report.succeeded_count(), 3);
}
