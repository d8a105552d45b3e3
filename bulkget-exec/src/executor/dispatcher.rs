use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use bulkget_core::{FetchMetadata, FetchOutcome, KeyFetchTask, KeyValueClient};
use futures_util::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use crate::executor::concurrency::{ConcurrencyLimiter, FetchPermit};
use crate::executor::events::{Event, EventSink};

/// Issues one fetch per task through the limiter and streams the outcomes
/// back as they complete.
pub struct FetchDispatcher {
    batch_id: Uuid,
    client: Arc<dyn KeyValueClient>,
    limiter: ConcurrencyLimiter,
    event_sink: Arc<dyn EventSink>,
}

impl FetchDispatcher {
    pub fn new(
        batch_id: Uuid,
        client: Arc<dyn KeyValueClient>,
        limiter: ConcurrencyLimiter,
        event_sink: Arc<dyn EventSink>,
    ) -> Self {
        Self { batch_id, client, limiter, event_sink }
    }

    /// Starts dispatching `tasks` in submission order. Outcomes arrive on the
    /// returned stream in completion order.
    ///
    /// Dropping the stream stops any fetch that has not started yet. Fetches
    /// already running finish (or time out) in the background and release
    /// their permits; their outcomes are discarded.
    pub fn dispatch(&self, tasks: Vec<KeyFetchTask>) -> OutcomeStream {
        let (tx, rx) = mpsc::channel(tasks.len().max(1));
        let batch_id = self.batch_id;
        let client = self.client.clone();
        let limiter = self.limiter.clone();
        let sink = self.event_sink.clone();

        let driver = tokio::spawn(async move {
            for task in tasks {
                let permit = limiter.acquire().await;
                sink.emit(Event::FetchStarted {
                    batch_id,
                    key: task.key().to_string(),
                })
                .await;

                let client = client.clone();
                let sink = sink.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let (outcome, elapsed) = run_fetch(batch_id, task, client.as_ref(), permit).await;
                    if tx.is_closed() {
                        tracing::debug!(%batch_id, key = outcome.key(), "discarding outcome of abandoned batch");
                        return;
                    }
                    sink.emit(Event::FetchFinished {
                        batch_id,
                        key: outcome.key().to_string(),
                        outcome: outcome.kind_str(),
                        latency_ms: elapsed.as_millis() as u64,
                    })
                    .await;
                    let _ = tx.send(outcome).await;
                });
            }
        });

        OutcomeStream { rx, driver }
    }
}

/// Outcomes of one dispatch, in completion order.
pub struct OutcomeStream {
    rx: mpsc::Receiver<FetchOutcome>,
    driver: JoinHandle<()>,
}

impl Stream for OutcomeStream {
    type Item = FetchOutcome;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for OutcomeStream {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

async fn run_fetch(
    batch_id: Uuid,
    task: KeyFetchTask,
    client: &dyn KeyValueClient,
    permit: FetchPermit,
) -> (FetchOutcome, Duration) {
    let started = Instant::now();
    let key = task.key().to_string();
    let timeout = task.timeout();

    let fetch = async {
        if let Some(delay) = task.delay() {
            tokio::time::sleep(delay).await;
        }
        let remaining = timeout.saturating_sub(started.elapsed());
        client.get(&key, remaining).await
    };

    let result = tokio::time::timeout(timeout, fetch).await;
    let outcome = match result {
        Ok(Ok(doc)) => FetchOutcome::Success {
            key,
            value: doc.value,
            metadata: FetchMetadata {
                revision: doc.revision,
                latency: started.elapsed(),
            },
        },
        Ok(Err(e)) => FetchOutcome::from_client_error(key, e),
        Err(_) => FetchOutcome::Timeout { key },
    };
    drop(permit);

    let elapsed = started.elapsed();
    tracing::debug!(
        %batch_id,
        key = outcome.key(),
        outcome = outcome.kind_str(),
        elapsed_ms = elapsed.as_millis() as u64,
        "fetch settled"
    );
    (outcome, elapsed)
}
