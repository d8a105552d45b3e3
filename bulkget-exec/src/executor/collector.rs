use std::collections::HashSet;
use std::time::Duration;

use bulkget_core::{BatchStatus, BulkReport, FailureKind, FetchOutcome, ReportBuilder};
use futures_util::{Stream, StreamExt};
use tokio::time::Instant;
use uuid::Uuid;

/// Folds an outcome stream into a [`BulkReport`].
pub struct ResultCollector {
    batch_id: Uuid,
    duplicate_keys: Vec<String>,
}

impl ResultCollector {
    pub fn new(batch_id: Uuid) -> Self {
        Self {
            batch_id,
            duplicate_keys: Vec::new(),
        }
    }

    pub fn with_duplicate_keys(mut self, keys: Vec<String>) -> Self {
        self.duplicate_keys = keys;
        self
    }

    /// Records outcomes until every key in `expected_keys` has one or `deadline`
    /// passes. Keys still unresolved at the deadline are reported as cancelled
    /// and the stream is dropped without waiting for them.
    ///
    /// `expected_keys` must not contain duplicates.
    pub async fn collect<S>(
        self,
        outcomes: S,
        expected_keys: &[String],
        deadline: Duration,
    ) -> BulkReport
    where
        S: Stream<Item = FetchOutcome> + Unpin,
    {
        let started = Instant::now();
        let deadline_at = started + deadline;
        let expected: HashSet<&str> = expected_keys.iter().map(String::as_str).collect();
        let mut builder = ReportBuilder::new(self.batch_id).with_duplicate_keys(self.duplicate_keys);
        let mut outcomes = outcomes;
        let mut status = BatchStatus::Completed;

        while builder.len() < expected.len() {
            match tokio::time::timeout_at(deadline_at, outcomes.next()).await {
                Ok(Some(outcome)) => {
                    if !expected.contains(outcome.key()) {
                        tracing::warn!(batch_id = %self.batch_id, key = outcome.key(), "ignoring outcome for unrequested key");
                        continue;
                    }
                    let key = outcome.key().to_string();
                    if !builder.record(outcome) {
                        tracing::warn!(batch_id = %self.batch_id, key = %key, "ignoring repeated outcome");
                    }
                }
                Ok(None) => {
                    tracing::warn!(
                        batch_id = %self.batch_id,
                        missing = expected.len() - builder.len(),
                        "outcome stream ended early"
                    );
                    for key in unresolved(expected_keys, &builder) {
                        builder.record(FetchOutcome::Failure {
                            key,
                            kind: FailureKind::Internal,
                            message: "fetch ended without reporting an outcome".to_string(),
                        });
                    }
                    break;
                }
                Err(_) => {
                    status = BatchStatus::Cancelled;
                    for key in unresolved(expected_keys, &builder) {
                        builder.record(FetchOutcome::Cancelled { key });
                    }
                    break;
                }
            }
        }
        drop(outcomes);

        builder.finish(status, started.elapsed())
    }
}

fn unresolved(expected_keys: &[String], builder: &ReportBuilder) -> Vec<String> {
    expected_keys
        .iter()
        .filter(|k| !builder.contains(k))
        .cloned()
        .collect()
}
