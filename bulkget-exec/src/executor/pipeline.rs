use std::collections::HashSet;
use std::sync::Arc;

use bulkget_core::{BulkReport, ConfigError, FetchOptions, KeyFetchTask, KeyValueClient};
use tracing::Instrument;
use uuid::Uuid;

use crate::executor::collector::ResultCollector;
use crate::executor::concurrency::ConcurrencyLimiter;
use crate::executor::dispatcher::FetchDispatcher;
use crate::executor::events::{Event, EventSink, NoOpEventSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Dispatching,
    Collecting,
    Completed,
    Cancelled,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Dispatching => "dispatching",
            PipelineState::Collecting => "collecting",
            PipelineState::Completed => "completed",
            PipelineState::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Completed | PipelineState::Cancelled)
    }
}

/// Fetches a batch of keys with bounded concurrency and reports one outcome per key.
///
/// Repeated keys collapse into one fetch and one outcome; the first occurrence
/// fixes the submission order and the report lists the repeated keys.
pub struct BulkFetchPipeline {
    client: Arc<dyn KeyValueClient>,
    options: FetchOptions,
    event_sink: Arc<dyn EventSink>,
}

impl BulkFetchPipeline {
    pub fn new(client: Arc<dyn KeyValueClient>, options: FetchOptions) -> Self {
        Self {
            client,
            options,
            event_sink: Arc::new(NoOpEventSink),
        }
    }

    pub fn with_event_sink(mut self, event_sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    /// Runs one batch. Only invalid input is an error; every per-key problem
    /// is reported as that key's outcome.
    pub async fn bulk_fetch<K: AsRef<str>>(&self, keys: &[K]) -> Result<BulkReport, ConfigError> {
        let (unique, duplicates) = dedup_keys(keys)?;
        self.options.validate()?;

        let batch_id = Uuid::new_v4();
        let span = tracing::info_span!("bulk_fetch", %batch_id, keys = unique.len());
        Ok(self.run(batch_id, unique, duplicates).instrument(span).await)
    }

    async fn run(&self, batch_id: Uuid, keys: Vec<String>, duplicates: Vec<String>) -> BulkReport {
        let mut state = PipelineState::Idle;
        self.event_sink
            .emit(Event::BatchStarted {
                batch_id,
                keys: keys.len(),
                concurrency: self.options.concurrency,
            })
            .await;

        let tasks: Vec<KeyFetchTask> = keys.iter().map(|k| self.options.task_for(k)).collect();
        // Never more permits than fetches.
        let limiter = ConcurrencyLimiter::new(self.options.concurrency.min(keys.len()));
        let dispatcher = FetchDispatcher::new(
            batch_id,
            self.client.clone(),
            limiter.clone(),
            self.event_sink.clone(),
        );

        self.transition(batch_id, &mut state, PipelineState::Dispatching).await;
        let outcomes = dispatcher.dispatch(tasks);

        self.transition(batch_id, &mut state, PipelineState::Collecting).await;
        let report = ResultCollector::new(batch_id)
            .with_duplicate_keys(duplicates)
            .collect(outcomes, &keys, self.options.overall_deadline)
            .await;

        let terminal = match report.status() {
            bulkget_core::BatchStatus::Completed => PipelineState::Completed,
            bulkget_core::BatchStatus::Cancelled => PipelineState::Cancelled,
        };
        self.transition(batch_id, &mut state, terminal).await;

        self.event_sink
            .emit(Event::BatchFinished {
                batch_id,
                status: report.status(),
                succeeded: report.succeeded_count(),
                failed: report.failed_count(),
                timed_out: report.timed_out_count(),
                cancelled: report.cancelled_count(),
                peak_in_flight: limiter.peak_in_flight(),
                elapsed_ms: report.elapsed().as_millis() as u64,
            })
            .await;

        report
    }

    async fn transition(&self, batch_id: Uuid, state: &mut PipelineState, next: PipelineState) {
        debug_assert!(!state.is_terminal(), "no transitions out of a terminal state");
        tracing::debug!(from = state.as_str(), to = next.as_str(), "pipeline state");
        *state = next;
        self.event_sink
            .emit(Event::StateChanged { batch_id, state: next })
            .await;
    }
}

/// Convenience wrapper around [`BulkFetchPipeline`] without an event sink.
pub async fn bulk_fetch<K: AsRef<str>>(
    keys: &[K],
    client: Arc<dyn KeyValueClient>,
    options: FetchOptions,
) -> Result<BulkReport, ConfigError> {
    BulkFetchPipeline::new(client, options).bulk_fetch(keys).await
}

fn dedup_keys<K: AsRef<str>>(keys: &[K]) -> Result<(Vec<String>, Vec<String>), ConfigError> {
    if keys.is_empty() {
        return Err(ConfigError::EmptyKeys);
    }
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(keys.len());
    let mut duplicates = Vec::new();
    for (i, key) in keys.iter().enumerate() {
        let key = key.as_ref();
        if key.is_empty() {
            return Err(ConfigError::EmptyKey(i));
        }
        if seen.insert(key) {
            unique.push(key.to_string());
        } else if !duplicates.iter().any(|d| d == key) {
            duplicates.push(key.to_string());
        }
    }
    Ok((unique, duplicates))
}
