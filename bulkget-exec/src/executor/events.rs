use std::sync::Arc;

use async_trait::async_trait;
use bulkget_core::BatchStatus;
use serde_json::json;
use uuid::Uuid;

use crate::executor::pipeline::PipelineState;

#[derive(Debug, Clone)]
pub enum Event {
    BatchStarted {
        batch_id: Uuid,
        keys: usize,
        concurrency: usize,
    },
    StateChanged {
        batch_id: Uuid,
        state: PipelineState,
    },
    FetchStarted {
        batch_id: Uuid,
        key: String,
    },
    FetchFinished {
        batch_id: Uuid,
        key: String,
        outcome: &'static str,
        latency_ms: u64,
    },
    BatchFinished {
        batch_id: Uuid,
        status: BatchStatus,
        succeeded: usize,
        failed: usize,
        timed_out: usize,
        cancelled: usize,
        peak_in_flight: usize,
        elapsed_ms: u64,
    },
}

impl Event {
    pub fn batch_id(&self) -> Uuid {
        match self {
            Event::BatchStarted { batch_id, .. }
            | Event::StateChanged { batch_id, .. }
            | Event::FetchStarted { batch_id, .. }
            | Event::FetchFinished { batch_id, .. }
            | Event::BatchFinished { batch_id, .. } => *batch_id,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Event::BatchStarted { batch_id, keys, concurrency } => {
                json!({ "type": "batch.started", "batch_id": batch_id.to_string(), "keys": keys, "concurrency": concurrency })
            }
            Event::StateChanged { batch_id, state } => {
                json!({ "type": "batch.state", "batch_id": batch_id.to_string(), "state": state.as_str() })
            }
            Event::FetchStarted { batch_id, key } => {
                json!({ "type": "fetch.started", "batch_id": batch_id.to_string(), "key": key })
            }
            Event::FetchFinished { batch_id, key, outcome, latency_ms } => {
                json!({ "type": "fetch.finished", "batch_id": batch_id.to_string(), "key": key, "outcome": outcome, "latency_ms": latency_ms })
            }
            Event::BatchFinished {
                batch_id,
                status,
                succeeded,
                failed,
                timed_out,
                cancelled,
                peak_in_flight,
                elapsed_ms,
            } => {
                json!({
                    "type": "batch.finished",
                    "batch_id": batch_id.to_string(),
                    "status": status.as_str(),
                    "succeeded": succeeded,
                    "failed": failed,
                    "timed_out": timed_out,
                    "cancelled": cancelled,
                    "peak_in_flight": peak_in_flight,
                    "elapsed_ms": elapsed_ms,
                })
            }
        }
    }
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: Event);
}

pub struct CompositeEventSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl Default for CompositeEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add(&mut self, sink: Arc<dyn EventSink>) {
        self.sinks.push(sink);
    }
}

#[async_trait]
impl EventSink for CompositeEventSink {
    async fn emit(&self, event: Event) {
        for sink in &self.sinks {
            sink.emit(event.clone()).await;
        }
    }
}

/// Writes one JSON object per event to stdout.
pub struct StdoutEventSink;

#[async_trait]
impl EventSink for StdoutEventSink {
    async fn emit(&self, event: Event) {
        println!("{}", serde_json::to_string(&event.to_json()).unwrap_or_default());
    }
}

/// Forwards events to `tracing`: batch-level at info, per-key at debug.
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: Event) {
        match &event {
            Event::BatchStarted { batch_id, keys, concurrency } => {
                tracing::info!(%batch_id, keys, concurrency, "batch started");
            }
            Event::StateChanged { batch_id, state } => {
                tracing::debug!(%batch_id, state = state.as_str(), "batch state changed");
            }
            Event::FetchStarted { batch_id, key } => {
                tracing::debug!(%batch_id, key = %key, "fetch started");
            }
            Event::FetchFinished { batch_id, key, outcome, latency_ms } => {
                tracing::debug!(%batch_id, key = %key, outcome, latency_ms, "fetch finished");
            }
            Event::BatchFinished {
                batch_id,
                status,
                succeeded,
                failed,
                elapsed_ms,
                ..
            } => {
                tracing::info!(
                    %batch_id,
                    status = status.as_str(),
                    succeeded,
                    failed,
                    elapsed_ms,
                    "batch finished"
                );
            }
        }
    }
}

pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: Event) {}
}
