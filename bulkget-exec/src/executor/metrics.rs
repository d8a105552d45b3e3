use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bulkget_core::BatchStatus;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::executor::{Event, EventSink};

#[derive(Debug, Clone, Default)]
pub struct BatchMetrics {
    pub batch_id: Option<Uuid>,
    pub status: Option<BatchStatus>,
    pub keys_total: usize,
    pub concurrency: usize,
    pub requests: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub cancelled: usize,
    pub peak_in_flight: usize,
    pub total_duration: Option<Duration>,
}

impl BatchMetrics {
    pub fn start(&mut self, batch_id: Uuid, keys: usize, concurrency: usize) {
        *self = Self {
            batch_id: Some(batch_id),
            keys_total: keys,
            concurrency,
            ..Default::default()
        };
    }

    pub fn record_request(&mut self) {
        self.requests += 1;
    }

    pub fn record_outcome(&mut self, outcome: &str) {
        match outcome {
            "success" => self.succeeded += 1,
            "timeout" => self.timed_out += 1,
            "cancelled" => self.cancelled += 1,
            _ => self.failed += 1,
        }
    }

    pub fn finish(&mut self, status: BatchStatus, cancelled: usize, peak_in_flight: usize, elapsed: Duration) {
        self.status = Some(status);
        self.cancelled = cancelled;
        self.peak_in_flight = peak_in_flight;
        self.total_duration = Some(elapsed);
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "batch_id": self.batch_id.map(|id| id.to_string()),
            "status": self.status.map(|s| s.as_str()),
            "duration_ms": self.total_duration.map(|d| d.as_millis() as u64),
            "keys": self.keys_total,
            "concurrency": {
                "limit": self.concurrency,
                "peak": self.peak_in_flight,
            },
            "requests": self.requests,
            "outcomes": {
                "succeeded": self.succeeded,
                "failed": self.failed,
                "timed_out": self.timed_out,
                "cancelled": self.cancelled,
            },
        })
    }
}

#[derive(Default)]
pub struct MetricsCollector {
    metrics: Arc<Mutex<BatchMetrics>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_metrics(&self) -> BatchMetrics {
        self.metrics.lock().await.clone()
    }
}

/// Updates a [`MetricsCollector`] from the event stream, then forwards each event.
pub struct MetricsEventSink {
    collector: Arc<MetricsCollector>,
    base: Arc<dyn EventSink>,
}

impl MetricsEventSink {
    pub fn new(collector: Arc<MetricsCollector>, base: Arc<dyn EventSink>) -> Self {
        Self { collector, base }
    }
}

#[async_trait]
impl EventSink for MetricsEventSink {
    async fn emit(&self, event: Event) {
        {
            let mut m = self.collector.metrics.lock().await;
            match &event {
                Event::BatchStarted { batch_id, keys, concurrency } => {
                    m.start(*batch_id, *keys, *concurrency);
                }
                Event::FetchStarted { .. } => m.record_request(),
                Event::FetchFinished { outcome, .. } => m.record_outcome(outcome),
                Event::BatchFinished {
                    status,
                    cancelled,
                    peak_in_flight,
                    elapsed_ms,
                    ..
                } => {
                    m.finish(*status, *cancelled, *peak_in_flight, Duration::from_millis(*elapsed_ms));
                }
                Event::StateChanged { .. } => {}
            }
        }

        self.base.emit(event).await;
    }
}
