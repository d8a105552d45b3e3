use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::outcome::FetchOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Every key resolved before the deadline.
    Completed,
    /// The deadline passed; unresolved keys were reported as cancelled.
    Cancelled,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Completed => "completed",
            BatchStatus::Cancelled => "cancelled",
        }
    }
}

/// Result of one bulk fetch. Holds exactly one outcome per requested key, in
/// the order the outcomes were recorded.
#[derive(Debug, Clone, Serialize)]
pub struct BulkReport {
    batch_id: Uuid,
    status: BatchStatus,
    succeeded_count: usize,
    failed_count: usize,
    timed_out_count: usize,
    cancelled_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    duplicate_keys: Vec<String>,
    #[serde(rename = "elapsed_ms", serialize_with = "crate::serde_duration::as_millis")]
    elapsed: Duration,
    outcomes: Vec<FetchOutcome>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl BulkReport {
    pub fn batch_id(&self) -> Uuid {
        self.batch_id
    }

    pub fn status(&self) -> BatchStatus {
        self.status
    }

    /// Outcomes in completion order.
    pub fn outcomes(&self) -> &[FetchOutcome] {
        &self.outcomes
    }

    pub fn get(&self, key: &str) -> Option<&FetchOutcome> {
        self.index.get(key).map(|&i| &self.outcomes[i])
    }

    /// Position of `key` in completion order.
    pub fn completion_rank(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded_count(&self) -> usize {
        self.succeeded_count
    }

    /// Every outcome that is not a success: failures, timeouts and cancellations.
    pub fn failed_count(&self) -> usize {
        self.failed_count
    }

    pub fn timed_out_count(&self) -> usize {
        self.timed_out_count
    }

    pub fn cancelled_count(&self) -> usize {
        self.cancelled_count
    }

    /// Keys that were requested more than once and collapsed to one outcome.
    pub fn duplicate_keys(&self) -> &[String] {
        &self.duplicate_keys
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed_count == 0
    }
}

/// Incrementally builds a [`BulkReport`]. Only the first outcome per key is kept.
#[derive(Debug)]
pub struct ReportBuilder {
    report: BulkReport,
}

impl ReportBuilder {
    pub fn new(batch_id: Uuid) -> Self {
        Self {
            report: BulkReport {
                batch_id,
                status: BatchStatus::Completed,
                succeeded_count: 0,
                failed_count: 0,
                timed_out_count: 0,
                cancelled_count: 0,
                duplicate_keys: Vec::new(),
                elapsed: Duration::ZERO,
                outcomes: Vec::new(),
                index: HashMap::new(),
            },
        }
    }

    pub fn with_duplicate_keys(mut self, keys: Vec<String>) -> Self {
        self.report.duplicate_keys = keys;
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.report.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.report.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.report.outcomes.is_empty()
    }

    /// Records `outcome`. Returns false, and drops it, if its key already has one.
    pub fn record(&mut self, outcome: FetchOutcome) -> bool {
        if self.contains(outcome.key()) {
            return false;
        }
        let r = &mut self.report;
        match &outcome {
            FetchOutcome::Success { .. } => r.succeeded_count += 1,
            FetchOutcome::Failure { .. } => r.failed_count += 1,
            FetchOutcome::Timeout { .. } => {
                r.failed_count += 1;
                r.timed_out_count += 1;
            }
            FetchOutcome::Cancelled { .. } => {
                r.failed_count += 1;
                r.cancelled_count += 1;
            }
        }
        r.index.insert(outcome.key().to_string(), r.outcomes.len());
        r.outcomes.push(outcome);
        true
    }

    pub fn finish(mut self, status: BatchStatus, elapsed: Duration) -> BulkReport {
        self.report.status = status;
        self.report.elapsed = elapsed;
        self.report
    }
}
