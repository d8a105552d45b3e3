use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounds the number of requests in flight. Waiters are served in FIFO order.
#[derive(Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    limit: usize,
    gauge: Arc<Gauge>,
}

#[derive(Default)]
struct Gauge {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl ConcurrencyLimiter {
    /// `limit` must be at least 1; options validation rejects 0 before a limiter is built.
    /// Limits above `Semaphore::MAX_PERMITS` are clamped to it.
    pub fn new(limit: usize) -> Self {
        let limit = limit.min(Semaphore::MAX_PERMITS);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
            gauge: Arc::new(Gauge::default()),
        }
    }

    pub async fn acquire(&self) -> FetchPermit {
        // The semaphore is owned here and never closed, so acquire cannot fail.
        let permit = self.semaphore.clone().acquire_owned().await.unwrap_or_else(|_| {
            panic!("concurrency semaphore closed unexpectedly. This is a bug - please report it.");
        });
        let now = self.gauge.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.gauge.peak.fetch_max(now, Ordering::SeqCst);
        FetchPermit {
            _permit: permit,
            gauge: self.gauge.clone(),
        }
    }

    /// Returns a slot. Equivalent to dropping the permit.
    pub fn release(&self, permit: FetchPermit) {
        drop(permit);
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn in_flight(&self) -> usize {
        self.gauge.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of permits held at the same time since creation.
    pub fn peak_in_flight(&self) -> usize {
        self.gauge.peak.load(Ordering::SeqCst)
    }
}

/// One unit of concurrency budget. The slot is returned when the permit is dropped.
pub struct FetchPermit {
    _permit: OwnedSemaphorePermit,
    gauge: Arc<Gauge>,
}

impl Drop for FetchPermit {
    fn drop(&mut self) {
        self.gauge.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
