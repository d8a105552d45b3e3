use std::time::Duration;

use async_trait::async_trait;
use bulkget_core::{ClientError, Document, KeyValueClient};
use tokio::time::Instant;

use crate::retry::{decide_retry, RetryConfig, RetryDecision};

/// Retries connection failures of the wrapped client within the caller's timeout.
pub struct RetryingClient<C> {
    inner: C,
    config: RetryConfig,
}

impl<C: KeyValueClient> RetryingClient<C> {
    pub fn new(inner: C, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: KeyValueClient> KeyValueClient for RetryingClient<C> {
    async fn get(&self, key: &str, timeout: Duration) -> Result<Document, ClientError> {
        let deadline = Instant::now() + timeout;
        let mut attempt_no = 1;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ClientError::Timeout);
            }
            let err = match self.inner.get(key, remaining).await {
                Ok(doc) => return Ok(doc),
                Err(e) => e,
            };
            match decide_retry(&self.config, attempt_no, &err, || fastrand::u64(..)) {
                RetryDecision::RetryAfter { delay, .. } => {
                    if Instant::now() + delay >= deadline {
                        return Err(err);
                    }
                    tracing::debug!(key, attempt_no, delay_ms = delay.as_millis() as u64, error = %err, "retrying get");
                    tokio::time::sleep(delay).await;
                    attempt_no += 1;
                }
                RetryDecision::Stop { .. } => return Err(err),
            }
        }
    }
}
