use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bulkget_core::{ClientError, Document, KeyValueClient};
use tokio::sync::RwLock;

/// In-process document store with configurable latency and injected errors.
#[derive(Default)]
pub struct MemoryClient {
    docs: RwLock<HashMap<String, Document>>,
    latency: Duration,
    key_latency: HashMap<String, Duration>,
    failures: HashMap<String, ClientError>,
    revision: AtomicU64,
    calls: AtomicUsize,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latency applied to every `get`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Latency applied to `get` for `key`, replacing the default latency.
    pub fn with_key_latency(mut self, key: impl Into<String>, latency: Duration) -> Self {
        self.key_latency.insert(key.into(), latency);
        self
    }

    /// Makes every `get` for `key` fail with `error` (after the key's latency).
    pub fn with_failure(mut self, key: impl Into<String>, error: ClientError) -> Self {
        self.failures.insert(key.into(), error);
        self
    }

    /// Inserts or replaces `key`, returning the new revision.
    pub async fn upsert(&self, key: impl Into<String>, value: serde_json::Value) -> String {
        let revision = (self.revision.fetch_add(1, Ordering::SeqCst) + 1).to_string();
        let doc = Document::new(value).with_revision(revision.clone());
        self.docs.write().await.insert(key.into(), doc);
        revision
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }

    /// Number of `get` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueClient for MemoryClient {
    async fn get(&self, key: &str, timeout: Duration) -> Result<Document, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let latency = self.key_latency.get(key).copied().unwrap_or(self.latency);
        if latency > timeout {
            tokio::time::sleep(timeout).await;
            return Err(ClientError::Timeout);
        }
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if let Some(err) = self.failures.get(key) {
            return Err(err.clone());
        }
        self.docs
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or(ClientError::NotFound)
    }
}
