use std::time::Duration;

use async_trait::async_trait;

/// A document as returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub value: serde_json::Value,
    /// Store-assigned version (CAS, ETag, revision counter), if the store exposes one.
    pub revision: Option<String>,
}

impl Document {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value, revision: None }
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("document not found")]
    NotFound,
    #[error("timeout")]
    Timeout,
    #[error("connection error: {0}")]
    Connection(String),
    #[error("client error: {0}")]
    Other(String),
}

/// Read access to a remote key-value store.
///
/// Implementations own connection handling and any retry policy; the pipeline
/// issues exactly one `get` per key and bounds it with its own timeout as well.
#[async_trait]
pub trait KeyValueClient: Send + Sync {
    async fn get(&self, key: &str, timeout: Duration) -> Result<Document, ClientError>;
}
