use std::time::Duration;

use serde::Serialize;

use crate::client::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    Connection,
    Other,
    /// The fetch task ended without reporting a result.
    Internal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::NotFound => "not_found",
            FailureKind::Connection => "connection",
            FailureKind::Other => "other",
            FailureKind::Internal => "internal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(rename = "latency_ms", serialize_with = "crate::serde_duration::as_millis")]
    pub latency: Duration,
}

/// Terminal result of one key fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    Success {
        key: String,
        value: serde_json::Value,
        metadata: FetchMetadata,
    },
    Failure {
        key: String,
        kind: FailureKind,
        message: String,
    },
    Timeout {
        key: String,
    },
    Cancelled {
        key: String,
    },
}

impl FetchOutcome {
    /// Maps a client error for `key` to its outcome. Client-side timeouts are
    /// reported the same way as timeouts enforced by the pipeline.
    pub fn from_client_error(key: impl Into<String>, err: ClientError) -> Self {
        let key = key.into();
        match err {
            ClientError::Timeout => FetchOutcome::Timeout { key },
            ClientError::NotFound => FetchOutcome::Failure {
                key,
                kind: FailureKind::NotFound,
                message: err.to_string(),
            },
            ClientError::Connection(_) => FetchOutcome::Failure {
                key,
                kind: FailureKind::Connection,
                message: err.to_string(),
            },
            ClientError::Other(_) => FetchOutcome::Failure {
                key,
                kind: FailureKind::Other,
                message: err.to_string(),
            },
        }
    }

    pub fn key(&self) -> &str {
        match self {
            FetchOutcome::Success { key, .. }
            | FetchOutcome::Failure { key, .. }
            | FetchOutcome::Timeout { key }
            | FetchOutcome::Cancelled { key } => key,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            FetchOutcome::Success { .. } => "success",
            FetchOutcome::Failure { .. } => "failure",
            FetchOutcome::Timeout { .. } => "timeout",
            FetchOutcome::Cancelled { .. } => "cancelled",
        }
    }
}
