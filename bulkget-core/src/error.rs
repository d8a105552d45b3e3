use thiserror::Error;

/// Rejected options. Raised before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("no keys to fetch")]
    EmptyKeys,
    #[error("empty key at position {0}")]
    EmptyKey(usize),
    #[error("concurrency must be at least 1 (got {0})")]
    InvalidConcurrency(usize),
    #[error("per-task timeout must be positive")]
    InvalidTimeout,
    #[error("overall deadline must be positive")]
    InvalidDeadline,
    #[error("timeout override for key {0} must be positive")]
    InvalidTimeoutOverride(String),
}
