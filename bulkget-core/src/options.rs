use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::ConfigError;
use crate::task::KeyFetchTask;

#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Maximum number of requests in flight at once.
    pub concurrency: usize,
    pub per_task_timeout: Duration,
    /// Hard bound on the whole batch; unresolved keys are cancelled once it passes.
    pub overall_deadline: Duration,
    /// Artificial per-key delays, mostly for testing slow keys.
    pub delays: BTreeMap<String, Duration>,
    /// Per-key replacements for `per_task_timeout`.
    pub timeout_overrides: BTreeMap<String, Duration>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            concurrency: 10,
            per_task_timeout: Duration::from_secs(5),
            overall_deadline: Duration::from_secs(30),
            delays: BTreeMap::new(),
            timeout_overrides: BTreeMap::new(),
        }
    }
}

impl FetchOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(self.concurrency));
        }
        if self.per_task_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.overall_deadline.is_zero() {
            return Err(ConfigError::InvalidDeadline);
        }
        if let Some((key, _)) = self.timeout_overrides.iter().find(|(_, t)| t.is_zero()) {
            return Err(ConfigError::InvalidTimeoutOverride(key.clone()));
        }
        Ok(())
    }

    /// Builds the task for `key`, applying any delay or timeout override.
    pub fn task_for(&self, key: &str) -> KeyFetchTask {
        let timeout = self
            .timeout_overrides
            .get(key)
            .copied()
            .unwrap_or(self.per_task_timeout);
        let task = KeyFetchTask::new(key, timeout);
        match self.delays.get(key) {
            Some(d) => task.with_delay(*d),
            None => task,
        }
    }
}
