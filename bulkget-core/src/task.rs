use std::time::Duration;

/// One key to fetch, with the limits that apply to that single fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFetchTask {
    key: String,
    timeout: Duration,
    delay: Option<Duration>,
}

impl KeyFetchTask {
    pub fn new(key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            key: key.into(),
            timeout,
            delay: None,
        }
    }

    /// Artificial delay applied before the request is issued. Counts against `timeout`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn delay(&self) -> Option<Duration> {
        self.delay
    }
}
