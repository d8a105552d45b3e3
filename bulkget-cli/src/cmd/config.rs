use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bulkget_core::{FetchOptions, KeyValueClient};
use bulkget_exec::executor::{
    EventSink, MetricsCollector, MetricsEventSink, NoOpEventSink, StdoutEventSink,
    TracingEventSink,
};
use bulkget_exec::retry::RetryConfig;
use bulkget_exec::{HttpClient, RetryingClient};
use bulkget_store::PostgresClient;

use crate::output::print_error;
use crate::utils::{parse_key_millis, redact_url_password};
use crate::{
    ConcurrencyArgs, EventsArgs, EventsKind, KeysArgs, OutputArgs, RetryArgs, SourceArgs,
    SourceKind, StoreArgs,
};

pub fn get_database_url(store: &StoreArgs, output: &OutputArgs) -> Option<String> {
    let url = store
        .store
        .clone()
        .or_else(|| std::env::var("BULKGET_DATABASE_URL").ok())
        .or_else(|| std::env::var("DATABASE_URL").ok());
    if url.is_none() {
        print_error(output.format, output.quiet,
            "missing database URL. Set --store <url>, BULKGET_DATABASE_URL, or DATABASE_URL environment variable");
    }
    url
}

pub async fn connect_store(store: &StoreArgs, output: &OutputArgs) -> Option<PostgresClient> {
    let database_url = get_database_url(store, output)?;
    match PostgresClient::connect(&database_url, store.max_connections).await {
        Ok(c) => Some(c),
        Err(e) => {
            let safe_url = redact_url_password(&database_url);
            print_error(output.format, output.quiet, &format!("database connection failed to {safe_url}: {e}"));
            None
        }
    }
}

/// Keys from positional arguments, then the keys file, then the generated range.
pub fn load_keys(args: &KeysArgs) -> Result<Vec<String>, String> {
    let mut keys = args.keys.clone();
    if let Some(path) = &args.keys_file {
        keys.extend(read_keys_file(path)?);
    }
    if let (Some(prefix), Some(count)) = (&args.prefix, args.count) {
        keys.extend((0..count).map(|i| format!("{prefix}_{i}")));
    }
    Ok(keys)
}

fn read_keys_file(path: &Path) -> Result<Vec<String>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read keys file {}: {e}", path.display()))?;
    if let Ok(v) = serde_json::from_str::<Vec<String>>(&content) {
        return Ok(v);
    }
    if let Ok(v) = serde_yaml::from_str::<Vec<String>>(&content) {
        return Ok(v);
    }
    Err(format!("keys file {} is neither a JSON nor a YAML list of strings", path.display()))
}

pub fn build_fetch_options(args: &ConcurrencyArgs) -> Result<FetchOptions, String> {
    let mut options = FetchOptions {
        concurrency: args.concurrency,
        per_task_timeout: Duration::from_millis(args.timeout_ms),
        overall_deadline: Duration::from_millis(args.deadline_ms),
        ..Default::default()
    };
    for s in &args.delays {
        let (key, d) = parse_key_millis(s)?;
        options.delays.insert(key, d);
    }
    for s in &args.key_timeouts {
        let (key, d) = parse_key_millis(s)?;
        options.timeout_overrides.insert(key, d);
    }
    Ok(options)
}

pub fn build_retry_config(args: &RetryArgs) -> RetryConfig {
    RetryConfig {
        max_attempts: args.retry_max_attempts.max(1),
        base_delay: Duration::from_millis(args.retry_base_delay),
        max_delay: Duration::from_millis(args.retry_max_delay),
        ..Default::default()
    }
}

/// Builds the client for `--source`. Errors are already printed when `None` is returned.
pub async fn build_client(
    source: &SourceArgs,
    retry: &RetryArgs,
    output: &OutputArgs,
) -> Option<Arc<dyn KeyValueClient>> {
    let retry = build_retry_config(retry);
    match source.source {
        SourceKind::Memory => {
            // An empty store: every key reports not found. Useful for dry runs.
            Some(Arc::new(bulkget_exec::MemoryClient::new()))
        }
        SourceKind::Http => {
            let Some(base) = &source.base_url else {
                print_error(output.format, output.quiet, "--base-url is required with --source http");
                return None;
            };
            let url = match url::Url::parse(base) {
                Ok(u) => u,
                Err(e) => {
                    print_error(output.format, output.quiet, &format!("invalid base url {base}: {e}"));
                    return None;
                }
            };
            match HttpClient::new(url) {
                Ok(c) => Some(Arc::new(RetryingClient::new(c, retry))),
                Err(e) => {
                    print_error(output.format, output.quiet, &e.to_string());
                    None
                }
            }
        }
        SourceKind::Postgres => {
            let pg = connect_store(&source.store, output).await?;
            Some(Arc::new(RetryingClient::new(pg, retry)))
        }
    }
}

pub fn build_event_sink(events: &EventsArgs) -> (Arc<dyn EventSink>, Option<Arc<MetricsCollector>>) {
    let base: Arc<dyn EventSink> = match events.events {
        EventsKind::None => Arc::new(NoOpEventSink),
        EventsKind::Stdout => Arc::new(StdoutEventSink),
        EventsKind::Log => Arc::new(TracingEventSink),
    };
    if !events.metrics {
        return (base, None);
    }
    let collector = Arc::new(MetricsCollector::new());
    let sink = Arc::new(MetricsEventSink::new(collector.clone(), base));
    (sink, Some(collector))
}
