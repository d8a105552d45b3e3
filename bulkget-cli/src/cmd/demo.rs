use std::sync::Arc;
use std::time::Duration;

use bulkget_core::FetchOptions;
use bulkget_exec::{BulkFetchPipeline, MemoryClient};
use serde_json::json;

use crate::exit_codes;
use crate::output::{print_error, print_report};
use crate::{EventsArgs, OutputArgs};

use super::config::build_event_sink;

const KEY_PREFIX: &str = "bulkget_example";

#[allow(clippy::too_many_arguments)]
pub async fn demo_cmd(
    count: usize,
    slow_key: usize,
    slow_ms: u64,
    concurrency: usize,
    timeout_ms: u64,
    deadline_ms: u64,
    events: EventsArgs,
    output: OutputArgs,
) -> i32 {
    let keys: Vec<String> = (0..count).map(|i| format!("{KEY_PREFIX}_{i}")).collect();

    // Seeding finishes before the batch starts.
    let client = MemoryClient::new();
    for key in &keys {
        client.upsert(key.clone(), json!({ "item": "A bulk get test value" })).await;
    }

    let mut options = FetchOptions {
        concurrency,
        per_task_timeout: Duration::from_millis(timeout_ms),
        overall_deadline: Duration::from_millis(deadline_ms),
        ..Default::default()
    };
    if let Some(key) = keys.get(slow_key) {
        options.delays.insert(key.clone(), Duration::from_millis(slow_ms));
    }

    let (sink, metrics) = build_event_sink(&events);
    let pipeline = BulkFetchPipeline::new(Arc::new(client), options).with_event_sink(sink);
    let report = match pipeline.bulk_fetch(&keys).await {
        Ok(r) => r,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::CONFIG_ERROR;
        }
    };

    let metrics = match metrics {
        Some(m) => Some(m.get_metrics().await.to_json()),
        None => None,
    };
    print_report(output.format, output.quiet, &report, metrics);

    if report.all_succeeded() {
        exit_codes::SUCCESS
    } else {
        exit_codes::KEYS_FAILED
    }
}
