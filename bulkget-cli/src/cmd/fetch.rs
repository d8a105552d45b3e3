use bulkget_exec::BulkFetchPipeline;

use crate::exit_codes;
use crate::output::{print_error, print_report};
use crate::{ConcurrencyArgs, EventsArgs, KeysArgs, OutputArgs, RetryArgs, SourceArgs};

use super::config::{build_client, build_event_sink, build_fetch_options, load_keys};

pub async fn fetch_cmd(
    keys: KeysArgs,
    source: SourceArgs,
    concurrency: ConcurrencyArgs,
    retry: RetryArgs,
    events: EventsArgs,
    output: OutputArgs,
) -> i32 {
    let keys = match load_keys(&keys) {
        Ok(k) => k,
        Err(e) => {
            print_error(output.format, output.quiet, &e);
            return exit_codes::CONFIG_ERROR;
        }
    };
    if keys.is_empty() {
        print_error(output.format, output.quiet, "no keys given (pass keys, --keys-file, or --prefix/--count)");
        return exit_codes::CONFIG_ERROR;
    }

    let options = match build_fetch_options(&concurrency) {
        Ok(o) => o,
        Err(e) => {
            print_error(output.format, output.quiet, &e);
            return exit_codes::CONFIG_ERROR;
        }
    };
    // Reject bad options before connecting to anything.
    if let Err(e) = options.validate() {
        print_error(output.format, output.quiet, &e.to_string());
        return exit_codes::CONFIG_ERROR;
    }

    tracing::info!(keys = keys.len(), source = ?source.source, concurrency = options.concurrency, "starting fetch");
    let Some(client) = build_client(&source, &retry, &output).await else {
        return exit_codes::RUNTIME_ERROR;
    };
    let (sink, metrics) = build_event_sink(&events);

    let pipeline = BulkFetchPipeline::new(client, options).with_event_sink(sink);
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
