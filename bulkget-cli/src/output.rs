use bulkget_core::{BulkReport, FetchOutcome};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn print_result<T: Serialize>(format: OutputFormat, quiet: bool, result: &T) {
    if quiet {
        return;
    }
    match format {
        OutputFormat::Text => {
            if let Ok(json) = serde_json::to_string_pretty(result) {
                println!("{json}");
            }
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string(result) {
                println!("{json}");
            }
        }
    }
}

pub fn print_error(format: OutputFormat, quiet: bool, message: &str) {
    if quiet {
        return;
    }
    match format {
        OutputFormat::Text => eprintln!("error: {message}"),
        OutputFormat::Json => {
            let err = serde_json::json!({"error": message});
            eprintln!("{}", serde_json::to_string(&err).unwrap_or_default());
        }
    }
}

/// Prints the report: one line per key in completion order plus a summary in
/// text mode, the serialized report in JSON mode.
pub fn print_report(
    format: OutputFormat,
    quiet: bool,
    report: &BulkReport,
    metrics: Option<serde_json::Value>,
) {
    if quiet {
        return;
    }
    match format {
        OutputFormat::Json => {
            let mut v = serde_json::to_value(report).unwrap_or_default();
            if let (Some(obj), Some(m)) = (v.as_object_mut(), metrics) {
                obj.insert("metrics".to_string(), m);
            }
            println!("{}", serde_json::to_string(&v).unwrap_or_default());
        }
        OutputFormat::Text => {
            for outcome in report.outcomes() {
                println!("{}", outcome_line(outcome));
            }
            println!(
                "{}: {} succeeded, {} failed ({} timed out, {} cancelled) in {}ms",
                report.status().as_str(),
                report.succeeded_count(),
                report.failed_count(),
                report.timed_out_count(),
                report.cancelled_count(),
                report.elapsed().as_millis()
            );
            if !report.duplicate_keys().is_empty() {
                println!("duplicate keys collapsed: {}", report.duplicate_keys().join(", "));
            }
            if let Some(m) = metrics {
                if let Ok(json) = serde_json::to_string_pretty(&m) {
                    println!("{json}");
                }
            }
        }
    }
}

fn outcome_line(outcome: &FetchOutcome) -> String {
    match outcome {
        FetchOutcome::Success { key, value, metadata } => format!(
            "found {key} rev={} ({}ms): {value}",
            metadata.revision.as_deref().unwrap_or("-"),
            metadata.latency.as_millis()
        ),
        FetchOutcome::Failure { key, kind, message } => {
            format!("failed {key} [{}]: {message}", kind.as_str())
        }
        FetchOutcome::Timeout { key } => format!("timeout {key}"),
        FetchOutcome::Cancelled { key } => format!("cancelled {key}"),
    }
}
