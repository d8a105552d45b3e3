use std::path::Path;

use serde::Serialize;

use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{OutputArgs, StoreArgs};

use super::config::connect_store;

#[derive(Serialize)]
struct SeedResult {
    upserted: usize,
    first_key: Option<String>,
    last_key: Option<String>,
    total_documents: Option<i64>,
}

pub async fn seed_cmd(
    prefix: &str,
    count: usize,
    content: Option<&str>,
    content_file: Option<&Path>,
    store: StoreArgs,
    output: OutputArgs,
) -> i32 {
    let raw = match (content, content_file) {
        (Some(c), _) => c.to_string(),
        (None, Some(path)) => match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                print_error(output.format, output.quiet, &format!("failed to read {}: {e}", path.display()));
                return exit_codes::CONFIG_ERROR;
            }
        },
        (None, None) => r#"{"item":"A bulk get test value"}"#.to_string(),
    };
    let value: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            print_error(output.format, output.quiet, &format!("document content is not valid JSON: {e}"));
            return exit_codes::CONFIG_ERROR;
        }
    };

    let Some(pg) = connect_store(&store, &output).await else {
        return exit_codes::RUNTIME_ERROR;
    };

    let docs: Vec<(String, serde_json::Value)> = (0..count)
        .map(|i| (format!("{prefix}_{i}"), value.clone()))
        .collect();
    if let Err(e) = pg.upsert_many(&docs).await {
        print_error(output.format, output.quiet, &format!("seed failed: {e}"));
        return exit_codes::RUNTIME_ERROR;
    }
    let total_documents = match pg.count().await {
        Ok(n) => Some(n),
        Err(e) => {
            tracing::warn!(error = %e, "failed to count documents after seeding");
            None
        }
    };

    let result = SeedResult {
        upserted: docs.len(),
        first_key: docs.first().map(|(k, _)| k.clone()),
        last_key: docs.last().map(|(k, _)| k.clone()),
        total_documents,
    };
    if output.format == OutputFormat::Text && !output.quiet {
        println!("ok: upserted {} documents under {prefix}_*", result.upserted);
    } else {
        print_result(output.format, output.quiet, &result);
    }
    exit_codes::SUCCESS
}
