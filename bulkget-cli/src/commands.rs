use clap::Subcommand;
use std::path::PathBuf;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch a batch of keys and print one outcome per key.
    Fetch {
        #[command(flatten)]
        keys: KeysArgs,
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        concurrency: ConcurrencyArgs,
        #[command(flatten)]
        retry: RetryArgs,
        #[command(flatten)]
        events: EventsArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Insert or replace documents in the Postgres store.
    Seed {
        #[arg(long)]
        prefix: String,
        #[arg(long, default_value_t = 10)]
        count: usize,
        /// Document body as JSON.
        #[arg(long, conflicts_with = "content_file")]
        content: Option<String>,
        #[arg(long)]
        content_file: Option<PathBuf>,
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Apply the store's schema migrations.
    Migrate {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Run the ten-key bulk get example against an in-memory store.
    Demo {
        #[arg(long, default_value_t = 10)]
        count: usize,
        /// Index of the key that answers slowly.
        #[arg(long, default_value_t = 3)]
        slow_key: usize,
        /// Artificial delay of the slow key, in milliseconds.
        #[arg(long, default_value_t = 3000)]
        slow_ms: u64,
        #[arg(long, default_value_t = 5)]
        concurrency: usize,
        #[arg(long, default_value_t = 5000)]
        timeout_ms: u64,
        #[arg(long, default_value_t = 10000)]
        deadline_ms: u64,
        #[command(flatten)]
        events: EventsArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}
