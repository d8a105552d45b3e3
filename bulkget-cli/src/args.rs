use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct StoreArgs {
    /// Postgres URL. Falls back to BULKGET_DATABASE_URL, then DATABASE_URL.
    #[arg(long)]
    pub store: Option<String>,
    #[arg(long, default_value_t = 10)]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    Memory,
    Http,
    Postgres,
}

#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    #[arg(long, value_enum, default_value_t = SourceKind::Postgres)]
    pub source: SourceKind,
    /// Base URL for `--source http`; documents are read from `{base-url}/{key}`.
    #[arg(long)]
    pub base_url: Option<String>,
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Debug, Args, Clone)]
pub struct KeysArgs {
    pub keys: Vec<String>,
    /// JSON or YAML file holding a list of keys.
    #[arg(long)]
    pub keys_file: Option<PathBuf>,
    /// Generate keys `{prefix}_0 .. {prefix}_{count-1}`.
    #[arg(long, requires = "count")]
    pub prefix: Option<String>,
    #[arg(long, requires = "prefix")]
    pub count: Option<usize>,
}

#[derive(Debug, Args, Clone)]
pub struct ConcurrencyArgs {
    #[arg(long, default_value_t = 10)]
    pub concurrency: usize,
    /// Per-key timeout in milliseconds.
    #[arg(long, default_value_t = 5000)]
    pub timeout_ms: u64,
    /// Overall deadline in milliseconds.
    #[arg(long, default_value_t = 30000)]
    pub deadline_ms: u64,
    #[arg(long = "delay", value_name = "KEY=MS")]
    pub delays: Vec<String>,
    #[arg(long = "key-timeout", value_name = "KEY=MS")]
    pub key_timeouts: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct RetryArgs {
    /// Attempts per key for connection failures, including the first one.
    #[arg(long, default_value_t = 3)]
    pub retry_max_attempts: usize,
    #[arg(long, default_value_t = 100)]
    pub retry_base_delay: u64,
    #[arg(long, default_value_t = 2000)]
    pub retry_max_delay: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EventsKind {
    None,
    Stdout,
    Log,
}

#[derive(Debug, Args, Clone)]
pub struct EventsArgs {
    #[arg(long, value_enum, default_value_t = EventsKind::Log)]
    pub events: EventsKind,
    /// Include batch metrics in the output.
    #[arg(long)]
    pub metrics: bool,
}
