use clap::Parser;
use tracing_subscriber::EnvFilter;

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod output;
mod utils;

pub use args::*;
use commands::Command;

#[derive(Debug, Parser)]
#[command(name = "bulkget", version, about = "Bounded-concurrency bulk key fetcher")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays parseable. RUST_LOG overrides the default.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::RUNTIME_ERROR);
        }
    };

    let exit_code = rt.block_on(run_command(cli.command));
    std::process::exit(exit_code);
}

async fn run_command(command: Command) -> i32 {
    match command {
        Command::Fetch {
            keys,
            source,
            concurrency,
            retry,
            events,
            output,
        } => cmd::fetch::fetch_cmd(keys, source, concurrency, retry, events, output).await,
        Command::Seed {
            prefix,
            count,
            content,
            content_file,
            store,
            output,
        } => {
            cmd::seed::seed_cmd(
                &prefix,
                count,
                content.as_deref(),
                content_file.as_deref(),
                store,
                output,
            )
            .await
        }
        Command::Migrate { store, output } => cmd::migrate::migrate_cmd(store, output).await,
        Command::Demo {
            count,
            slow_key,
            slow_ms,
            concurrency,
            timeout_ms,
            deadline_ms,
            events,
            output,
        } => {
            cmd::demo::demo_cmd(
                count,
                slow_key,
                slow_ms,
                concurrency,
                timeout_ms,
                deadline_ms,
                events,
                output,
            )
            .await
        }
    }
}
