mod client;
mod documents;
mod migrate;

pub use client::PostgresClient;
pub use documents::DocumentRow;
pub use migrate::run_migrations;
