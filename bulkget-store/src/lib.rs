#![forbid(unsafe_code)]

mod error;
pub mod postgres;

pub use crate::error::StoreError;
pub use crate::postgres::{run_migrations, DocumentRow, PostgresClient};
