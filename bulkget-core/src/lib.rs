#![forbid(unsafe_code)]

//! Data model for bulk key fetches: tasks, per-key outcomes, the final report,
//! pipeline options, and the client capability the pipeline consumes.

pub mod client;
pub mod error;
pub mod options;
pub mod outcome;
pub mod report;
pub mod task;

mod serde_duration;

pub use crate::client::{ClientError, Document, KeyValueClient};
pub use crate::error::ConfigError;
pub use crate::options::FetchOptions;
pub use crate::outcome::{FailureKind, FetchMetadata, FetchOutcome};
pub use crate::report::{BatchStatus, BulkReport, ReportBuilder};
pub use crate::task::KeyFetchTask;
