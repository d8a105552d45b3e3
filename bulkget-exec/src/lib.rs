#![forbid(unsafe_code)]

//! Bulk key-fetch pipeline.
//!
//! Keys are dispatched against a [`KeyValueClient`](bulkget_core::KeyValueClient)
//! with a bounded number of requests in flight, and every key's outcome is
//! gathered into a [`BulkReport`](bulkget_core::BulkReport) before the overall
//! deadline.

pub mod client;
pub mod executor;
pub mod retry;

pub use crate::client::{HttpClient, MemoryClient, RetryingClient};
pub use crate::executor::{bulk_fetch, BulkFetchPipeline};
