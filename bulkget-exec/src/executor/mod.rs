pub mod collector;
pub mod concurrency;
pub mod dispatcher;
pub mod events;
pub mod metrics;
mod pipeline;

pub use collector::ResultCollector;
pub use concurrency::{ConcurrencyLimiter, FetchPermit};
pub use dispatcher::{FetchDispatcher, OutcomeStream};
pub use events::{
    CompositeEventSink, Event, EventSink, NoOpEventSink, StdoutEventSink, TracingEventSink,
};
pub use metrics::{BatchMetrics, MetricsCollector, MetricsEventSink};
pub use pipeline::{bulk_fetch, BulkFetchPipeline, PipelineState};
