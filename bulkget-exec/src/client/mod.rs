mod http;
mod memory;
mod retrying;

pub use http::HttpClient;
pub use memory::MemoryClient;
pub use retrying::RetryingClient;
