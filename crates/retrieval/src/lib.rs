pub mod adapter;
pub mod backend;
pub mod rest;
pub mod types;

// Re-exports for convenience.
pub use adapter::Retriever;
pub use backend::SearchBackend;
pub use rest::RestSearchClient;
pub use types::{SearchHitDto, SearchRequest, SearchResponse};
