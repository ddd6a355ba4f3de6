//! The `SearchBackend` trait defines the interface to the vector
//! similarity-search collaborator (REST, or a test double).

use async_trait::async_trait;
use docent_domain::error::Result;

use crate::types::{SearchRequest, SearchResponse};

/// Abstraction over the similarity-search API surface.
///
/// Absence of results is a valid, non-error response; implementations
/// raise errors only for transport and protocol failures.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Semantic search over the subject's knowledge base.
    async fn search(&self, req: SearchRequest) -> Result<SearchResponse>;
}
