//! The retriever adapter: backend hits in, clean context chunks out.
//!
//! Applies the similarity floor and top-k cap, orders by descending
//! similarity, and degrades to empty context on any backend failure or
//! timeout. Retrieval is never fatal to a turn.

use std::sync::Arc;
use std::time::Duration;

use docent_domain::config::RetrievalConfig;
use docent_domain::state::Chunk;
use docent_domain::trace::TraceEvent;

use crate::backend::SearchBackend;
use crate::types::SearchRequest;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Retriever
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct Retriever {
    backend: Arc<dyn SearchBackend>,
    top_k: usize,
    min_similarity: f32,
    timeout: Duration,
}

impl Retriever {
    pub fn new(backend: Arc<dyn SearchBackend>, cfg: &RetrievalConfig) -> Self {
        Self {
            backend,
            top_k: cfg.top_k,
            min_similarity: cfg.min_similarity,
            timeout: Duration::from_millis(cfg.timeout_ms),
        }
    }

    /// Retrieve supporting context for a query.
    ///
    /// Returns at most `top_k` chunks, each with similarity within
    /// `[min_similarity, 1.0]`, sorted descending. Any failure — backend
    /// error, malformed hit, overall timeout — yields `[]`.
    pub async fn retrieve(&self, query: &str) -> Vec<Chunk> {
        let req = SearchRequest {
            query: query.to_owned(),
            limit: Some(self.top_k as u32),
            threshold: self.min_similarity,
        };

        let response = match tokio::time::timeout(self.timeout, self.backend.search(req)).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => {
                TraceEvent::SearchDegraded {
                    reason: e.to_string(),
                }
                .emit();
                return Vec::new();
            }
            Err(_) => {
                TraceEvent::SearchDegraded {
                    reason: format!("retrieval exceeded {}ms", self.timeout.as_millis()),
                }
                .emit();
                return Vec::new();
            }
        };

        let mut chunks: Vec<Chunk> = response
            .results
            .into_iter()
            .filter_map(|hit| {
                let similarity = hit.similarity.unwrap_or(0.0) as f32;
                let chunk = Chunk::validated(
                    hit.source_id.unwrap_or_default(),
                    hit.section.unwrap_or_default(),
                    hit.content,
                    similarity,
                );
                if chunk.is_none() {
                    tracing::warn!(similarity, "dropping hit with out-of-range similarity");
                }
                chunk
            })
            .filter(|c| c.similarity >= self.min_similarity)
            .collect();

        // total_cmp: NaN already rejected by Chunk::validated.
        chunks.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        chunks.truncate(self.top_k);
        chunks
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
