//! REST implementation of [`SearchBackend`].
//!
//! `RestSearchClient` wraps a `reqwest::Client` and translates the trait
//! into HTTP calls against the search backend, with automatic retry +
//! exponential back-off on transient (5xx / timeout) failures.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use uuid::Uuid;

use docent_domain::config::RetrievalConfig;
use docent_domain::error::{Error, Result};
use docent_domain::trace::TraceEvent;

use crate::backend::SearchBackend;
use crate::types::{SearchRequest, SearchResponse};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A REST-based client for the similarity-search backend.
///
/// Created once and reused for the lifetime of the process; the
/// underlying `reqwest::Client` maintains a connection pool.
#[derive(Debug, Clone)]
pub struct RestSearchClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    max_retries: u32,
}

impl RestSearchClient {
    /// Build a new client from the shared retrieval config. The API key
    /// is resolved from the configured environment variable at startup.
    pub fn new(cfg: &RetrievalConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            api_key: std::env::var(&cfg.api_key_env).ok(),
            max_retries: cfg.max_retries,
        })
    }

    // ── request helpers ──────────────────────────────────────────────

    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        let trace_id = Uuid::new_v4().to_string();
        let mut rb = rb
            .header("X-Client-Type", "docent")
            .header("X-Trace-Id", &trace_id);
        if let Some(ref key) = self.api_key {
            rb = rb.header("X-Api-Key", key);
        }
        rb
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ── retry engine ─────────────────────────────────────────────────

    /// Execute a request with retry + exponential back-off on transient
    /// errors.
    ///
    /// * Retries on 5xx status codes and on timeouts.
    /// * Does **not** retry on 4xx (client errors are permanent).
    /// * Emits a `TraceEvent::SearchCall` after every attempt.
    async fn execute_with_retry(
        &self,
        endpoint: &str,
        build_request: impl Fn() -> RequestBuilder,
    ) -> Result<Response> {
        let mut last_err: Option<Error> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(100 * 2u64.pow(attempt - 1));
                tokio::time::sleep(backoff).await;
            }

            let start = Instant::now();
            let rb = self.decorate(build_request());
            let result = rb.send().await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    TraceEvent::SearchCall {
                        endpoint: endpoint.to_owned(),
                        status,
                        duration_ms,
                    }
                    .emit();

                    if resp.status().is_server_error() {
                        // 5xx — transient, retry
                        let body = resp.text().await.unwrap_or_default();
                        last_err = Some(Error::Backend {
                            name: "search".into(),
                            message: format!("{endpoint} returned {status}: {body}"),
                        });
                        continue;
                    }

                    if resp.status().is_client_error() {
                        // 4xx — permanent, do NOT retry
                        let body = resp.text().await.unwrap_or_default();
                        return Err(Error::Backend {
                            name: "search".into(),
                            message: format!("{endpoint} returned {status}: {body}"),
                        });
                    }

                    return Ok(resp);
                }
                Err(e) if e.is_timeout() => {
                    TraceEvent::SearchCall {
                        endpoint: endpoint.to_owned(),
                        status: 0,
                        duration_ms,
                    }
                    .emit();
                    last_err = Some(Error::Timeout(format!("{endpoint}: {e}")));
                    continue;
                }
                Err(e) => {
                    TraceEvent::SearchCall {
                        endpoint: endpoint.to_owned(),
                        status: 0,
                        duration_ms,
                    }
                    .emit();
                    // Connection-level failures are worth one more attempt.
                    last_err = Some(Error::Http(format!("{endpoint}: {e}")));
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| Error::Http(format!("{endpoint}: exhausted retries"))))
    }
}

#[async_trait]
impl SearchBackend for RestSearchClient {
    async fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
        let url = self.url("/api/search");
        let resp = self
            .execute_with_retry("/api/search", || self.http.post(&url).json(&req))
            .await?;

        resp.json::<SearchResponse>()
            .await
            .map_err(|e| Error::Backend {
                name: "search".into(),
                message: format!("malformed search response: {e}"),
            })
    }
}
