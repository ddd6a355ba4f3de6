//! REST implementation of [`DocumentDelivery`].

use async_trait::async_trait;

use docent_domain::config::DeliveryConfig;
use docent_domain::error::{Error, Result};

use crate::traits::{DeliveryRequest, DocumentDelivery};

/// Client for the document-delivery service.
#[derive(Debug, Clone)]
pub struct RestDeliveryClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestDeliveryClient {
    pub fn new(cfg: &DeliveryConfig, timeout_ms: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            api_key: std::env::var(&cfg.api_key_env).ok(),
        })
    }
}

#[async_trait]
impl DocumentDelivery for RestDeliveryClient {
    async fn deliver(&self, req: DeliveryRequest) -> Result<String> {
        let url = format!("{}/api/deliveries", self.base_url);

        let mut rb = self.http.post(&url).json(&req);
        if let Some(ref key) = self.api_key {
            rb = rb.header("X-Api-Key", key);
        }

        let resp = rb.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(format!("delivery: {e}"))
            } else {
                Error::Http(format!("delivery: {e}"))
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Backend {
                name: "delivery".into(),
                message: format!("HTTP {status}: {body}"),
            });
        }

        Ok(format!("document {} queued for delivery", req.document_id))
    }
}
