//! REST implementation of [`Notifier`].

use async_trait::async_trait;

use docent_domain::config::NotifyConfig;
use docent_domain::error::{Error, Result};

use crate::traits::{Notifier, NotifyRequest};

/// Client for the operator-notification service.
#[derive(Debug, Clone)]
pub struct RestNotifyClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestNotifyClient {
    pub fn new(cfg: &NotifyConfig, timeout_ms: u64) -> Result<Self> {
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
impl Notifier for RestNotifyClient {
    async fn notify(&self, req: NotifyRequest) -> Result<String> {
        let url = format!("{}/api/notify", self.base_url);

        let mut rb = self.http.post(&url).json(&req);
        if let Some(ref key) = self.api_key {
            rb = rb.header("X-Api-Key", key);
        }

        let resp = rb.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(format!("notify: {e}"))
            } else {
                Error::Http(format!("notify: {e}"))
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Backend {
                name: "notify".into(),
                message: format!("HTTP {status}: {body}"),
            });
        }

        Ok("operator notified".into())
    }
}
