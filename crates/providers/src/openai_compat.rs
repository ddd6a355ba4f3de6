//! OpenAI-compatible adapter.
//!
//! Works with OpenAI, Ollama, vLLM, LM Studio, Together, and any other
//! endpoint that follows the OpenAI chat completions contract.

use serde_json::Value;

use docent_domain::config::LlmConfig;
use docent_domain::error::{Error, Result};

use crate::traits::{ChatMessage, ChatRequest, ChatResponse, LlmProvider};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An LLM provider adapter for any OpenAI-compatible API endpoint.
pub struct OpenAiCompatProvider {
    base_url: String,
    api_key: Option<String>,
    default_model: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new provider from the deserialized config. The API key is
    /// resolved from the configured environment variable at startup; an
    /// unset variable means unauthenticated requests (local backends).
    pub fn new(cfg: &LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: std::env::var(&cfg.api_key_env).ok(),
            default_model: cfg.model.clone(),
            client,
        })
    }

    // ── Internal: build the JSON body ─────────────────────────────

    fn build_chat_body(&self, req: &ChatRequest) -> Value {
        let messages: Vec<Value> = req.messages.iter().map(msg_to_openai).collect();

        let model = req
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone());

        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
            "stream": false,
        });

        if let Some(temp) = req.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        if let Some(max) = req.max_tokens {
            body["max_tokens"] = serde_json::json!(max);
        }
        body
    }
}

fn msg_to_openai(msg: &ChatMessage) -> Value {
    serde_json::json!({
        "role": msg.role.as_str(),
        "content": msg.content,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LlmProvider impl
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_chat_body(&req);

        let mut rb = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");
        if let Some(ref key) = self.api_key {
            rb = rb.header("Authorization", format!("Bearer {key}"));
        }

        let resp = rb.json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(format!("chat completions: {e}"))
            } else {
                Error::Http(format!("chat completions: {e}"))
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(Error::Backend {
                name: "llm".into(),
                message: format!("chat completions HTTP {status}: {body_text}"),
            });
        }

        let json: Value = resp.json().await.map_err(|e| Error::Backend {
            name: "llm".into(),
            message: format!("malformed chat response: {e}"),
        })?;

        let choice = json
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|a| a.first())
            .ok_or_else(|| Error::Backend {
                name: "llm".into(),
                message: "response has no choices".into(),
            })?;

        let content = choice
            .pointer("/message/content")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let model = json
            .get("model")
            .and_then(|v| v.as_str())
            .unwrap_or(&self.default_model)
            .to_string();

        let finish_reason = choice
            .get("finish_reason")
            .and_then(|v| v.as_str())
            .map(str::to_owned);

        Ok(ChatResponse {
            content,
            model,
            finish_reason,
        })
    }

    fn provider_id(&self) -> &str {
        "openai_compat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_carries_model_and_messages() {
        let cfg = LlmConfig::default();
        let provider = OpenAiCompatProvider::new(&cfg).unwrap();

        let req = ChatRequest {
            messages: vec![ChatMessage::system("be brief"), ChatMessage::user("hi")],
            temperature: Some(0.3),
            max_tokens: Some(600),
            model: None,
        };
        let body = provider.build_chat_body(&req);

        assert_eq!(body["model"], cfg.model.as_str());
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["max_tokens"], 600);
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn explicit_model_overrides_default() {
        let provider = OpenAiCompatProvider::new(&LlmConfig::default()).unwrap();
        let req = ChatRequest {
            model: Some("other-model".into()),
            ..ChatRequest::default()
        };
        assert_eq!(provider.build_chat_body(&req)["model"], "other-model");
    }
}
