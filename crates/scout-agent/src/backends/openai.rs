use super::{ByteStream, ChatRequest, CompletionBackend};
use crate::config::ModelConfig;
use async_trait::async_trait;
use futures_util::StreamExt;
use scout_core::{ScoutError, ScoutResult};
use std::sync::Arc;
use tracing::debug;

/// OpenAI-compatible API backend.
///
/// Works with Fireworks, OpenAI, OpenRouter, Groq, Ollama, and any other
/// provider that implements the OpenAI chat completions API.
pub struct OpenAiBackend {
    config: Arc<ModelConfig>,
    http: reqwest::Client,
}

impl OpenAiBackend {
    /// Backend reading its key, base URL and model settings from `config`.
    pub fn new(config: Arc<ModelConfig>) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn build_body(&self, request: &ChatRequest, stream: bool) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = request
            .messages
            .iter()
            .map(|m| {
                serde_json::json!({
                    "role": m.role.as_str(),
                    "content": m.content,
                })
            })
            .collect();

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });
        if stream {
            body["stream"] = serde_json::json!(true);
        }
        body
    }

    async fn send(&self, body: &serde_json::Value) -> ScoutResult<reqwest::Response> {
        let api_key = self
            .config
            .api_key()
            .ok_or_else(|| ScoutError::Config("Fireworks API key not configured".into()))?;

        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url().trim_end_matches('/')
        );

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| ScoutError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let error_body = resp
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ScoutError::Upstream {
                status: status.as_u16(),
                body: error_body,
            });
        }

        Ok(resp)
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, request: &ChatRequest) -> ScoutResult<String> {
        let body = self.build_body(request, false);
        let resp = self.send(&body).await?;
        let resp_body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ScoutError::Http(e.to_string()))?;

        let content = resp_body["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        debug!(model = %request.model, chars = content.len(), "Completion received");
        Ok(content)
    }

    async fn stream(&self, request: &ChatRequest) -> ScoutResult<ByteStream> {
        let body = self.build_body(request, true);
        let resp = self.send(&body).await?;
        debug!(model = %request.model, "Completion stream opened");

        let bytes = resp.bytes_stream().map(|chunk| {
            chunk
                .map(|b| b.to_vec())
                .map_err(|e| ScoutError::Http(format!("Stream read error: {e}")))
        });
        Ok(Box::pin(bytes))
    }
}
