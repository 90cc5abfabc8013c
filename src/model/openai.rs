//! OpenAI-compatible `/chat/completions` client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{ChatModel, Prompt};
use crate::config::AiConfig;
use crate::upstream::{UpstreamError, build_client, expect_success};

const SERVICE: &str = "model";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat model reached over an OpenAI-compatible API.
pub struct OpenAiChat {
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    http: reqwest::Client,
}

impl OpenAiChat {
    /// Create a client for the configured model.
    pub fn new(config: &AiConfig) -> Self {
        info!(model = %config.model, base_url = %config.base_url, "Chat model initialized");
        Self {
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            http: build_client(Duration::from_secs(config.timeout_secs)),
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, prompt: Prompt) -> Result<String, UpstreamError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(UpstreamError::NotConfigured {
                service: SERVICE,
                detail: "ai.api_key is not set",
            });
        };

        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.temperature,
            max_tokens: prompt.max_tokens,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(UpstreamError::transport(SERVICE))
            .inspect_err(|_| crate::metrics::record_upstream_failure(SERVICE))?;
        let response = expect_success(SERVICE, response).await?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(UpstreamError::decode(SERVICE))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| UpstreamError::Decode {
                service: SERVICE,
                detail: "response has no message content".into(),
            })?;

        debug!(chars = content.len(), "Chat completion received");
        Ok(content)
    }
}
