//! Hosted chat-completion model configuration.

use serde::Deserialize;

use super::defaults::{
    default_abstract_max_chars, default_ai_base_url, default_ai_model, default_ai_timeout_secs,
    default_max_prompt_chars, default_summary_max_chars, default_temperature,
};

/// Chat-completion model used by PDF analysis.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// OpenAI-compatible API root (default: https://api.openai.com/v1).
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,
    /// Bearer key. Overridden by `OPENAI_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model name (default: gpt-4o-mini).
    #[serde(default = "default_ai_model")]
    pub model: String,
    /// Sampling temperature (default: 0.3).
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds (default: 60).
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,
    /// Characters of extracted text sent to the model (default: 8000).
    #[serde(default = "default_max_prompt_chars")]
    pub max_prompt_chars: usize,
    /// Characters kept of the model's abstract (default: 1000).
    #[serde(default = "default_abstract_max_chars")]
    pub abstract_max_chars: usize,
    /// Characters of the abstract kept as the summary (default: 200).
    #[serde(default = "default_summary_max_chars")]
    pub summary_max_chars: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: default_ai_base_url(),
            api_key: None,
            model: default_ai_model(),
            temperature: default_temperature(),
            timeout_secs: default_ai_timeout_secs(),
            max_prompt_chars: default_max_prompt_chars(),
            abstract_max_chars: default_abstract_max_chars(),
            summary_max_chars: default_summary_max_chars(),
        }
    }
}
