//! Hosted chat-completion model abstraction.

use async_trait::async_trait;

use crate::upstream::UpstreamError;

pub mod openai;

pub use openai::OpenAiChat;

/// One single-turn prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    /// Role instructions.
    pub system: String,
    /// The question, including any document text.
    pub user: String,
    /// Upper bound on the reply length in tokens.
    pub max_tokens: u32,
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send one prompt and return the text of the first choice.
    async fn complete(&self, prompt: Prompt) -> Result<String, UpstreamError>;
}
