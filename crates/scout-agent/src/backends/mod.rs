/// OpenAI-compatible chat-completions backend.
pub mod openai;

use async_trait::async_trait;
use futures_util::Stream;
use scout_core::{Message, Role, ScoutResult};
use serde::{Deserialize, Serialize};
use std::pin::Pin;

pub use openai::OpenAiBackend;

/// Raw response body of a streaming completion, chunked as the transport delivers it.
pub type ByteStream = Pin<Box<dyn Stream<Item = ScoutResult<Vec<u8>>> + Send>>;

/// One message of a chat-completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who is speaking.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Message with an explicit role.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// System instruction.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// User turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self::new(message.role, message.content.clone())
    }
}

/// A fully shaped chat-completion request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Provider model identifier.
    pub model: String,
    /// Conversation, system prompt first.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// Trait for model provider backends.
///
/// Backends own transport and authentication. They do not interpret the
/// streamed body: [`CompletionBackend::stream`] hands back raw bytes and the
/// relay does the framing.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Non-streaming completion; returns the assistant text.
    async fn complete(&self, request: &ChatRequest) -> ScoutResult<String>;

    /// Streaming completion. Fails before returning if the provider rejects
    /// the request (non-success status, transport error, missing credentials).
    async fn stream(&self, request: &ChatRequest) -> ScoutResult<ByteStream>;
}
