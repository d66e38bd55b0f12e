use crate::backends::{ChatMessage, ChatRequest, CompletionBackend};
use crate::config::ModelConfig;
use crate::prompt::{build_summary_prompt, SUMMARY_SYSTEM_PROMPT};
use scout_core::ScoutResult;
use std::sync::Arc;
use tracing::info;

/// Returned when the model produced no text.
pub const EMPTY_SUMMARY: &str = "Unable to generate summary";

const SUMMARY_TEMPERATURE: f32 = 0.3;
const SUMMARY_MAX_TOKENS: u32 = 300;

/// Produces short summaries of research conversations with one
/// non-streaming completion.
pub struct Summarizer {
    backend: Arc<dyn CompletionBackend>,
    config: Arc<ModelConfig>,
}

impl Summarizer {
    /// Summarizer over `backend`, using the summary model from `config`.
    pub fn new(backend: Arc<dyn CompletionBackend>, config: Arc<ModelConfig>) -> Self {
        Self { backend, config }
    }

    /// The completion request sent for `conversation`.
    pub fn request(&self, conversation: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.summary_model_id.clone(),
            messages: vec![
                ChatMessage::system(SUMMARY_SYSTEM_PROMPT),
                ChatMessage::user(build_summary_prompt(conversation)),
            ],
            temperature: SUMMARY_TEMPERATURE,
            max_tokens: SUMMARY_MAX_TOKENS,
        }
    }

    /// Summarizes `conversation`; an empty reply becomes [`EMPTY_SUMMARY`].
    pub async fn summarize(&self, conversation: &str) -> ScoutResult<String> {
        let summary = self.backend.complete(&self.request(conversation)).await?;
        let summary = summary.trim();
        info!(chars = summary.len(), "Conversation summarized");
        if summary.is_empty() {
            Ok(EMPTY_SUMMARY.to_string())
        } else {
            Ok(summary.to_string())
        }
    }
}
