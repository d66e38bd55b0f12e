//! Completion side of Scout.
//!
//! [`CompletionRelay`] turns one chat request into a stream of
//! [`StreamEvent`]s: it aggregates retrieval results, builds the prompt,
//! opens a streaming completion through a [`CompletionBackend`] and decodes
//! the provider's SSE body incrementally. [`Summarizer`] is the
//! non-streaming sibling used for conversation summaries.

/// Model provider clients.
pub mod backends;
/// Model settings.
pub mod config;
/// System and summary prompts.
pub mod prompt;
/// The streaming completion relay.
pub mod relay;
/// Incremental SSE decoding of provider bodies.
pub mod sse;
/// Client-facing stream events and their wire form.
pub mod stream;
/// Conversation summaries.
pub mod summarize;

pub use backends::{ChatMessage, ChatRequest, CompletionBackend};
pub use config::ModelConfig;
pub use relay::{CompletionRelay, RelayOutcome, RelayRequest, RelayState, APOLOGY};
pub use stream::{StreamEvent, DONE_FRAME};
pub use summarize::{Summarizer, EMPTY_SUMMARY};
