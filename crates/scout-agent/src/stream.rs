use scout_core::SourceRef;
use serde::{Deserialize, Serialize};

/// Terminal SSE frame of every response stream.
pub const DONE_FRAME: &str = "data: [DONE]\n\n";

/// Events emitted by the relay while answering one chat request.
///
/// Order on a successful stream is any number of `Content`, at most one
/// `Sources`, then `Done`. `Error` is terminal and replaces whatever would
/// have followed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A chunk of assistant text, forwarded as soon as it arrives.
    Content {
        /// Text to append to the answer.
        content: String,
    },

    /// The retrieval results the answer was grounded on.
    Sources {
        /// One entry per retrieval result, in aggregation order.
        sources: Vec<SourceRef>,
    },

    /// The stream has finished successfully.
    Done,

    /// The request failed; `message` is safe to show to the user.
    Error {
        /// User-facing text.
        message: String,
    },
}

impl StreamEvent {
    /// Content event carrying `content`.
    pub fn content(content: impl Into<String>) -> Self {
        Self::Content {
            content: content.into(),
        }
    }

    /// `Done` and `Error` end the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error { .. })
    }

    /// Renders the event as SSE frames.
    ///
    /// Clients only understand content, sources and the `[DONE]` sentinel, so
    /// an error becomes a content frame carrying the message followed by
    /// `[DONE]`.
    pub fn to_frames(&self) -> Vec<String> {
        match self {
            Self::Content { content } => {
                vec![data_frame(&serde_json::json!({ "content": content }))]
            }
            Self::Sources { sources } => {
                vec![data_frame(&serde_json::json!({ "sources": sources }))]
            }
            Self::Done => vec![DONE_FRAME.to_string()],
            Self::Error { message } => vec![
                data_frame(&serde_json::json!({ "content": message })),
                DONE_FRAME.to_string(),
            ],
        }
    }
}

fn data_frame(value: &serde_json::Value) -> String {
    format!("data: {value}\n\n")
}

/// A response frame as a client reads it back.
#[derive(Debug, Clone, PartialEq)]
pub enum WireFrame {
    /// Assistant text.
    Content(String),
    /// The sources list.
    Sources(Vec<SourceRef>),
    /// The `[DONE]` marker.
    Done,
}

/// Parses a complete response body into frames. Payloads that match no
/// known frame shape are dropped.
pub fn decode_body(body: &str) -> Vec<WireFrame> {
    body.split("\n\n")
        .filter_map(|block| block.trim().strip_prefix("data:"))
        .filter_map(|payload| {
            let payload = payload.trim();
            if payload == "[DONE]" {
                return Some(WireFrame::Done);
            }
            let value: serde_json::Value = serde_json::from_str(payload).ok()?;
            if let Some(content) = value.get("content").and_then(|c| c.as_str()) {
                return Some(WireFrame::Content(content.to_string()));
            }
            let sources = value.get("sources")?.clone();
            serde_json::from_value(sources).ok().map(WireFrame::Sources)
        })
        .collect()
}
