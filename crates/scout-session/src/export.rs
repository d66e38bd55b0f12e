//! Rendering sessions for download and sharing.

use crate::session::Session;
use scout_core::{Role, ScoutError, ScoutResult};
use std::fmt::Write as _;
use std::str::FromStr;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Session export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Markdown transcript with sources.
    #[default]
    Markdown,
    /// Pretty-printed JSON.
    Json,
    /// Plain-text transcript.
    Text,
}

impl ExportFormat {
    /// MIME type for downloads.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Markdown => "text/markdown; charset=utf-8",
            Self::Json => "application/json",
            Self::Text => "text/plain; charset=utf-8",
        }
    }

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Json => "json",
            Self::Text => "txt",
        }
    }

    /// Suggested download name, e.g. `research-session-<id>.md`.
    pub fn file_name(&self, session: &Session) -> String {
        format!("research-session-{}.{}", session.id, self.extension())
    }

    /// Renders `session` in this format.
    pub fn render(&self, session: &Session) -> ScoutResult<String> {
        match self {
            Self::Markdown => Ok(to_markdown(session)),
            Self::Json => to_json(session),
            Self::Text => Ok(to_shareable_text(session)),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            other => Err(ScoutError::Session(format!("Unknown export format: {other}"))),
        }
    }
}

/// The session as pretty-printed JSON.
pub fn to_json(session: &Session) -> ScoutResult<String> {
    Ok(serde_json::to_string_pretty(session)?)
}

/// Markdown transcript with per-answer source lists.
pub fn to_markdown(session: &Session) -> String {
    let mut out = String::new();
    let _ = write!(out, "# {}\n\n", session.title);
    let _ = writeln!(out, "**Created:** {}", session.created_at.format(TIMESTAMP_FORMAT));
    let _ = write!(out, "**Updated:** {}\n\n", session.updated_at.format(TIMESTAMP_FORMAT));
    if !session.tags.is_empty() {
        let _ = write!(out, "**Tags:** {}\n\n", session.tags.join(", "));
    }
    out.push_str("---\n\n");

    for msg in session.conversation() {
        match msg.role {
            Role::User => {
                let _ = write!(out, "## 🙋 User\n\n{}\n\n", msg.content);
            }
            _ => {
                let _ = write!(out, "## 🤖 Scout\n\n{}\n\n", msg.content);
                if !msg.sources.is_empty() {
                    out.push_str("### Sources\n\n");
                    for (i, source) in msg.sources.iter().enumerate() {
                        let _ = writeln!(out, "{}. [{}]({})", i + 1, source.title, source.url);
                        let _ = write!(out, "   > {}\n\n", source.snippet);
                    }
                }
            }
        }
        out.push_str("---\n\n");
    }
    out
}

/// Plain-text Q/A transcript suitable for pasting into a chat or email.
pub fn to_shareable_text(session: &Session) -> String {
    let mut out = format!("{}\n\n", session.title);
    for msg in session.conversation() {
        match msg.role {
            Role::User => {
                let _ = write!(out, "Q: {}\n\n", msg.content);
            }
            _ => {
                let _ = write!(out, "A: {}\n\n", msg.content);
                if !msg.sources.is_empty() {
                    out.push_str("Sources:\n");
                    for source in &msg.sources {
                        let _ = writeln!(out, "- {}: {}", source.title, source.url);
                    }
                    out.push('\n');
                }
            }
        }
    }
    out
}
