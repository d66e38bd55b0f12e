use chrono::{DateTime, Utc};
use scout_core::{Message, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title of a session that has no user turn yet.
pub const DEFAULT_TITLE: &str = "New Research Session";

const TITLE_MAX_CHARS: usize = 50;

/// One research conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Stable identifier; also the file name.
    pub id: Uuid,
    /// Display title.
    #[serde(default = "default_title")]
    pub title: String,
    /// Turns, oldest first.
    pub messages: Vec<Message>,
    /// User-assigned tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

impl Session {
    /// Empty, untitled session with a fresh id.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    /// Empty, untitled session with the given id.
    pub fn with_id(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: default_title(),
            messages: Vec::new(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Appends one message.
    pub fn add_message(&mut self, message: Message) {
        self.updated_at = Utc::now();
        self.messages.push(message);
    }

    /// Appends a question and its answer. An untitled session takes its
    /// title from the first user turn.
    pub fn add_exchange(&mut self, question: Message, answer: Message) {
        self.add_message(question);
        self.add_message(answer);
        if self.title == DEFAULT_TITLE {
            self.title = generate_title(&self.messages);
        }
    }

    /// Number of stored messages.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// User and assistant turns, oldest first.
    pub fn conversation(&self) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(|m| matches!(m.role, Role::User | Role::Assistant))
    }

    /// Adds `tag` unless already present. Returns whether it was added.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        if self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Returns whether the tag was present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    /// Whether the session carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Flips the bookmark on one message and returns its new value, or
    /// `None` if the session has no such message.
    pub fn toggle_bookmark(&mut self, message_id: Uuid) -> Option<bool> {
        let message = self.messages.iter_mut().find(|m| m.id == message_id)?;
        message.bookmarked = !message.bookmarked;
        Some(message.bookmarked)
    }

    /// Case-insensitive match against the title, tags and message text.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            || self
                .messages
                .iter()
                .any(|m| m.content.to_lowercase().contains(&needle))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Title derived from the first user turn: trimmed, and cut to 47
/// characters plus `...` when longer than 50.
pub fn generate_title(messages: &[Message]) -> String {
    let Some(first) = messages.iter().find(|m| m.role == Role::User) else {
        return default_title();
    };
    let content = first.content.trim();
    if content.chars().count() <= TITLE_MAX_CHARS {
        return content.to_string();
    }
    let head: String = content.chars().take(TITLE_MAX_CHARS - 3).collect();
    format!("{head}...")
}

/// A bookmarked message together with the session it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkedMessage {
    /// Owning session.
    pub session_id: Uuid,
    /// Title of the owning session.
    pub session_title: String,
    /// The bookmarked message.
    pub message: Message,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_title() {
        assert_eq!(generate_title(&[]), DEFAULT_TITLE);
        assert_eq!(generate_title(&[Message::assistant("hi")]), DEFAULT_TITLE);
        assert_eq!(
            generate_title(&[Message::user("  What is Sentient?  ")]),
            "What is Sentient?"
        );

        let exact = "a".repeat(50);
        assert_eq!(generate_title(&[Message::user(exact.clone())]), exact);

        let long = "b".repeat(51);
        let title = generate_title(&[Message::user(long)]);
        assert_eq!(title, format!("{}...", "b".repeat(47)));
        assert_eq!(title.chars().count(), 50);
    }

    #[test]
    fn test_title_counts_characters_not_bytes() {
        let long = "é".repeat(60);
        let title = generate_title(&[Message::user(long)]);
        assert_eq!(title.chars().count(), 50);
    }

    #[test]
    fn test_add_exchange_titles_untitled_session() {
        let mut session = Session::new();
        session.add_exchange(
            Message::user("Compare BTC and ETH"),
            Message::assistant("..."),
        );
        assert_eq!(session.title, "Compare BTC and ETH");
        assert_eq!(session.message_count(), 2);

        session.add_exchange(Message::user("Another question"), Message::assistant("..."));
        assert_eq!(session.title, "Compare BTC and ETH");
    }

    #[test]
    fn test_tags_are_idempotent() {
        let mut session = Session::new();
        assert!(session.add_tag("defi"));
        assert!(!session.add_tag("defi"));
        assert_eq!(session.tags, vec!["defi"]);
        assert!(session.remove_tag("defi"));
        assert!(!session.remove_tag("defi"));
        assert!(!session.has_tag("defi"));
    }

    #[test]
    fn test_toggle_bookmark() {
        let mut session = Session::new();
        let msg = Message::assistant("answer");
        let id = msg.id;
        session.add_message(msg);

        assert_eq!(session.toggle_bookmark(id), Some(true));
        assert_eq!(session.toggle_bookmark(id), Some(false));
        assert_eq!(session.toggle_bookmark(Uuid::new_v4()), None);
    }

    #[test]
    fn test_matches_title_tags_and_content() {
        let mut session = Session::new();
        session.title = "Layer 2 research".into();
        session.add_tag("Rollups");
        session.add_message(Message::assistant("Optimism uses fraud proofs"));

        assert!(session.matches("layer"));
        assert!(session.matches("ROLLUP"));
        assert!(session.matches("fraud proofs"));
        assert!(session.matches(""));
        assert!(!session.matches("zk"));
    }

    #[test]
    fn test_conversation_skips_system_turns() {
        let mut session = Session::new();
        session.add_message(Message::system("note"));
        session.add_message(Message::user("q"));
        assert_eq!(session.conversation().count(), 1);
    }

    #[test]
    fn test_missing_title_and_tags_deserialize() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "messages": [],
            "created_at": Utc::now(),
            "updated_at": Utc::now(),
        });
        let session: Session = serde_json::from_value(json).unwrap();
        assert_eq!(session.title, DEFAULT_TITLE);
        assert!(session.tags.is_empty());
    }
}
