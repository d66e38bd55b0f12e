//! Research sessions: the persisted history of a user's questions and the
//! answers (with sources) they received.

/// Session renderings.
pub mod export;
/// The session model.
pub mod session;
/// Session persistence.
pub mod store;

pub use export::ExportFormat;
pub use session::{generate_title, BookmarkedMessage, Session, DEFAULT_TITLE};
pub use store::{FileSessionStore, SessionEdit, SessionStore};
