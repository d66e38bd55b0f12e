use crate::session::{BookmarkedMessage, Session};
use async_trait::async_trait;
use scout_core::{Message, ScoutError, ScoutResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

/// A change applied to a stored session under the store's write lock.
pub type SessionEdit = Box<dyn FnOnce(&mut Session) + Send>;

/// Persistence for research sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Every stored session, most recently updated first.
    async fn get_all(&self) -> ScoutResult<Vec<Session>>;
    /// One session by id.
    async fn get(&self, id: Uuid) -> ScoutResult<Option<Session>>;
    /// Inserts or replaces. Replacing refreshes `updated_at`.
    async fn save(&self, session: &Session) -> ScoutResult<()>;
    /// Removes one session. Unknown ids are not an error.
    async fn delete(&self, id: Uuid) -> ScoutResult<()>;
    /// Removes every session.
    async fn delete_all(&self) -> ScoutResult<()>;

    /// Atomically applies `edit` to an existing session and stores the
    /// result. `None` if there is no such session.
    async fn update(&self, id: Uuid, edit: SessionEdit) -> ScoutResult<Option<Session>>;

    /// Like [`SessionStore::update`], creating an empty session with this id
    /// first when it does not exist.
    async fn update_or_create(&self, id: Uuid, edit: SessionEdit) -> ScoutResult<Session>;

    /// Records a question and its answer, creating the session if needed.
    async fn append_exchange(
        &self,
        id: Uuid,
        question: Message,
        answer: Message,
    ) -> ScoutResult<Session> {
        let edit = move |s: &mut Session| s.add_exchange(question, answer);
        self.update_or_create(id, Box::new(edit)).await
    }

    /// Adds a tag to an existing session.
    async fn add_tag(&self, id: Uuid, tag: String) -> ScoutResult<Option<Session>> {
        let edit = move |s: &mut Session| {
            s.add_tag(&tag);
        };
        self.update(id, Box::new(edit)).await
    }

    /// Removes a tag from an existing session.
    async fn remove_tag(&self, id: Uuid, tag: String) -> ScoutResult<Option<Session>> {
        let edit = move |s: &mut Session| {
            s.remove_tag(&tag);
        };
        self.update(id, Box::new(edit)).await
    }

    /// Flips the bookmark on one message. `None` if the session does not
    /// exist; an unknown message id leaves the session unchanged.
    async fn toggle_bookmark(&self, id: Uuid, message_id: Uuid) -> ScoutResult<Option<Session>> {
        let edit = move |s: &mut Session| {
            s.toggle_bookmark(message_id);
        };
        self.update(id, Box::new(edit)).await
    }

    /// Every bookmarked message across all sessions.
    async fn bookmarked_messages(&self) -> ScoutResult<Vec<BookmarkedMessage>> {
        let sessions = self.get_all().await?;
        Ok(sessions
            .into_iter()
            .flat_map(|session| {
                let session_id = session.id;
                let session_title = session.title;
                session
                    .messages
                    .into_iter()
                    .filter(|m| m.bookmarked)
                    .map(move |message| BookmarkedMessage {
                        session_id,
                        session_title: session_title.clone(),
                        message,
                    })
            })
            .collect())
    }

    /// Sessions matching a free-text query and, when given, carrying `tag`.
    async fn search(&self, query: Option<&str>, tag: Option<&str>) -> ScoutResult<Vec<Session>> {
        let sessions = self.get_all().await?;
        Ok(sessions
            .into_iter()
            .filter(|s| query.map_or(true, |q| s.matches(q)))
            .filter(|s| tag.map_or(true, |t| s.has_tag(t)))
            .collect())
    }
}

/// Session store backed by one JSON file per session.
///
/// Writers take an async mutex so concurrent read-modify-write cycles do not
/// lose updates. A session file is replaced by renaming a fully written
/// temporary file over it, so readers never observe a partial document.
pub struct FileSessionStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub async fn new(dir: PathBuf) -> ScoutResult<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Directory holding the session files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn session_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn temp_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json.tmp"))
    }

    async fn read(&self, id: Uuid) -> ScoutResult<Option<Session>> {
        let data = match tokio::fs::read_to_string(self.session_path(id)).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let session: Session = serde_json::from_str(&data)
            .map_err(|e| ScoutError::Session(format!("Failed to parse session {id}: {e}")))?;
        Ok(Some(session))
    }

    async fn write(&self, session: &Session) -> ScoutResult<()> {
        let json = serde_json::to_string_pretty(session)?;
        let temp = self.temp_path(session.id);
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, self.session_path(session.id)).await?;
        Ok(())
    }

    async fn ids(&self) -> ScoutResult<Vec<Uuid>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                if let Some(stem) = name.strip_suffix(".json") {
                    if let Ok(id) = Uuid::parse_str(stem) {
                        ids.push(id);
                    }
                }
            }
        }
        Ok(ids)
    }

    async fn apply(&self, mut session: Session, edit: SessionEdit) -> ScoutResult<Session> {
        edit(&mut session);
        session.updated_at = chrono::Utc::now();
        self.write(&session).await?;
        debug!(
            session_id = %session.id,
            messages = session.messages.len(),
            "Session updated"
        );
        Ok(session)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get_all(&self) -> ScoutResult<Vec<Session>> {
        let mut sessions = Vec::new();
        for id in self.ids().await? {
            match self.read(id).await {
                Ok(Some(session)) => sessions.push(session),
                Ok(None) => {}
                Err(e) => warn!(session_id = %id, error = %e, "Skipping unreadable session"),
            }
        }
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }

    async fn get(&self, id: Uuid) -> ScoutResult<Option<Session>> {
        self.read(id).await
    }

    async fn save(&self, session: &Session) -> ScoutResult<()> {
        let _guard = self.write_lock.lock().await;
        if self.session_path(session.id).exists() {
            let mut refreshed = session.clone();
            refreshed.updated_at = chrono::Utc::now();
            self.write(&refreshed).await
        } else {
            self.write(session).await
        }
    }

    async fn delete(&self, id: Uuid) -> ScoutResult<()> {
        let _guard = self.write_lock.lock().await;
        let path = self.session_path(id);
        if path.exists() {
            tokio::fs::remove_file(path).await?;
        }
        Ok(())
    }

    async fn delete_all(&self) -> ScoutResult<()> {
        let _guard = self.write_lock.lock().await;
        for id in self.ids().await? {
            tokio::fs::remove_file(self.session_path(id)).await?;
        }
        Ok(())
    }

    async fn update(&self, id: Uuid, edit: SessionEdit) -> ScoutResult<Option<Session>> {
        let _guard = self.write_lock.lock().await;
        match self.read(id).await? {
            Some(session) => self.apply(session, edit).await.map(Some),
            None => Ok(None),
        }
    }

    async fn update_or_create(&self, id: Uuid, edit: SessionEdit) -> ScoutResult<Session> {
        let _guard = self.write_lock.lock().await;
        let session = self
            .read(id)
            .await?
            .unwrap_or_else(|| Session::with_id(id));
        self.apply(session, edit).await
    }
}
