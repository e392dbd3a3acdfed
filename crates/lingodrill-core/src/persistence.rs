//! Saving and restoring state through a [`KeyValueStore`].
//!
//! Every blob is wrapped in a versioned envelope. A blob that is missing,
//! malformed, or carries an unknown version reads back as absent.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::session::Session;
use crate::traits::KeyValueStore;

/// Current envelope version.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    data: T,
}

/// The storage key for `name` under `prefix`, e.g. `app_bookmarks`.
pub fn storage_key(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}_{name}")
    }
}

/// Write `value` under `key` inside a versioned envelope.
pub fn save_blob<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let envelope = Envelope {
        version: SCHEMA_VERSION,
        data: value,
    };
    let json = serde_json::to_string(&envelope).map_err(|source| StoreError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &json)
}

/// Read the value under `key`.
///
/// Unreadable content is removed from the store and reported as `None`.
pub fn load_blob<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    match serde_json::from_str::<Envelope<T>>(&raw) {
        Ok(envelope) if envelope.version == SCHEMA_VERSION => Ok(Some(envelope.data)),
        Ok(envelope) => {
            tracing::warn!(
                "discarding '{key}': unsupported version {}",
                envelope.version
            );
            store.remove(key)?;
            Ok(None)
        }
        Err(e) => {
            tracing::warn!("discarding malformed '{key}': {e}");
            store.remove(key)?;
            Ok(None)
        }
    }
}

/// What to do with an unfinished session found at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResumeChoice {
    Resume,
    Restart,
}

/// Checkpoints the one in-flight session.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>, prefix: &str) -> Self {
        Self {
            store,
            key: storage_key(prefix, "learning_session"),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn save(&self, session: &Session) -> Result<(), StoreError> {
        save_blob(self.store.as_ref(), &self.key, session)
    }

    /// The stored session, if there is a readable and consistent one.
    /// An inconsistent session is removed like a malformed blob.
    pub fn load(&self) -> Option<Session> {
        let session = match load_blob::<Session>(self.store.as_ref(), &self.key) {
            Ok(session) => session?,
            Err(e) => {
                tracing::warn!("failed to load session from {}: {e}", self.store.name());
                return None;
            }
        };
        if let Err(e) = session.validate() {
            tracing::warn!("discarding '{}': {e}", self.key);
            if let Err(e) = self.clear() {
                tracing::warn!("failed to clear inconsistent session: {e}");
            }
            return None;
        }
        Some(session)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(&self.key)
    }

    /// A stored session worth offering to resume: present and not completed.
    /// A completed leftover is cleared.
    pub fn resume_candidate(&self) -> Option<Session> {
        let session = self.load()?;
        if session.is_completed() {
            if let Err(e) = self.clear() {
                tracing::warn!("failed to clear finished session: {e}");
            }
            return None;
        }
        Some(session)
    }

    /// Apply the learner's answer to the resume prompt.
    pub fn decide(&self, choice: ResumeChoice) -> Option<Session> {
        match choice {
            ResumeChoice::Resume => self.resume_candidate(),
            ResumeChoice::Restart => {
                if let Err(e) = self.clear() {
                    tracing::warn!("failed to discard stored session: {e}");
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Direction, Question, StudyMode};
    use crate::session::{SessionQuestion, SessionSettings};
    use crate::testing::{word, MapStore};

    fn session(n: usize) -> Session {
        let questions = (0..n)
            .map(|i| {
                SessionQuestion::free_text(Question::Vocabulary(word(
                    &format!("w{i}"),
                    &format!("Wort{i}"),
                    &format!("woord{i}"),
                )))
            })
            .collect();
        let mut session = Session::new(
            StudyMode::Write,
            Direction::NativeToForeign,
            questions,
            SessionSettings::default(),
            Some(60),
        );
        session.start();
        session
    }

    #[test]
    fn key_uses_prefix() {
        assert_eq!(storage_key("dub5", "bookmarks"), "dub5_bookmarks");
        assert_eq!(storage_key("", "bookmarks"), "bookmarks");
    }

    #[test]
    fn save_and_load() {
        let store = Arc::new(MapStore::default());
        let sessions = SessionStore::new(store.clone(), "app");
        let mut s = session(3);
        s.record_answer("Wort0");
        sessions.save(&s).unwrap();

        let raw = store.get("app_learning_session").unwrap().unwrap();
        assert!(raw.starts_with("{\"version\":1"));

        let restored = sessions.load().unwrap();
        assert_eq!(restored, s);
    }

    #[test]
    fn missing_is_none() {
        let sessions = SessionStore::new(Arc::new(MapStore::default()), "app");
        assert!(sessions.load().is_none());
    }

    #[test]
    fn malformed_is_discarded() {
        let store = Arc::new(MapStore::default());
        store.set("app_learning_session", "{not json").unwrap();
        let sessions = SessionStore::new(store.clone(), "app");
        assert!(sessions.load().is_none());
        assert!(store.get("app_learning_session").unwrap().is_none());
    }

    #[test]
    fn unknown_version_is_discarded() {
        let store = Arc::new(MapStore::default());
        store
            .set("app_learning_session", r#"{"version":99,"data":{}}"#)
            .unwrap();
        let sessions = SessionStore::new(store.clone(), "app");
        assert!(sessions.load().is_none());
        assert!(store.get("app_learning_session").unwrap().is_none());
    }

    #[test]
    fn unversioned_blob_is_discarded() {
        let store = Arc::new(MapStore::default());
        store.set("app_learning_session", r#"{"mode":"write"}"#).unwrap();
        let sessions = SessionStore::new(store, "app");
        assert!(sessions.load().is_none());
    }

    #[test]
    fn tampered_position_is_discarded() {
        let store = Arc::new(MapStore::default());
        let sessions = SessionStore::new(store.clone(), "app");
        sessions.save(&session(1)).unwrap();

        let raw = store.get("app_learning_session").unwrap().unwrap();
        assert!(raw.contains("\"current_index\":0"));
        store
            .set(
                "app_learning_session",
                &raw.replace("\"current_index\":0", "\"current_index\":5"),
            )
            .unwrap();

        assert!(sessions.resume_candidate().is_none());
        assert!(store.get("app_learning_session").unwrap().is_none());
    }

    #[test]
    fn completed_session_is_not_a_candidate() {
        let store = Arc::new(MapStore::default());
        let sessions = SessionStore::new(store.clone(), "app");
        let mut s = session(1);
        s.record_answer("Wort0");
        assert!(s.is_completed());
        sessions.save(&s).unwrap();

        assert!(sessions.resume_candidate().is_none());
        assert!(store.get("app_learning_session").unwrap().is_none());
    }

    #[test]
    fn restart_clears() {
        let store = Arc::new(MapStore::default());
        let sessions = SessionStore::new(store.clone(), "app");
        sessions.save(&session(2)).unwrap();

        assert!(sessions.decide(ResumeChoice::Restart).is_none());
        assert!(sessions.load().is_none());
    }

    #[test]
    fn resume_returns_unfinished() {
        let store = Arc::new(MapStore::default());
        let sessions = SessionStore::new(store, "app");
        let s = session(2);
        sessions.save(&s).unwrap();
        assert_eq!(sessions.decide(ResumeChoice::Resume).unwrap().id(), s.id());
    }
}
