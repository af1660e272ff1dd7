//! Pluggable session persistence.
//!
//! The HTTP pipeline and the store never touch browser-style ambient storage
//! directly; they go through the [`SessionStore`] capability so tests can
//! substitute an in-memory double. Two implementations are provided:
//! [`MemorySessionStore`] and [`FileSessionStore`].

use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::RwLock;
use roster_types::Session;

use crate::error::{Result, StorageSnafu};

/// Key-value persistence for the authentication session.
///
/// Exactly one session is stored at a time (four logical fields: access
/// token, refresh token, expiry epoch-ms, user id). `store` overwrites any
/// previous session; `clear` removes all four fields.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the persisted session, if any.
    async fn load(&self) -> Result<Option<Session>>;

    /// Persists the session, replacing any previous one.
    async fn store(&self, session: &Session) -> Result<()>;

    /// Removes the persisted session.
    async fn clear(&self) -> Result<()>;
}

/// In-memory session store for tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with a session.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self { inner: RwLock::new(Some(session)) }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<Session>> {
        Ok(self.inner.read().clone())
    }

    async fn store(&self, session: &Session) -> Result<()> {
        *self.inner.write() = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.inner.write() = None;
        Ok(())
    }
}

/// File-backed session store persisting the session as a JSON document.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write never leaves a truncated session behind.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Creates a store persisting to the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<Session>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return StorageSnafu { message: format!("read {}: {e}", self.path.display()) }
                    .fail()
            }
        };
        let session = serde_json::from_slice(&raw).map_err(|e| {
            StorageSnafu { message: format!("parse {}: {e}", self.path.display()) }.build()
        })?;
        Ok(Some(session))
    }

    async fn store(&self, session: &Session) -> Result<()> {
        let raw = serde_json::to_vec_pretty(session)
            .map_err(|e| StorageSnafu { message: format!("encode session: {e}") }.build())?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, &raw).await.map_err(|e| {
            StorageSnafu { message: format!("write {}: {e}", temp.display()) }.build()
        })?;
        tokio::fs::rename(&temp, &self.path).await.map_err(|e| {
            StorageSnafu { message: format!("rename {}: {e}", self.path.display()) }.build()
        })?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                StorageSnafu { message: format!("remove {}: {e}", self.path.display()) }.fail()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use roster_types::UserId;

    use super::*;

    fn session() -> Session {
        Session {
            access_token: "tok".to_owned(),
            refresh_token: "ref".to_owned(),
            expires_at: 42,
            user_id: UserId::new("u1"),
        }
    }

    #[tokio::test]
    async fn test_memory_roundtrip() {
        let store = MemorySessionStore::new();
        assert_eq!(store.load().await.unwrap(), None);

        store.store(&session()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(session()));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));

        assert_eq!(store.load().await.unwrap(), None);
        store.store(&session()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(session()));
    }

    #[tokio::test]
    async fn test_file_persists_exactly_four_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileSessionStore::new(&path);
        store.store(&session()).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        let object = raw.as_object().unwrap();
        assert_eq!(object.len(), 4);
        for key in ["access_token", "refresh_token", "expires_at", "user_id"] {
            assert!(object.contains_key(key), "missing field {key}");
        }
    }

    #[tokio::test]
    async fn test_file_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileSessionStore::new(&path);

        store.store(&session()).await.unwrap();
        store.clear().await.unwrap();
        assert!(!path.exists());
        assert_eq!(store.load().await.unwrap(), None);

        // Clearing an already-empty store is not an error.
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_corrupt_content_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"not json").unwrap();

        let store = FileSessionStore::new(&path);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, crate::error::ClientError::Storage { .. }));
    }
}
