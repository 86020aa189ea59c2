//! Session store trait definition.

use crate::codec::{SessionValue, empty_session};
use crate::error::{SessionError, SessionResult};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tabula_log::warn;

/// Boundary between the web framework's session layer and storage.
///
/// The session layer generates identifiers and carries them in cookies;
/// the store only maps an identifier to a [`SessionValue`].
///
/// # Examples
///
/// ```ignore
/// use tabula_session::{SessionStore, SessionResult};
/// use serde_json::json;
///
/// async fn example(store: &impl SessionStore) -> SessionResult<()> {
///     store.save("4f1c", &json!({"user_id": 42})).await?;
///
///     let session = store.load("4f1c").await?;
///     assert_eq!(session["user_id"], 42);
///
///     store.destroy("4f1c").await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a session.
    ///
    /// Returns the empty session when no row exists or the row holds no
    /// data. Decode failures are returned to the caller; see
    /// [`load_or_empty`](Self::load_or_empty) for the lenient variant.
    async fn load(&self, session_id: &str) -> SessionResult<SessionValue>;

    /// Save a session, inserting or updating its row.
    ///
    /// A null value is stored as SQL `NULL` without encoding.
    async fn save(&self, session_id: &str, value: &SessionValue) -> SessionResult<()>;

    /// Delete a session. Deleting an unknown identifier succeeds.
    async fn destroy(&self, session_id: &str) -> SessionResult<()>;

    /// Check whether a row exists for the identifier.
    async fn exists(&self, session_id: &str) -> SessionResult<bool>;

    /// Number of stored sessions.
    async fn count(&self) -> SessionResult<usize>;

    /// Delete every stored session.
    ///
    /// **Warning:** This will invalidate all user sessions.
    async fn clear(&self) -> SessionResult<()>;

    // ========== Convenience Methods ==========

    /// Load a session, treating undecodable data as an empty session.
    ///
    /// Storage errors still propagate.
    async fn load_or_empty(&self, session_id: &str) -> SessionResult<SessionValue> {
        match self.load(session_id).await {
            Err(e) if e.is_decode_error() => {
                warn!("Discarding undecodable session {}: {}", session_id, e);
                Ok(empty_session())
            }
            other => other,
        }
    }

    /// Read one key of an object-shaped session.
    async fn get_value<T: DeserializeOwned + Send>(
        &self,
        session_id: &str,
        key: &str,
    ) -> SessionResult<Option<T>> {
        let session = self.load(session_id).await?;
        Ok(session
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok()))
    }

    /// Set one key, turning a non-object session into an object.
    async fn set_value<T: Serialize + Send + Sync>(
        &self,
        session_id: &str,
        key: &str,
        value: T,
    ) -> SessionResult<()> {
        let json_value =
            serde_json::to_value(&value).map_err(|e| SessionError::Encode(e.to_string()))?;
        let mut session = self.load(session_id).await?;
        if !session.is_object() {
            session = empty_session();
        }
        if let Some(map) = session.as_object_mut() {
            map.insert(key.to_string(), json_value);
        }
        self.save(session_id, &session).await
    }

    /// Remove one key; saves only when the key was present.
    async fn remove_value(&self, session_id: &str, key: &str) -> SessionResult<()> {
        let mut session = self.load(session_id).await?;
        let removed = session
            .as_object_mut()
            .and_then(|map| map.remove(key))
            .is_some();
        if removed {
            self.save(session_id, &session).await?;
        }
        Ok(())
    }
}
