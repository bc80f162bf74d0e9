//! Session store with pluggable durable storage.
//!
//! Holds the authenticated identity and bearer token, persists both so a
//! reload does not lose the session, and clears both on logout regardless
//! of whether the server-side invalidation succeeded.
//!
//! Every mutation bumps a monotonic [`SessionGeneration`]. Asynchronous
//! work captures the generation when it starts and checks it before
//! applying results, so a completion that raced a logout (or a new login)
//! is discarded instead of mutating state that no longer belongs to it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Identity;

/// Opaque bearer credential.
///
/// `Debug` is redacted so tokens never leak into logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token for the `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(..)")
    }
}

/// Persisted session snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// The authenticated account.
    pub identity: Identity,
    /// Issued bearer token.
    pub token: AuthToken,
}

/// Durable storage failure.
#[derive(Debug, Error)]
#[error("session storage failure: {message}")]
pub struct StorageError {
    /// Backend description of the failure.
    pub message: String,
}

impl StorageError {
    /// Build from any backend description.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Durable client storage for the session snapshot.
///
/// Implementations back this with whatever the platform offers (browser
/// local storage, a file, a keychain). The store treats failures as
/// non-fatal: it logs and carries on with its in-memory view.
pub trait SessionStorage {
    /// Persist the snapshot, replacing any previous one.
    fn save(&mut self, record: &SessionRecord) -> Result<(), StorageError>;

    /// Load the previously persisted snapshot, if any.
    fn load(&self) -> Result<Option<SessionRecord>, StorageError>;

    /// Remove any persisted snapshot.
    fn clear(&mut self) -> Result<(), StorageError>;
}

/// In-memory storage, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    record: Option<SessionRecord>,
}

impl MemorySessionStorage {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with a snapshot, as if a previous session had
    /// persisted one.
    pub fn seeded(record: SessionRecord) -> Self {
        Self { record: Some(record) }
    }
}

impl SessionStorage for MemorySessionStorage {
    fn save(&mut self, record: &SessionRecord) -> Result<(), StorageError> {
        self.record = Some(record.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<SessionRecord>, StorageError> {
        Ok(self.record.clone())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.record = None;
        Ok(())
    }
}

/// Monotonic stamp of the session's lifetime.
///
/// Two generations compare equal only if no login or logout happened
/// between taking them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionGeneration(u64);

/// The session store.
///
/// Owns the current session, mirrors it into durable storage, and stamps
/// every change with a new generation.
#[derive(Debug)]
pub struct SessionStore<S: SessionStorage> {
    storage: S,
    session: Option<SessionRecord>,
    generation: u64,
}

impl<S: SessionStorage> SessionStore<S> {
    /// Create a store, restoring any snapshot the storage still holds so a
    /// reload does not lose the session.
    pub fn restore(storage: S) -> Self {
        let session = match storage.load() {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(error = %err, "failed to restore persisted session");
                None
            },
        };
        Self { storage, session, generation: 0 }
    }

    /// Install a freshly authenticated session and persist it.
    pub fn establish(&mut self, identity: Identity, token: AuthToken) {
        let record = SessionRecord { identity, token };
        if let Err(err) = self.storage.save(&record) {
            tracing::warn!(error = %err, "failed to persist session");
        }
        self.session = Some(record);
        self.generation += 1;
    }

    /// Drop the session locally and from storage.
    ///
    /// Runs unconditionally: server-side invalidation outcome does not
    /// matter here, the local session is gone either way.
    pub fn clear(&mut self) {
        if let Err(err) = self.storage.clear() {
            tracing::warn!(error = %err, "failed to clear persisted session");
        }
        self.session = None;
        self.generation += 1;
    }

    /// The authenticated identity, if any.
    pub fn current(&self) -> Option<&Identity> {
        self.session.as_ref().map(|record| &record.identity)
    }

    /// The bearer token, if authenticated.
    pub fn token(&self) -> Option<&AuthToken> {
        self.session.as_ref().map(|record| &record.token)
    }

    /// Current generation stamp.
    pub fn generation(&self) -> SessionGeneration {
        SessionGeneration(self.generation)
    }

    /// Whether the persisted view still exists in storage.
    pub fn persisted(&self) -> bool {
        matches!(self.storage.load(), Ok(Some(_)))
    }
}
