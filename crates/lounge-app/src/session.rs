//! Session lifecycle: login, logout, forced teardown.

use lounge_core::{
    ApiError, AuthToken, Identity, SessionGeneration, SessionResolution, SessionStorage,
    SessionStore,
};
use lounge_proto::LoginRequest;

use crate::RestClient;

/// Drives the session store through the REST auth endpoints.
///
/// Owns the store; the REST driver is borrowed per call so the manager can
/// exist before any transport does (the login screen needs it first).
#[derive(Debug)]
pub struct SessionManager<S: SessionStorage> {
    store: SessionStore<S>,
}

impl<S: SessionStorage> SessionManager<S> {
    /// Create a manager, restoring any persisted session.
    pub fn new(storage: S) -> Self {
        Self { store: SessionStore::restore(storage) }
    }

    /// Authenticate and establish a session.
    ///
    /// On success the identity and token are persisted before returning,
    /// so a reload right after login still finds the session.
    pub async fn login<R: RestClient>(
        &mut self,
        rest: &R,
        credentials: LoginRequest,
    ) -> Result<Identity, ApiError> {
        let response = rest.login(&credentials).await?;
        let identity = Identity::from(response.user);
        let token = AuthToken::new(response.authorisation.token);
        self.store.establish(identity.clone(), token);
        tracing::debug!(role = %identity.role, "session established");
        Ok(identity)
    }

    /// End the session.
    ///
    /// Server-side invalidation is best effort: the local session is
    /// cleared even when the call fails, and the failure is still
    /// reported.
    pub async fn logout<R: RestClient>(&mut self, rest: &R) -> Result<(), ApiError> {
        let result = match self.store.token().cloned() {
            Some(token) => rest.logout(&token).await,
            None => Ok(()),
        };
        self.store.clear();
        if let Err(err) = &result {
            tracing::warn!(error = %err, "server-side logout failed; local session cleared");
        }
        result
    }

    /// Tear the session down locally without a server call.
    ///
    /// Invoked when any authenticated call answers 401: the server already
    /// considers the session dead.
    pub fn force_logout(&mut self) {
        tracing::warn!("session expired server-side, clearing local session");
        self.store.clear();
    }

    /// The authenticated identity, if any.
    pub fn current(&self) -> Option<&Identity> {
        self.store.current()
    }

    /// The bearer token, if authenticated.
    pub fn token(&self) -> Option<&AuthToken> {
        self.store.token()
    }

    /// Current generation stamp of the store.
    pub fn generation(&self) -> SessionGeneration {
        self.store.generation()
    }

    /// Resolution for the route guard. The store restores synchronously,
    /// so a constructed manager is always resolved.
    pub fn resolution(&self) -> SessionResolution {
        SessionResolution::Resolved(self.store.current().cloned())
    }
}
