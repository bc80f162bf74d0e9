//! Runtime errors.

use lounge_core::{ApiError, Role};
use thiserror::Error;

/// Errors surfaced by the role runtimes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuntimeError {
    /// No authenticated session in the store.
    #[error("no authenticated session")]
    NotAuthenticated,

    /// The session's role does not match the runtime.
    #[error("session role is {actual}, this screen requires {required}")]
    RoleMismatch {
        /// Role this runtime serves.
        required: Role,
        /// Role the session actually has.
        actual: Role,
    },

    /// A driver call failed in a way the machines do not absorb. A
    /// contained [`ApiError::Auth`] means the session was already torn
    /// down.
    #[error(transparent)]
    Api(#[from] ApiError),
}
