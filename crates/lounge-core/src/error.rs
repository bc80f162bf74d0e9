//! Error taxonomy for the lounge client.
//!
//! Strongly-typed errors shared by every layer. The taxonomy mirrors how
//! errors must be handled, not where they come from: authentication
//! failures tear the session down, queue rejections become dismissible
//! notices with state unchanged, network failures mean the action was not
//! applied and is safe to retry, and a 404 on a status poll means "absent",
//! never an error.
//!
//! We avoid `std::io::Error` and stringly-typed status matching in the rest
//! of the workspace; classification happens once, here.

use thiserror::Error;

/// Errors produced by REST and push operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Bad credentials or expired session. The only error kind that forces
    /// a global session teardown.
    #[error("authentication failed: {message}")]
    Auth {
        /// Server-side or adapter-side description.
        message: String,
    },

    /// Client-side precondition failure; the request was never sent.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Offending input field.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// Server-rejected queue action (double pickup, exit while not queued,
    /// join while already queued). Local state stays in its prior state.
    #[error("queue action rejected: {message}")]
    Queue {
        /// Server-side rejection message.
        message: String,
    },

    /// Transport failure. The action is considered not applied.
    #[error("network failure: {message}")]
    Network {
        /// Underlying transport description.
        message: String,
    },

    /// 404 on a status poll: the resource is absent, which is a normal
    /// answer, not a failure.
    #[error("resource absent")]
    NotFound,

    /// The server answered with a body we could not decode.
    #[error("protocol error: {message}")]
    Protocol {
        /// What failed to decode.
        message: String,
    },
}

impl ApiError {
    /// Classify an HTTP status into the taxonomy.
    ///
    /// `message` is the server-provided description, used verbatim where
    /// one fits.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 419 => Self::Auth { message },
            404 => Self::NotFound,
            400..=499 => Self::Queue { message },
            _ => Self::Network { message },
        }
    }

    /// Whether this error must force a session teardown.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Whether this error means "absent" rather than "failed".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Whether retrying the same action may succeed.
    ///
    /// Only transport failures qualify; a rejection will repeat until the
    /// underlying state changes, and an auth failure requires a new login.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol { message: err.to_string() }
    }
}
