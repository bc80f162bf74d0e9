//! Domain layer for the lounge waiting-room client.
//!
//! Everything here is independent of any transport: the authenticated
//! identity, the error taxonomy every layer speaks, the session store with
//! pluggable durable storage, and the pure route guard.
//!
//! # Components
//!
//! - [`Identity`]: the authenticated account, immutable for a session
//! - [`ApiError`]: error taxonomy shared across the workspace
//! - [`SessionStore`]: persisted identity + token, generation-stamped
//! - [`RouteAccess`]: pure role-gated navigation decisions

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod guard;
mod identity;
mod session;

pub use error::ApiError;
pub use guard::{RouteAccess, SessionResolution};
pub use identity::Identity;
pub use lounge_proto::Role;
pub use session::{
    AuthToken, MemorySessionStorage, SessionGeneration, SessionRecord, SessionStorage,
    SessionStore, StorageError,
};
