//! Orchestration layer for the lounge waiting-room client.
//!
//! Wires the pure state machines from [`lounge_client`] to injected
//! transport drivers. The drivers are explicit constructor arguments — no
//! process-wide singletons — so tests substitute fakes and the connection
//! lifecycle is an ordinary owned resource.
//!
//! # Components
//!
//! - [`RestClient`] / [`PushClient`]: transport driver traits
//! - [`SessionManager`]: login, logout, forced logout on 401
//! - [`VisitorRuntime`] / [`ProviderRuntime`]: subscription lifecycle,
//!   reconciliation, action execution, state broadcast
//!
//! # Concurrency
//!
//! Everything here is single-threaded and event-loop driven; suspension
//! points are exactly the awaited driver calls. Asynchronous completions
//! are stamped with the session generation they started under and are
//! discarded if a logout (or a new login) happened in between, so nothing
//! mutates state that has been torn down.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod driver;
mod error;
mod provider;
mod session;
mod subscriptions;
mod visitor;

pub use driver::{PushClient, RestClient};
pub use error::RuntimeError;
pub use provider::{ProviderRuntime, ProviderView};
pub use session::SessionManager;
pub use subscriptions::SubscriptionSet;
pub use visitor::{VisitorRuntime, VisitorView};
