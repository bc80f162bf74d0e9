//! Wire types for the lounge waiting-room backend.
//!
//! The backend exposes two surfaces and this crate models both:
//!
//! - REST request/response bodies (JSON, snake_case field names owned by the
//!   server contract).
//! - Push-channel events: named events delivered on per-identity private
//!   channels and one shared broadcast channel for queue membership changes.
//!
//! Push events arrive as `(channel, event name, JSON payload)` triples. The
//! [`PushEvent`] enum decodes them at the transport boundary into a closed
//! set of typed variants; unknown event names decode to "ignored" rather
//! than an error, so a server-side addition never breaks a deployed client.
//!
//! # Invariants
//!
//! - Each [`PushEvent`] variant is valid on exactly one channel category;
//!   decoding checks the pairing and ignores mismatches.
//! - Decoding never panics. A known event name with a malformed payload is
//!   the only input that produces an error.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod auth;
mod channel;
mod event;
mod examination;
mod queue;

pub use auth::{AuthResponse, Authorisation, LoginRequest, Role, UserDto};
pub use channel::Channel;
pub use event::{
    DecodeError, Party, PickupEvent, PushEnvelope, PushEvent, QueueBroadcast, event_names,
};
pub use examination::{ExamStatus, ExaminationDetail};
pub use queue::{
    CompleteRequest, JoinQueueRequest, PickupRequest, QueueActionData, QueueActionResponse,
    QueueItem, QueueVisitor, WaitingList, WaitingListResponse,
};
