//! Machine input events.
//!
//! Events originate from three distinct sources:
//! - User intents (join, exit, pick up, complete).
//! - Results of REST calls the runtime executed for a previous action.
//! - Push events decoded at the transport boundary.
//!
//! The machines never learn which source an update came from beyond what
//! the variant itself says; transitions commute so arrival order between a
//! REST completion and the matching push event does not matter.

use lounge_core::ApiError;
use lounge_proto::{ExaminationDetail, PushEvent, QueueItem, WaitingList};

/// Events processed by the visitor machine.
#[derive(Debug, Clone)]
pub enum VisitorEvent {
    /// User asked to join the queue.
    JoinRequested {
        /// Caller-supplied external identifier for the visit.
        external_id: String,
        /// Reason for the visit; requiredness depends on [`crate::JoinPolicy`].
        reason: Option<String>,
    },

    /// The join call succeeded.
    JoinAccepted,

    /// The join call was rejected or failed.
    JoinRejected(ApiError),

    /// User asked to leave the queue.
    ExitRequested,

    /// The exit call succeeded.
    ExitConfirmed,

    /// The exit call was rejected or failed.
    ExitRejected(ApiError),

    /// User asked to end the running examination.
    CompleteRequested,

    /// The completion call succeeded.
    CompleteConfirmed,

    /// The completion call was rejected or failed.
    CompleteRejected(ApiError),

    /// `GET /queue/item` snapshot arrived; `None` means not queued (404).
    QueueItemLoaded(Option<QueueItem>),

    /// `GET /examination` snapshot arrived; `None` means no examination
    /// (404).
    ExaminationLoaded(Option<ExaminationDetail>),

    /// A status poll failed for a reason other than 404.
    StatusLoadFailed(ApiError),

    /// Decoded push event.
    Push(PushEvent),

    /// User dismissed the current notice.
    NoticeDismissed,
}

/// Events processed by the provider machine.
#[derive(Debug, Clone)]
pub enum ProviderEvent {
    /// User (or mount) asked for a full refresh.
    RefreshRequested,

    /// `GET /queue/list` snapshot arrived.
    QueueLoaded(WaitingList),

    /// `GET /queue/list` failed.
    QueueLoadFailed(ApiError),

    /// `GET /examination` snapshot arrived; `None` means no examination
    /// (404).
    ExaminationLoaded(Option<ExaminationDetail>),

    /// User asked to pick a visitor up.
    PickupRequested {
        /// Visitor to pull out of the queue.
        visitor_id: u64,
    },

    /// The pickup call succeeded.
    PickupAccepted {
        /// The visitor that was picked up.
        visitor_id: u64,
    },

    /// The pickup call was rejected or failed (another provider may have
    /// claimed the visitor first).
    PickupRejected(ApiError),

    /// User asked to complete the running examination.
    CompleteRequested {
        /// Visitor whose examination is being completed.
        visitor_id: u64,
    },

    /// The completion call succeeded.
    CompleteConfirmed,

    /// The completion call was rejected or failed.
    CompleteRejected(ApiError),

    /// Decoded push event.
    Push(PushEvent),

    /// User dismissed the current notice.
    NoticeDismissed,
}
