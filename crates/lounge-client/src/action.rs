//! Machine output actions.
//!
//! Actions are instructions for the runtime: issue this REST call and feed
//! the result back as the matching event. The machines never perform I/O
//! themselves.

/// Actions produced by the visitor machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitorAction {
    /// `POST /queue` — join the queue.
    CallJoin {
        /// Caller-supplied external identifier for the visit.
        external_id: String,
        /// Reason for the visit, when given.
        reason: Option<String>,
    },

    /// `DELETE /queue` — leave the queue.
    CallExit,

    /// `POST /examination/complete` — end the running examination.
    CallComplete {
        /// The provider on the other side of the examination.
        provider_id: u64,
    },

    /// `GET /queue/item` — refresh own queue membership.
    FetchQueueItem,

    /// `GET /examination` — refresh examination state.
    FetchExamination,
}

/// Actions produced by the provider machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderAction {
    /// `GET /queue/list` — refresh the waiting-list snapshot.
    FetchQueue,

    /// `GET /examination` — refresh examination state.
    FetchExamination,

    /// `POST /queue/pickup` — pull a visitor out of the queue.
    CallPickup {
        /// Visitor to pick up.
        visitor_id: u64,
    },

    /// `POST /examination/complete` — end the running examination.
    CallComplete {
        /// Visitor whose examination is being completed.
        visitor_id: u64,
    },
}
