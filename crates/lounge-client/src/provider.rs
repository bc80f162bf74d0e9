//! Provider state machine.
//!
//! Tracks the waiting-list snapshot and the provider's active examination.
//! The two are independent: the list keeps updating in the background while
//! an examination runs.
//!
//! The waiting list carries no version or sequence number, so incremental
//! merging against push events cannot be made safe against dropped or
//! reordered deliveries. Every broadcast therefore triggers a wholesale
//! re-pull; the snapshot replaces the local list entirely.

use lounge_proto::{ExaminationDetail, PushEvent, WaitingList};

use crate::{Notice, ProviderAction, ProviderEvent};

/// Provider state machine.
///
/// Pure: processes events, returns actions, performs no I/O.
#[derive(Debug, Clone, Default)]
pub struct ProviderMachine {
    queue: WaitingList,
    queue_loaded: bool,
    examination: Option<ExaminationDetail>,
    notice: Option<Notice>,
}

impl ProviderMachine {
    /// Create a machine with nothing loaded yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an event and return actions for the runtime.
    pub fn handle(&mut self, event: ProviderEvent) -> Vec<ProviderAction> {
        match event {
            ProviderEvent::RefreshRequested => {
                vec![ProviderAction::FetchExamination, ProviderAction::FetchQueue]
            },
            ProviderEvent::QueueLoaded(list) => {
                self.queue = list;
                self.queue_loaded = true;
                vec![]
            },
            ProviderEvent::QueueLoadFailed(err) => {
                self.queue = WaitingList::default();
                self.queue_loaded = false;
                self.notice = Some(Notice::error(err.to_string()));
                vec![]
            },
            ProviderEvent::ExaminationLoaded(detail) => {
                self.examination = detail.filter(ExaminationDetail::is_in_progress);
                vec![]
            },
            ProviderEvent::PickupRequested { visitor_id } => {
                vec![ProviderAction::CallPickup { visitor_id }]
            },
            ProviderEvent::PickupAccepted { visitor_id } => {
                tracing::debug!(visitor_id, "pickup accepted, refreshing examination");
                self.notice = Some(Notice::info("Visitor picked up successfully."));
                // The server decides who is actually in examination now; a
                // racing claim by another provider surfaces in the snapshot.
                vec![ProviderAction::FetchExamination]
            },
            ProviderEvent::PickupRejected(err) => {
                self.notice = Some(Notice::error(err.to_string()));
                vec![]
            },
            ProviderEvent::CompleteRequested { visitor_id } => {
                vec![ProviderAction::CallComplete { visitor_id }]
            },
            ProviderEvent::CompleteConfirmed => {
                self.examination = None;
                self.notice = Some(Notice::info("Examination completed successfully."));
                vec![]
            },
            ProviderEvent::CompleteRejected(err) => {
                if self.examination.is_some() {
                    self.notice = Some(Notice::error(err.to_string()));
                }
                vec![]
            },
            ProviderEvent::Push(push) => self.handle_push(push),
            ProviderEvent::NoticeDismissed => {
                self.notice = None;
                vec![]
            },
        }
    }

    fn handle_push(&mut self, push: PushEvent) -> Vec<ProviderAction> {
        match push {
            PushEvent::VisitorJoinedQueue(_) | PushEvent::VisitorExitedQueue(_) => {
                // Membership changed somewhere; re-pull the snapshot instead
                // of patching the list.
                vec![ProviderAction::FetchQueue]
            },
            PushEvent::ProviderPickedUpVisitor => {
                vec![ProviderAction::FetchExamination, ProviderAction::FetchQueue]
            },
            PushEvent::ProviderCompletedExamination => {
                self.examination = None;
                vec![]
            },
            PushEvent::VisitorPickedUp(_)
            | PushEvent::VisitorExaminationCompleted
            | PushEvent::VisitorExited => {
                tracing::debug!("ignoring visitor-scoped push event on provider machine");
                vec![]
            },
        }
    }

    /// Latest waiting-list snapshot.
    pub fn waiting_list(&self) -> &WaitingList {
        &self.queue
    }

    /// Whether a snapshot has been loaded since the last failure.
    pub fn queue_loaded(&self) -> bool {
        self.queue_loaded
    }

    /// The running examination, if any.
    pub fn examination(&self) -> Option<&ExaminationDetail> {
        self.examination.as_ref()
    }

    /// Whether an examination is running.
    pub fn has_active_examination(&self) -> bool {
        self.examination.is_some()
    }

    /// Current notice, if any.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }
}
