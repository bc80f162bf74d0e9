//! Visitor state machine.
//!
//! Tracks the visitor's path through `idle → queued → in-examination →
//! idle`, with direct exits from both intermediate states. Driven by user
//! intents, REST results, and push events; produces REST-call actions for
//! the runtime.
//!
//! # Invariants
//!
//! - At most one of `queue_status().in_queue` and `examination().active` is
//!   true, under any event ordering and duplication.
//! - Being picked up always wins over a concurrent queue exit: once
//!   in-examination, exit confirmations and queue-exit broadcasts are
//!   no-ops.
//! - A duplicate pickup delivery with the same examination id leaves state
//!   unchanged.

use lounge_proto::{PushEvent, QueueBroadcast};

use crate::{ExaminationStatus, Notice, QueueStatus, VisitorAction, VisitorEvent};

/// Which join-form fields a deployment requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinPolicy {
    /// Whether the visit reason must be non-empty.
    pub reason_required: bool,
}

impl Default for JoinPolicy {
    fn default() -> Self {
        Self { reason_required: true }
    }
}

/// Coarse phase of the visitor, derived from the full state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitorPhase {
    /// Neither queued nor in examination.
    Idle,
    /// Waiting in the queue.
    Queued,
    /// Paired with a provider.
    InExamination,
}

/// Visitor state machine.
///
/// Pure: processes events, returns actions, performs no I/O.
#[derive(Debug, Clone)]
pub struct VisitorMachine {
    /// Own role-scoped id, for filtering broadcast events.
    visitor_id: u64,
    policy: JoinPolicy,
    queue: QueueStatus,
    examination: ExaminationStatus,
    notice: Option<Notice>,
}

impl VisitorMachine {
    /// Create an idle machine for the given visitor.
    pub fn new(visitor_id: u64, policy: JoinPolicy) -> Self {
        Self {
            visitor_id,
            policy,
            queue: QueueStatus::absent(),
            examination: ExaminationStatus::absent(),
            notice: None,
        }
    }

    /// Process an event and return actions for the runtime.
    pub fn handle(&mut self, event: VisitorEvent) -> Vec<VisitorAction> {
        match event {
            VisitorEvent::JoinRequested { external_id, reason } => {
                self.handle_join_requested(external_id, reason)
            },
            VisitorEvent::JoinAccepted => {
                // Converge on the server snapshot rather than trusting the
                // call response; the joined broadcast takes the same path.
                self.notice = None;
                vec![VisitorAction::FetchQueueItem]
            },
            VisitorEvent::JoinRejected(err) => {
                self.notice = Some(Notice::error(err.to_string()));
                vec![]
            },
            VisitorEvent::ExitRequested => {
                if self.examination.active {
                    // Pickup won the race; the exit intent is moot.
                    return vec![];
                }
                vec![VisitorAction::CallExit]
            },
            VisitorEvent::ExitConfirmed => {
                if !self.examination.active {
                    self.queue = QueueStatus::absent();
                    self.notice = Some(Notice::info("You have exited the queue."));
                }
                vec![]
            },
            VisitorEvent::ExitRejected(err) => {
                if !self.examination.active {
                    self.notice = Some(Notice::error(err.to_string()));
                }
                vec![]
            },
            VisitorEvent::CompleteRequested => self.handle_complete_requested(),
            VisitorEvent::CompleteConfirmed => {
                self.clear_examination();
                vec![]
            },
            VisitorEvent::CompleteRejected(err) => {
                // Already reconciled when the completion event won the race.
                if self.examination.active {
                    self.notice = Some(Notice::error(err.to_string()));
                }
                vec![]
            },
            VisitorEvent::QueueItemLoaded(item) => {
                if self.examination.active {
                    // Stale queue membership is possible server-side during
                    // the pickup handoff window; the examination wins.
                    return vec![];
                }
                match item {
                    Some(item) => {
                        self.queue = QueueStatus::from_item(&item);
                        self.notice =
                            Some(Notice::info("Your provider will shortly be with you."));
                    },
                    None => self.queue = QueueStatus::absent(),
                }
                vec![]
            },
            VisitorEvent::ExaminationLoaded(detail) => {
                match detail.filter(lounge_proto::ExaminationDetail::is_in_progress) {
                    Some(detail) => {
                        self.examination = ExaminationStatus::from_detail(&detail);
                        self.queue = QueueStatus::absent();
                    },
                    None => self.examination = ExaminationStatus::absent(),
                }
                vec![]
            },
            VisitorEvent::StatusLoadFailed(err) => {
                self.notice = Some(Notice::error(err.to_string()));
                vec![]
            },
            VisitorEvent::Push(push) => self.handle_push(push),
            VisitorEvent::NoticeDismissed => {
                self.notice = None;
                vec![]
            },
        }
    }

    fn handle_join_requested(
        &mut self,
        external_id: String,
        reason: Option<String>,
    ) -> Vec<VisitorAction> {
        if external_id.trim().is_empty() {
            self.notice = Some(Notice::error("An external id is required to join the queue."));
            return vec![];
        }
        let reason = reason.filter(|r| !r.trim().is_empty());
        if self.policy.reason_required && reason.is_none() {
            self.notice = Some(Notice::error("A reason for the visit is required."));
            return vec![];
        }
        vec![VisitorAction::CallJoin { external_id, reason }]
    }

    fn handle_complete_requested(&mut self) -> Vec<VisitorAction> {
        if !self.examination.active {
            return vec![];
        }
        match self.examination.counterparty_id {
            Some(provider_id) => vec![VisitorAction::CallComplete { provider_id }],
            None => {
                // Pickup payload lacked the provider id; resolve it first.
                tracing::debug!("completion requested without a known provider id");
                vec![VisitorAction::FetchExamination]
            },
        }
    }

    fn handle_push(&mut self, push: PushEvent) -> Vec<VisitorAction> {
        match push {
            PushEvent::VisitorPickedUp(pickup) => {
                if self.examination.active
                    && self.examination.examination_id == Some(pickup.examination_id)
                {
                    // Duplicate delivery; already applied.
                    return vec![];
                }
                self.examination = ExaminationStatus::from_pickup(&pickup);
                self.queue = QueueStatus::absent();
                self.notice = Some(Notice::info(format!(
                    "You are invited by {}. Your examination is in progress.",
                    pickup.provider.name
                )));
                // The event payload is authoritative for the transition;
                // the snapshot fills in duration and reason.
                vec![VisitorAction::FetchExamination]
            },
            PushEvent::VisitorExaminationCompleted | PushEvent::VisitorExited => {
                self.clear_examination();
                vec![]
            },
            PushEvent::VisitorJoinedQueue(broadcast) => {
                if self.concerns_self(&broadcast) && !self.examination.active {
                    return vec![VisitorAction::FetchQueueItem];
                }
                vec![]
            },
            PushEvent::VisitorExitedQueue(broadcast) => {
                if self.concerns_self(&broadcast) && !self.examination.active {
                    self.queue = QueueStatus::absent();
                    self.notice = Some(Notice::info("You have exited the queue."));
                }
                vec![]
            },
            PushEvent::ProviderPickedUpVisitor | PushEvent::ProviderCompletedExamination => {
                tracing::debug!("ignoring provider-scoped push event on visitor machine");
                vec![]
            },
        }
    }

    fn clear_examination(&mut self) {
        if self.examination.active {
            self.examination = ExaminationStatus::absent();
            self.notice = Some(Notice::info("Your examination has been completed."));
        }
    }

    fn concerns_self(&self, broadcast: &QueueBroadcast) -> bool {
        broadcast.visitor_id == self.visitor_id
    }

    /// Own role-scoped id.
    pub fn visitor_id(&self) -> u64 {
        self.visitor_id
    }

    /// Current queue membership.
    pub fn queue_status(&self) -> &QueueStatus {
        &self.queue
    }

    /// Current examination state.
    pub fn examination(&self) -> &ExaminationStatus {
        &self.examination
    }

    /// Current notice, if any.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Coarse phase, derived.
    pub fn phase(&self) -> VisitorPhase {
        if self.examination.active {
            VisitorPhase::InExamination
        } else if self.queue.in_queue {
            VisitorPhase::Queued
        } else {
            VisitorPhase::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use lounge_core::ApiError;
    use lounge_proto::{ExamStatus, ExaminationDetail, Party, PickupEvent, QueueItem};

    use super::*;

    fn machine() -> VisitorMachine {
        VisitorMachine::new(31, JoinPolicy::default())
    }

    fn queue_item(position: u32) -> QueueItem {
        QueueItem {
            position,
            joined_at: "2024-05-01T10:00:00Z".to_string(),
            waited_time: Some("1 minute".to_string()),
            estimated_wait_time: Some("5 minutes".to_string()),
            total_visitors: Some(position),
        }
    }

    fn pickup(examination_id: u64) -> PickupEvent {
        PickupEvent {
            provider: Party { id: 3, name: "Dr. X".to_string(), email: None },
            visitor: Party { id: 31, name: "Ada".to_string(), email: None },
            examination_id,
            started_at: Some("2024-05-01T10:05:00Z".to_string()),
            message: None,
        }
    }

    fn queued_machine() -> VisitorMachine {
        let mut m = machine();
        let _ = m.handle(VisitorEvent::QueueItemLoaded(Some(queue_item(1))));
        assert_eq!(m.phase(), VisitorPhase::Queued);
        m
    }

    #[test]
    fn join_validates_external_id() {
        let mut m = machine();
        let actions = m.handle(VisitorEvent::JoinRequested {
            external_id: "   ".to_string(),
            reason: Some("checkup".to_string()),
        });
        assert!(actions.is_empty());
        assert!(m.notice().is_some_and(Notice::is_error));
    }

    #[test]
    fn join_validates_reason_when_required() {
        let mut m = machine();
        let actions = m.handle(VisitorEvent::JoinRequested {
            external_id: "vsee123".to_string(),
            reason: None,
        });
        assert!(actions.is_empty());
        assert!(m.notice().is_some_and(Notice::is_error));
    }

    #[test]
    fn join_reason_optional_under_relaxed_policy() {
        let mut m = VisitorMachine::new(31, JoinPolicy { reason_required: false });
        let actions = m.handle(VisitorEvent::JoinRequested {
            external_id: "vsee123".to_string(),
            reason: None,
        });
        assert_eq!(actions, vec![VisitorAction::CallJoin {
            external_id: "vsee123".to_string(),
            reason: None,
        }]);
    }

    #[test]
    fn join_round_trip_reaches_queued_with_snapshot_position() {
        let mut m = machine();
        let actions = m.handle(VisitorEvent::JoinRequested {
            external_id: "vsee123".to_string(),
            reason: Some("checkup".to_string()),
        });
        assert!(matches!(actions.as_slice(), [VisitorAction::CallJoin { .. }]));

        let actions = m.handle(VisitorEvent::JoinAccepted);
        assert_eq!(actions, vec![VisitorAction::FetchQueueItem]);

        let _ = m.handle(VisitorEvent::QueueItemLoaded(Some(queue_item(1))));
        assert!(m.queue_status().in_queue);
        assert_eq!(m.queue_status().position, Some(1));
    }

    #[test]
    fn join_rejection_leaves_state_unchanged() {
        let mut m = queued_machine();
        let before = m.queue_status().clone();

        let _ = m.handle(VisitorEvent::JoinRejected(ApiError::Queue {
            message: "already queued".to_string(),
        }));
        assert_eq!(m.queue_status(), &before);
        assert!(m.notice().is_some_and(Notice::is_error));
    }

    #[test]
    fn pickup_clears_queue_membership() {
        let mut m = queued_machine();
        let actions = m.handle(VisitorEvent::Push(PushEvent::VisitorPickedUp(pickup(12))));

        assert_eq!(actions, vec![VisitorAction::FetchExamination]);
        assert_eq!(m.phase(), VisitorPhase::InExamination);
        assert!(!m.queue_status().in_queue);
        assert_eq!(m.examination().examination_id, Some(12));
        assert_eq!(m.examination().counterparty_name.as_deref(), Some("Dr. X"));
    }

    #[test]
    fn duplicate_pickup_is_idempotent() {
        let mut m = queued_machine();
        let _ = m.handle(VisitorEvent::Push(PushEvent::VisitorPickedUp(pickup(12))));
        let _ = m.handle(VisitorEvent::NoticeDismissed);
        let before_exam = m.examination().clone();
        let before_queue = m.queue_status().clone();

        let actions = m.handle(VisitorEvent::Push(PushEvent::VisitorPickedUp(pickup(12))));
        assert!(actions.is_empty());
        assert_eq!(m.examination(), &before_exam);
        assert_eq!(m.queue_status(), &before_queue);
        assert!(m.notice().is_none());
    }

    #[test]
    fn pickup_wins_over_concurrent_exit() {
        let mut m = queued_machine();

        // Exit is issued, but the pickup event lands before the exit call
        // resolves.
        let actions = m.handle(VisitorEvent::ExitRequested);
        assert_eq!(actions, vec![VisitorAction::CallExit]);
        let _ = m.handle(VisitorEvent::Push(PushEvent::VisitorPickedUp(pickup(12))));

        let _ = m.handle(VisitorEvent::ExitConfirmed);
        assert_eq!(m.phase(), VisitorPhase::InExamination);
    }

    #[test]
    fn exit_is_noop_once_in_examination() {
        let mut m = queued_machine();
        let _ = m.handle(VisitorEvent::Push(PushEvent::VisitorPickedUp(pickup(12))));

        let actions = m.handle(VisitorEvent::ExitRequested);
        assert!(actions.is_empty());
        assert_eq!(m.phase(), VisitorPhase::InExamination);
    }

    #[test]
    fn completion_event_and_confirmation_commute() {
        for event_first in [true, false] {
            let mut m = queued_machine();
            let _ = m.handle(VisitorEvent::Push(PushEvent::VisitorPickedUp(pickup(12))));
            let _ = m.handle(VisitorEvent::CompleteRequested);

            if event_first {
                let _ = m.handle(VisitorEvent::Push(PushEvent::VisitorExaminationCompleted));
                let _ = m.handle(VisitorEvent::CompleteConfirmed);
            } else {
                let _ = m.handle(VisitorEvent::CompleteConfirmed);
                let _ = m.handle(VisitorEvent::Push(PushEvent::VisitorExaminationCompleted));
            }

            assert_eq!(m.phase(), VisitorPhase::Idle);
            assert!(!m.examination().active);
            assert!(!m.queue_status().in_queue);
        }
    }

    #[test]
    fn late_rejection_after_completion_event_is_swallowed() {
        let mut m = queued_machine();
        let _ = m.handle(VisitorEvent::Push(PushEvent::VisitorPickedUp(pickup(12))));
        let _ = m.handle(VisitorEvent::Push(PushEvent::VisitorExaminationCompleted));
        let _ = m.handle(VisitorEvent::NoticeDismissed);

        let _ = m.handle(VisitorEvent::CompleteRejected(ApiError::NotFound));
        assert!(m.notice().is_none());
    }

    #[test]
    fn examination_snapshot_wins_over_stale_queue_state() {
        let mut m = queued_machine();
        let detail = ExaminationDetail {
            examination_id: 12,
            status: ExamStatus::InProgress,
            provider_id: Some(3),
            provider_name: Some("Dr. X".to_string()),
            visitor_id: None,
            visitor_name: None,
            started_at: None,
            duration: None,
            reason: None,
        };

        let _ = m.handle(VisitorEvent::ExaminationLoaded(Some(detail)));
        assert!(m.examination().active);
        assert!(!m.queue_status().in_queue);

        // A stale queue snapshot arriving afterwards must not resurrect
        // membership.
        let _ = m.handle(VisitorEvent::QueueItemLoaded(Some(queue_item(1))));
        assert!(!m.queue_status().in_queue);
        assert_eq!(m.phase(), VisitorPhase::InExamination);
    }

    #[test]
    fn queue_broadcasts_about_other_visitors_are_ignored() {
        let mut m = queued_machine();
        let broadcast = lounge_proto::QueueBroadcast {
            visitor_id: 99,
            visitor_name: None,
            position: None,
            message: None,
        };

        let actions = m.handle(VisitorEvent::Push(PushEvent::VisitorExitedQueue(broadcast)));
        assert!(actions.is_empty());
        assert!(m.queue_status().in_queue);
    }

    #[test]
    fn exited_queue_broadcast_is_ignored_while_in_examination() {
        let mut m = queued_machine();
        let _ = m.handle(VisitorEvent::Push(PushEvent::VisitorPickedUp(pickup(12))));

        let broadcast = lounge_proto::QueueBroadcast {
            visitor_id: 31,
            visitor_name: None,
            position: None,
            message: None,
        };
        let _ = m.handle(VisitorEvent::Push(PushEvent::VisitorExitedQueue(broadcast)));
        assert_eq!(m.phase(), VisitorPhase::InExamination);
    }
}
