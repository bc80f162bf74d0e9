//! Property-based tests for the visitor state machine.
//!
//! Invariants must hold under arbitrary event sequences, not just the
//! scripted flows: the transport gives no ordering between REST completions
//! and push deliveries, so any interleaving a generator can produce is one
//! production can produce too.

use lounge_client::{JoinPolicy, VisitorEvent, VisitorMachine, VisitorPhase};
use lounge_core::ApiError;
use lounge_proto::{
    ExamStatus, ExaminationDetail, Party, PickupEvent, PushEvent, QueueBroadcast, QueueItem,
};
use proptest::prelude::*;

const SELF_ID: u64 = 31;

fn queue_item(position: u32) -> QueueItem {
    QueueItem {
        position,
        joined_at: "2024-05-01T10:00:00Z".to_string(),
        waited_time: None,
        estimated_wait_time: None,
        total_visitors: None,
    }
}

fn pickup(examination_id: u64) -> PickupEvent {
    PickupEvent {
        provider: Party { id: 3, name: "Dr. X".to_string(), email: None },
        visitor: Party { id: SELF_ID, name: "Ada".to_string(), email: None },
        examination_id,
        started_at: None,
        message: None,
    }
}

fn detail(examination_id: u64, status: ExamStatus) -> ExaminationDetail {
    ExaminationDetail {
        examination_id,
        status,
        provider_id: Some(3),
        provider_name: Some("Dr. X".to_string()),
        visitor_id: None,
        visitor_name: None,
        started_at: None,
        duration: None,
        reason: None,
    }
}

fn broadcast(visitor_id: u64) -> QueueBroadcast {
    QueueBroadcast { visitor_id, visitor_name: None, position: None, message: None }
}

/// Generate random visitor events, covering every source: intents, REST
/// results, and push deliveries about us and about strangers.
fn event_strategy() -> impl Strategy<Value = VisitorEvent> {
    prop_oneof![
        2 => Just(VisitorEvent::JoinRequested {
            external_id: "vsee123".to_string(),
            reason: Some("checkup".to_string()),
        }),
        1 => Just(VisitorEvent::JoinAccepted),
        1 => Just(VisitorEvent::JoinRejected(ApiError::Queue {
            message: "already queued".to_string(),
        })),
        2 => Just(VisitorEvent::ExitRequested),
        2 => Just(VisitorEvent::ExitConfirmed),
        1 => Just(VisitorEvent::CompleteRequested),
        1 => Just(VisitorEvent::CompleteConfirmed),
        1 => Just(VisitorEvent::CompleteRejected(ApiError::NotFound)),
        2 => (1u32..5).prop_map(|p| VisitorEvent::QueueItemLoaded(Some(queue_item(p)))),
        1 => Just(VisitorEvent::QueueItemLoaded(None)),
        2 => (1u64..4).prop_map(|id| {
            VisitorEvent::ExaminationLoaded(Some(detail(id, ExamStatus::InProgress)))
        }),
        1 => Just(VisitorEvent::ExaminationLoaded(None)),
        3 => (1u64..4).prop_map(|id| VisitorEvent::Push(PushEvent::VisitorPickedUp(pickup(id)))),
        2 => Just(VisitorEvent::Push(PushEvent::VisitorExaminationCompleted)),
        1 => Just(VisitorEvent::Push(PushEvent::VisitorExited)),
        1 => Just(VisitorEvent::Push(PushEvent::VisitorJoinedQueue(broadcast(SELF_ID)))),
        1 => Just(VisitorEvent::Push(PushEvent::VisitorExitedQueue(broadcast(SELF_ID)))),
        1 => Just(VisitorEvent::Push(PushEvent::VisitorExitedQueue(broadcast(99)))),
        1 => Just(VisitorEvent::StatusLoadFailed(ApiError::Network {
            message: "connection reset".to_string(),
        })),
        1 => Just(VisitorEvent::NoticeDismissed),
    ]
}

proptest! {
    /// Queue membership and an active examination are never reported
    /// together, whatever the delivery order or duplication.
    #[test]
    fn prop_mutual_exclusion_holds(events in prop::collection::vec(event_strategy(), 0..60)) {
        let mut machine = VisitorMachine::new(SELF_ID, JoinPolicy::default());

        for event in events {
            let _ = machine.handle(event);
            prop_assert!(
                !(machine.queue_status().in_queue && machine.examination().active),
                "queued and in examination simultaneously"
            );
        }
    }

    /// Replaying any event immediately leaves observable state unchanged:
    /// all transitions are idempotent against duplicate delivery.
    #[test]
    fn prop_duplicate_delivery_is_idempotent(
        events in prop::collection::vec(event_strategy(), 1..40),
        dup_at in any::<prop::sample::Index>(),
    ) {
        let mut machine = VisitorMachine::new(SELF_ID, JoinPolicy::default());
        let dup_at = dup_at.index(events.len());

        for (i, event) in events.into_iter().enumerate() {
            let _ = machine.handle(event.clone());
            if i == dup_at {
                let queue = machine.queue_status().clone();
                let exam = machine.examination().clone();
                let _ = machine.handle(event);
                prop_assert_eq!(machine.queue_status(), &queue);
                prop_assert_eq!(machine.examination(), &exam);
            }
        }
    }

    /// The derived phase always agrees with the underlying state.
    #[test]
    fn prop_phase_is_consistent(events in prop::collection::vec(event_strategy(), 0..60)) {
        let mut machine = VisitorMachine::new(SELF_ID, JoinPolicy::default());

        for event in events {
            let _ = machine.handle(event);
            let expected = if machine.examination().active {
                VisitorPhase::InExamination
            } else if machine.queue_status().in_queue {
                VisitorPhase::Queued
            } else {
                VisitorPhase::Idle
            };
            prop_assert_eq!(machine.phase(), expected);
        }
    }
}
