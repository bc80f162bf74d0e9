//! Visitor-side view model.
//!
//! These structures hold the subset of server state the visitor screens
//! render, translated from the wire DTOs. They carry no behavior beyond
//! construction; all transition logic lives in the machines.

use lounge_proto::{ExaminationDetail, PickupEvent, QueueItem};

/// The visitor's own queue membership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStatus {
    /// Whether the visitor is queued right now.
    pub in_queue: bool,
    /// 1-based position, when queued.
    pub position: Option<u32>,
    /// Server timestamp of the join.
    pub joined_at: Option<String>,
    /// Human-readable time waited so far.
    pub waited_time: Option<String>,
    /// Human-readable wait estimate.
    pub estimated_wait_time: Option<String>,
    /// Number of visitors currently queued.
    pub total_visitors: Option<u32>,
}

impl QueueStatus {
    /// Not queued.
    pub fn absent() -> Self {
        Self::default()
    }

    /// Membership as reported by a `GET /queue/item` snapshot.
    pub fn from_item(item: &QueueItem) -> Self {
        Self {
            in_queue: true,
            position: Some(item.position),
            joined_at: Some(item.joined_at.clone()),
            waited_time: item.waited_time.clone(),
            estimated_wait_time: item.estimated_wait_time.clone(),
            total_visitors: item.total_visitors,
        }
    }
}

/// The visitor's current examination, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExaminationStatus {
    /// Whether an examination is running.
    pub active: bool,
    /// Server-assigned examination id.
    pub examination_id: Option<u64>,
    /// The provider's role-scoped id.
    pub counterparty_id: Option<u64>,
    /// The provider's display name.
    pub counterparty_name: Option<String>,
    /// Server timestamp of the pickup.
    pub started_at: Option<String>,
    /// Human-readable running time.
    pub duration: Option<String>,
    /// Reason given at join time.
    pub reason: Option<String>,
}

impl ExaminationStatus {
    /// No examination.
    pub fn absent() -> Self {
        Self::default()
    }

    /// Examination as announced by the pickup push event.
    pub fn from_pickup(pickup: &PickupEvent) -> Self {
        Self {
            active: true,
            examination_id: Some(pickup.examination_id),
            counterparty_id: Some(pickup.provider.id),
            counterparty_name: Some(pickup.provider.name.clone()),
            started_at: pickup.started_at.clone(),
            duration: None,
            reason: None,
        }
    }

    /// Examination as reported by a `GET /examination` snapshot.
    pub fn from_detail(detail: &ExaminationDetail) -> Self {
        Self {
            active: detail.is_in_progress(),
            examination_id: Some(detail.examination_id),
            counterparty_id: detail.provider_id,
            counterparty_name: detail.provider_name.clone(),
            started_at: detail.started_at.clone(),
            duration: detail.duration.clone(),
            reason: detail.reason.clone(),
        }
    }
}
