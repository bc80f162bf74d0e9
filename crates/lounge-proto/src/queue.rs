//! Queue request/response bodies.
//!
//! The queue is a server-side concept; clients only ever see either a flat
//! snapshot of the waiting list (provider side) or their own position in it
//! (visitor side). Snapshots replace local state wholesale, so none of these
//! types carry version or sequence numbers.

use serde::{Deserialize, Serialize};

/// `POST /queue` request body (visitor joins the queue).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinQueueRequest {
    /// Caller-supplied external identifier for the visit.
    pub external_id: String,
    /// Reason for the visit. Some deployments require it, some do not; the
    /// client validates per its configured policy before sending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `POST /queue/pickup` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupRequest {
    /// Visitor to pull out of the queue.
    pub visitor_id: u64,
}

/// `POST /examination/complete` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteRequest {
    /// Visitor whose examination is being completed.
    pub visitor_id: u64,
}

/// Visitor's own queue position, from `GET /queue/item`.
///
/// The endpoint answers 404 when the visitor is not queued; absence is not
/// modelled here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    /// 1-based position in the queue.
    pub position: u32,
    /// Server timestamp of the join.
    pub joined_at: String,
    /// Human-readable time waited so far.
    pub waited_time: Option<String>,
    /// Human-readable wait estimate.
    pub estimated_wait_time: Option<String>,
    /// Number of visitors currently queued.
    pub total_visitors: Option<u32>,
}

/// One waiting visitor in the provider's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueVisitor {
    /// 1-based position in the queue.
    pub position: u32,
    /// Role-scoped visitor id.
    pub visitor_id: u64,
    /// Display name.
    pub visitor_name: String,
    /// Reason given at join time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Visitor email, when the server shares it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Human-readable time waited so far.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting_time: Option<String>,
}

/// Full waiting-list snapshot, from `GET /queue/list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingList {
    /// Number of visitors queued.
    pub total: u32,
    /// Entries in server-provided order.
    pub visitors: Vec<QueueVisitor>,
}

impl WaitingList {
    /// Whether the snapshot contains the given visitor.
    pub fn contains(&self, visitor_id: u64) -> bool {
        self.visitors.iter().any(|v| v.visitor_id == visitor_id)
    }
}

/// Envelope for `GET /queue/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitingListResponse {
    /// Server-side success flag.
    pub success: bool,
    /// The snapshot.
    pub data: WaitingList,
}

/// Optional detail block of a queue action response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueActionData {
    /// Assigned position, on joins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    /// Server-side message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Affected visitor id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visitor_id: Option<u64>,
    /// Affected visitor name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visitor_name: Option<String>,
    /// Time the visitor waited, on exits and pickups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waited_time: Option<String>,
    /// Examination length, on completions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examination_duration: Option<String>,
}

/// Response envelope shared by join/exit/pickup/complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueActionResponse {
    /// Server-side success flag.
    pub success: bool,
    /// Optional detail block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<QueueActionData>,
    /// Top-level message, usually set on rejections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waiting_list_parses_and_answers_membership() {
        let body = serde_json::json!({
            "success": true,
            "data": {
                "total": 2,
                "visitors": [
                    { "position": 1, "visitor_id": 5, "visitor_name": "Ada" },
                    { "position": 2, "visitor_id": 9, "visitor_name": "Grace",
                      "reason": "checkup", "waiting_time": "2 minutes" }
                ]
            }
        });

        let parsed: WaitingListResponse = serde_json::from_value(body).expect("deserialize");
        assert_eq!(parsed.data.total, 2);
        assert!(parsed.data.contains(9));
        assert!(!parsed.data.contains(6));
    }

    #[test]
    fn join_request_omits_absent_reason() {
        let without =
            JoinQueueRequest { external_id: "vsee123".to_string(), reason: None };
        let json = serde_json::to_value(&without).expect("serialize");
        assert_eq!(json, serde_json::json!({ "external_id": "vsee123" }));
    }

    #[test]
    fn action_response_tolerates_sparse_bodies() {
        let parsed: QueueActionResponse =
            serde_json::from_value(serde_json::json!({ "success": false, "message": "already queued" }))
                .expect("deserialize");
        assert!(!parsed.success);
        assert_eq!(parsed.message.as_deref(), Some("already queued"));
        assert!(parsed.data.is_none());
    }
}
