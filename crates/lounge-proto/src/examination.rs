//! Examination request/response bodies.

use serde::{Deserialize, Serialize};

/// Lifecycle state of an examination as the server reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamStatus {
    /// Provider and visitor are paired right now.
    InProgress,
    /// The examination has ended.
    Completed,
}

/// Current examination, from `GET /examination`.
///
/// The endpoint is role-scoped: each side sees the counterparty's fields
/// filled in and its own omitted, so everything beyond the id and status is
/// optional. A 404 means no examination exists; absence is not modelled
/// here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExaminationDetail {
    /// Server-assigned examination id.
    pub examination_id: u64,
    /// Lifecycle state.
    pub status: ExamStatus,
    /// Provider id, present on the visitor side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<u64>,
    /// Provider name, present on the visitor side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    /// Visitor id, present on the provider side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visitor_id: Option<u64>,
    /// Visitor name, present on the provider side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visitor_name: Option<String>,
    /// Server timestamp of the pickup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    /// Human-readable running time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Reason the visitor gave at join time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ExaminationDetail {
    /// Whether this examination is currently running.
    pub fn is_in_progress(&self) -> bool {
        matches!(self.status, ExamStatus::InProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visitor_side_detail_parses() {
        let body = serde_json::json!({
            "examination_id": 12,
            "status": "in_progress",
            "provider_id": 3,
            "provider_name": "Dr. X",
            "started_at": "2024-05-01T10:00:00Z",
            "duration": "5 minutes"
        });

        let parsed: ExaminationDetail = serde_json::from_value(body).expect("deserialize");
        assert!(parsed.is_in_progress());
        assert_eq!(parsed.provider_name.as_deref(), Some("Dr. X"));
        assert!(parsed.visitor_id.is_none());
    }

    #[test]
    fn completed_detail_is_not_in_progress() {
        let parsed: ExaminationDetail = serde_json::from_value(serde_json::json!({
            "examination_id": 12,
            "status": "completed"
        }))
        .expect("deserialize");
        assert!(!parsed.is_in_progress());
    }
}
