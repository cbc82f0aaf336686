use serde::{Deserialize, Serialize};

use crate::capture::snapshot_model::FormSnapshot;
use crate::replay::replay::ReplayRequest;

// ============================================================================
// Message channel between the coordinator and the page agent
// ============================================================================

/// Request sent to the page agent (one JSON message).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum AgentRequest {
    CaptureForm,
    FillForm { data: ReplayRequest },
}

/// Response returned by the page agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<FormSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentResponse {
    pub fn ok() -> Self {
        AgentResponse {
            success: true,
            data: None,
            error: None,
        }
    }

    pub fn captured(snapshot: FormSnapshot) -> Self {
        AgentResponse {
            data: Some(snapshot),
            ..Self::ok()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        AgentResponse {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

// ============================================================================
// User-facing notices
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A non-blocking message surfaced to the user after a coordinator operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}
