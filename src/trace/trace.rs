use serde::Serialize;

use crate::replay::strategy::{FieldOutcome, FillMode};

/// One line of the replay trace: what happened to one field.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: i64,
    pub snapshot_id: String,
    pub mode: FillMode,

    #[serde(flatten)]
    pub outcome: FieldOutcome,
}

impl TraceEvent {
    pub fn now(snapshot_id: &str, mode: FillMode, outcome: &FieldOutcome) -> Self {
        Self {
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            snapshot_id: snapshot_id.to_string(),
            mode,
            outcome: outcome.clone(),
        }
    }
}
