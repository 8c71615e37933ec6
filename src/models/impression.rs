use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a row as reported to the message source for visibility tracking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ImpressionRowInfo {
    pub message_id: String,
    pub silent_inbox: bool,
}

impl ImpressionRowInfo {
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            silent_inbox: false,
        }
    }
}

/// Finalized visibility record for one row within a session.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Impression {
    pub message_id: String,
    pub silent_inbox: bool,
    /// Number of times the row entered the visible set
    pub display_count: u32,
    /// Total on-screen time in seconds
    pub display_duration_secs: f64,
}

/// Everything the message source learns when a session window closes.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub start_rows: Vec<ImpressionRowInfo>,
    pub end_rows: Vec<ImpressionRowInfo>,
    pub impressions: Vec<Impression>,
}

impl SessionSummary {
    /// Find the impression recorded for a message, if it was ever visible.
    pub fn impression_for(&self, message_id: &str) -> Option<&Impression> {
        self.impressions.iter().find(|i| i.message_id == message_id)
    }

    pub fn duration_secs(&self) -> f64 {
        (self.ended_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}
