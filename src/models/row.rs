use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ImpressionRowInfo, InboxMessage};

/// Display-ready projection of one inbox message.
///
/// Rows are rebuilt from scratch on every refresh; the only in-place
/// mutation is flipping `read` when the row is opened.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RowViewModel {
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    /// `created_at` rendered by the configured date mapper
    pub formatted_date: String,
    pub read: bool,
    /// True only for the final row in display order
    pub is_last: bool,
    /// Source message this row was projected from
    pub message: InboxMessage,
}

impl RowViewModel {
    pub fn message_id(&self) -> &str {
        &self.message.message_id
    }

    pub fn impression_row(&self) -> ImpressionRowInfo {
        self.message.impression_row()
    }

    /// Mark the row (and its message copy) as read.
    pub fn mark_read(&mut self) {
        self.read = true;
        self.message.read = true;
    }
}
