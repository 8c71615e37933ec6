use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{deserialize_id, deserialize_timestamp, ImpressionRowInfo};

/// Where an in-app message was shown or acted on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum InAppLocation {
    /// Displayed automatically by the messaging runtime
    InApp,
    /// Opened from the inbox list
    #[default]
    Inbox,
}

/// What triggered a message delete.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum DeleteSource {
    /// Swipe-to-delete on a list row
    InboxSwipe,
    /// Delete button inside the detail view
    DeleteButton,
    #[default]
    Unknown,
}

/// Inbox-specific display fields, separate from the message body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct InboxMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Icon or image reference
    #[serde(default)]
    pub icon: Option<String>,
}

/// A message as handed out by the messaging runtime.
///
/// The rich body is not part of this record; it is fetched on demand by id
/// through [`crate::traits::MessageSource::fetch_content`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InboxMessage {
    #[serde(deserialize_with = "deserialize_id")]
    pub message_id: String,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub read: bool,
    /// Saved to the inbox without ever being displayed as an in-app
    #[serde(default)]
    pub silent_inbox: bool,
    #[serde(default)]
    pub inbox_metadata: Option<InboxMetadata>,
}

impl InboxMessage {
    /// Create an unread message with no timestamp and no metadata.
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            created_at: None,
            read: false,
            silent_inbox: false,
            inbox_metadata: None,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    pub fn with_silent_inbox(mut self, silent_inbox: bool) -> Self {
        self.silent_inbox = silent_inbox;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata_mut().title = Some(title.into());
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.metadata_mut().subtitle = Some(subtitle.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.metadata_mut().icon = Some(icon.into());
        self
    }

    fn metadata_mut(&mut self) -> &mut InboxMetadata {
        self.inbox_metadata.get_or_insert_with(InboxMetadata::default)
    }

    /// Creation time, with a missing value treated as the Unix epoch.
    pub fn created_at_or_epoch(&self) -> DateTime<Utc> {
        self.created_at.unwrap_or_default()
    }

    /// Row identity used for impression tracking.
    pub fn impression_row(&self) -> ImpressionRowInfo {
        ImpressionRowInfo {
            message_id: self.message_id.clone(),
            silent_inbox: self.silent_inbox,
        }
    }
}

/// Padding the detail view applies around HTML content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct EdgeInsets {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub right: f64,
}

/// Rich body of a message, fetched lazily by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HtmlContent {
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub edge_insets: EdgeInsets,
}

impl HtmlContent {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            edge_insets: EdgeInsets::default(),
        }
    }
}
