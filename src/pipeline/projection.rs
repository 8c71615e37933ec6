//! Row view-model projection.

use chrono::{DateTime, Utc};

use crate::config::DateMapper;
use crate::models::{InboxMessage, RowViewModel};

/// Default date rendering, e.g. `Jan 5, 2024 at 2:30 PM`.
///
/// Timestamps are rendered in UTC; hosts that want local time install a
/// [`DateMapper`].
pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%b %-d, %Y at %-I:%M %p").to_string()
}

/// Map one message to its display row. Never fails; absent fields fall
/// back to empty/`None`. `is_last` is left false for the pipeline to set.
pub fn project(message: InboxMessage, date_mapper: Option<&DateMapper>) -> RowViewModel {
    let formatted_date = match date_mapper {
        Some(mapper) => mapper(&message).unwrap_or_default(),
        None => message.created_at.as_ref().map(format_date).unwrap_or_default(),
    };

    let metadata = message.inbox_metadata.clone().unwrap_or_default();

    RowViewModel {
        title: metadata.title.unwrap_or_default(),
        subtitle: metadata.subtitle,
        image_url: metadata.icon,
        created_at: message.created_at,
        formatted_date,
        read: message.read,
        is_last: false,
        message,
    }
}
