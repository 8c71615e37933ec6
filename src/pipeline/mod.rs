//! Ordering & filtering pipeline.
//!
//! Turns the raw message set into display rows: filter, then a stable sort,
//! then projection. The output is rebuilt from scratch on every call; the
//! only state involved is the [`InboxConfig`] passed in.

mod projection;

pub use projection::{format_date, project};

use std::cmp::Ordering;

use crate::config::{InboxConfig, MessageComparator, MessageFilter};
use crate::models::{InboxMessage, RowViewModel};

/// Default order: newest first, missing timestamps count as the epoch.
pub fn most_recent_first(a: &InboxMessage, b: &InboxMessage) -> Ordering {
    b.created_at_or_epoch().cmp(&a.created_at_or_epoch())
}

/// Keep the messages the filter accepts and order them.
///
/// `Vec::sort_by` is stable, so messages the comparator reports as equal
/// keep their input order.
pub fn sort_and_filter(
    messages: Vec<InboxMessage>,
    filter: Option<&MessageFilter>,
    comparator: Option<&MessageComparator>,
) -> Vec<InboxMessage> {
    let mut kept: Vec<InboxMessage> = match filter {
        Some(filter) => messages.into_iter().filter(|m| filter(m)).collect(),
        None => messages,
    };

    match comparator {
        Some(comparator) => kept.sort_by(|a, b| comparator(a, b)),
        None => kept.sort_by(most_recent_first),
    }

    kept
}

/// Run the full pipeline: filter, sort, project, then flag the last row.
pub fn process(messages: Vec<InboxMessage>, config: &InboxConfig) -> Vec<RowViewModel> {
    let ordered = sort_and_filter(
        messages,
        config.filter.as_ref(),
        config.comparator.as_ref(),
    );

    let mut rows: Vec<RowViewModel> = ordered
        .into_iter()
        .map(|message| project(message, config.date_mapper.as_ref()))
        .collect();

    if let Some(last) = rows.last_mut() {
        last.is_last = true;
    }

    rows
}
