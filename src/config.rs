//! Inbox configuration.
//!
//! [`InboxConfig`] is built once by the host and handed to
//! [`crate::inbox::Inbox::new`]; [`crate::inbox::Inbox::reconfigure`] swaps it
//! wholesale. Every refresh reads the installed filter, comparator and date
//! mapper; nothing mutates them in place.

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{InboxError, InboxResult};
use crate::models::InboxMessage;

/// Predicate deciding whether a message appears in the inbox.
pub type MessageFilter = Arc<dyn Fn(&InboxMessage) -> bool + Send + Sync>;

/// Total order over messages; replaces the default newest-first order.
pub type MessageComparator = Arc<dyn Fn(&InboxMessage, &InboxMessage) -> Ordering + Send + Sync>;

/// Renders a message's date for its row. `None` renders as an empty string.
pub type DateMapper = Arc<dyn Fn(&InboxMessage) -> Option<String> + Send + Sync>;

/// Default length of the list/detail slide.
pub const DEFAULT_SLIDE_DURATION_MS: i64 = 300;

const DEFAULT_NAV_TITLE: &str = "Inbox";
const DEFAULT_NO_MESSAGES_TITLE: &str = "No saved messages";
const DEFAULT_NO_MESSAGES_BODY: &str = "Check again later!";

/// Text shown around the message list.
///
/// Missing or empty values fall back to the built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct InboxCustomizations {
    pub nav_title: Option<String>,
    pub no_messages_title: Option<String>,
    pub no_messages_body: Option<String>,
}

impl InboxCustomizations {
    /// Load customizations from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> InboxResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| InboxError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| InboxError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn nav_title(&self) -> &str {
        non_empty_or(&self.nav_title, DEFAULT_NAV_TITLE)
    }

    pub fn no_messages_title(&self) -> &str {
        non_empty_or(&self.no_messages_title, DEFAULT_NO_MESSAGES_TITLE)
    }

    pub fn no_messages_body(&self) -> &str {
        non_empty_or(&self.no_messages_body, DEFAULT_NO_MESSAGES_BODY)
    }
}

fn non_empty_or<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    match value.as_deref() {
        Some(text) if !text.is_empty() => text,
        _ => fallback,
    }
}

/// Configuration applied to every refresh.
#[derive(Clone)]
pub struct InboxConfig {
    pub filter: Option<MessageFilter>,
    pub comparator: Option<MessageComparator>,
    pub date_mapper: Option<DateMapper>,
    pub customizations: InboxCustomizations,
    pub slide_duration: Duration,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            filter: None,
            comparator: None,
            date_mapper: None,
            customizations: InboxCustomizations::default(),
            slide_duration: Duration::milliseconds(DEFAULT_SLIDE_DURATION_MS),
        }
    }
}

impl InboxConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&InboxMessage) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn with_comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&InboxMessage, &InboxMessage) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Some(Arc::new(comparator));
        self
    }

    pub fn with_date_mapper<F>(mut self, mapper: F) -> Self
    where
        F: Fn(&InboxMessage) -> Option<String> + Send + Sync + 'static,
    {
        self.date_mapper = Some(Arc::new(mapper));
        self
    }

    pub fn with_customizations(mut self, customizations: InboxCustomizations) -> Self {
        self.customizations = customizations;
        self
    }

    pub fn with_slide_duration(mut self, duration: Duration) -> Self {
        self.slide_duration = duration;
        self
    }
}

impl fmt::Debug for InboxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboxConfig")
            .field("filter", &self.filter.is_some())
            .field("comparator", &self.comparator.is_some())
            .field("date_mapper", &self.date_mapper.is_some())
            .field("customizations", &self.customizations)
            .field("slide_duration", &self.slide_duration)
            .finish()
    }
}
