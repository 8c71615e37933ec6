//! Common test utilities for integration tests.
//!
//! Provides message fixtures, a manually advanced clock and a builder for
//! mounted inboxes backed by [`InMemoryMessageSource`].
//!
//! # Example
//!
//! ```ignore
//! use common::{message_at, TestInboxBuilder};
//!
//! let (source, clock, inbox) = TestInboxBuilder::new()
//!     .with_message(message_at("a", 100))
//!     .build();
//! ```

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use inbox_kit::adapters::InMemoryMessageSource;
use inbox_kit::config::InboxConfig;
use inbox_kit::inbox::Inbox;
use inbox_kit::models::{ImpressionRowInfo, InboxMessage};

/// Base instant every fixture timestamp is relative to.
pub fn base_time() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

/// A message created `secs` seconds after [`base_time`].
pub fn message_at(id: &str, secs: i64) -> InboxMessage {
    InboxMessage::new(id)
        .with_created_at(base_time() + Duration::seconds(secs))
        .with_title(format!("Title {}", id))
        .with_subtitle(format!("Subtitle {}", id))
}

pub fn rows(ids: &[&str]) -> Vec<ImpressionRowInfo> {
    ids.iter().map(|id| ImpressionRowInfo::new(*id)).collect()
}

/// Clock the test advances by hand.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(base_time())),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    pub fn advance_ms(&self, ms: i64) {
        *self.now.lock().unwrap() += Duration::milliseconds(ms);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance_ms(secs * 1000);
    }
}

/// Builder for inboxes wired to an in-memory source and a manual clock.
#[derive(Default)]
pub struct TestInboxBuilder {
    messages: Vec<InboxMessage>,
    config: Option<InboxConfig>,
}

impl TestInboxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, message: InboxMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_messages(mut self, messages: Vec<InboxMessage>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn with_config(mut self, config: InboxConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds an unmounted inbox.
    pub fn build(
        self,
    ) -> (
        Arc<InMemoryMessageSource>,
        ManualClock,
        Inbox<InMemoryMessageSource>,
    ) {
        let source = Arc::new(InMemoryMessageSource::with_messages(self.messages));
        let clock = ManualClock::new();
        let tick = clock.clone();
        let inbox = Inbox::new(Arc::clone(&source), self.config.unwrap_or_default())
            .with_clock(move || tick.now());
        (source, clock, inbox)
    }

    /// Builds and mounts the inbox.
    pub async fn mounted(
        self,
    ) -> (
        Arc<InMemoryMessageSource>,
        ManualClock,
        Inbox<InMemoryMessageSource>,
    ) {
        let (source, clock, mut inbox) = self.build();
        inbox.mount().await;
        (source, clock, inbox)
    }
}

/// Ids of the inbox rows in display order.
pub fn row_ids(inbox: &Inbox<InMemoryMessageSource>) -> Vec<String> {
    inbox
        .rows()
        .iter()
        .map(|row| row.message_id().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new();
        clock.advance_ms(1500);
        assert_eq!(clock.now(), base_time() + Duration::milliseconds(1500));
    }

    #[test]
    fn test_message_fixture() {
        let message = message_at("a", 10);
        assert_eq!(message.message_id, "a");
        assert_eq!(message.created_at, Some(base_time() + Duration::seconds(10)));
    }
}
