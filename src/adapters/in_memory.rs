//! In-memory message source.
//!
//! Holds messages and content in memory, records every call it receives and
//! can be told to fail individual operations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::SourceError;
use crate::models::{
    DeleteSource, HtmlContent, ImpressionRowInfo, InAppLocation, InboxMessage, SessionSummary,
};
use crate::traits::{InboxChanged, InboxSubscription, MessageSource};

/// A call received by [`InMemoryMessageSource`].
#[derive(Debug, Clone, PartialEq)]
pub enum SourceCall {
    FetchMessages,
    FetchContent(String),
    SetRead { message_id: String, read: bool },
    Delete {
        message_id: String,
        location: InAppLocation,
        source: DeleteSource,
    },
    TrackInAppOpen {
        message_id: String,
        location: InAppLocation,
    },
    StartSession(Vec<ImpressionRowInfo>),
    EndSession(SessionSummary),
    UpdateVisibleRows(Vec<ImpressionRowInfo>),
}

#[derive(Debug, Default)]
struct SourceState {
    messages: Vec<InboxMessage>,
    contents: HashMap<String, HtmlContent>,
    calls: Vec<SourceCall>,
    fetch_should_fail: bool,
    content_should_fail: bool,
    writes_should_fail: bool,
}

/// In-memory message source for tests and demos.
///
/// # Example
///
/// ```ignore
/// use inbox_kit::adapters::InMemoryMessageSource;
/// use inbox_kit::models::InboxMessage;
///
/// let source = InMemoryMessageSource::with_messages(vec![InboxMessage::new("m1")]);
/// source.notify_inbox_changed();
/// assert_eq!(source.session_balance(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryMessageSource {
    state: Arc<Mutex<SourceState>>,
    changed_tx: broadcast::Sender<InboxChanged>,
}

impl InMemoryMessageSource {
    pub fn new() -> Self {
        let (changed_tx, _) = broadcast::channel(32);
        Self {
            state: Arc::new(Mutex::new(SourceState::default())),
            changed_tx,
        }
    }

    pub fn with_messages(messages: Vec<InboxMessage>) -> Self {
        let source = Self::new();
        source.state().messages = messages;
        source
    }

    fn state(&self) -> MutexGuard<'_, SourceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the stored messages without notifying subscribers.
    pub fn set_messages(&self, messages: Vec<InboxMessage>) {
        self.state().messages = messages;
    }

    /// Add a message and notify subscribers.
    pub fn push_message(&self, message: InboxMessage) {
        self.state().messages.push(message);
        self.notify_inbox_changed();
    }

    pub fn set_content(&self, message_id: impl Into<String>, content: HtmlContent) {
        self.state().contents.insert(message_id.into(), content);
    }

    pub fn messages(&self) -> Vec<InboxMessage> {
        self.state().messages.clone()
    }

    pub fn message(&self, message_id: &str) -> Option<InboxMessage> {
        self.state()
            .messages
            .iter()
            .find(|m| m.message_id == message_id)
            .cloned()
    }

    pub fn notify_inbox_changed(&self) {
        // no subscribers is fine
        let _ = self.changed_tx.send(InboxChanged);
    }

    pub fn subscriber_count(&self) -> usize {
        self.changed_tx.receiver_count()
    }

    pub fn set_fetch_should_fail(&self, should_fail: bool) {
        self.state().fetch_should_fail = should_fail;
    }

    pub fn set_content_should_fail(&self, should_fail: bool) {
        self.state().content_should_fail = should_fail;
    }

    /// Make every fire-and-forget call return an error (after recording it).
    pub fn set_writes_should_fail(&self, should_fail: bool) {
        self.state().writes_should_fail = should_fail;
    }

    pub fn calls(&self) -> Vec<SourceCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn session_starts(&self) -> usize {
        self.count_calls(|c| matches!(c, SourceCall::StartSession(_)))
    }

    pub fn session_ends(&self) -> usize {
        self.count_calls(|c| matches!(c, SourceCall::EndSession(_)))
    }

    /// Session opens minus closes; 1 while a session is open, otherwise 0.
    pub fn session_balance(&self) -> i64 {
        self.session_starts() as i64 - self.session_ends() as i64
    }

    pub fn session_summaries(&self) -> Vec<SessionSummary> {
        self.state()
            .calls
            .iter()
            .filter_map(|c| match c {
                SourceCall::EndSession(summary) => Some(summary.clone()),
                _ => None,
            })
            .collect()
    }

    /// Most recent visible-row report, if any.
    pub fn last_visible_rows(&self) -> Option<Vec<ImpressionRowInfo>> {
        self.state().calls.iter().rev().find_map(|c| match c {
            SourceCall::UpdateVisibleRows(rows) => Some(rows.clone()),
            _ => None,
        })
    }

    fn count_calls(&self, predicate: impl Fn(&SourceCall) -> bool) -> usize {
        self.state().calls.iter().filter(|c| predicate(*c)).count()
    }

    fn record_write(&self, call: SourceCall) -> Result<(), SourceError> {
        let mut state = self.state();
        state.calls.push(call);
        if state.writes_should_fail {
            return Err(SourceError::Unavailable("Mock write failure".to_string()));
        }
        Ok(())
    }
}

impl Default for InMemoryMessageSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageSource for InMemoryMessageSource {
    async fn fetch_messages(&self) -> Result<Vec<InboxMessage>, SourceError> {
        let mut state = self.state();
        state.calls.push(SourceCall::FetchMessages);
        if state.fetch_should_fail {
            return Err(SourceError::request_failed(
                "fetch_messages",
                "Mock fetch failure",
            ));
        }
        Ok(state.messages.clone())
    }

    async fn fetch_content(&self, message_id: &str) -> Result<HtmlContent, SourceError> {
        let mut state = self.state();
        state
            .calls
            .push(SourceCall::FetchContent(message_id.to_string()));
        if state.content_should_fail {
            return Err(SourceError::request_failed(
                "fetch_content",
                "Mock content failure",
            ));
        }
        state
            .contents
            .get(message_id)
            .cloned()
            .ok_or_else(|| SourceError::ContentNotFound {
                message_id: message_id.to_string(),
            })
    }

    fn set_read(&self, message_id: &str, read: bool) -> Result<(), SourceError> {
        self.record_write(SourceCall::SetRead {
            message_id: message_id.to_string(),
            read,
        })?;
        if let Some(message) = self
            .state()
            .messages
            .iter_mut()
            .find(|m| m.message_id == message_id)
        {
            message.read = read;
        }
        Ok(())
    }

    fn delete_message(
        &self,
        message_id: &str,
        location: InAppLocation,
        source: DeleteSource,
    ) -> Result<(), SourceError> {
        self.record_write(SourceCall::Delete {
            message_id: message_id.to_string(),
            location,
            source,
        })?;
        let removed = {
            let mut state = self.state();
            let before = state.messages.len();
            state.messages.retain(|m| m.message_id != message_id);
            state.messages.len() != before
        };
        if removed {
            debug!("In-memory source deleted {}", message_id);
            self.notify_inbox_changed();
        }
        Ok(())
    }

    fn track_in_app_open(
        &self,
        message: &InboxMessage,
        location: InAppLocation,
    ) -> Result<(), SourceError> {
        self.record_write(SourceCall::TrackInAppOpen {
            message_id: message.message_id.clone(),
            location,
        })
    }

    fn start_session(&self, rows: &[ImpressionRowInfo]) -> Result<(), SourceError> {
        self.record_write(SourceCall::StartSession(rows.to_vec()))
    }

    fn end_session(&self, summary: &SessionSummary) -> Result<(), SourceError> {
        self.record_write(SourceCall::EndSession(summary.clone()))
    }

    fn update_visible_rows(&self, rows: &[ImpressionRowInfo]) -> Result<(), SourceError> {
        self.record_write(SourceCall::UpdateVisibleRows(rows.to_vec()))
    }

    fn subscribe_inbox_changed(&self) -> InboxSubscription {
        InboxSubscription::new(self.changed_tx.subscribe())
    }
}
