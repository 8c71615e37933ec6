//! Message source trait abstraction.
//!
//! The messaging runtime owns message storage, HTML content, read/delete
//! persistence and analytics. The inbox only talks to it through
//! [`MessageSource`], so tests and the demo binary can run against
//! [`crate::adapters::InMemoryMessageSource`].

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::SourceError;
use crate::models::{
    DeleteSource, HtmlContent, ImpressionRowInfo, InAppLocation, InboxMessage, SessionSummary,
};

/// Signal that the runtime's message set changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboxChanged;

/// Handle for inbox-changed notifications.
///
/// Dropping the handle unsubscribes.
#[derive(Debug)]
pub struct InboxSubscription {
    rx: broadcast::Receiver<InboxChanged>,
}

impl InboxSubscription {
    pub fn new(rx: broadcast::Receiver<InboxChanged>) -> Self {
        Self { rx }
    }

    /// Drain queued notifications without waiting.
    ///
    /// Returns true if at least one change was pending. Several pending
    /// changes collapse into one, since any of them calls for the same
    /// full refresh.
    pub fn take_pending(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.rx.try_recv() {
                Ok(InboxChanged) | Err(broadcast::error::TryRecvError::Lagged(_)) => {
                    changed = true;
                }
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => return changed,
            }
        }
    }

    /// Wait for the next change.
    ///
    /// Returns false once the source has closed its side.
    pub async fn changed(&mut self) -> bool {
        match self.rx.recv().await {
            Ok(InboxChanged) | Err(broadcast::error::RecvError::Lagged(_)) => true,
            Err(broadcast::error::RecvError::Closed) => false,
        }
    }
}

/// Trait for the messaging runtime behind the inbox.
///
/// Fetches are async requests. Everything else is fire-and-forget: the
/// returned `Result` only exists so failures can be logged, and the inbox
/// never retries or rolls back local state because of one.
///
/// # Example
///
/// ```ignore
/// use inbox_kit::traits::MessageSource;
///
/// async fn unread_count<S: MessageSource>(source: &S) -> usize {
///     match source.fetch_messages().await {
///         Ok(messages) => messages.iter().filter(|m| !m.read).count(),
///         Err(_) => 0,
///     }
/// }
/// ```
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Fetch the current inbox message set, in no particular order.
    async fn fetch_messages(&self) -> Result<Vec<InboxMessage>, SourceError>;

    /// Fetch the rich body for one message.
    async fn fetch_content(&self, message_id: &str) -> Result<HtmlContent, SourceError>;

    /// Persist the read flag for a message.
    fn set_read(&self, message_id: &str, read: bool) -> Result<(), SourceError>;

    /// Delete a message. The runtime follows up with an inbox-changed signal.
    fn delete_message(
        &self,
        message_id: &str,
        location: InAppLocation,
        source: DeleteSource,
    ) -> Result<(), SourceError>;

    /// Record that a message was opened.
    fn track_in_app_open(
        &self,
        message: &InboxMessage,
        location: InAppLocation,
    ) -> Result<(), SourceError>;

    /// Open an inbox session with the visible rows at entry.
    fn start_session(&self, rows: &[ImpressionRowInfo]) -> Result<(), SourceError>;

    /// Close the inbox session, reporting its impressions.
    fn end_session(&self, summary: &SessionSummary) -> Result<(), SourceError>;

    /// Report the rows currently on screen.
    fn update_visible_rows(&self, rows: &[ImpressionRowInfo]) -> Result<(), SourceError>;

    /// Subscribe to inbox-changed notifications.
    fn subscribe_inbox_changed(&self) -> InboxSubscription;
}
