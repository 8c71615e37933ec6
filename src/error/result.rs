//! Result type alias for inbox operations.

use super::inbox_error::InboxError;

/// Type alias for Results using InboxError.
pub type InboxResult<T> = Result<T, InboxError>;

/// Extension trait for logging and discarding best-effort failures.
///
/// Calls into the message source that are fire-and-forget (read state,
/// deletes, session brackets) must never feed an error back into inbox
/// state; this trait gives them a single place to be logged.
pub trait BestEffort {
    /// Log the error at warn level under `operation` and drop it.
    fn best_effort(self, operation: &str);
}

impl<E: std::fmt::Display> BestEffort for Result<(), E> {
    fn best_effort(self, operation: &str) {
        if let Err(err) = self {
            tracing::warn!("{} failed (ignored): {}", operation, err);
        }
    }
}
