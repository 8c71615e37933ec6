//! Unified error type for inbox operations.

use std::path::PathBuf;

use thiserror::Error;

use super::category::ErrorCategory;
use super::source::SourceError;

/// Error returned by fallible [`crate::inbox::Inbox`] operations.
///
/// Read, delete, session and visibility calls never produce one of these:
/// they are best-effort and only logged.
#[derive(Debug, Error)]
pub enum InboxError {
    /// The message source failed
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A row index outside the displayed list
    #[error("Row {index} out of range (list has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    /// An action that is not valid in the current navigation state
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    /// The inbox is not mounted
    #[error("Inbox is not mounted")]
    NotMounted,

    /// Configuration file could not be read
    #[error("Failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed
    #[error("Invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl InboxError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            InboxError::Source(_) => ErrorCategory::Source,
            InboxError::RowOutOfRange { .. }
            | InboxError::InvalidTransition { .. }
            | InboxError::NotMounted => ErrorCategory::Navigation,
            InboxError::ConfigIo { .. } => ErrorCategory::System,
            InboxError::ConfigParse { .. } => ErrorCategory::Configuration,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            InboxError::Source(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            InboxError::Source(err) => err.error_code(),
            InboxError::RowOutOfRange { .. } => "E_NAV_ROW_RANGE",
            InboxError::InvalidTransition { .. } => "E_NAV_TRANSITION",
            InboxError::NotMounted => "E_NAV_NOT_MOUNTED",
            InboxError::ConfigIo { .. } => "E_CFG_IO",
            InboxError::ConfigParse { .. } => "E_CFG_PARSE",
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            InboxError::Source(err) => err.user_message(),
            InboxError::ConfigIo { path, .. } | InboxError::ConfigParse { path, .. } => {
                format!("Could not load inbox settings from {}", path.display())
            }
            _ => "Something went wrong in the inbox. Please try again.".to_string(),
        }
    }

    /// Get a recovery hint based on the error category.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}
