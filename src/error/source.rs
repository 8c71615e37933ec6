//! Errors reported by the messaging runtime behind [`crate::traits::MessageSource`].

use thiserror::Error;

/// Failure of a call into the message source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The runtime bridge is not initialized or has gone away
    #[error("Message source unavailable: {0}")]
    Unavailable(String),

    /// A request reached the runtime but failed
    #[error("{operation} failed: {message}")]
    RequestFailed { operation: String, message: String },

    /// No content exists for the requested message
    #[error("No content for message {message_id}")]
    ContentNotFound { message_id: String },

    /// The runtime returned data this crate could not decode
    #[error("Malformed payload: {0}")]
    Decode(String),
}

impl SourceError {
    pub fn request_failed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        SourceError::RequestFailed {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Check if the request may succeed when repeated.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SourceError::Unavailable(_) | SourceError::RequestFailed { .. }
        )
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            SourceError::Unavailable(_) => "E_SRC_UNAVAILABLE",
            SourceError::RequestFailed { .. } => "E_SRC_REQUEST",
            SourceError::ContentNotFound { .. } => "E_SRC_NO_CONTENT",
            SourceError::Decode(_) => "E_SRC_DECODE",
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            SourceError::Unavailable(_) | SourceError::RequestFailed { .. } => {
                "Messages could not be loaded right now. Please try again.".to_string()
            }
            SourceError::ContentNotFound { .. } => {
                "This message is no longer available.".to_string()
            }
            SourceError::Decode(_) => "This message could not be displayed.".to_string(),
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Decode(err.to_string())
    }
}
