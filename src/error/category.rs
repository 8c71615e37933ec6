//! Error category classification for inbox operations.
//!
//! Categories drive how callers react to a failure: retry later, fix the
//! call site, or fix configuration.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The messaging runtime failed or is not ready.
    /// Generally transient and retryable.
    Source,

    /// An operation was invoked in the wrong navigation state or with a
    /// row index that does not exist. Not retryable as-is.
    Navigation,

    /// Invalid or unreadable configuration.
    Configuration,

    /// OS-level failures (file access while loading configuration).
    System,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient
    /// and the operation can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Source)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Source => "source",
            ErrorCategory::Navigation => "navigation",
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::System => "system",
        }
    }

    /// Returns a user-friendly description of the category.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCategory::Source => "Messaging runtime issue",
            ErrorCategory::Navigation => "Invalid inbox navigation",
            ErrorCategory::Configuration => "Configuration problem",
            ErrorCategory::System => "System error",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Source => "Pull to refresh or try again later",
            ErrorCategory::Navigation => {
                "This may be a bug. Please report this issue if it persists"
            }
            ErrorCategory::Configuration => "Check your inbox configuration",
            ErrorCategory::System => "Check file permissions and paths",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
