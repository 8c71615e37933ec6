//! Error handling for the inbox view-model layer.
//!
//! - **Error Categories**: High-level classification for handling decisions
//! - **Source Errors**: Failures reported by the messaging runtime
//! - **Unified Error Type**: `InboxError` for every fallible inbox operation
//! - **Result Type Alias**: `InboxResult<T>`
//!
//! Most collaborator calls are best-effort and never surface here; see
//! [`BestEffort`].
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Source | Runtime not ready, request failed | Yes |
//! | Navigation | Wrong state or bad row index | No |
//! | Configuration | Bad config file | No |
//! | System | Config file unreadable | No |

mod category;
mod inbox_error;
mod result;
mod source;

pub use category::ErrorCategory;
pub use inbox_error::InboxError;
pub use result::{BestEffort, InboxResult};
pub use source::SourceError;
