//! Trait abstractions for dependency injection and testability.
//!
//! - [`MessageSource`] - the messaging runtime that owns messages, content,
//!   read/delete state and session analytics

pub mod message_source;

pub use message_source::{InboxChanged, InboxSubscription, MessageSource};
