//! Concrete implementations of trait abstractions.
//!
//! - [`InMemoryMessageSource`] - in-process message source that records every
//!   call; backs the integration tests and the demo binary

pub mod in_memory;

pub use in_memory::{InMemoryMessageSource, SourceCall};
