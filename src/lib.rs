//! Inbox Kit - view-model layer for a message inbox
//!
//! Turns the messages a [`traits::MessageSource`] provides into ordered,
//! display-ready rows, tracks which rows are on screen during an inbox
//! session, and drives list/detail navigation.

pub mod adapters;
pub mod config;
pub mod error;
pub mod impressions;
pub mod inbox;
pub mod models;
pub mod navigation;
pub mod pipeline;
pub mod traits;
