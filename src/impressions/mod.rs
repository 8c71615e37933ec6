//! Impression tracking and session bracketing.
//!
//! - [`ImpressionTracker`] - visible rows, per-row impressions, the open [`SessionWindow`]
//! - [`LifecycleGate`] - focus/foreground/mount conjunction deciding when a session is open

mod gate;
mod tracker;

pub use gate::{AppState, GateTransition, LifecycleGate};
pub use tracker::{ImpressionTracker, SessionWindow};
