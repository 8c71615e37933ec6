//! Session gate driven by the three lifecycle signals.
//!
//! A session is open exactly while the inbox screen is focused, the app is
//! in the foreground and the inbox is mounted. Every input change is fed
//! through [`LifecycleGate`], which reports at most one edge per change, so
//! overlapping signals can never double-open or double-close.

use serde::{Deserialize, Serialize};

/// Process lifecycle state as reported by the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppState {
    #[default]
    Active,
    Inactive,
    Background,
}

impl AppState {
    pub fn is_foreground(&self) -> bool {
        matches!(self, AppState::Active)
    }
}

/// Edge produced when the gate output flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateTransition {
    Open,
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleGate {
    focused: bool,
    app_state: AppState,
    mounted: bool,
}

impl Default for LifecycleGate {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleGate {
    /// Focused and foregrounded, not yet mounted.
    pub fn new() -> Self {
        Self {
            focused: true,
            app_state: AppState::Active,
            mounted: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.focused && self.app_state.is_foreground() && self.mounted
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn app_state(&self) -> AppState {
        self.app_state
    }

    pub fn set_mounted(&mut self, mounted: bool) -> Option<GateTransition> {
        self.apply(|gate| gate.mounted = mounted)
    }

    pub fn set_focused(&mut self, focused: bool) -> Option<GateTransition> {
        self.apply(|gate| gate.focused = focused)
    }

    pub fn set_app_state(&mut self, app_state: AppState) -> Option<GateTransition> {
        self.apply(|gate| gate.app_state = app_state)
    }

    fn apply(&mut self, change: impl FnOnce(&mut Self)) -> Option<GateTransition> {
        let was_open = self.is_open();
        change(self);
        match (was_open, self.is_open()) {
            (false, true) => Some(GateTransition::Open),
            (true, false) => Some(GateTransition::Close),
            _ => None,
        }
    }
}
