//! List/detail navigation state machine.
//!
//! The inbox shows either the message list or one message's detail pane.
//! Switching panes starts a slide; the pane offset runs linearly from 0
//! (list) to 1 (detail) over the configured duration. Easing is left to the
//! renderer.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::error::{InboxError, InboxResult};

/// Called once the slide back to the list has finished.
pub type CompletionCallback = Box<dyn FnOnce() + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    List,
    Detail,
}

impl Pane {
    fn offset(&self) -> f64 {
        match self {
            Pane::List => 0.0,
            Pane::Detail => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NavigationState {
    #[default]
    List,
    Detail {
        /// Row index in the current display order
        index: usize,
        /// Message the index resolved to when selected
        message_id: String,
    },
}

impl NavigationState {
    pub fn pane(&self) -> Pane {
        match self {
            NavigationState::List => Pane::List,
            NavigationState::Detail { .. } => Pane::Detail,
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        match self {
            NavigationState::Detail { index, .. } => Some(*index),
            NavigationState::List => None,
        }
    }

    pub fn selected_message_id(&self) -> Option<&str> {
        match self {
            NavigationState::Detail { message_id, .. } => Some(message_id),
            NavigationState::List => None,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            NavigationState::List => "showing the list",
            NavigationState::Detail { .. } => "showing a message",
        }
    }
}

/// An in-flight pane slide.
pub struct SlideAnimation {
    pub target: Pane,
    from_offset: f64,
    started_at: DateTime<Utc>,
    duration: Duration,
    on_complete: Option<CompletionCallback>,
}

impl SlideAnimation {
    fn new(
        target: Pane,
        from_offset: f64,
        started_at: DateTime<Utc>,
        duration: Duration,
        on_complete: Option<CompletionCallback>,
    ) -> Self {
        Self {
            target,
            from_offset,
            started_at,
            duration,
            on_complete,
        }
    }

    /// Linear progress in `[0, 1]`.
    pub fn progress_at(&self, now: DateTime<Utc>) -> f64 {
        let total = self.duration.num_milliseconds();
        if total <= 0 {
            return 1.0;
        }
        let elapsed = (now - self.started_at).num_milliseconds();
        (elapsed as f64 / total as f64).clamp(0.0, 1.0)
    }

    pub fn offset_at(&self, now: DateTime<Utc>) -> f64 {
        let to = self.target.offset();
        self.from_offset + (to - self.from_offset) * self.progress_at(now)
    }

    pub fn is_finished_at(&self, now: DateTime<Utc>) -> bool {
        self.progress_at(now) >= 1.0
    }

    fn complete(mut self) {
        if let Some(callback) = self.on_complete.take() {
            callback();
        }
    }
}

impl std::fmt::Debug for SlideAnimation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlideAnimation")
            .field("target", &self.target)
            .field("from_offset", &self.from_offset)
            .field("started_at", &self.started_at)
            .field("duration", &self.duration)
            .field("has_callback", &self.on_complete.is_some())
            .finish()
    }
}

#[derive(Debug)]
pub struct Navigator {
    state: NavigationState,
    animation: Option<SlideAnimation>,
    /// Offset once the current animation (if any) settles
    settled_offset: f64,
    slide_duration: Duration,
}

impl Navigator {
    pub fn new(slide_duration: Duration) -> Self {
        Self {
            state: NavigationState::List,
            animation: None,
            settled_offset: 0.0,
            slide_duration,
        }
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn pane(&self) -> Pane {
        self.state.pane()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn set_slide_duration(&mut self, duration: Duration) {
        self.slide_duration = duration;
    }

    /// Pane offset at `now`: 0 is the list, 1 the detail pane.
    pub fn offset_at(&self, now: DateTime<Utc>) -> f64 {
        match &self.animation {
            Some(animation) => animation.offset_at(now),
            None => self.settled_offset,
        }
    }

    /// `List -> Detail(index)`: start the slide, then switch state.
    pub fn show_detail(
        &mut self,
        index: usize,
        message_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> InboxResult<()> {
        if self.state != NavigationState::List {
            return Err(InboxError::InvalidTransition {
                action: "select a row",
                state: self.state.describe(),
            });
        }

        self.begin_slide(Pane::Detail, now, None);
        self.state = NavigationState::Detail {
            index,
            message_id: message_id.into(),
        };
        debug!("Navigation: list -> detail({})", index);
        Ok(())
    }

    /// `Detail -> List`: start the slide back, then switch state.
    ///
    /// `on_complete` runs once the slide finishes (see [`Navigator::tick`]).
    /// Returns false, dropping the callback unrun, when the list is already
    /// showing.
    pub fn return_to_list(
        &mut self,
        now: DateTime<Utc>,
        on_complete: Option<CompletionCallback>,
    ) -> bool {
        if self.state == NavigationState::List {
            return false;
        }

        self.begin_slide(Pane::List, now, on_complete);
        self.state = NavigationState::List;
        debug!("Navigation: detail -> list");
        true
    }

    /// Point the detail pane at a new index for the same message.
    pub fn reindex(&mut self, new_index: usize) {
        if let NavigationState::Detail { index, .. } = &mut self.state {
            *index = new_index;
        }
    }

    /// Settle a finished animation and run its callback.
    ///
    /// Returns true when an animation completed on this tick.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        let finished = self
            .animation
            .as_ref()
            .is_some_and(|animation| animation.is_finished_at(now));
        if !finished {
            return false;
        }

        if let Some(animation) = self.animation.take() {
            self.settled_offset = animation.target.offset();
            animation.complete();
        }
        true
    }

    fn begin_slide(
        &mut self,
        target: Pane,
        now: DateTime<Utc>,
        on_complete: Option<CompletionCallback>,
    ) {
        let from_offset = self.offset_at(now);
        // an interrupted slide still reports completion
        if let Some(previous) = self.animation.take() {
            previous.complete();
        }
        self.settled_offset = target.offset();
        self.animation = Some(SlideAnimation::new(
            target,
            from_offset,
            now,
            self.slide_duration,
            on_complete,
        ));
    }
}
