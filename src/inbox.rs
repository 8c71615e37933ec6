//! Inbox controller.
//!
//! [`Inbox`] owns the displayed rows, the navigation state, the impression
//! tracker and the lifecycle gate, and forwards side effects to a
//! [`MessageSource`]. Everything runs on the host's event thread: methods
//! take `&mut self` and never block. Fetches are the only async work.
//!
//! ```text
//! MessageSource ──fetch──▶ pipeline::process ──▶ rows ──▶ host renders
//!       ▲                                              │
//!       │ session / visible rows / read / delete       │ visible rows, taps
//!       └────────────── Inbox ◀────────────────────────┘
//! ```

use std::future::Future;
use std::ops::Range;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::InboxConfig;
use crate::error::{BestEffort, InboxError, InboxResult};
use crate::impressions::{AppState, GateTransition, ImpressionTracker, LifecycleGate};
use crate::models::{DeleteSource, HtmlContent, ImpressionRowInfo, InAppLocation, RowViewModel};
use crate::navigation::{CompletionCallback, NavigationState, Navigator, Pane};
use crate::pipeline;
use crate::traits::{InboxSubscription, MessageSource};

/// Source of "now" for sessions, impressions and slides.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// What the list pane should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListSurface<'a> {
    /// First refresh still in flight
    Loading,
    Empty { title: &'a str, body: &'a str },
    Rows(&'a [RowViewModel]),
}

pub struct Inbox<S: MessageSource + 'static> {
    source: Arc<S>,
    config: InboxConfig,
    rows: Vec<RowViewModel>,
    loading: bool,
    navigator: Navigator,
    tracker: ImpressionTracker,
    gate: LifecycleGate,
    /// Rows the list viewport reports, kept while the detail pane hides them
    viewport_rows: Vec<ImpressionRowInfo>,
    subscription: Option<InboxSubscription>,
    return_trigger: bool,
    clock: Clock,
}

impl<S: MessageSource + 'static> Inbox<S> {
    pub fn new(source: Arc<S>, config: InboxConfig) -> Self {
        Self {
            source,
            navigator: Navigator::new(config.slide_duration),
            config,
            rows: Vec::new(),
            loading: true,
            tracker: ImpressionTracker::new(),
            gate: LifecycleGate::new(),
            viewport_rows: Vec::new(),
            subscription: None,
            return_trigger: false,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn config(&self) -> &InboxConfig {
        &self.config
    }

    pub fn rows(&self) -> &[RowViewModel] {
        &self.rows
    }

    pub fn navigation(&self) -> &NavigationState {
        self.navigator.state()
    }

    pub fn selected_row(&self) -> Option<&RowViewModel> {
        self.navigator
            .state()
            .selected_index()
            .and_then(|index| self.rows.get(index))
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_mounted(&self) -> bool {
        self.gate.is_mounted()
    }

    pub fn is_session_open(&self) -> bool {
        self.tracker.is_session_open()
    }

    pub fn lifecycle(&self) -> &LifecycleGate {
        &self.gate
    }

    /// Rows the impression tracker currently counts as visible.
    pub fn visible_rows(&self) -> &[ImpressionRowInfo] {
        self.tracker.visible_rows()
    }

    pub fn nav_title(&self) -> &str {
        self.config.customizations.nav_title()
    }

    pub fn list_surface(&self) -> ListSurface<'_> {
        if !self.rows.is_empty() {
            ListSurface::Rows(&self.rows)
        } else if self.loading {
            ListSurface::Loading
        } else {
            let custom = &self.config.customizations;
            ListSurface::Empty {
                title: custom.no_messages_title(),
                body: custom.no_messages_body(),
            }
        }
    }

    /// Pane offset for rendering: 0 is the list, 1 the detail pane.
    pub fn pane_offset(&self) -> f64 {
        self.navigator.offset_at(self.now())
    }

    /// Install a new configuration. Takes effect on the next refresh.
    pub fn reconfigure(&mut self, config: InboxConfig) {
        debug!("Inbox reconfigured: {:?}", config);
        self.navigator.set_slide_duration(config.slide_duration);
        self.config = config;
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Mount and load the first page of rows.
    pub async fn mount(&mut self) {
        self.activate();
        self.refresh().await;
    }

    /// Subscribe to inbox changes and mark the inbox mounted.
    ///
    /// Opens a session if the screen is focused and the app is active.
    pub fn activate(&mut self) {
        if self.gate.is_mounted() {
            return;
        }
        self.subscription = Some(self.source.subscribe_inbox_changed());
        let transition = self.gate.set_mounted(true);
        info!("Inbox mounted");
        self.apply_transition(transition);
    }

    /// Close any open session, then drop the inbox-changed subscription.
    ///
    /// Also runs on drop.
    pub fn unmount(&mut self) {
        if !self.gate.is_mounted() {
            return;
        }
        let transition = self.gate.set_mounted(false);
        self.apply_transition(transition);
        self.subscription = None;
        info!("Inbox unmounted");
    }

    pub fn set_focused(&mut self, focused: bool) {
        let transition = self.gate.set_focused(focused);
        self.apply_transition(transition);
    }

    pub fn set_app_state(&mut self, app_state: AppState) {
        let transition = self.gate.set_app_state(app_state);
        self.apply_transition(transition);
    }

    fn apply_transition(&mut self, transition: Option<GateTransition>) {
        let now = self.now();
        match transition {
            Some(GateTransition::Open) => {
                let rows = self.effective_visible_rows();
                if let Some(window) = self.tracker.start_session(rows.clone(), now) {
                    info!("Inbox session {} started", window.id);
                    self.source.start_session(&rows).best_effort("start_session");
                }
            }
            Some(GateTransition::Close) => {
                let rows = self.effective_visible_rows();
                if let Some(summary) = self.tracker.end_session(rows, now) {
                    info!(
                        "Inbox session {} ended after {:.1}s with {} impressions",
                        summary.session_id,
                        summary.duration_secs(),
                        summary.impressions.len()
                    );
                    self.source.end_session(&summary).best_effort("end_session");
                }
            }
            None => {}
        }
    }

    // ========================================================================
    // Visibility
    // ========================================================================

    /// Replace the set of rows the list viewport reports as on screen.
    ///
    /// While the detail pane is shown the report is held back and the
    /// tracker keeps seeing no rows; returning to the list republishes it.
    pub fn update_visible_rows(&mut self, rows: Vec<ImpressionRowInfo>) {
        self.viewport_rows = rows;
        if self.navigator.pane() == Pane::List {
            self.publish_visible_rows();
        } else {
            debug!("Detail pane shown, holding {} viewport rows", self.viewport_rows.len());
        }
    }

    /// [`Inbox::update_visible_rows`] by row index range, clamped to the list.
    pub fn update_visible_range(&mut self, range: Range<usize>) {
        let end = range.end.min(self.rows.len());
        let start = range.start.min(end);
        let rows = self.rows[start..end]
            .iter()
            .map(RowViewModel::impression_row)
            .collect();
        self.update_visible_rows(rows);
    }

    fn effective_visible_rows(&self) -> Vec<ImpressionRowInfo> {
        match self.navigator.pane() {
            Pane::List => self.viewport_rows.clone(),
            Pane::Detail => Vec::new(),
        }
    }

    fn publish_visible_rows(&mut self) {
        let rows = self.effective_visible_rows();
        let now = self.now();
        self.tracker.update_visible_rows(rows.clone(), now);
        self.source
            .update_visible_rows(&rows)
            .best_effort("update_visible_rows");
    }

    // ========================================================================
    // Refresh
    // ========================================================================

    /// Start a refresh without borrowing the inbox.
    ///
    /// The returned future fetches and processes messages with the current
    /// configuration; hand its output to [`Inbox::apply_refresh`]. A failed
    /// fetch yields an empty list. Several may be in flight; whichever is
    /// applied last wins.
    pub fn begin_refresh(&self) -> impl Future<Output = Vec<RowViewModel>> + Send + 'static {
        let source = Arc::clone(&self.source);
        let config = self.config.clone();
        async move {
            match source.fetch_messages().await {
                Ok(messages) => pipeline::process(messages, &config),
                Err(err) => {
                    warn!("Inbox fetch failed, showing empty inbox: {}", err);
                    Vec::new()
                }
            }
        }
    }

    /// Install freshly processed rows.
    ///
    /// Results arriving after unmount are dropped. An open detail pane
    /// follows its message to the message's new position, or returns to
    /// the list if the message is gone.
    pub fn apply_refresh(&mut self, rows: Vec<RowViewModel>) {
        if !self.gate.is_mounted() {
            debug!("Discarding refresh result for unmounted inbox");
            return;
        }
        self.rows = rows;
        self.loading = false;
        info!("Inbox refreshed: {} rows", self.rows.len());
        self.resolve_selection();
        self.prune_viewport_rows();
    }

    pub async fn refresh(&mut self) {
        let rows = self.begin_refresh().await;
        self.apply_refresh(rows);
    }

    fn resolve_selection(&mut self) {
        let Some(message_id) = self.navigator.state().selected_message_id().map(str::to_owned)
        else {
            return;
        };
        match self.rows.iter().position(|row| row.message_id() == message_id) {
            Some(index) => self.navigator.reindex(index),
            None => {
                info!("Displayed message {} left the inbox, returning to list", message_id);
                self.return_to_list(None);
            }
        }
    }

    /// Drop viewport rows whose message left the inbox.
    fn prune_viewport_rows(&mut self) {
        let before = self.viewport_rows.len();
        let rows = &self.rows;
        self.viewport_rows
            .retain(|info| rows.iter().any(|row| row.message_id() == info.message_id));
        if self.viewport_rows.len() != before && self.navigator.pane() == Pane::List {
            debug!("Pruned {} stale viewport rows", before - self.viewport_rows.len());
            self.publish_visible_rows();
        }
    }

    /// Refresh if an inbox-changed notification arrived since the last call.
    pub async fn process_inbox_changes(&mut self) -> bool {
        let pending = self
            .subscription
            .as_mut()
            .is_some_and(|subscription| subscription.take_pending());
        if pending {
            debug!("Inbox changed, refreshing");
            self.refresh().await;
        }
        pending
    }

    /// Wait for the next inbox-changed notification.
    ///
    /// Returns false when not subscribed or the source has shut down.
    pub async fn next_inbox_change(&mut self) -> bool {
        match self.subscription.as_mut() {
            Some(subscription) => subscription.changed().await,
            None => false,
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Open row `index` in the detail pane.
    ///
    /// Marks the row read locally and at the source, records the open,
    /// starts the slide and switches to `Detail(index)`. The tracker sees no
    /// visible rows until the list is shown again.
    pub fn select_row(&mut self, index: usize) -> InboxResult<()> {
        if !self.gate.is_mounted() {
            return Err(InboxError::NotMounted);
        }
        let len = self.rows.len();
        if index >= len {
            return Err(InboxError::RowOutOfRange { index, len });
        }
        if self.navigator.pane() != Pane::List {
            return Err(InboxError::InvalidTransition {
                action: "select a row",
                state: "showing a message",
            });
        }

        let now = self.now();
        let row = &mut self.rows[index];
        row.mark_read();
        let message = row.message.clone();

        self.source
            .set_read(&message.message_id, true)
            .best_effort("set_read");
        self.source
            .track_in_app_open(&message, InAppLocation::Inbox)
            .best_effort("track_in_app_open");
        self.navigator
            .show_detail(index, message.message_id.clone(), now)?;
        info!("Opened inbox message {} at row {}", message.message_id, index);

        self.publish_visible_rows();
        Ok(())
    }

    /// Slide back to the list. `on_complete` runs when the slide finishes.
    ///
    /// Returns false if the list is already showing.
    pub fn return_to_list(&mut self, on_complete: Option<CompletionCallback>) -> bool {
        let now = self.now();
        if !self.navigator.return_to_list(now, on_complete) {
            return false;
        }
        self.publish_visible_rows();
        true
    }

    /// External "return to inbox" toggle. Any change while a message is
    /// shown returns to the list.
    pub fn set_return_trigger(&mut self, trigger: bool) -> bool {
        if trigger == self.return_trigger {
            return false;
        }
        self.return_trigger = trigger;
        self.return_to_list(None)
    }

    /// Advance the pane slide; runs completion callbacks that are due.
    pub fn tick(&mut self) -> bool {
        let now = self.now();
        self.navigator.tick(now)
    }

    // ========================================================================
    // Delete / content
    // ========================================================================

    /// Delete a message and refresh.
    ///
    /// If the message is the one being displayed, navigation returns to the
    /// list first. The message never reappears in the visible rows. The
    /// inbox-changed signal the delete produces is consumed here.
    pub async fn delete_row(&mut self, message_id: &str, delete_source: DeleteSource) {
        self.source
            .delete_message(message_id, InAppLocation::Inbox, delete_source)
            .best_effort("delete_message");
        info!("Deleted inbox message {} ({:?})", message_id, delete_source);

        self.viewport_rows.retain(|info| info.message_id != message_id);
        if self.navigator.state().selected_message_id() == Some(message_id) {
            self.return_to_list(None);
        }
        self.refresh().await;
        if let Some(subscription) = self.subscription.as_mut() {
            subscription.take_pending();
        }
    }

    /// Delete the message in the detail pane via its delete button.
    pub async fn delete_selected(&mut self) -> InboxResult<()> {
        let message_id = self
            .navigator
            .state()
            .selected_message_id()
            .map(str::to_owned)
            .ok_or(InboxError::InvalidTransition {
                action: "delete the displayed message",
                state: "showing the list",
            })?;
        self.delete_row(&message_id, DeleteSource::DeleteButton).await;
        Ok(())
    }

    /// Fetch a message body without borrowing the inbox.
    pub fn request_content(
        &self,
        message_id: &str,
    ) -> impl Future<Output = InboxResult<HtmlContent>> + Send + 'static {
        let source = Arc::clone(&self.source);
        let message_id = message_id.to_string();
        async move {
            debug!("Fetching content for {}", message_id);
            source.fetch_content(&message_id).await.map_err(|err| {
                warn!("Content fetch for {} failed: {}", message_id, err);
                InboxError::from(err)
            })
        }
    }

    /// Fetch the body of the message in the detail pane.
    pub async fn selected_content(&self) -> InboxResult<HtmlContent> {
        let message_id = self
            .navigator
            .state()
            .selected_message_id()
            .ok_or(InboxError::InvalidTransition {
                action: "load message content",
                state: "showing the list",
            })?;
        self.request_content(message_id).await
    }
}

impl<S: MessageSource + 'static> Drop for Inbox<S> {
    fn drop(&mut self) {
        self.unmount();
    }
}
