//! Visible-row set, per-row impression records and the session window.
//!
//! The tracker is pure state: it decides what should be reported and hands
//! it back to the caller, which forwards it to the message source.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::models::{Impression, ImpressionRowInfo, SessionSummary};

/// The currently open session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionWindow {
    pub id: Uuid,
    pub opened_at: DateTime<Utc>,
    /// Visible rows at open; replaced by a repeated start while open
    pub start_rows: Vec<ImpressionRowInfo>,
}

#[derive(Debug, Clone)]
struct ImpressionRecord {
    row: ImpressionRowInfo,
    display_count: u32,
    on_screen: Duration,
    visible_since: Option<DateTime<Utc>>,
}

impl ImpressionRecord {
    fn new(row: ImpressionRowInfo) -> Self {
        Self {
            row,
            display_count: 0,
            on_screen: Duration::zero(),
            visible_since: None,
        }
    }

    fn start(&mut self, now: DateTime<Utc>) {
        if self.visible_since.is_none() {
            self.display_count += 1;
            self.visible_since = Some(now);
        }
    }

    fn stop(&mut self, now: DateTime<Utc>) {
        if let Some(since) = self.visible_since.take() {
            // clock going backwards must not shrink the total
            self.on_screen = self.on_screen + (now - since).max(Duration::zero());
        }
    }

    fn finalize(mut self, now: DateTime<Utc>) -> Impression {
        self.stop(now);
        Impression {
            message_id: self.row.message_id,
            silent_inbox: self.row.silent_inbox,
            display_count: self.display_count,
            display_duration_secs: self.on_screen.num_milliseconds() as f64 / 1000.0,
        }
    }
}

#[derive(Debug, Default)]
pub struct ImpressionTracker {
    visible: Vec<ImpressionRowInfo>,
    /// In first-seen order; only populated while a session is open
    records: Vec<ImpressionRecord>,
    session: Option<SessionWindow>,
}

impl ImpressionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible_rows(&self) -> &[ImpressionRowInfo] {
        &self.visible
    }

    pub fn session(&self) -> Option<&SessionWindow> {
        self.session.as_ref()
    }

    pub fn is_session_open(&self) -> bool {
        self.session.is_some()
    }

    /// Replace the visible set.
    ///
    /// While a session is open, rows entering the set start an impression
    /// and rows leaving it have their on-screen time accumulated.
    pub fn update_visible_rows(&mut self, rows: Vec<ImpressionRowInfo>, now: DateTime<Utc>) {
        if self.session.is_some() {
            for record in &mut self.records {
                if !rows.contains(&record.row) {
                    record.stop(now);
                }
            }
            for row in &rows {
                self.record_for(row).start(now);
            }
        }
        self.visible = rows;
    }

    /// Open a session with `rows` as the entry snapshot.
    ///
    /// Returns the new window when one was opened. When a window is already
    /// open only its entry snapshot is replaced and `None` is returned, so
    /// the caller never reports a second open.
    pub fn start_session(
        &mut self,
        rows: Vec<ImpressionRowInfo>,
        now: DateTime<Utc>,
    ) -> Option<&SessionWindow> {
        if let Some(window) = self.session.as_mut() {
            debug!("Session {} already open, replacing entry snapshot", window.id);
            window.start_rows = rows;
            return None;
        }

        let window = SessionWindow {
            id: Uuid::new_v4(),
            opened_at: now,
            start_rows: rows.clone(),
        };
        debug!("Opening session {} with {} visible rows", window.id, rows.len());
        self.session = Some(window);
        self.update_visible_rows(rows, now);
        self.session.as_ref()
    }

    /// Close the open session with `rows` as the exit snapshot.
    ///
    /// All impression records are finalized into the summary and dropped.
    /// Without an open session this is a no-op returning `None`.
    pub fn end_session(
        &mut self,
        rows: Vec<ImpressionRowInfo>,
        now: DateTime<Utc>,
    ) -> Option<SessionSummary> {
        let window = self.session.take()?;
        let impressions = std::mem::take(&mut self.records)
            .into_iter()
            .map(|record| record.finalize(now))
            .collect();

        debug!("Closing session {}", window.id);
        Some(SessionSummary {
            session_id: window.id,
            started_at: window.opened_at,
            ended_at: now,
            start_rows: window.start_rows,
            end_rows: rows,
            impressions,
        })
    }

    fn record_for(&mut self, row: &ImpressionRowInfo) -> &mut ImpressionRecord {
        let index = match self.records.iter().position(|r| &r.row == row) {
            Some(index) => index,
            None => {
                self.records.push(ImpressionRecord::new(row.clone()));
                self.records.len() - 1
            }
        };
        &mut self.records[index]
    }
}
