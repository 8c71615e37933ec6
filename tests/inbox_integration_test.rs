//! Integration tests for the inbox controller.
//!
//! Drives a mounted [`Inbox`] through refresh, selection, return, delete and
//! content fetches against the in-memory message source.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use common::{message_at, row_ids, TestInboxBuilder};
use inbox_kit::adapters::SourceCall;
use inbox_kit::config::{InboxConfig, InboxCustomizations};
use inbox_kit::error::{InboxError, SourceError};
use inbox_kit::inbox::ListSurface;
use inbox_kit::models::{DeleteSource, HtmlContent, InAppLocation, InboxMessage};
use inbox_kit::navigation::{NavigationState, Pane};

// =============================================================================
// Refresh & ordering
// =============================================================================

#[tokio::test]
async fn test_newest_first_with_last_row_flag() {
    let (_source, _clock, inbox) = TestInboxBuilder::new()
        .with_message(message_at("a", 100))
        .with_message(message_at("b", 200))
        .mounted()
        .await;

    assert_eq!(row_ids(&inbox), vec!["b", "a"]);
    let is_last: Vec<bool> = inbox.rows().iter().map(|r| r.is_last).collect();
    assert_eq!(is_last, vec![false, true]);
    assert!(!inbox.is_loading());
}

#[tokio::test]
async fn test_default_date_format() {
    let created = Utc.with_ymd_and_hms(2024, 1, 5, 14, 30, 0).unwrap();
    let (_source, _clock, inbox) = TestInboxBuilder::new()
        .with_message(InboxMessage::new("a").with_created_at(created))
        .with_message(InboxMessage::new("undated"))
        .mounted()
        .await;

    assert_eq!(inbox.rows()[0].formatted_date, "Jan 5, 2024 at 2:30 PM");
    assert_eq!(inbox.rows()[1].formatted_date, "");
}

#[tokio::test]
async fn test_configured_filter_comparator_and_date_mapper() {
    let config = InboxConfig::new()
        .with_filter(|m| !m.read)
        .with_comparator(|a, b| a.message_id.cmp(&b.message_id))
        .with_date_mapper(|m| Some(format!("sent {}", m.message_id)));

    let (_source, _clock, inbox) = TestInboxBuilder::new()
        .with_config(config)
        .with_message(message_at("c", 300))
        .with_message(message_at("a", 100))
        .with_message(message_at("b", 200).with_read(true))
        .mounted()
        .await;

    assert_eq!(row_ids(&inbox), vec!["a", "c"]);
    assert_eq!(inbox.rows()[0].formatted_date, "sent a");
}

#[tokio::test]
async fn test_reconfigure_applies_on_next_refresh() {
    let (_source, _clock, mut inbox) = TestInboxBuilder::new()
        .with_message(message_at("a", 100))
        .with_message(message_at("b", 200))
        .mounted()
        .await;

    inbox.reconfigure(InboxConfig::new().with_filter(|m| m.message_id == "a"));
    assert_eq!(row_ids(&inbox), vec!["b", "a"]);

    inbox.refresh().await;
    assert_eq!(row_ids(&inbox), vec!["a"]);
}

#[tokio::test]
async fn test_fetch_failure_shows_empty_state() {
    let customizations = InboxCustomizations {
        no_messages_title: Some("Nothing yet".to_string()),
        ..Default::default()
    };
    let (source, _clock, mut inbox) = TestInboxBuilder::new()
        .with_config(InboxConfig::new().with_customizations(customizations))
        .with_message(message_at("a", 100))
        .build();
    source.set_fetch_should_fail(true);

    assert_eq!(inbox.list_surface(), ListSurface::Loading);
    inbox.mount().await;

    assert_eq!(
        inbox.list_surface(),
        ListSurface::Empty {
            title: "Nothing yet",
            body: "Check again later!"
        }
    );
    assert_eq!(inbox.nav_title(), "Inbox");
}

#[tokio::test]
async fn test_inbox_changed_triggers_refresh() {
    let (source, _clock, mut inbox) = TestInboxBuilder::new()
        .with_message(message_at("a", 100))
        .mounted()
        .await;

    assert!(!inbox.process_inbox_changes().await);

    source.push_message(message_at("b", 200));
    assert!(inbox.process_inbox_changes().await);
    assert_eq!(row_ids(&inbox), vec!["b", "a"]);
}

#[tokio::test]
async fn test_next_inbox_change_wakes_on_notification() {
    let (source, _clock, mut inbox) = TestInboxBuilder::new().mounted().await;

    source.notify_inbox_changed();
    assert!(inbox.next_inbox_change().await);

    inbox.unmount();
    assert!(!inbox.next_inbox_change().await);
    assert_eq!(source.subscriber_count(), 0);
}

#[tokio::test]
async fn test_last_completed_refresh_wins() {
    let (source, _clock, mut inbox) = TestInboxBuilder::new()
        .with_message(message_at("a", 100))
        .mounted()
        .await;

    let first = inbox.begin_refresh();
    let second = inbox.begin_refresh();

    let second_rows = second.await;
    source.set_messages(vec![
        message_at("a", 100),
        message_at("b", 200),
        message_at("c", 300),
    ]);
    let first_rows = first.await;

    inbox.apply_refresh(second_rows);
    inbox.apply_refresh(first_rows);
    assert_eq!(row_ids(&inbox), vec!["c", "b", "a"]);
}

#[tokio::test]
async fn test_refresh_resolving_after_unmount_is_dropped() {
    let (source, _clock, mut inbox) = TestInboxBuilder::new()
        .with_message(message_at("a", 100))
        .mounted()
        .await;

    let pending = inbox.begin_refresh();
    source.set_messages(Vec::new());
    inbox.unmount();

    inbox.apply_refresh(pending.await);
    assert_eq!(row_ids(&inbox), vec!["a"]);
}

// =============================================================================
// Selection & return
// =============================================================================

#[tokio::test]
async fn test_select_marks_read_and_opens_detail() {
    let (source, _clock, mut inbox) = TestInboxBuilder::new()
        .with_message(message_at("a", 100))
        .with_message(message_at("b", 200))
        .mounted()
        .await;
    source.clear_calls();

    inbox.select_row(0).unwrap();

    assert_eq!(
        inbox.navigation(),
        &NavigationState::Detail {
            index: 0,
            message_id: "b".to_string()
        }
    );
    assert!(inbox.rows()[0].read);
    assert!(!inbox.rows()[1].read);
    assert!(source.message("b").unwrap().read);
    assert_eq!(
        &source.calls()[..2],
        &[
            SourceCall::SetRead {
                message_id: "b".to_string(),
                read: true
            },
            SourceCall::TrackInAppOpen {
                message_id: "b".to_string(),
                location: InAppLocation::Inbox
            },
        ]
    );
}

#[tokio::test]
async fn test_select_while_in_detail_is_rejected() {
    let (_source, _clock, mut inbox) = TestInboxBuilder::new()
        .with_message(message_at("a", 100))
        .with_message(message_at("b", 200))
        .mounted()
        .await;

    inbox.select_row(0).unwrap();
    let err = inbox.select_row(1).unwrap_err();
    assert!(matches!(err, InboxError::InvalidTransition { .. }));
    assert!(!inbox.rows()[1].read);
}

#[tokio::test]
async fn test_failed_writes_keep_local_state() {
    let (source, _clock, mut inbox) = TestInboxBuilder::new()
        .with_message(message_at("a", 100))
        .mounted()
        .await;
    source.set_writes_should_fail(true);

    inbox.select_row(0).unwrap();
    assert!(inbox.rows()[0].read);
    assert_eq!(inbox.navigation().pane(), Pane::Detail);
}

#[tokio::test]
async fn test_return_callback_runs_after_slide() {
    let (_source, clock, mut inbox) = TestInboxBuilder::new()
        .with_message(message_at("a", 100))
        .mounted()
        .await;

    inbox.select_row(0).unwrap();
    clock.advance_ms(150);
    assert_eq!(inbox.pane_offset(), 0.5);
    clock.advance_ms(150);
    assert!(inbox.tick());

    let count = Arc::new(AtomicUsize::new(0));
    let seen = count.clone();
    assert!(inbox.return_to_list(Some(Box::new(move || {
        seen.fetch_add(1, Ordering::SeqCst);
    }))));
    assert_eq!(inbox.navigation(), &NavigationState::List);

    clock.advance_ms(299);
    assert!(!inbox.tick());
    assert_eq!(count.load(Ordering::SeqCst), 0);

    clock.advance_ms(1);
    assert!(inbox.tick());
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(inbox.pane_offset(), 0.0);
}

#[tokio::test]
async fn test_return_trigger_toggle() {
    let (_source, _clock, mut inbox) = TestInboxBuilder::new()
        .with_message(message_at("a", 100))
        .mounted()
        .await;

    // flipping while on the list changes nothing
    assert!(!inbox.set_return_trigger(true));

    inbox.select_row(0).unwrap();
    assert!(!inbox.set_return_trigger(true));
    assert_eq!(inbox.navigation().pane(), Pane::Detail);

    assert!(inbox.set_return_trigger(false));
    assert_eq!(inbox.navigation(), &NavigationState::List);
}

#[tokio::test]
async fn test_refresh_follows_selected_message() {
    let (source, _clock, mut inbox) = TestInboxBuilder::new()
        .with_message(message_at("a", 100))
        .with_message(message_at("b", 200))
        .mounted()
        .await;

    inbox.select_row(1).unwrap();
    source.push_message(message_at("c", 300));
    inbox.process_inbox_changes().await;

    assert_eq!(row_ids(&inbox), vec!["c", "b", "a"]);
    assert_eq!(inbox.navigation().selected_index(), Some(2));
    assert_eq!(inbox.selected_row().unwrap().message_id(), "a");
}

// =============================================================================
// Delete & content
// =============================================================================

#[tokio::test]
async fn test_delete_displayed_message_returns_to_list() {
    let (source, _clock, mut inbox) = TestInboxBuilder::new()
        .with_message(message_at("a", 100))
        .with_message(message_at("b", 200))
        .mounted()
        .await;

    inbox.select_row(1).unwrap();
    inbox.delete_row("a", DeleteSource::InboxSwipe).await;

    assert_eq!(inbox.navigation(), &NavigationState::List);
    assert_eq!(row_ids(&inbox), vec!["b"]);
    assert!(source.calls().contains(&SourceCall::Delete {
        message_id: "a".to_string(),
        location: InAppLocation::Inbox,
        source: DeleteSource::InboxSwipe,
    }));
}

#[tokio::test]
async fn test_delete_refreshes_once() {
    let (source, _clock, mut inbox) = TestInboxBuilder::new()
        .with_message(message_at("a", 100))
        .with_message(message_at("b", 200))
        .mounted()
        .await;
    source.clear_calls();

    inbox.delete_row("a", DeleteSource::InboxSwipe).await;
    assert!(!inbox.process_inbox_changes().await);

    let fetches = source
        .calls()
        .iter()
        .filter(|call| matches!(call, SourceCall::FetchMessages))
        .count();
    assert_eq!(fetches, 1);
    assert_eq!(row_ids(&inbox), vec!["b"]);
}

#[tokio::test]
async fn test_delete_other_message_keeps_detail() {
    let (_source, _clock, mut inbox) = TestInboxBuilder::new()
        .with_message(message_at("a", 100))
        .with_message(message_at("b", 200))
        .mounted()
        .await;

    inbox.select_row(1).unwrap();
    inbox.delete_row("b", DeleteSource::Unknown).await;

    assert_eq!(
        inbox.navigation(),
        &NavigationState::Detail {
            index: 0,
            message_id: "a".to_string()
        }
    );
}

#[tokio::test]
async fn test_delete_selected_uses_delete_button() {
    let (source, _clock, mut inbox) = TestInboxBuilder::new()
        .with_message(message_at("a", 100))
        .mounted()
        .await;

    assert!(inbox.delete_selected().await.is_err());

    inbox.select_row(0).unwrap();
    inbox.delete_selected().await.unwrap();

    assert_eq!(inbox.navigation(), &NavigationState::List);
    assert!(inbox.rows().is_empty());
    assert!(source.calls().contains(&SourceCall::Delete {
        message_id: "a".to_string(),
        location: InAppLocation::Inbox,
        source: DeleteSource::DeleteButton,
    }));
}

#[tokio::test]
async fn test_selected_content() {
    let (source, _clock, mut inbox) = TestInboxBuilder::new()
        .with_message(message_at("a", 100))
        .mounted()
        .await;
    source.set_content("a", HtmlContent::new("<p>hello</p>"));

    assert!(matches!(
        inbox.selected_content().await,
        Err(InboxError::InvalidTransition { .. })
    ));

    inbox.select_row(0).unwrap();
    assert_eq!(inbox.selected_content().await.unwrap().html, "<p>hello</p>");

    source.set_content_should_fail(true);
    let err = inbox.selected_content().await.unwrap_err();
    assert!(matches!(
        err,
        InboxError::Source(SourceError::RequestFailed { .. })
    ));
    assert!(err.is_retryable());
    // a failed body fetch leaves the detail pane alone
    assert_eq!(inbox.navigation().pane(), Pane::Detail);
}

#[test]
fn test_messages_from_bridge_json() {
    let raw = r#"[
        {"messageId": 42, "createdAt": 1704465000000, "read": true,
         "inboxMetadata": {"title": "Hi", "subtitle": "there", "icon": "https://example.com/i.png"}},
        {"messageId": "m2", "createdAt": "not a date"}
    ]"#;
    let messages: Vec<InboxMessage> = serde_json::from_str(raw).unwrap();

    assert_eq!(messages[0].message_id, "42");
    assert_eq!(
        messages[0].created_at,
        Some(Utc.with_ymd_and_hms(2024, 1, 5, 14, 30, 0).unwrap())
    );
    assert!(messages[0].read);
    assert_eq!(messages[1].created_at, None);
    assert!(!messages[1].silent_inbox);
}

#[test]
fn test_malformed_created_at_keeps_message_list() {
    let raw = r#"[
        {"messageId": "a"},
        {"messageId": "b", "createdAt": {}},
        {"messageId": "c", "createdAt": false}
    ]"#;
    let messages: Vec<InboxMessage> = serde_json::from_str(raw).unwrap();

    assert_eq!(messages.len(), 3);
    assert!(messages.iter().all(|m| m.created_at.is_none()));
}
