mod support;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use queue_core::{CursorPosition, FeedbackEvent, SubmissionOutcome, ToastPlacement};
use queue_engine::{
    FeedbackChannel, FeedbackDispatcher, FeedbackError, PageDocument, TabRegistry, BADGE_ERR_COLOR,
    BADGE_OK_COLOR,
};
use serde_json::json;
use support::{settle, RecordingBadge, RecordingNotifier, RecordingToasts};
use tokio::time::advance;

struct Fixture {
    badge: Arc<RecordingBadge>,
    notifier: Arc<RecordingNotifier>,
    toasts: Arc<RecordingToasts>,
    tabs: Arc<TabRegistry>,
    dispatcher: FeedbackDispatcher,
}

fn fixture() -> Fixture {
    let badge = RecordingBadge::new();
    let notifier = RecordingNotifier::new();
    let toasts = RecordingToasts::new();
    let tabs = Arc::new(TabRegistry::new(toasts.clone()));
    let dispatcher = FeedbackDispatcher::new(badge.clone(), notifier.clone(), tabs.clone());
    Fixture {
        badge,
        notifier,
        toasts,
        tabs,
        dispatcher,
    }
}

fn success(origin_tab: Option<u32>, cursor: Option<CursorPosition>) -> FeedbackEvent {
    FeedbackEvent::from_outcome(&SubmissionOutcome::Success(json!({})), origin_tab, cursor)
}

fn server_error() -> FeedbackEvent {
    FeedbackEvent::from_outcome(
        &SubmissionOutcome::HttpError {
            status: 500,
            body: "queue full".to_string(),
        },
        None,
        None,
    )
}

#[tokio::test(start_paused = true)]
async fn success_sets_badge_notifies_and_toasts_origin_tab() {
    queue_logging::initialize_for_tests();
    let fx = fixture();
    let tab = fx.tabs.open_tab("https://www.youtube.com/", PageDocument::blank());

    let failures = fx
        .dispatcher
        .dispatch(&success(Some(tab), Some(CursorPosition::new(30, 40))))
        .await;
    settle().await;

    assert!(failures.is_empty());
    assert_eq!(
        fx.badge.current(),
        Some(("OK".to_string(), BADGE_OK_COLOR.to_string()))
    );
    assert_eq!(fx.notifier.titles(), vec!["Cosmos Queue"]);
    assert_eq!(fx.notifier.messages(), vec!["Added to queue"]);

    let rendered = fx.toasts.rendered();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].text, "Added to queue");
    assert!(rendered[0].success);
    assert_eq!(
        rendered[0].placement,
        ToastPlacement::NearPointer { left: 42, top: 52 }
    );
}

#[tokio::test(start_paused = true)]
async fn failure_without_origin_tab_skips_toast() {
    let fx = fixture();
    fx.tabs.open_tab("https://www.youtube.com/", PageDocument::blank());

    let failures = fx.dispatcher.dispatch(&server_error()).await;
    settle().await;

    assert!(failures.is_empty());
    assert_eq!(
        fx.badge.current(),
        Some(("ERR".to_string(), BADGE_ERR_COLOR.to_string()))
    );
    assert_eq!(
        fx.notifier.messages(),
        vec!["Server error (500): queue full"]
    );
    assert!(fx.toasts.rendered().is_empty());
}

#[tokio::test(start_paused = true)]
async fn badge_clears_two_seconds_after_it_was_set() {
    let fx = fixture();
    fx.dispatcher.dispatch(&success(None, None)).await;
    settle().await;

    advance(Duration::from_millis(1_999)).await;
    settle().await;
    assert!(fx.badge.current().is_some());

    advance(Duration::from_millis(2)).await;
    settle().await;
    assert_eq!(fx.badge.current(), None);
}

#[tokio::test(start_paused = true)]
async fn overlapping_clear_timers_run_independently() {
    let fx = fixture();
    fx.dispatcher.dispatch(&success(None, None)).await;
    settle().await;

    advance(Duration::from_millis(1_000)).await;
    fx.dispatcher.dispatch(&server_error()).await;
    settle().await;

    // The first timer fires at 2s and clears the newer ERR badge.
    advance(Duration::from_millis(1_001)).await;
    settle().await;
    assert_eq!(fx.badge.current(), None);
    assert_eq!(
        fx.badge.history(),
        vec![Some("OK".to_string()), Some("ERR".to_string()), None]
    );

    advance(Duration::from_millis(1_000)).await;
    settle().await;
    assert_eq!(
        fx.badge.history(),
        vec![Some("OK".to_string()), Some("ERR".to_string()), None, None]
    );
}

#[tokio::test(start_paused = true)]
async fn broken_channels_are_reported_not_raised() {
    let fx = fixture();
    let tab = fx.tabs.open_tab("https://www.youtube.com/", PageDocument::blank());
    fx.tabs.close_tab(tab).unwrap();
    fx.badge.break_channel();
    fx.notifier.deny();

    let failures = fx.dispatcher.dispatch(&success(Some(tab), None)).await;

    let channels: Vec<FeedbackChannel> = failures
        .iter()
        .map(|failure| match failure {
            FeedbackError::ChannelUnavailable { channel, .. } => *channel,
        })
        .collect();
    assert_eq!(
        channels,
        vec![
            FeedbackChannel::Badge,
            FeedbackChannel::Notification,
            FeedbackChannel::Toast
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn notice_only_notifies() {
    let fx = fixture();
    assert!(fx
        .dispatcher
        .notice("No hovered link or active tab URL")
        .is_none());

    assert_eq!(
        fx.notifier.messages(),
        vec!["No hovered link or active tab URL"]
    );
    assert_eq!(fx.badge.current(), None);
    assert!(fx.badge.history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn progress_toast_goes_to_top_frame() {
    let fx = fixture();
    let tab = fx.tabs.open_tab("https://www.youtube.com/", PageDocument::blank());

    assert!(fx.dispatcher.progress_toast(tab).await.is_none());
    settle().await;

    assert_eq!(fx.toasts.texts(), vec!["Adding to queue…"]);
    assert!(fx.dispatcher.progress_toast(99).await.is_some());
}
