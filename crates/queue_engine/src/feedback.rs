//! Badge, notification and in-page toast for a finished trigger.
//!
//! Every channel is best-effort. Failures are logged and handed back to the
//! caller as a list, never as an error.

use std::sync::Arc;
use std::time::Duration;

use queue_core::{
    FeedbackEvent, TabId, ToastRequest, NOTIFICATION_TITLE, PROGRESS_TOAST_TEXT, TOP_FRAME_ID,
};
use queue_logging::{queue_debug, queue_warn};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::host::BrowserHost;
use crate::{FeedbackChannel, FeedbackError};

pub const BADGE_OK_TEXT: &str = "OK";
pub const BADGE_OK_COLOR: &str = "#16a34a";
pub const BADGE_ERR_TEXT: &str = "ERR";
pub const BADGE_ERR_COLOR: &str = "#dc2626";
pub const BADGE_CLEAR_AFTER: Duration = Duration::from_secs(2);

/// Toolbar icon badge.
pub trait BadgeSurface: Send + Sync {
    fn set_badge(&self, text: &str, color: &str) -> Result<(), FeedbackError>;
    fn clear_badge(&self) -> Result<(), FeedbackError>;
}

/// System notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str) -> Result<(), FeedbackError>;
}

pub struct FeedbackDispatcher {
    badge: Arc<dyn BadgeSurface>,
    notifier: Arc<dyn Notifier>,
    host: Arc<dyn BrowserHost>,
    badge_clear_after: Duration,
    cancel: CancellationToken,
}

impl FeedbackDispatcher {
    pub fn new(
        badge: Arc<dyn BadgeSurface>,
        notifier: Arc<dyn Notifier>,
        host: Arc<dyn BrowserHost>,
    ) -> Self {
        Self {
            badge,
            notifier,
            host,
            badge_clear_after: BADGE_CLEAR_AFTER,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_badge_clear_after(mut self, after: Duration) -> Self {
        self.badge_clear_after = after;
        self
    }

    /// Stops pending badge clear timers.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Renders `event` on every channel. Must run inside a tokio runtime.
    pub async fn dispatch(&self, event: &FeedbackEvent) -> Vec<FeedbackError> {
        let mut failures = Vec::new();

        let (text, color) = if event.success {
            (BADGE_OK_TEXT, BADGE_OK_COLOR)
        } else {
            (BADGE_ERR_TEXT, BADGE_ERR_COLOR)
        };
        match self.badge.set_badge(text, color) {
            Ok(()) => self.schedule_badge_clear(),
            Err(err) => failures.push(err),
        }

        if let Err(err) = self.notifier.notify(NOTIFICATION_TITLE, &event.message) {
            failures.push(err);
        }

        if let Some(tab_id) = event.origin_tab {
            let request = ToastRequest::new(event.toast_text.clone(), event.success, event.cursor);
            if let Err(err) = self.toast(tab_id, request).await {
                failures.push(err);
            }
        }

        for failure in &failures {
            queue_warn!("Feedback dropped: {failure}");
        }
        failures
    }

    /// Notification only; no badge, no toast.
    pub fn notice(&self, message: &str) -> Option<FeedbackError> {
        let result = self.notifier.notify(NOTIFICATION_TITLE, message).err();
        if let Some(err) = &result {
            queue_warn!("Notice dropped: {err}");
        }
        result
    }

    /// Optimistic toast shown while the submission is still running.
    pub async fn progress_toast(&self, tab_id: TabId) -> Option<FeedbackError> {
        let request = ToastRequest::new(PROGRESS_TOAST_TEXT, true, None);
        let result = self.toast(tab_id, request).await.err();
        if let Some(err) = &result {
            queue_debug!("Progress toast dropped: {err}");
        }
        result
    }

    async fn toast(&self, tab_id: TabId, request: ToastRequest) -> Result<(), FeedbackError> {
        self.host
            .show_toast(tab_id, TOP_FRAME_ID, request)
            .await
            .map_err(|err| FeedbackError::unavailable(FeedbackChannel::Toast, err.to_string()))
    }

    // One timer per event; an older timer may clear a newer badge.
    fn schedule_badge_clear(&self) {
        let badge = self.badge.clone();
        let after = self.badge_clear_after;
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = sleep(after) => {
                    if let Err(err) = badge.clear_badge() {
                        queue_debug!("Badge clear failed: {err}");
                    }
                }
            }
        });
    }
}
