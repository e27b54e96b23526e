#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use queue_core::ToastPhase;
use queue_engine::{
    BadgeSurface, FeedbackChannel, FeedbackError, Notifier, RenderedToast, ToastSurface,
};

#[derive(Default)]
pub struct RecordingBadge {
    current: Mutex<Option<(String, String)>>,
    history: Mutex<Vec<Option<String>>>,
    broken: AtomicBool,
}

impl RecordingBadge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn current(&self) -> Option<(String, String)> {
        self.current.lock().unwrap().clone()
    }

    /// Badge texts in order; `None` marks a clear.
    pub fn history(&self) -> Vec<Option<String>> {
        self.history.lock().unwrap().clone()
    }

    pub fn break_channel(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }
}

impl BadgeSurface for RecordingBadge {
    fn set_badge(&self, text: &str, color: &str) -> Result<(), FeedbackError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(FeedbackError::unavailable(FeedbackChannel::Badge, "no action api"));
        }
        *self.current.lock().unwrap() = Some((text.to_string(), color.to_string()));
        self.history.lock().unwrap().push(Some(text.to_string()));
        Ok(())
    }

    fn clear_badge(&self) -> Result<(), FeedbackError> {
        *self.current.lock().unwrap() = None;
        self.history.lock().unwrap().push(None);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(String, String)>>,
    denied: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn titles(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|(title, _)| title.clone())
            .collect()
    }

    pub fn deny(&self) {
        self.denied.store(true, Ordering::SeqCst);
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<(), FeedbackError> {
        if self.denied.load(Ordering::SeqCst) {
            return Err(FeedbackError::unavailable(
                FeedbackChannel::Notification,
                "permission denied",
            ));
        }
        self.messages
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastLog {
    Rendered(RenderedToast),
    Phase(u64, ToastPhase),
    Removed(u64),
}

#[derive(Default)]
pub struct RecordingToasts {
    log: Mutex<Vec<ToastLog>>,
}

impl RecordingToasts {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn log(&self) -> Vec<ToastLog> {
        self.log.lock().unwrap().clone()
    }

    pub fn rendered(&self) -> Vec<RenderedToast> {
        self.log()
            .into_iter()
            .filter_map(|entry| match entry {
                ToastLog::Rendered(toast) => Some(toast),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.rendered().into_iter().map(|toast| toast.text).collect()
    }
}

impl ToastSurface for RecordingToasts {
    fn render(&self, toast: &RenderedToast) {
        self.log.lock().unwrap().push(ToastLog::Rendered(toast.clone()));
    }

    fn update_phase(&self, toast_id: u64, phase: ToastPhase) {
        self.log.lock().unwrap().push(ToastLog::Phase(toast_id, phase));
    }

    fn remove(&self, toast_id: u64) {
        self.log.lock().unwrap().push(ToastLog::Removed(toast_id));
    }
}

/// Lets spawned tasks run until they block again.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
