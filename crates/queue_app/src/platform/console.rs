//! Browser surfaces rendered as console lines.

use queue_core::{ToastPhase, ToastPlacement};
use queue_engine::{BadgeSurface, FeedbackError, Notifier, RenderedToast, ToastSurface};
use queue_logging::queue_trace;

pub(crate) struct ConsoleBadge;

impl BadgeSurface for ConsoleBadge {
    fn set_badge(&self, text: &str, color: &str) -> Result<(), FeedbackError> {
        println!("[badge] {text} ({color})");
        Ok(())
    }

    fn clear_badge(&self) -> Result<(), FeedbackError> {
        println!("[badge] cleared");
        Ok(())
    }
}

pub(crate) struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<(), FeedbackError> {
        println!("[notification] {title}: {message}");
        Ok(())
    }
}

pub(crate) struct ConsoleToasts;

impl ToastSurface for ConsoleToasts {
    fn render(&self, toast: &RenderedToast) {
        let mark = if toast.success { "✓" } else { "✗" };
        let position = match toast.placement {
            ToastPlacement::NearPointer { left, top } => format!("at {left},{top}"),
            ToastPlacement::Corner { right, bottom } => {
                format!("in corner, {right}px right / {bottom}px bottom")
            }
        };
        println!("[toast #{}] {mark} {} ({position})", toast.id, toast.text);
    }

    fn update_phase(&self, toast_id: u64, phase: ToastPhase) {
        queue_trace!("Toast {toast_id} is now {phase:?}");
    }

    fn remove(&self, toast_id: u64) {
        println!("[toast #{toast_id}] gone");
    }
}
