//! Per-frame hover tracking.
//!
//! A [`FrameHoverTracker`] owns one frame's [`HoverState`] and document inside
//! a tokio task. Page events and orchestrator requests reach it through a
//! cloneable [`FrameHandle`]; nothing else touches the state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use queue_core::hover::{HOVER_POLL_INTERVAL_MS, HOVER_THROTTLE_MS};
use queue_core::toast::{
    DEFAULT_TOAST_TEXT, TOAST_FADE_OUT_MS, TOAST_FRAME_TICK_MS, TOAST_HOLD_MS,
};
use queue_core::{
    place_toast, CursorPosition, FrameId, HoverState, HoverUpdate, HoveredLinkReply, ToastPhase,
    ToastPlacement, ToastRequest, TOP_FRAME_ID,
};
use queue_logging::{queue_debug, queue_trace};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::document::{PageDocument, Rect};
use crate::HostError;

static NEXT_TOAST_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedToast {
    pub id: u64,
    pub frame_id: FrameId,
    pub text: String,
    pub success: bool,
    pub placement: ToastPlacement,
}

/// Where a top frame draws its toasts.
pub trait ToastSurface: Send + Sync {
    fn render(&self, toast: &RenderedToast);
    fn update_phase(&self, toast_id: u64, phase: ToastPhase);
    fn remove(&self, toast_id: u64);
}

#[derive(Debug, Clone)]
pub struct TrackerSettings {
    pub throttle: Duration,
    pub poll_interval: Duration,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            throttle: Duration::from_millis(HOVER_THROTTLE_MS),
            poll_interval: Duration::from_millis(HOVER_POLL_INTERVAL_MS),
        }
    }
}

enum FrameMessage {
    PointerOver(String),
    PointerMoved(CursorPosition),
    FocusIn(String),
    Place(String, Rect),
    Navigate(PageDocument),
    GetHoveredLink(oneshot::Sender<HoveredLinkReply>),
    ShowToast(ToastRequest),
    Inspect(oneshot::Sender<HoverState>),
}

/// Sender side of a frame. Every method fails with
/// [`HostError::FrameDetached`] once the tracker is gone.
#[derive(Clone)]
pub struct FrameHandle {
    frame_id: FrameId,
    tx: mpsc::UnboundedSender<FrameMessage>,
}

impl FrameHandle {
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    fn send(&self, message: FrameMessage) -> Result<(), HostError> {
        self.tx
            .send(message)
            .map_err(|_| HostError::FrameDetached(self.frame_id))
    }

    /// `mouseover` on the element with `id="element_id"`.
    pub fn pointer_over(&self, element_id: impl Into<String>) -> Result<(), HostError> {
        self.send(FrameMessage::PointerOver(element_id.into()))
    }

    pub fn pointer_moved(&self, position: CursorPosition) -> Result<(), HostError> {
        self.send(FrameMessage::PointerMoved(position))
    }

    pub fn focus(&self, element_id: impl Into<String>) -> Result<(), HostError> {
        self.send(FrameMessage::FocusIn(element_id.into()))
    }

    /// Lays out an element for hit testing.
    pub fn place(&self, element_id: impl Into<String>, rect: Rect) -> Result<(), HostError> {
        self.send(FrameMessage::Place(element_id.into(), rect))
    }

    pub fn navigate(&self, document: PageDocument) -> Result<(), HostError> {
        self.send(FrameMessage::Navigate(document))
    }

    pub fn show_toast(&self, request: ToastRequest) -> Result<(), HostError> {
        self.send(FrameMessage::ShowToast(request))
    }

    pub async fn query_hovered_link(&self) -> Result<HoveredLinkReply, HostError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(FrameMessage::GetHoveredLink(reply_tx))?;
        reply_rx.await.map_err(|_| HostError::NoReply(self.frame_id))
    }

    /// Copy of the tracker's hover state.
    pub async fn hover_state(&self) -> Result<HoverState, HostError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(FrameMessage::Inspect(reply_tx))?;
        reply_rx.await.map_err(|_| HostError::NoReply(self.frame_id))
    }
}

pub struct FrameHoverTracker {
    handle: FrameHandle,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl FrameHoverTracker {
    /// Spawns the tracker task. Must be called from within a tokio runtime.
    pub fn attach(
        frame_id: FrameId,
        document: PageDocument,
        surface: Arc<dyn ToastSurface>,
        settings: TrackerSettings,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = FrameTask {
            frame_id,
            document,
            hover: HoverState::with_throttle(settings.throttle.as_millis() as u64),
            focused: None,
            surface,
            started: Instant::now(),
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(task.run(rx, settings.poll_interval));
        queue_trace!("Attached frame {frame_id}");
        Self {
            handle: FrameHandle { frame_id, tx },
            cancel,
            task: Some(task),
        }
    }

    pub fn frame_id(&self) -> FrameId {
        self.handle.frame_id
    }

    pub fn handle(&self) -> FrameHandle {
        self.handle.clone()
    }

    /// Cancels the tracker and waits for its task to stop.
    pub async fn detach(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for FrameHoverTracker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct FrameTask {
    frame_id: FrameId,
    document: PageDocument,
    hover: HoverState,
    focused: Option<String>,
    surface: Arc<dyn ToastSurface>,
    started: Instant,
    cancel: CancellationToken,
}

impl FrameTask {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<FrameMessage>, poll_every: Duration) {
        let mut poll = tokio::time::interval_at(Instant::now() + poll_every, poll_every);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = poll.tick() => self.poll_hover_stack(),
                message = rx.recv() => match message {
                    Some(message) => self.handle(message),
                    None => break,
                },
            }
        }
        self.cancel.cancel();
        queue_trace!("Frame {} detached", self.frame_id);
    }

    fn is_top(&self) -> bool {
        self.frame_id == TOP_FRAME_ID
    }

    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn anchor_for(&self, element_id: &str) -> Option<String> {
        self.document
            .find_by_id(element_id)
            .and_then(|node| self.document.nearest_anchor_href(node))
    }

    // Covers pages whose scripts swallow mouseover events.
    fn poll_hover_stack(&mut self) {
        let href = self
            .hover
            .pointer()
            .and_then(|position| self.document.anchor_href_at(position));
        if self.hover.record_poll(href) {
            queue_trace!(
                "Frame {} poll picked up {}",
                self.frame_id,
                self.hover.last_href()
            );
        }
    }

    fn record_target(&mut self, element_id: &str) {
        let now_ms = self.now_ms();
        let document = &self.document;
        let update = self.hover.record_event(now_ms, || {
            document
                .find_by_id(element_id)
                .and_then(|node| document.nearest_anchor_href(node))
        });
        if update == HoverUpdate::Updated {
            queue_trace!("Frame {} hovering {}", self.frame_id, self.hover.last_href());
        }
    }

    fn handle(&mut self, message: FrameMessage) {
        match message {
            FrameMessage::PointerOver(element_id) => self.record_target(&element_id),
            FrameMessage::PointerMoved(position) => self.hover.record_pointer(position),
            FrameMessage::FocusIn(element_id) => {
                self.record_target(&element_id);
                self.focused = Some(element_id);
            }
            FrameMessage::Place(element_id, rect) => match self.document.find_by_id(&element_id) {
                Some(node) => self.document.place(node, rect),
                None => queue_debug!("Frame {} has no element #{element_id}", self.frame_id),
            },
            FrameMessage::Navigate(document) => {
                self.document = document;
                self.hover.reset();
                self.focused = None;
                queue_debug!("Frame {} navigated", self.frame_id);
            }
            FrameMessage::GetHoveredLink(reply) => {
                let href = self.hover.resolve(
                    |position| self.document.anchor_href_at(position),
                    || {
                        self.focused
                            .as_deref()
                            .and_then(|element_id| self.anchor_for(element_id))
                    },
                );
                // Sub-frame coordinates mean nothing to the top frame's toast.
                let cursor = if self.is_top() { self.hover.pointer() } else { None };
                let _ = reply.send(HoveredLinkReply { href, cursor });
            }
            FrameMessage::ShowToast(request) => self.show_toast(request),
            FrameMessage::Inspect(reply) => {
                let _ = reply.send(self.hover.clone());
            }
        }
    }

    fn show_toast(&self, request: ToastRequest) {
        if !self.is_top() {
            queue_debug!("Frame {} ignores toast request", self.frame_id);
            return;
        }
        let text = if request.text.is_empty() {
            DEFAULT_TOAST_TEXT.to_string()
        } else {
            request.text.clone()
        };
        let toast = RenderedToast {
            id: NEXT_TOAST_ID.fetch_add(1, Ordering::Relaxed),
            frame_id: self.frame_id,
            text,
            success: request.success,
            placement: place_toast(
                request.position(),
                self.hover.pointer(),
                self.document.viewport(),
            ),
        };
        self.surface.render(&toast);
        tokio::spawn(run_toast(
            toast.id,
            self.surface.clone(),
            self.cancel.child_token(),
        ));
    }
}

async fn run_toast(toast_id: u64, surface: Arc<dyn ToastSurface>, cancel: CancellationToken) {
    let timeline = async {
        sleep(Duration::from_millis(TOAST_FRAME_TICK_MS)).await;
        surface.update_phase(toast_id, ToastPhase::Visible);
        sleep(Duration::from_millis(TOAST_HOLD_MS - TOAST_FRAME_TICK_MS)).await;
        surface.update_phase(toast_id, ToastPhase::Leaving);
        sleep(Duration::from_millis(TOAST_FADE_OUT_MS)).await;
    };
    tokio::select! {
        _ = cancel.cancelled() => {}
        _ = timeline => {}
    }
    surface.remove(toast_id);
}
