//! Browser surface the orchestrator talks to: the active tab, its frames and
//! per-frame messaging.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use queue_core::{FrameId, HoveredLinkReply, TabId, ToastRequest, TOP_FRAME_ID};
use queue_logging::queue_debug;

use crate::document::PageDocument;
use crate::frame::{FrameHandle, FrameHoverTracker, ToastSurface, TrackerSettings};
use crate::HostError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub id: TabId,
    pub url: String,
}

#[async_trait::async_trait]
pub trait BrowserHost: Send + Sync {
    async fn active_tab(&self) -> Option<TabInfo>;

    /// Frame ids of `tab_id` in enumeration order, top frame first.
    /// `None` when the browser cannot enumerate frames.
    async fn frame_ids(&self, tab_id: TabId) -> Option<Vec<FrameId>>;

    async fn query_hovered_link(
        &self,
        tab_id: TabId,
        frame_id: FrameId,
    ) -> Result<HoveredLinkReply, HostError>;

    async fn show_toast(
        &self,
        tab_id: TabId,
        frame_id: FrameId,
        request: ToastRequest,
    ) -> Result<(), HostError>;
}

struct TabEntry {
    url: String,
    frames: BTreeMap<FrameId, FrameHoverTracker>,
    next_frame_id: FrameId,
}

#[derive(Default)]
struct Registry {
    tabs: BTreeMap<TabId, TabEntry>,
    active: Option<TabId>,
    next_tab_id: TabId,
}

/// In-process tabs whose frames are live [`FrameHoverTracker`]s.
///
/// Frames must be attached from inside a tokio runtime. Closing a tab or
/// navigating it drops the affected trackers, which cancels their tasks.
pub struct TabRegistry {
    inner: Mutex<Registry>,
    surface: Arc<dyn ToastSurface>,
    tracker_settings: TrackerSettings,
    enumerate_frames: bool,
}

impl TabRegistry {
    pub fn new(surface: Arc<dyn ToastSurface>) -> Self {
        Self {
            inner: Mutex::new(Registry {
                next_tab_id: 1,
                ..Registry::default()
            }),
            surface,
            tracker_settings: TrackerSettings::default(),
            enumerate_frames: true,
        }
    }

    pub fn with_tracker_settings(mut self, settings: TrackerSettings) -> Self {
        self.tracker_settings = settings;
        self
    }

    /// Simulates browsers without frame enumeration: only the top frame is
    /// queried.
    pub fn with_frame_enumeration(mut self, enabled: bool) -> Self {
        self.enumerate_frames = enabled;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn attach(&self, frame_id: FrameId, document: PageDocument) -> FrameHoverTracker {
        FrameHoverTracker::attach(
            frame_id,
            document,
            self.surface.clone(),
            self.tracker_settings.clone(),
        )
    }

    /// Opens a tab with its top frame and makes it active.
    pub fn open_tab(&self, url: impl Into<String>, document: PageDocument) -> TabId {
        let tracker = self.attach(TOP_FRAME_ID, document);
        let mut registry = self.lock();
        let tab_id = registry.next_tab_id;
        registry.next_tab_id += 1;
        let mut frames = BTreeMap::new();
        frames.insert(TOP_FRAME_ID, tracker);
        registry.tabs.insert(
            tab_id,
            TabEntry {
                url: url.into(),
                frames,
                next_frame_id: TOP_FRAME_ID + 1,
            },
        );
        registry.active = Some(tab_id);
        queue_debug!("Opened tab {tab_id}");
        tab_id
    }

    /// Attaches an embedded frame to `tab_id` and returns its id.
    pub fn add_frame(&self, tab_id: TabId, document: PageDocument) -> Result<FrameId, HostError> {
        let mut registry = self.lock();
        let tab = registry
            .tabs
            .get_mut(&tab_id)
            .ok_or(HostError::TabClosed(tab_id))?;
        let frame_id = tab.next_frame_id;
        tab.next_frame_id += 1;
        tab.frames.insert(frame_id, self.attach(frame_id, document));
        Ok(frame_id)
    }

    pub fn frame(&self, tab_id: TabId, frame_id: FrameId) -> Result<FrameHandle, HostError> {
        let registry = self.lock();
        let tab = registry
            .tabs
            .get(&tab_id)
            .ok_or(HostError::TabClosed(tab_id))?;
        tab.frames
            .get(&frame_id)
            .map(FrameHoverTracker::handle)
            .ok_or(HostError::FrameDetached(frame_id))
    }

    pub fn activate(&self, tab_id: TabId) -> Result<(), HostError> {
        let mut registry = self.lock();
        if !registry.tabs.contains_key(&tab_id) {
            return Err(HostError::TabClosed(tab_id));
        }
        registry.active = Some(tab_id);
        Ok(())
    }

    pub fn active_tab_id(&self) -> Option<TabId> {
        self.lock().active
    }

    /// Loads a new document into the top frame. Embedded frames belong to the
    /// old document and are detached.
    pub fn navigate(
        &self,
        tab_id: TabId,
        url: impl Into<String>,
        document: PageDocument,
    ) -> Result<(), HostError> {
        let mut registry = self.lock();
        let tab = registry
            .tabs
            .get_mut(&tab_id)
            .ok_or(HostError::TabClosed(tab_id))?;
        tab.url = url.into();
        tab.frames.retain(|frame_id, _| *frame_id == TOP_FRAME_ID);
        tab.next_frame_id = TOP_FRAME_ID + 1;
        match tab.frames.get(&TOP_FRAME_ID) {
            Some(top) => top.handle().navigate(document),
            None => {
                tab.frames
                    .insert(TOP_FRAME_ID, self.attach(TOP_FRAME_ID, document));
                Ok(())
            }
        }
    }

    pub fn close_tab(&self, tab_id: TabId) -> Result<(), HostError> {
        let mut registry = self.lock();
        registry
            .tabs
            .remove(&tab_id)
            .ok_or(HostError::TabClosed(tab_id))?;
        if registry.active == Some(tab_id) {
            registry.active = registry.tabs.keys().next_back().copied();
        }
        queue_debug!("Closed tab {tab_id}");
        Ok(())
    }
}

#[async_trait::async_trait]
impl BrowserHost for TabRegistry {
    async fn active_tab(&self) -> Option<TabInfo> {
        let registry = self.lock();
        let id = registry.active?;
        registry.tabs.get(&id).map(|tab| TabInfo {
            id,
            url: tab.url.clone(),
        })
    }

    async fn frame_ids(&self, tab_id: TabId) -> Option<Vec<FrameId>> {
        if !self.enumerate_frames {
            return None;
        }
        let registry = self.lock();
        registry
            .tabs
            .get(&tab_id)
            .map(|tab| tab.frames.keys().copied().collect())
    }

    async fn query_hovered_link(
        &self,
        tab_id: TabId,
        frame_id: FrameId,
    ) -> Result<HoveredLinkReply, HostError> {
        let handle = self.frame(tab_id, frame_id)?;
        handle.query_hovered_link().await
    }

    async fn show_toast(
        &self,
        tab_id: TabId,
        frame_id: FrameId,
        request: ToastRequest,
    ) -> Result<(), HostError> {
        self.frame(tab_id, frame_id)?.show_toast(request)
    }
}
