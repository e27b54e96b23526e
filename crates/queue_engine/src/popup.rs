//! Popup behaviour: "add current tab" and "add pasted URL".

use std::sync::Arc;

use queue_core::menu::is_supported_media_url;
use queue_core::AddUrlReply;
use queue_logging::queue_debug;

use crate::host::BrowserHost;
use crate::orchestrator::OrchestratorHandle;

pub const NO_URL_LABEL: &str = "No URL";
pub const NO_ACTIVE_TAB_URL: &str = "No active tab URL";
pub const PASTE_URL_FIRST: &str = "Paste a URL first";
pub const ADDED_STATUS: &str = "Added!";
pub const ADDING_STATUS: &str = "Adding...";

/// Status text under a popup or options form, green when `ok`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub ok: bool,
}

impl StatusLine {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ok: true,
        }
    }

    pub fn failed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ok: false,
        }
    }

    pub fn adding() -> Self {
        Self::ok(ADDING_STATUS)
    }

    pub fn from_reply(reply: &AddUrlReply) -> Self {
        if reply.ok {
            Self::ok(ADDED_STATUS)
        } else {
            Self::failed(format!("Failed: {}", reply.error.as_deref().unwrap_or("")))
        }
    }
}

pub struct PopupController {
    host: Arc<dyn BrowserHost>,
    orchestrator: OrchestratorHandle,
}

impl PopupController {
    pub fn new(host: Arc<dyn BrowserHost>, orchestrator: OrchestratorHandle) -> Self {
        Self { host, orchestrator }
    }

    async fn active_tab_url(&self) -> String {
        self.host
            .active_tab()
            .await
            .map(|tab| tab.url)
            .unwrap_or_default()
    }

    /// Text for the "current URL" line.
    pub async fn current_url_label(&self) -> String {
        let url = self.active_tab_url().await;
        if url.is_empty() {
            NO_URL_LABEL.to_string()
        } else {
            url
        }
    }

    pub async fn add_current(&self) -> StatusLine {
        self.add_current_reporting(|_| {}).await
    }

    /// Like [`add_current`](Self::add_current), handing the interim
    /// "Adding..." line to `progress` once the URL is known.
    pub async fn add_current_reporting(
        &self,
        progress: impl FnOnce(StatusLine) + Send,
    ) -> StatusLine {
        let url = self.active_tab_url().await;
        if url.is_empty() {
            return StatusLine::failed(NO_ACTIVE_TAB_URL);
        }
        self.send(url, progress).await
    }

    pub async fn add_manual(&self, input: &str) -> StatusLine {
        self.add_manual_reporting(input, |_| {}).await
    }

    pub async fn add_manual_reporting(
        &self,
        input: &str,
        progress: impl FnOnce(StatusLine) + Send,
    ) -> StatusLine {
        let url = input.trim();
        if url.is_empty() {
            return StatusLine::failed(PASTE_URL_FIRST);
        }
        self.send(url.to_string(), progress).await
    }

    // Unsupported hosts are still sent; the server has the final word.
    async fn send(&self, url: String, progress: impl FnOnce(StatusLine) + Send) -> StatusLine {
        if !is_supported_media_url(&url) {
            queue_debug!("Sending non-media URL {url}");
        }
        progress(StatusLine::adding());
        let reply = self.orchestrator.add_url(url).await;
        StatusLine::from_reply(&reply)
    }
}
