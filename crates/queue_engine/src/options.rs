use std::sync::Arc;

use queue_core::{Settings, DEFAULT_SERVER_BASE};
use queue_logging::queue_warn;

use crate::client::QueueClient;
use crate::popup::StatusLine;
use crate::settings::SettingsSource;

pub const SAVED_STATUS: &str = "Saved!";
pub const TESTING_STATUS: &str = "Testing...";

/// Options page: edit the settings and probe the server's health endpoint.
pub struct OptionsPage {
    settings: Arc<dyn SettingsSource>,
    client: Arc<dyn QueueClient>,
}

impl OptionsPage {
    pub fn new(settings: Arc<dyn SettingsSource>, client: Arc<dyn QueueClient>) -> Self {
        Self { settings, client }
    }

    /// Values the form starts with.
    pub async fn load_form(&self) -> Settings {
        self.settings.load().await
    }

    pub async fn save(&self, server_base: &str, device_name: &str) -> StatusLine {
        let settings = match Settings::from_input(server_base, device_name) {
            Ok(settings) => settings,
            Err(err) => return StatusLine::failed(err.to_string()),
        };
        match self.settings.save(settings).await {
            Ok(()) => StatusLine::ok(SAVED_STATUS),
            Err(err) => {
                queue_warn!("Saving settings failed: {err}");
                StatusLine::failed(err.to_string())
            }
        }
    }

    /// Tests the server typed into the form, not the saved one.
    pub async fn test(&self, server_base: &str) -> StatusLine {
        self.test_reporting(server_base, |_| {}).await
    }

    /// Like [`test`](Self::test), handing "Testing..." to `progress` before
    /// the request goes out.
    pub async fn test_reporting(
        &self,
        server_base: &str,
        progress: impl FnOnce(StatusLine) + Send,
    ) -> StatusLine {
        let server_base = match server_base.trim() {
            "" => DEFAULT_SERVER_BASE,
            typed => typed,
        };
        progress(StatusLine::ok(TESTING_STATUS));
        let report = self.client.health_check(server_base).await;
        StatusLine {
            text: report.status_text(),
            ok: report.is_healthy(),
        }
    }
}
