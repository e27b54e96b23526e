use std::error::Error as _;
use std::time::Duration;

use queue_core::{endpoint, SubmissionOutcome, SubmissionRequest, APPEND_QUEUE_PATH, HEALTH_PATH};
use queue_logging::{queue_debug, queue_info, queue_warn};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Result of `GET {server}/health`, for display only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthReport {
    Healthy(String),
    HttpError(u16),
    Unreachable(String),
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthReport::Healthy(_))
    }

    /// Status line shown by the options page.
    pub fn status_text(&self) -> String {
        match self {
            HealthReport::Healthy(body) if body.trim().is_empty() => "Health OK: OK".to_string(),
            HealthReport::Healthy(body) => format!("Health OK: {}", body.trim()),
            HealthReport::HttpError(status) => format!("Health failed: HTTP {status}"),
            HealthReport::Unreachable(reason) => format!("Health error: {reason}"),
        }
    }
}

/// Single-attempt submission to the queue service. No retries.
#[async_trait::async_trait]
pub trait QueueClient: Send + Sync {
    async fn submit(&self, server_base: &str, request: &SubmissionRequest) -> SubmissionOutcome;

    async fn health_check(&self, server_base: &str) -> HealthReport;
}

#[derive(Debug, Clone)]
pub struct ReqwestQueueClient {
    client: Result<reqwest::Client, String>,
}

impl ReqwestQueueClient {
    pub fn new(settings: ClientSettings) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| error_reason(&err));
        Self { client }
    }

    fn client(&self) -> Result<&reqwest::Client, String> {
        self.client.as_ref().map_err(Clone::clone)
    }
}

impl Default for ReqwestQueueClient {
    fn default() -> Self {
        Self::new(ClientSettings::default())
    }
}

#[async_trait::async_trait]
impl QueueClient for ReqwestQueueClient {
    async fn submit(&self, server_base: &str, request: &SubmissionRequest) -> SubmissionOutcome {
        let url = match endpoint(server_base, APPEND_QUEUE_PATH) {
            Ok(url) => url,
            Err(err) => {
                queue_warn!("Not submitting, bad server base {server_base:?}: {err}");
                return SubmissionOutcome::InvalidEndpoint(err.to_string());
            }
        };
        let client = match self.client() {
            Ok(client) => client,
            Err(reason) => return SubmissionOutcome::NetworkError(reason),
        };
        let body = match serde_json::to_vec(request) {
            Ok(body) => body,
            Err(err) => return SubmissionOutcome::NetworkError(err.to_string()),
        };

        queue_debug!("POST {url} for {}", request.url);
        let response = match client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                let reason = error_reason(&err);
                queue_warn!("Submission failed: {reason}");
                return SubmissionOutcome::NetworkError(reason);
            }
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) if status.is_success() => {
                queue_debug!("Could not read 2xx body: {}", error_reason(&err));
                return SubmissionOutcome::ParseError;
            }
            Err(_) => bytes::Bytes::new(),
        };

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            queue_warn!("Queue service answered {}: {body}", status.as_u16());
            return SubmissionOutcome::HttpError {
                status: status.as_u16(),
                body,
            };
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(payload) => {
                queue_info!("Queued {}", request.url);
                SubmissionOutcome::Success(payload)
            }
            Err(err) => {
                queue_info!("Queued {} (unparsable reply: {err})", request.url);
                SubmissionOutcome::ParseError
            }
        }
    }

    async fn health_check(&self, server_base: &str) -> HealthReport {
        let url = match endpoint(server_base, HEALTH_PATH) {
            Ok(url) => url,
            Err(err) => return HealthReport::Unreachable(err.to_string()),
        };
        let client = match self.client() {
            Ok(client) => client,
            Err(reason) => return HealthReport::Unreachable(reason),
        };
        let response = match client.get(url).send().await {
            Ok(response) => response,
            Err(err) => return HealthReport::Unreachable(error_reason(&err)),
        };
        let status = response.status();
        if !status.is_success() {
            return HealthReport::HttpError(status.as_u16());
        }
        match response.text().await {
            Ok(text) => HealthReport::Healthy(text),
            Err(err) => HealthReport::Unreachable(error_reason(&err)),
        }
    }
}

// reqwest's top-level message is generic; the root cause names the actual
// failure (connection refused, dns error, ...).
fn error_reason(err: &reqwest::Error) -> String {
    let mut reason = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        reason = format!("{reason}: {cause}");
        source = cause.source();
    }
    if err.is_timeout() && !reason.contains("timed out") {
        reason.push_str(" (timed out)");
    }
    reason
}
