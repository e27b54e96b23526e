use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type TabId = u32;
pub type FrameId = u32;
pub type TriggerId = u64;

/// Frame id of a tab's top-level document.
pub const TOP_FRAME_ID: FrameId = 0;

pub const NOTIFICATION_TITLE: &str = "Cosmos Queue";
pub const ADDED_MESSAGE: &str = "Added to queue";
pub const FAILED_TOAST_TEXT: &str = "Failed to add";
pub const PROGRESS_TOAST_TEXT: &str = "Adding to queue…";
pub const NO_CANDIDATE_MESSAGE: &str = "No hovered link or active tab URL";

/// Pointer coordinates in CSS pixels relative to the frame viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub x: i32,
    pub y: i32,
}

impl CursorPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    Link,
    ActiveTabUrl,
    Popup,
}

/// The single URL chosen for one trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub href: String,
    pub source: CandidateSource,
}

impl Candidate {
    pub fn new(href: impl Into<String>, source: CandidateSource) -> Self {
        Self {
            href: href.into(),
            source,
        }
    }
}

/// Body of `POST /append-queue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub url: String,
    pub device_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Success(Value),
    HttpError { status: u16, body: String },
    NetworkError(String),
    /// 2xx response with a body that is not JSON. Counts as success.
    ParseError,
    /// The configured server base could not be turned into an endpoint; nothing was sent.
    InvalidEndpoint(String),
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_) | Self::ParseError)
    }

    /// Payload handed back to the popup; unparsable acknowledgements become `{}`.
    pub fn payload(&self) -> Option<Value> {
        match self {
            Self::Success(body) => Some(body.clone()),
            Self::ParseError => Some(Value::Object(Default::default())),
            _ => None,
        }
    }

    /// Human readable summary used for notifications.
    pub fn summary(&self) -> String {
        match self {
            Self::Success(_) | Self::ParseError => ADDED_MESSAGE.to_string(),
            Self::HttpError { status, body } => {
                let body = if body.trim().is_empty() {
                    "Unknown error"
                } else {
                    body.as_str()
                };
                format!("Server error ({status}): {body}")
            }
            Self::NetworkError(reason) => format!("Failed to add: {reason}"),
            Self::InvalidEndpoint(reason) => format!("Failed to add: {reason}"),
        }
    }

    /// Short error text for the popup status line.
    pub fn error_text(&self) -> Option<String> {
        match self {
            Self::Success(_) | Self::ParseError => None,
            Self::HttpError { status, body } => Some(format!("HTTP {status}: {body}")),
            Self::NetworkError(reason) | Self::InvalidEndpoint(reason) => Some(reason.clone()),
        }
    }
}

/// Ephemeral description of what the user should see after a trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackEvent {
    pub success: bool,
    pub message: String,
    pub toast_text: String,
    pub origin_tab: Option<TabId>,
    pub cursor: Option<CursorPosition>,
}

impl FeedbackEvent {
    pub fn from_outcome(
        outcome: &SubmissionOutcome,
        origin_tab: Option<TabId>,
        cursor: Option<CursorPosition>,
    ) -> Self {
        let success = outcome.is_success();
        Self {
            success,
            message: outcome.summary(),
            toast_text: if success { ADDED_MESSAGE } else { FAILED_TOAST_TEXT }.to_string(),
            origin_tab,
            cursor,
        }
    }
}

/// Reply of a frame to `GetHoveredLink`. An empty `href` means nothing was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoveredLinkReply {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<CursorPosition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastRequest {
    pub text: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
}

impl ToastRequest {
    pub fn new(text: impl Into<String>, success: bool, cursor: Option<CursorPosition>) -> Self {
        Self {
            text: text.into(),
            success,
            x: cursor.map(|c| c.x),
            y: cursor.map(|c| c.y),
        }
    }

    pub fn position(&self) -> Option<CursorPosition> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(CursorPosition { x, y }),
            _ => None,
        }
    }
}

/// Messages the orchestrator sends into page frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FrameRequest {
    #[serde(rename = "cq_getHoveredLink")]
    GetHoveredLink,
    #[serde(rename = "cq_showToast")]
    ShowToast(ToastRequest),
}

/// Messages the popup sends to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RuntimeRequest {
    #[serde(rename = "addUrl")]
    AddUrl { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddUrlReply {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AddUrlReply {
    pub fn from_outcome(outcome: &SubmissionOutcome) -> Self {
        if outcome.is_success() {
            Self {
                ok: true,
                result: outcome.payload(),
                error: None,
            }
        } else {
            Self::error(outcome.error_text().unwrap_or_default())
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(message.into()),
        }
    }

    pub fn busy() -> Self {
        Self::error("busy")
    }
}
