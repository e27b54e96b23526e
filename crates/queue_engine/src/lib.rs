//! Cosmos Queue engine: frame trackers, browser host, queue client, feedback
//! and the orchestrator that ties them together.
mod client;
mod document;
mod engine;
mod feedback;
mod frame;
mod host;
mod options;
mod orchestrator;
mod persist;
mod popup;
mod resolve;
mod settings;
mod types;

pub use client::{ClientSettings, HealthReport, QueueClient, ReqwestQueueClient};
pub use document::{PageDocument, PageNode, Rect};
pub use engine::{ExtensionRuntime, RuntimeCommand, RuntimeDeps, RuntimeEvent};
pub use feedback::{
    BadgeSurface, FeedbackDispatcher, Notifier, BADGE_CLEAR_AFTER, BADGE_ERR_COLOR,
    BADGE_ERR_TEXT, BADGE_OK_COLOR, BADGE_OK_TEXT,
};
pub use frame::{FrameHandle, FrameHoverTracker, RenderedToast, ToastSurface, TrackerSettings};
pub use host::{BrowserHost, TabInfo, TabRegistry};
pub use options::{OptionsPage, SAVED_STATUS, TESTING_STATUS};
pub use orchestrator::{OrchestratorDeps, OrchestratorHandle, OrchestratorSettings, NO_RESPONSE};
pub use persist::{ensure_dir, read_optional, AtomicFileWriter, PersistError};
pub use popup::{
    PopupController, StatusLine, ADDED_STATUS, ADDING_STATUS, NO_ACTIVE_TAB_URL, NO_URL_LABEL,
    PASTE_URL_FIRST,
};
pub use resolve::resolve_hovered_link;
pub use settings::{SettingsSource, SharedSettings, StoreError};
pub use types::{FeedbackChannel, FeedbackError, HostError, OrchestratorEvent};
