//! Cosmos Queue core: pure data model, per-frame hover state and the
//! trigger state machine. No IO and no async live here.
mod effect;
pub mod hover;
pub mod menu;
mod msg;
mod query_set;
mod settings;
mod state;
pub mod toast;
mod trigger;
mod types;
mod update;

pub use effect::{Effect, TriggerReport};
pub use hover::{HoverState, HoverUpdate};
pub use menu::{menu_items, MatchPattern, MenuContext, MenuItem};
pub use msg::{Msg, Resolution};
pub use query_set::{FrameReply, QueryDecision, QuerySet};
pub use settings::{
    endpoint, Settings, SettingsError, APPEND_QUEUE_PATH, DEFAULT_DEVICE_NAME,
    DEFAULT_SERVER_BASE, HEALTH_PATH,
};
pub use state::{ActiveTrigger, OrchestratorState, TriggerPhase};
pub use toast::{place_toast, ToastPhase, ToastPlacement, Viewport};
pub use trigger::{MenuClick, Trigger, TriggerKind};
pub use types::{
    AddUrlReply, Candidate, CandidateSource, CursorPosition, FeedbackEvent, FrameId,
    FrameRequest, HoveredLinkReply, RuntimeRequest, SubmissionOutcome, SubmissionRequest, TabId,
    ToastRequest, TriggerId, ADDED_MESSAGE, FAILED_TOAST_TEXT, NOTIFICATION_TITLE,
    NO_CANDIDATE_MESSAGE, PROGRESS_TOAST_TEXT, TOP_FRAME_ID,
};
pub use update::update;
