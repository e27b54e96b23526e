use crate::{AddUrlReply, FeedbackEvent, SubmissionOutcome, TabId, TriggerId, TriggerKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Query every frame of the active tab for a hovered link.
    ResolveHoveredLink { trigger_id: TriggerId },
    /// Optimistic "in progress" toast, shown before the network call completes.
    ShowProgressToast { trigger_id: TriggerId, tab_id: TabId },
    /// Read settings and POST the URL to the queue service.
    Submit { trigger_id: TriggerId, url: String },
    DispatchFeedback {
        trigger_id: TriggerId,
        event: FeedbackEvent,
    },
    /// Neutral notification only (no badge, no toast).
    Notice { trigger_id: TriggerId, message: String },
    ReplyToPopup {
        trigger_id: TriggerId,
        reply: AddUrlReply,
    },
    Finished(TriggerReport),
    /// A trigger arrived while another one was in flight and was dropped.
    Rejected {
        kind: TriggerKind,
        busy_with: TriggerId,
    },
}

/// Summary of a completed trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerReport {
    pub trigger_id: TriggerId,
    pub kind: TriggerKind,
    pub submitted_url: Option<String>,
    pub outcome: Option<SubmissionOutcome>,
}
