use crate::{Candidate, CursorPosition, SubmissionOutcome, TabId, Trigger, TriggerId};

/// Result of the hover-resolution protocol for one shortcut trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found {
        candidate: Candidate,
        tab_id: Option<TabId>,
        /// Pointer position reported by the top frame, if it answered.
        cursor: Option<CursorPosition>,
    },
    NoCandidate { tab_id: Option<TabId> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A menu click, shortcut or popup request arrived.
    TriggerFired(Trigger),
    /// Hover resolution finished.
    CandidateResolved {
        trigger_id: TriggerId,
        resolution: Resolution,
    },
    /// The single submission attempt finished.
    SubmissionFinished {
        trigger_id: TriggerId,
        outcome: SubmissionOutcome,
    },
    /// Feedback was handed to every channel.
    FeedbackDispatched { trigger_id: TriggerId },
}
