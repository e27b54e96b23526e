use std::fmt;

use queue_core::{FrameId, TabId, TriggerId, TriggerKind, TriggerReport};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("tab {0} is not open")]
    TabClosed(TabId),
    #[error("frame {0} is detached")]
    FrameDetached(FrameId),
    #[error("frame {0} dropped the request without replying")]
    NoReply(FrameId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackChannel {
    Badge,
    Notification,
    Toast,
}

impl fmt::Display for FeedbackChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackChannel::Badge => write!(f, "badge"),
            FeedbackChannel::Notification => write!(f, "notification"),
            FeedbackChannel::Toast => write!(f, "toast"),
        }
    }
}

/// Delivery failure of a single feedback channel. Logged, never propagated
/// past the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedbackError {
    #[error("{channel} unavailable: {reason}")]
    ChannelUnavailable {
        channel: FeedbackChannel,
        reason: String,
    },
}

impl FeedbackError {
    pub fn unavailable(channel: FeedbackChannel, reason: impl Into<String>) -> Self {
        FeedbackError::ChannelUnavailable {
            channel,
            reason: reason.into(),
        }
    }
}

/// Reported by the orchestrator for every trigger that ends or is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorEvent {
    Finished(TriggerReport),
    Rejected {
        kind: TriggerKind,
        busy_with: TriggerId,
    },
}
