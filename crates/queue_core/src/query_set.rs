//! Bookkeeping for one hover-resolution attempt across the frames of a tab.

use crate::{Candidate, CandidateSource, FrameId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameReply {
    /// The frame answered; empty means it had no hovered link.
    Answered(String),
    TimedOut,
    /// The frame is gone or refused the message.
    Unreachable,
}

impl FrameReply {
    fn usable_href(&self) -> Option<&str> {
        match self {
            FrameReply::Answered(href) if !href.is_empty() => Some(href),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryDecision {
    /// An earlier frame in enumeration order has not settled yet.
    Pending,
    Found { frame_id: FrameId, href: String },
    /// Every frame settled without a usable answer.
    Exhausted,
}

/// Replies collected per frame, kept in enumeration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySet {
    slots: Vec<(FrameId, Option<FrameReply>)>,
}

impl QuerySet {
    pub fn new(frames: impl IntoIterator<Item = FrameId>) -> Self {
        let mut slots: Vec<(FrameId, Option<FrameReply>)> = Vec::new();
        for frame_id in frames {
            if !slots.iter().any(|(id, _)| *id == frame_id) {
                slots.push((frame_id, None));
            }
        }
        Self { slots }
    }

    pub fn frame_ids(&self) -> impl Iterator<Item = FrameId> + '_ {
        self.slots.iter().map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Records the first reply of a frame. Unknown frames and repeated replies
    /// are ignored and return false.
    pub fn record(&mut self, frame_id: FrameId, reply: FrameReply) -> bool {
        match self.slots.iter_mut().find(|(id, _)| *id == frame_id) {
            Some((_, slot @ None)) => {
                *slot = Some(reply);
                true
            }
            _ => false,
        }
    }

    /// The first frame in enumeration order with a non-empty answer wins, but
    /// only once every frame before it has settled.
    pub fn decision(&self) -> QueryDecision {
        for (frame_id, reply) in &self.slots {
            match reply {
                None => return QueryDecision::Pending,
                Some(reply) => {
                    if let Some(href) = reply.usable_href() {
                        return QueryDecision::Found {
                            frame_id: *frame_id,
                            href: href.to_string(),
                        };
                    }
                }
            }
        }
        QueryDecision::Exhausted
    }

    /// Final candidate: the winning frame's link, else the tab URL.
    pub fn candidate(&self, tab_url: &str) -> Option<Candidate> {
        match self.decision() {
            QueryDecision::Found { href, .. } => Some(Candidate::new(href, CandidateSource::Link)),
            QueryDecision::Pending | QueryDecision::Exhausted => {
                let tab_url = tab_url.trim();
                (!tab_url.is_empty())
                    .then(|| Candidate::new(tab_url, CandidateSource::ActiveTabUrl))
            }
        }
    }
}
