use crate::{
    AddUrlReply, Candidate, CandidateSource, Effect, FeedbackEvent, Msg, OrchestratorState,
    Resolution, Trigger, TriggerKind, TriggerPhase, TriggerReport, NO_CANDIDATE_MESSAGE,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: OrchestratorState, msg: Msg) -> (OrchestratorState, Vec<Effect>) {
    let effects = match msg {
        Msg::TriggerFired(trigger) => {
            if let Some(busy_with) = state.active_id().filter(|_| !state.is_idle()) {
                return (
                    state,
                    vec![Effect::Rejected {
                        kind: trigger.kind(),
                        busy_with,
                    }],
                );
            }
            start_trigger(&mut state, trigger)
        }
        Msg::CandidateResolved {
            trigger_id,
            resolution,
        } => {
            let Some(active) = state.active_in(trigger_id, TriggerPhase::ResolvingCandidate)
            else {
                return (state, Vec::new());
            };
            match resolution {
                Resolution::Found {
                    candidate,
                    tab_id,
                    cursor,
                } => {
                    active.origin_tab = tab_id;
                    active.cursor = cursor;
                    let url = candidate.href.clone();
                    active.candidate = Some(candidate);
                    state.set_phase(TriggerPhase::Submitting);
                    let mut effects = Vec::with_capacity(2);
                    if let Some(tab_id) = tab_id {
                        effects.push(Effect::ShowProgressToast { trigger_id, tab_id });
                    }
                    effects.push(Effect::Submit { trigger_id, url });
                    effects
                }
                Resolution::NoCandidate { tab_id } => {
                    active.origin_tab = tab_id;
                    state.set_phase(TriggerPhase::Dispatching);
                    vec![Effect::Notice {
                        trigger_id,
                        message: NO_CANDIDATE_MESSAGE.to_string(),
                    }]
                }
            }
        }
        Msg::SubmissionFinished {
            trigger_id,
            outcome,
        } => {
            let Some(active) = state.active_in(trigger_id, TriggerPhase::Submitting) else {
                return (state, Vec::new());
            };
            let event = FeedbackEvent::from_outcome(&outcome, active.origin_tab, active.cursor);
            let mut effects = Vec::with_capacity(2);
            if active.kind == TriggerKind::PopupAddUrl {
                effects.push(Effect::ReplyToPopup {
                    trigger_id,
                    reply: AddUrlReply::from_outcome(&outcome),
                });
            }
            active.outcome = Some(outcome);
            state.set_phase(TriggerPhase::Dispatching);
            effects.push(Effect::DispatchFeedback { trigger_id, event });
            effects
        }
        Msg::FeedbackDispatched { trigger_id } => {
            if state
                .active_in(trigger_id, TriggerPhase::Dispatching)
                .is_none()
            {
                return (state, Vec::new());
            }
            match state.finish() {
                Some(finished) => vec![Effect::Finished(TriggerReport {
                    trigger_id: finished.id,
                    kind: finished.kind,
                    submitted_url: finished.candidate.map(|candidate| candidate.href),
                    outcome: finished.outcome,
                })],
                None => Vec::new(),
            }
        }
    };

    (state, effects)
}

fn start_trigger(state: &mut OrchestratorState, trigger: Trigger) -> Vec<Effect> {
    let kind = trigger.kind();
    let (origin_tab, direct) = match trigger {
        Trigger::MenuAddPage { page_url, tab_id } => (
            tab_id,
            Some(Candidate::new(page_url.trim(), CandidateSource::ActiveTabUrl)),
        ),
        Trigger::MenuAddLink { link_url, tab_id } => (
            tab_id,
            Some(Candidate::new(link_url.trim(), CandidateSource::Link)),
        ),
        Trigger::PopupAddUrl { url } => {
            (None, Some(Candidate::new(url.trim(), CandidateSource::Popup)))
        }
        Trigger::HoverShortcut => (None, None),
    };
    let trigger_id = state.begin(kind, origin_tab);

    let Some(candidate) = direct else {
        state.set_phase(TriggerPhase::ResolvingCandidate);
        return vec![Effect::ResolveHoveredLink { trigger_id }];
    };

    if candidate.href.is_empty() {
        state.set_phase(TriggerPhase::Dispatching);
        let mut effects = Vec::with_capacity(2);
        if kind == TriggerKind::PopupAddUrl {
            effects.push(Effect::ReplyToPopup {
                trigger_id,
                reply: AddUrlReply::error("No URL provided"),
            });
        }
        effects.push(Effect::Notice {
            trigger_id,
            message: NO_CANDIDATE_MESSAGE.to_string(),
        });
        return effects;
    }

    let url = candidate.href.clone();
    if let Some(active) = state.active_in(trigger_id, TriggerPhase::Idle) {
        active.candidate = Some(candidate);
    }
    state.set_phase(TriggerPhase::Submitting);
    vec![Effect::Submit { trigger_id, url }]
}
