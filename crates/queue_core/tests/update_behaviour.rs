use std::sync::Once;

use pretty_assertions::assert_eq;
use queue_core::{
    update, AddUrlReply, Candidate, CandidateSource, CursorPosition, Effect, FeedbackEvent,
    MenuClick, Msg, OrchestratorState, Resolution, SubmissionOutcome, Trigger, TriggerKind,
    TriggerPhase, TriggerReport, NO_CANDIDATE_MESSAGE,
};
use serde_json::json;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(queue_logging::initialize_for_tests);
}

fn fire(state: OrchestratorState, trigger: Trigger) -> (OrchestratorState, Vec<Effect>) {
    update(state, Msg::TriggerFired(trigger))
}

fn submitted_urls(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Submit { url, .. } => Some(url.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn menu_page_click_submits_page_url_directly() {
    init_logging();
    let click = MenuClick {
        menu_item_id: "cq_add_page".to_string(),
        page_url: Some("https://www.youtube.com/watch?v=1".to_string()),
        link_url: None,
        tab_id: Some(4),
    };
    let trigger = Trigger::from_menu_click(&click).expect("page trigger");

    let (state, effects) = fire(OrchestratorState::new(), trigger);

    assert_eq!(state.phase(), TriggerPhase::Submitting);
    assert_eq!(
        effects,
        vec![Effect::Submit {
            trigger_id: 1,
            url: "https://www.youtube.com/watch?v=1".to_string(),
        }]
    );
    assert_eq!(state.active().unwrap().origin_tab, Some(4));
}

#[test]
fn menu_click_without_expected_url_is_not_a_trigger() {
    let link_without_url = MenuClick {
        menu_item_id: "cq_add_link".to_string(),
        page_url: Some("https://example.com".to_string()),
        ..MenuClick::default()
    };
    assert_eq!(Trigger::from_menu_click(&link_without_url), None);

    let unknown = MenuClick {
        menu_item_id: "other".to_string(),
        page_url: Some("https://example.com".to_string()),
        ..MenuClick::default()
    };
    assert_eq!(Trigger::from_menu_click(&unknown), None);
    assert_eq!(Trigger::from_command("something-else"), None);
    assert_eq!(
        Trigger::from_command("add-hovered-link"),
        Some(Trigger::HoverShortcut)
    );
}

#[test]
fn menu_click_outside_media_patterns_is_not_a_trigger() {
    let page_elsewhere = MenuClick {
        menu_item_id: "cq_add_page".to_string(),
        page_url: Some("https://example.com/".to_string()),
        tab_id: Some(1),
        ..MenuClick::default()
    };
    assert_eq!(Trigger::from_menu_click(&page_elsewhere), None);

    let link_elsewhere = MenuClick {
        menu_item_id: "cq_add_link".to_string(),
        page_url: Some("https://www.youtube.com/".to_string()),
        link_url: Some("https://example.com/video".to_string()),
        tab_id: Some(1),
    };
    assert_eq!(Trigger::from_menu_click(&link_elsewhere), None);

    // Link items only look at the link target, not the page.
    let media_link_on_other_page = MenuClick {
        menu_item_id: "cq_add_link".to_string(),
        page_url: Some("https://example.com/".to_string()),
        link_url: Some("https://youtu.be/abc".to_string()),
        tab_id: Some(1),
    };
    assert_eq!(
        Trigger::from_menu_click(&media_link_on_other_page),
        Some(Trigger::MenuAddLink {
            link_url: "https://youtu.be/abc".to_string(),
            tab_id: Some(1),
        })
    );
}

#[test]
fn hover_shortcut_resolves_then_shows_progress_and_submits() {
    init_logging();
    let (state, effects) = fire(OrchestratorState::new(), Trigger::HoverShortcut);
    assert_eq!(state.phase(), TriggerPhase::ResolvingCandidate);
    assert_eq!(effects, vec![Effect::ResolveHoveredLink { trigger_id: 1 }]);

    let (state, effects) = update(
        state,
        Msg::CandidateResolved {
            trigger_id: 1,
            resolution: Resolution::Found {
                candidate: Candidate::new("https://youtu.be/abc", CandidateSource::Link),
                tab_id: Some(2),
                cursor: Some(CursorPosition::new(10, 20)),
            },
        },
    );
    assert_eq!(state.phase(), TriggerPhase::Submitting);
    assert_eq!(
        effects,
        vec![
            Effect::ShowProgressToast {
                trigger_id: 1,
                tab_id: 2
            },
            Effect::Submit {
                trigger_id: 1,
                url: "https://youtu.be/abc".to_string(),
            },
        ]
    );

    let (state, effects) = update(
        state,
        Msg::SubmissionFinished {
            trigger_id: 1,
            outcome: SubmissionOutcome::Success(json!({"queued": true})),
        },
    );
    assert_eq!(state.phase(), TriggerPhase::Dispatching);
    assert_eq!(
        effects,
        vec![Effect::DispatchFeedback {
            trigger_id: 1,
            event: FeedbackEvent {
                success: true,
                message: "Added to queue".to_string(),
                toast_text: "Added to queue".to_string(),
                origin_tab: Some(2),
                cursor: Some(CursorPosition::new(10, 20)),
            },
        }]
    );

    let (state, effects) = update(state, Msg::FeedbackDispatched { trigger_id: 1 });
    assert!(state.is_idle());
    assert_eq!(state.completed(), 1);
    assert_eq!(
        effects,
        vec![Effect::Finished(TriggerReport {
            trigger_id: 1,
            kind: TriggerKind::HoverShortcut,
            submitted_url: Some("https://youtu.be/abc".to_string()),
            outcome: Some(SubmissionOutcome::Success(json!({"queued": true}))),
        })]
    );
}

#[test]
fn no_candidate_ends_with_notice_and_no_submission() {
    init_logging();
    let (state, _) = fire(OrchestratorState::new(), Trigger::HoverShortcut);
    let (state, effects) = update(
        state,
        Msg::CandidateResolved {
            trigger_id: 1,
            resolution: Resolution::NoCandidate { tab_id: Some(3) },
        },
    );

    assert!(submitted_urls(&effects).is_empty());
    assert_eq!(
        effects,
        vec![Effect::Notice {
            trigger_id: 1,
            message: NO_CANDIDATE_MESSAGE.to_string(),
        }]
    );

    let (state, effects) = update(state, Msg::FeedbackDispatched { trigger_id: 1 });
    assert!(state.is_idle());
    assert!(matches!(
        effects.as_slice(),
        [Effect::Finished(TriggerReport {
            submitted_url: None,
            outcome: None,
            ..
        })]
    ));
}

#[test]
fn second_trigger_while_busy_is_rejected_not_queued() {
    init_logging();
    let (state, first) = fire(OrchestratorState::new(), Trigger::HoverShortcut);
    assert_eq!(first.len(), 1);

    let (state, second) = fire(state, Trigger::HoverShortcut);
    assert_eq!(
        second,
        vec![Effect::Rejected {
            kind: TriggerKind::HoverShortcut,
            busy_with: 1,
        }]
    );
    assert_eq!(state.phase(), TriggerPhase::ResolvingCandidate);
    assert_eq!(state.active_id(), Some(1));

    let (_state, popup) = fire(
        state,
        Trigger::PopupAddUrl {
            url: "https://youtu.be/x".to_string(),
        },
    );
    assert!(submitted_urls(&popup).is_empty());
}

#[test]
fn stale_replies_do_not_touch_a_newer_trigger() {
    init_logging();
    let (state, _) = fire(OrchestratorState::new(), Trigger::HoverShortcut);
    let (state, _) = update(
        state,
        Msg::CandidateResolved {
            trigger_id: 1,
            resolution: Resolution::NoCandidate { tab_id: None },
        },
    );
    let (state, _) = update(state, Msg::FeedbackDispatched { trigger_id: 1 });
    let (state, _) = fire(state, Trigger::HoverShortcut);
    assert_eq!(state.active_id(), Some(2));

    let before = state.clone();
    let (state, effects) = update(
        state,
        Msg::CandidateResolved {
            trigger_id: 1,
            resolution: Resolution::Found {
                candidate: Candidate::new("https://late", CandidateSource::Link),
                tab_id: None,
                cursor: None,
            },
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);
}

#[test]
fn popup_gets_reply_with_outcome() {
    init_logging();
    let (state, effects) = fire(
        OrchestratorState::new(),
        Trigger::PopupAddUrl {
            url: "  https://youtu.be/abc ".to_string(),
        },
    );
    assert_eq!(submitted_urls(&effects), vec!["https://youtu.be/abc"]);

    let (_state, effects) = update(
        state,
        Msg::SubmissionFinished {
            trigger_id: 1,
            outcome: SubmissionOutcome::HttpError {
                status: 500,
                body: "queue full".to_string(),
            },
        },
    );

    match effects.as_slice() {
        [Effect::ReplyToPopup { reply, .. }, Effect::DispatchFeedback { event, .. }] => {
            assert_eq!(reply, &AddUrlReply::error("HTTP 500: queue full"));
            assert!(!event.success);
            assert!(event.message.contains("500"));
            assert!(event.message.contains("queue full"));
            assert_eq!(event.origin_tab, None);
        }
        other => panic!("unexpected effects: {other:?}"),
    }
}

#[test]
fn empty_popup_url_replies_without_submitting() {
    init_logging();
    let (state, effects) = fire(
        OrchestratorState::new(),
        Trigger::PopupAddUrl {
            url: "   ".to_string(),
        },
    );

    assert!(submitted_urls(&effects).is_empty());
    assert_eq!(state.phase(), TriggerPhase::Dispatching);
    assert!(effects.iter().any(|effect| matches!(
        effect,
        Effect::ReplyToPopup { reply, .. } if !reply.ok
    )));
}

#[test]
fn parse_error_counts_as_success() {
    let (state, _) = fire(
        OrchestratorState::new(),
        Trigger::PopupAddUrl {
            url: "https://youtu.be/abc".to_string(),
        },
    );
    let (_state, effects) = update(
        state,
        Msg::SubmissionFinished {
            trigger_id: 1,
            outcome: SubmissionOutcome::ParseError,
        },
    );

    match effects.as_slice() {
        [Effect::ReplyToPopup { reply, .. }, Effect::DispatchFeedback { event, .. }] => {
            assert!(reply.ok);
            assert_eq!(reply.result, Some(json!({})));
            assert!(event.success);
        }
        other => panic!("unexpected effects: {other:?}"),
    }
}
