mod support;

use std::sync::Arc;
use std::time::Duration;

use queue_core::MenuClick;
use queue_engine::{
    ClientSettings, ExtensionRuntime, HostError, OrchestratorEvent, OrchestratorSettings,
    RuntimeCommand, RuntimeDeps, RuntimeEvent, SharedSettings, StatusLine,
};
use support::{RecordingBadge, RecordingNotifier, RecordingToasts};

fn runtime(notifier: Arc<RecordingNotifier>) -> ExtensionRuntime {
    queue_logging::initialize_for_tests();
    ExtensionRuntime::new(RuntimeDeps {
        settings: Arc::new(SharedSettings::default()),
        badge: RecordingBadge::new(),
        notifier,
        toast_surface: RecordingToasts::new(),
        client: ClientSettings::default(),
        orchestrator: OrchestratorSettings::default(),
    })
    .unwrap()
}

fn next(runtime: &ExtensionRuntime) -> RuntimeEvent {
    runtime
        .recv_timeout(Duration::from_secs(5))
        .expect("runtime event in time")
}

#[test]
fn tabs_and_frames_are_reported() {
    let runtime = runtime(RecordingNotifier::new());

    runtime.send(RuntimeCommand::OpenTab {
        url: "https://www.youtube.com/".to_string(),
        html: "<a id='x' href='/watch?v=1'>x</a>".to_string(),
    });
    assert_eq!(next(&runtime), RuntimeEvent::TabOpened(1));

    runtime.send(RuntimeCommand::AddFrame {
        tab_id: 1,
        url: "https://www.youtube.com/embed/1".to_string(),
        html: String::new(),
    });
    assert_eq!(
        next(&runtime),
        RuntimeEvent::FrameAdded {
            tab_id: 1,
            frame_id: 1
        }
    );

    runtime.send(RuntimeCommand::PopupOpened);
    assert_eq!(
        next(&runtime),
        RuntimeEvent::CurrentUrl("https://www.youtube.com/".to_string())
    );

    runtime.send(RuntimeCommand::PointerOver {
        tab_id: 9,
        frame_id: 0,
        element_id: "x".to_string(),
    });
    assert_eq!(next(&runtime), RuntimeEvent::HostError(HostError::TabClosed(9)));

    runtime.shutdown();
}

#[test]
fn non_triggers_and_invalid_forms_report_back() {
    let runtime = runtime(RecordingNotifier::new());

    runtime.send(RuntimeCommand::MenuClick(MenuClick {
        menu_item_id: "cq_other".to_string(),
        ..MenuClick::default()
    }));
    assert_eq!(
        next(&runtime),
        RuntimeEvent::Ignored("menu item cq_other".to_string())
    );

    runtime.send(RuntimeCommand::MenuClick(MenuClick {
        menu_item_id: "cq_add_page".to_string(),
        page_url: Some("https://example.com/".to_string()),
        link_url: None,
        tab_id: Some(1),
    }));
    assert_eq!(
        next(&runtime),
        RuntimeEvent::Ignored("menu item cq_add_page".to_string())
    );

    runtime.send(RuntimeCommand::PopupAddManual(String::new()));
    assert_eq!(
        next(&runtime),
        RuntimeEvent::PopupStatus(StatusLine::failed("Paste a URL first"))
    );

    runtime.send(RuntimeCommand::SaveSettings {
        server_base: "localhost".to_string(),
        device_name: "Laptop".to_string(),
    });
    assert_eq!(
        next(&runtime),
        RuntimeEvent::OptionsStatus(StatusLine::failed(
            "Server must start with http:// or https://"
        ))
    );
}

#[test]
fn shortcut_without_candidate_finishes_with_notice() {
    let notifier = RecordingNotifier::new();
    let runtime = runtime(notifier.clone());

    runtime.send(RuntimeCommand::OpenTab {
        url: String::new(),
        html: String::new(),
    });
    assert_eq!(next(&runtime), RuntimeEvent::TabOpened(1));

    runtime.send(RuntimeCommand::Command("add-hovered-link".to_string()));
    match next(&runtime) {
        RuntimeEvent::Trigger(OrchestratorEvent::Finished(report)) => {
            assert_eq!(report.submitted_url, None);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(notifier.messages(), vec!["No hovered link or active tab URL"]);
}

#[test]
fn interim_status_precedes_final_status() {
    let runtime = runtime(RecordingNotifier::new());

    runtime.send(RuntimeCommand::TestHealth {
        server_base: "http://127.0.0.1:9".to_string(),
    });
    assert_eq!(
        next(&runtime),
        RuntimeEvent::OptionsStatus(StatusLine::ok("Testing..."))
    );
    match next(&runtime) {
        RuntimeEvent::OptionsStatus(status) => {
            assert!(!status.ok);
            assert!(status.text.starts_with("Health error: "), "{}", status.text);
        }
        other => panic!("unexpected event {other:?}"),
    }

    runtime.send(RuntimeCommand::PopupAddManual("https://youtu.be/abc".to_string()));
    let statuses: Vec<StatusLine> = std::iter::from_fn(|| Some(next(&runtime)))
        .filter_map(|event| match event {
            RuntimeEvent::PopupStatus(status) => Some(status),
            _ => None,
        })
        .take(2)
        .collect();
    assert_eq!(statuses[0], StatusLine::ok("Adding..."));
    assert_ne!(statuses[1].text, "Adding...");
}
