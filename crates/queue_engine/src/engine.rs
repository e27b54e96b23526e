use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use queue_core::{CursorPosition, FrameId, MenuClick, TabId};
use queue_logging::{queue_debug, queue_warn};

use crate::client::{ClientSettings, ReqwestQueueClient};
use crate::document::{PageDocument, Rect};
use crate::feedback::{BadgeSurface, FeedbackDispatcher, Notifier};
use crate::frame::{FrameHandle, ToastSurface};
use crate::host::TabRegistry;
use crate::options::OptionsPage;
use crate::orchestrator::{OrchestratorDeps, OrchestratorHandle, OrchestratorSettings};
use crate::popup::{PopupController, StatusLine};
use crate::settings::SettingsSource;
use crate::{HostError, OrchestratorEvent};

/// Requests from the application thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCommand {
    OpenTab { url: String, html: String },
    AddFrame { tab_id: TabId, url: String, html: String },
    Navigate { tab_id: TabId, url: String, html: String },
    Activate(TabId),
    CloseTab(TabId),
    Place {
        tab_id: TabId,
        frame_id: FrameId,
        element_id: String,
        rect: Rect,
    },
    PointerOver {
        tab_id: TabId,
        frame_id: FrameId,
        element_id: String,
    },
    PointerMoved {
        tab_id: TabId,
        frame_id: FrameId,
        position: CursorPosition,
    },
    Focus {
        tab_id: TabId,
        frame_id: FrameId,
        element_id: String,
    },
    MenuClick(MenuClick),
    Command(String),
    PopupOpened,
    PopupAddCurrent,
    PopupAddManual(String),
    SaveSettings { server_base: String, device_name: String },
    TestHealth { server_base: String },
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    TabOpened(TabId),
    FrameAdded { tab_id: TabId, frame_id: FrameId },
    /// Popup "current URL" line.
    CurrentUrl(String),
    PopupStatus(StatusLine),
    OptionsStatus(StatusLine),
    /// A menu click or command that is not a trigger.
    Ignored(String),
    Trigger(OrchestratorEvent),
    HostError(HostError),
}

/// Browser-side surfaces and configuration supplied by the host application.
pub struct RuntimeDeps {
    pub settings: Arc<dyn SettingsSource>,
    pub badge: Arc<dyn BadgeSurface>,
    pub notifier: Arc<dyn Notifier>,
    pub toast_surface: Arc<dyn ToastSurface>,
    pub client: ClientSettings,
    pub orchestrator: OrchestratorSettings,
}

/// Synchronous facade over the async extension: a tokio runtime on its own
/// thread, commands in and events out over std channels.
pub struct ExtensionRuntime {
    cmd_tx: mpsc::Sender<RuntimeCommand>,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ExtensionRuntime {
    pub fn new(deps: RuntimeDeps) -> io::Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("queue-runtime".to_string())
            .spawn(move || {
                let _guard = runtime.enter();
                let background = Background::start(deps, &runtime, event_tx);
                while let Ok(command) = cmd_rx.recv() {
                    if matches!(command, RuntimeCommand::Shutdown) {
                        break;
                    }
                    background.handle(command, &runtime);
                }
                background.stop();
            })?;

        Ok(Self {
            cmd_tx,
            event_rx,
            thread: Some(thread),
        })
    }

    pub fn send(&self, command: RuntimeCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv(&self) -> Option<RuntimeEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<RuntimeEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Stops the runtime thread and waits for it.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                queue_warn!("Runtime thread panicked");
            }
        }
    }
}

impl Drop for ExtensionRuntime {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Background {
    tabs: Arc<TabRegistry>,
    orchestrator: OrchestratorHandle,
    feedback: Arc<FeedbackDispatcher>,
    popup: Arc<PopupController>,
    options: Arc<OptionsPage>,
    event_tx: mpsc::Sender<RuntimeEvent>,
}

impl Background {
    fn start(
        deps: RuntimeDeps,
        runtime: &tokio::runtime::Runtime,
        event_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        let tabs = Arc::new(TabRegistry::new(deps.toast_surface));
        let client = Arc::new(ReqwestQueueClient::new(deps.client));
        let feedback = Arc::new(FeedbackDispatcher::new(
            deps.badge,
            deps.notifier,
            tabs.clone(),
        ));
        let (orchestrator, mut trigger_events) = OrchestratorHandle::spawn(
            OrchestratorDeps {
                host: tabs.clone(),
                client: client.clone(),
                settings: deps.settings.clone(),
                feedback: feedback.clone(),
            },
            deps.orchestrator,
        );

        let forward_tx = event_tx.clone();
        runtime.spawn(async move {
            while let Some(event) = trigger_events.recv().await {
                if forward_tx.send(RuntimeEvent::Trigger(event)).is_err() {
                    break;
                }
            }
        });

        Self {
            popup: Arc::new(PopupController::new(tabs.clone(), orchestrator.clone())),
            options: Arc::new(OptionsPage::new(deps.settings, client)),
            tabs,
            orchestrator,
            feedback,
            event_tx,
        }
    }

    fn emit(&self, event: RuntimeEvent) {
        let _ = self.event_tx.send(event);
    }

    fn frame(&self, tab_id: TabId, frame_id: FrameId) -> Result<FrameHandle, HostError> {
        self.tabs.frame(tab_id, frame_id)
    }

    fn handle(&self, command: RuntimeCommand, runtime: &tokio::runtime::Runtime) {
        let result = match command {
            RuntimeCommand::OpenTab { url, html } => {
                let document = PageDocument::parse(&html, Some(&url));
                let tab_id = self.tabs.open_tab(url, document);
                self.emit(RuntimeEvent::TabOpened(tab_id));
                Ok(())
            }
            RuntimeCommand::AddFrame { tab_id, url, html } => self
                .tabs
                .add_frame(tab_id, PageDocument::parse(&html, Some(&url)))
                .map(|frame_id| self.emit(RuntimeEvent::FrameAdded { tab_id, frame_id })),
            RuntimeCommand::Navigate { tab_id, url, html } => {
                let document = PageDocument::parse(&html, Some(&url));
                self.tabs.navigate(tab_id, url, document)
            }
            RuntimeCommand::Activate(tab_id) => self.tabs.activate(tab_id),
            RuntimeCommand::CloseTab(tab_id) => self.tabs.close_tab(tab_id),
            RuntimeCommand::Place {
                tab_id,
                frame_id,
                element_id,
                rect,
            } => self
                .frame(tab_id, frame_id)
                .and_then(|frame| frame.place(element_id, rect)),
            RuntimeCommand::PointerOver {
                tab_id,
                frame_id,
                element_id,
            } => self
                .frame(tab_id, frame_id)
                .and_then(|frame| frame.pointer_over(element_id)),
            RuntimeCommand::PointerMoved {
                tab_id,
                frame_id,
                position,
            } => self
                .frame(tab_id, frame_id)
                .and_then(|frame| frame.pointer_moved(position)),
            RuntimeCommand::Focus {
                tab_id,
                frame_id,
                element_id,
            } => self
                .frame(tab_id, frame_id)
                .and_then(|frame| frame.focus(element_id)),
            RuntimeCommand::MenuClick(click) => {
                if !self.orchestrator.menu_clicked(&click) {
                    self.emit(RuntimeEvent::Ignored(format!("menu item {}", click.menu_item_id)));
                }
                Ok(())
            }
            RuntimeCommand::Command(name) => {
                if !self.orchestrator.command(&name) {
                    self.emit(RuntimeEvent::Ignored(format!("command {name}")));
                }
                Ok(())
            }
            RuntimeCommand::PopupOpened => {
                let popup = self.popup.clone();
                let event_tx = self.event_tx.clone();
                runtime.spawn(async move {
                    let label = popup.current_url_label().await;
                    let _ = event_tx.send(RuntimeEvent::CurrentUrl(label));
                });
                Ok(())
            }
            RuntimeCommand::PopupAddCurrent => {
                let popup = self.popup.clone();
                let event_tx = self.event_tx.clone();
                runtime.spawn(async move {
                    let progress_tx = event_tx.clone();
                    let progress = move |status| {
                        let _ = progress_tx.send(RuntimeEvent::PopupStatus(status));
                    };
                    let status = popup.add_current_reporting(progress).await;
                    let _ = event_tx.send(RuntimeEvent::PopupStatus(status));
                });
                Ok(())
            }
            RuntimeCommand::PopupAddManual(input) => {
                let popup = self.popup.clone();
                let event_tx = self.event_tx.clone();
                runtime.spawn(async move {
                    let progress_tx = event_tx.clone();
                    let progress = move |status| {
                        let _ = progress_tx.send(RuntimeEvent::PopupStatus(status));
                    };
                    let status = popup.add_manual_reporting(&input, progress).await;
                    let _ = event_tx.send(RuntimeEvent::PopupStatus(status));
                });
                Ok(())
            }
            RuntimeCommand::SaveSettings {
                server_base,
                device_name,
            } => {
                let options = self.options.clone();
                let event_tx = self.event_tx.clone();
                runtime.spawn(async move {
                    let status = options.save(&server_base, &device_name).await;
                    let _ = event_tx.send(RuntimeEvent::OptionsStatus(status));
                });
                Ok(())
            }
            RuntimeCommand::TestHealth { server_base } => {
                let options = self.options.clone();
                let event_tx = self.event_tx.clone();
                runtime.spawn(async move {
                    let progress_tx = event_tx.clone();
                    let progress = move |status| {
                        let _ = progress_tx.send(RuntimeEvent::OptionsStatus(status));
                    };
                    let status = options.test_reporting(&server_base, progress).await;
                    let _ = event_tx.send(RuntimeEvent::OptionsStatus(status));
                });
                Ok(())
            }
            RuntimeCommand::Shutdown => Ok(()),
        };

        if let Err(err) = result {
            queue_debug!("Host command failed: {err}");
            self.emit(RuntimeEvent::HostError(err));
        }
    }

    fn stop(&self) {
        self.orchestrator.shutdown();
        self.feedback.shutdown();
    }
}
