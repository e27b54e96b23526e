//! Background orchestrator: executes the effects of the trigger state machine.
//!
//! The loop never awaits IO itself. Each effect runs as its own task and
//! reports back with a [`Msg`], so triggers arriving mid-flight still reach
//! [`update`] and are rejected there instead of queueing up.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use queue_core::{
    update, AddUrlReply, Effect, MenuClick, Msg, OrchestratorState, SubmissionRequest, TabId,
    Trigger, TriggerId,
};
use queue_logging::{queue_debug, queue_info};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::client::QueueClient;
use crate::feedback::FeedbackDispatcher;
use crate::host::BrowserHost;
use crate::resolve::resolve_hovered_link;
use crate::settings::SettingsSource;
use crate::OrchestratorEvent;

pub const NO_RESPONSE: &str = "No response";

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Per-frame budget for a hovered-link query.
    pub frame_timeout: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            frame_timeout: Duration::from_millis(300),
        }
    }
}

/// Collaborators the orchestrator drives.
#[derive(Clone)]
pub struct OrchestratorDeps {
    pub host: Arc<dyn BrowserHost>,
    pub client: Arc<dyn QueueClient>,
    pub settings: Arc<dyn SettingsSource>,
    pub feedback: Arc<FeedbackDispatcher>,
}

enum Command {
    Fire {
        trigger: Trigger,
        reply: Option<oneshot::Sender<AddUrlReply>>,
    },
}

#[derive(Clone)]
pub struct OrchestratorHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
    cancel: CancellationToken,
}

impl OrchestratorHandle {
    /// Spawns the orchestrator on the current tokio runtime.
    pub fn spawn(
        deps: OrchestratorDeps,
        settings: OrchestratorSettings,
    ) -> (Self, mpsc::UnboundedReceiver<OrchestratorEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let orchestrator = Orchestrator {
            deps,
            settings,
            state: OrchestratorState::new(),
            popup_reply: None,
            progress_tab: None,
            msg_tx,
            event_tx,
            cancel: cancel.clone(),
        };
        tokio::spawn(orchestrator.run(cmd_rx, msg_rx));

        (Self { cmd_tx, cancel }, event_rx)
    }

    /// Returns `false` when the orchestrator has shut down.
    pub fn fire(&self, trigger: Trigger) -> bool {
        self.cmd_tx
            .send(Command::Fire {
                trigger,
                reply: None,
            })
            .is_ok()
    }

    /// Context-menu click. Unknown items and clicks without the expected URL
    /// are ignored and return `false`.
    pub fn menu_clicked(&self, click: &MenuClick) -> bool {
        match Trigger::from_menu_click(click) {
            Some(trigger) => self.fire(trigger),
            None => {
                queue_debug!("Ignoring menu click {:?}", click.menu_item_id);
                false
            }
        }
    }

    /// Keyboard command. Only `add-hovered-link` is a trigger.
    pub fn command(&self, name: &str) -> bool {
        match Trigger::from_command(name) {
            Some(trigger) => self.fire(trigger),
            None => {
                queue_debug!("Ignoring command {name:?}");
                false
            }
        }
    }

    /// Popup `addUrl` request. Resolves once the submission outcome is known.
    pub async fn add_url(&self, url: impl Into<String>) -> AddUrlReply {
        let (reply_tx, reply_rx) = oneshot::channel();
        let command = Command::Fire {
            trigger: Trigger::PopupAddUrl { url: url.into() },
            reply: Some(reply_tx),
        };
        if self.cmd_tx.send(command).is_err() {
            return AddUrlReply::error(NO_RESPONSE);
        }
        reply_rx
            .await
            .unwrap_or_else(|_| AddUrlReply::error(NO_RESPONSE))
    }

    /// Stops the loop and every effect still running.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && !self.cmd_tx.is_closed()
    }
}

struct Orchestrator {
    deps: OrchestratorDeps,
    settings: OrchestratorSettings,
    state: OrchestratorState,
    popup_reply: Option<(TriggerId, oneshot::Sender<AddUrlReply>)>,
    /// Tab owed an optimistic toast ahead of the next submission.
    progress_tab: Option<TabId>,
    msg_tx: mpsc::UnboundedSender<Msg>,
    event_tx: mpsc::UnboundedSender<OrchestratorEvent>,
    cancel: CancellationToken,
}

impl Orchestrator {
    async fn run(
        mut self,
        mut cmd_rx: mpsc::UnboundedReceiver<Command>,
        mut msg_rx: mpsc::UnboundedReceiver<Msg>,
    ) {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                command = cmd_rx.recv() => match command {
                    Some(Command::Fire { trigger, reply }) => self.on_trigger(trigger, reply),
                    None => break,
                },
                Some(msg) = msg_rx.recv() => {
                    let effects = self.step(msg);
                    self.run_effects(effects);
                }
            }
        }
        self.cancel.cancel();
        queue_debug!("Orchestrator stopped");
    }

    fn step(&mut self, msg: Msg) -> Vec<Effect> {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        effects
    }

    fn on_trigger(&mut self, trigger: Trigger, reply: Option<oneshot::Sender<AddUrlReply>>) {
        queue_debug!("Trigger {}", trigger.kind().label());
        let effects = self.step(Msg::TriggerFired(trigger));
        if let Some(reply) = reply {
            let rejected = effects
                .iter()
                .any(|effect| matches!(effect, Effect::Rejected { .. }));
            match self.state.active_id() {
                Some(trigger_id) if !rejected => self.popup_reply = Some((trigger_id, reply)),
                _ => {
                    let _ = reply.send(AddUrlReply::busy());
                }
            }
        }
        self.run_effects(effects);
    }

    fn spawn_effect<F>(&self, effect: F)
    where
        F: Future<Output = Msg> + Send + 'static,
    {
        let msg_tx = self.msg_tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                msg = effect => {
                    let _ = msg_tx.send(msg);
                }
            }
        });
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ResolveHoveredLink { trigger_id } => {
                let host = self.deps.host.clone();
                let frame_timeout = self.settings.frame_timeout;
                self.spawn_effect(async move {
                    let resolution = resolve_hovered_link(host.as_ref(), frame_timeout).await;
                    Msg::CandidateResolved {
                        trigger_id,
                        resolution,
                    }
                });
            }
            Effect::ShowProgressToast { tab_id, .. } => self.progress_tab = Some(tab_id),
            Effect::Submit { trigger_id, url } => {
                let client = self.deps.client.clone();
                let settings = self.deps.settings.clone();
                let feedback = self.deps.feedback.clone();
                let progress_tab = self.progress_tab.take();
                self.spawn_effect(async move {
                    // Delivered before the request so it always precedes the final toast.
                    if let Some(tab_id) = progress_tab {
                        feedback.progress_toast(tab_id).await;
                    }
                    let settings = settings.load().await;
                    let request = SubmissionRequest {
                        url,
                        device_name: settings.device_name,
                    };
                    let outcome = client.submit(&settings.server_base, &request).await;
                    Msg::SubmissionFinished {
                        trigger_id,
                        outcome,
                    }
                });
            }
            Effect::DispatchFeedback { trigger_id, event } => {
                let feedback = self.deps.feedback.clone();
                self.spawn_effect(async move {
                    feedback.dispatch(&event).await;
                    Msg::FeedbackDispatched { trigger_id }
                });
            }
            Effect::Notice {
                trigger_id,
                message,
            } => {
                queue_info!("{message}");
                self.deps.feedback.notice(&message);
                let _ = self.msg_tx.send(Msg::FeedbackDispatched { trigger_id });
            }
            Effect::ReplyToPopup { trigger_id, reply } => match self.popup_reply.take() {
                Some((waiting, sender)) if waiting == trigger_id => {
                    let _ = sender.send(reply);
                }
                other => self.popup_reply = other,
            },
            Effect::Finished(report) => {
                queue_info!(
                    "Trigger {} ({}) finished: {}",
                    report.trigger_id,
                    report.kind.label(),
                    report
                        .outcome
                        .as_ref()
                        .map(|outcome| outcome.summary())
                        .unwrap_or_else(|| "nothing submitted".to_string())
                );
                if matches!(&self.popup_reply, Some((waiting, _)) if *waiting == report.trigger_id)
                {
                    self.popup_reply = None;
                }
                let _ = self.event_tx.send(OrchestratorEvent::Finished(report));
            }
            Effect::Rejected { kind, busy_with } => {
                queue_info!(
                    "Dropped {} trigger, trigger {busy_with} still in flight",
                    kind.label()
                );
                let _ = self
                    .event_tx
                    .send(OrchestratorEvent::Rejected { kind, busy_with });
            }
        }
    }
}
