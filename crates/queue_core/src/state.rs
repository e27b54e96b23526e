use crate::{Candidate, CursorPosition, SubmissionOutcome, TabId, TriggerId, TriggerKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerPhase {
    #[default]
    Idle,
    ResolvingCandidate,
    Submitting,
    Dispatching,
}

/// The trigger currently owning the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTrigger {
    pub id: TriggerId,
    pub kind: TriggerKind,
    pub origin_tab: Option<TabId>,
    pub cursor: Option<CursorPosition>,
    pub candidate: Option<Candidate>,
    pub outcome: Option<SubmissionOutcome>,
}

/// Orchestrator state. Doubles as the mutex that keeps one trigger in flight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrchestratorState {
    phase: TriggerPhase,
    active: Option<ActiveTrigger>,
    last_trigger_id: TriggerId,
    completed: u64,
}

impl OrchestratorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TriggerPhase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == TriggerPhase::Idle
    }

    pub fn active(&self) -> Option<&ActiveTrigger> {
        self.active.as_ref()
    }

    pub fn active_id(&self) -> Option<TriggerId> {
        self.active.as_ref().map(|active| active.id)
    }

    /// Number of triggers that reached `Idle` again.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub(crate) fn begin(&mut self, kind: TriggerKind, origin_tab: Option<TabId>) -> TriggerId {
        self.last_trigger_id += 1;
        self.active = Some(ActiveTrigger {
            id: self.last_trigger_id,
            kind,
            origin_tab,
            cursor: None,
            candidate: None,
            outcome: None,
        });
        self.last_trigger_id
    }

    pub(crate) fn set_phase(&mut self, phase: TriggerPhase) {
        self.phase = phase;
    }

    /// Active trigger, but only when `trigger_id` still owns the orchestrator
    /// and it sits in `phase`. Late messages for older triggers get `None`.
    pub(crate) fn active_in(
        &mut self,
        trigger_id: TriggerId,
        phase: TriggerPhase,
    ) -> Option<&mut ActiveTrigger> {
        if self.phase != phase {
            return None;
        }
        self.active
            .as_mut()
            .filter(|active| active.id == trigger_id)
    }

    pub(crate) fn finish(&mut self) -> Option<ActiveTrigger> {
        self.phase = TriggerPhase::Idle;
        let finished = self.active.take();
        if finished.is_some() {
            self.completed += 1;
        }
        finished
    }
}
