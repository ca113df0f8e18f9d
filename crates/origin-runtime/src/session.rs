//! Participant session - server side of the synchronization protocol
//!
//! A session owns one participant's [`AssignmentState`] and its
//! [`SelectionEngine`]. It is driven by exactly one task, so requests are
//! applied strictly in arrival order. Messages for the client and events for
//! subscribers are queued and drained by the connection driver.

use std::collections::VecDeque;

use origin_core::{AssignmentRecord, Identifier, Participant};
use origin_state::{AssignmentState, GrantBundle};
use origin_wire::{ClientMessage, ServerMessage};

use crate::{ChoiceOutcome, ChoiceRequest, SelectionEngine, SelectionEvent, SweepOutcome};

#[derive(Clone, Debug, Default)]
pub struct SessionStats {
    pub choices: u64,
    pub rejected: u64,
    pub auto_assigned: u64,
    pub ignored_messages: u64,
    pub messages_out: u64,
}

/// Coordinator-side session for one participant
#[derive(Debug)]
pub struct ParticipantSession {
    participant: Participant,
    state: AssignmentState,
    engine: SelectionEngine,
    outgoing: VecDeque<ServerMessage>,
    events: VecDeque<SelectionEvent>,
    stats: SessionStats,
}

impl ParticipantSession {
    /// Fresh participant with no prior state
    pub fn new(participant: Participant, engine: SelectionEngine) -> Self {
        ParticipantSession {
            participant,
            state: AssignmentState::new(),
            engine,
            outgoing: VecDeque::new(),
            events: VecDeque::new(),
            stats: SessionStats::default(),
        }
    }

    /// Participant returning with a persisted record. A record that is
    /// already complete does not fire the completion event again.
    pub fn restore(participant: Participant, engine: SelectionEngine, record: &AssignmentRecord) -> Self {
        let mut session = ParticipantSession::new(participant, engine);
        session.state = AssignmentState::from_record(record);
        let registry = session.engine.registry().as_ref();
        if session.state.has_all_origins(registry, &session.participant) {
            session.state.assume_complete();
        }
        session
    }

    pub fn participant(&self) -> &Participant {
        &self.participant
    }

    pub fn state(&self) -> &AssignmentState {
        &self.state
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Record for persistence and full syncs
    pub fn snapshot(&self) -> AssignmentRecord {
        self.state.to_record()
    }

    pub fn has_all_origins(&self) -> bool {
        self.state
            .has_all_origins(self.engine.registry().as_ref(), &self.participant)
    }

    /// Admit the participant: sweep with default origins, sync, and request
    /// the selection UI if any layer still needs a choice
    pub fn join(&mut self) -> SweepOutcome {
        let had_all = self.has_all_origins();
        let had_origin_before = self.state.had_origin_before();
        let sweep = self.engine.sweep(&mut self.state, &self.participant, true);
        self.finish_sweep(&sweep, had_all, had_origin_before);
        sweep
    }

    /// Clear every layer and start a new lifecycle epoch, then select again
    pub fn reset(&mut self) -> SweepOutcome {
        tracing::info!(participant = %self.participant.id, "resetting assignments");
        let layers: Vec<Identifier> = self
            .engine
            .registry()
            .layers()
            .into_iter()
            .map(|layer| layer.id.clone())
            .collect();
        self.state.reset(layers.iter());

        let had_origin_before = self.state.had_origin_before();
        let sweep = self.engine.sweep(&mut self.state, &self.participant, false);
        self.finish_sweep(&sweep, false, had_origin_before);
        sweep
    }

    /// Force the bundle's assignable entries. With nothing assignable every
    /// enabled layer is cleared instead. Any layer left open is offered for
    /// selection as a first-time choice.
    pub fn apply_grant(&mut self, bundle: &GrantBundle) -> SweepOutcome {
        let registry = std::sync::Arc::clone(self.engine.registry());
        let had_origin_before = self.state.had_origin_before();

        let mut forced = false;
        for entry in bundle.assignable(registry.as_ref()) {
            self.state.set_origin(entry.layer.clone(), entry.origin.clone());
            forced = true;
        }
        if !forced {
            for layer in registry.enabled_layers() {
                self.state.set_origin(layer.id.clone(), Identifier::empty());
            }
        }
        tracing::info!(
            participant = %self.participant.id,
            forced,
            entries = bundle.entries().len(),
            "grant applied"
        );

        let sweep = self.engine.sweep(&mut self.state, &self.participant, false);
        self.finish_sweep(&sweep, false, had_origin_before);
        sweep
    }

    /// Handle one message from the admitted client
    pub fn handle(&mut self, message: ClientMessage) {
        match message {
            ClientMessage::RequestChoice { layer, origin } => {
                self.choose(&layer, ChoiceRequest::Explicit(origin));
            }
            ClientMessage::RequestRandomChoice { layer } => {
                self.choose(&layer, ChoiceRequest::Random);
            }
            other => {
                self.stats.ignored_messages += 1;
                tracing::warn!(
                    participant = %self.participant.id,
                    kind = ?other.kind(),
                    "handshake message after admission"
                );
            }
        }
    }

    /// Apply a choice and queue ConfirmAssignment followed by FullStateSync.
    ///
    /// The confirmation is sent whatever the outcome, so the client always
    /// converges on the authoritative value.
    pub fn choose(&mut self, layer: &Identifier, request: ChoiceRequest) -> ChoiceOutcome {
        let outcome = self
            .engine
            .apply_choice(&mut self.state, &self.participant, layer, request);

        self.stats.choices += 1;
        if outcome.rejection.is_some() {
            self.stats.rejected += 1;
        }
        self.stats.auto_assigned += outcome.sweep.auto_assigned.len() as u64;
        if let Some(event) = &outcome.event {
            self.events.push_back(event.clone());
        }

        self.push(ServerMessage::ConfirmAssignment {
            layer: outcome.layer.clone(),
            origin: outcome.origin.clone(),
        });
        self.state.set_selecting(false);
        self.push_sync();
        outcome
    }

    fn finish_sweep(&mut self, sweep: &SweepOutcome, had_all: bool, had_origin_before: bool) {
        self.stats.auto_assigned += sweep.auto_assigned.len() as u64;
        if let Some(event) =
            self.engine
                .check_completion(&mut self.state, &self.participant, had_origin_before)
        {
            self.events.push_back(event);
        }

        let selecting = sweep.needs_selection();
        self.state.set_selecting(selecting);
        self.push_sync();
        if selecting {
            self.push(ServerMessage::OpenSelectionUi {
                is_reassignment: had_all,
            });
        }
    }

    fn push_sync(&mut self) {
        self.push(ServerMessage::FullStateSync {
            record: self.state.to_record(),
        });
    }

    fn push(&mut self, message: ServerMessage) {
        self.outgoing.push_back(message);
    }

    /// Next message for the client
    pub fn pop_outgoing(&mut self) -> Option<ServerMessage> {
        let message = self.outgoing.pop_front();
        if message.is_some() {
            self.stats.messages_out += 1;
        }
        message
    }

    pub fn drain_outgoing(&mut self) -> Vec<ServerMessage> {
        std::iter::from_fn(|| self.pop_outgoing()).collect()
    }

    /// Next event for subscribers
    pub fn pop_event(&mut self) -> Option<SelectionEvent> {
        self.events.pop_front()
    }
}
