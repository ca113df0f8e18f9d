//! Coordinator - shared services for every connection

use std::sync::Arc;

use tokio::task::JoinHandle;

use origin_core::{OriginResult, Participant, Registry};

use crate::{
    duplex, serve_connection, ClientLink, CoordinatorConfig, EventHub, MemoryStore,
    ParticipantSession, RecordStore, SelectionEngine, SelectionListener, ServerLink,
};

/// Authoritative coordinator.
///
/// Cheap to clone: every connection task holds a clone. The registry is
/// shared read-only; per-participant state lives in the connection task.
#[derive(Clone)]
pub struct Coordinator {
    config: Arc<CoordinatorConfig>,
    registry: Arc<dyn Registry>,
    store: Arc<dyn RecordStore>,
    events: EventHub,
    seed: Option<u64>,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig, registry: Arc<dyn Registry>) -> Self {
        Coordinator {
            config: Arc::new(config),
            registry,
            store: Arc::new(MemoryStore::new()),
            events: EventHub::new(),
            seed: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = store;
        self
    }

    /// Seed every session's random source (mixed with the participant id)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<dyn Registry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn events(&self) -> &EventHub {
        &self.events
    }

    pub fn subscribe(&self, listener: Arc<dyn SelectionListener>) {
        self.events.subscribe(listener);
    }

    fn engine_for(&self, participant: &Participant) -> SelectionEngine {
        match self.seed {
            Some(seed) => SelectionEngine::with_seed(Arc::clone(&self.registry), seed ^ participant.id.0),
            None => SelectionEngine::new(Arc::clone(&self.registry)),
        }
    }

    /// Session for an admitted participant, restored from the store if a
    /// record exists
    pub fn open_session(&self, participant: Participant) -> ParticipantSession {
        let engine = self.engine_for(&participant);
        match self.store.load(participant.id) {
            Some(record) => {
                tracing::debug!(participant = %participant.id, "restoring saved record");
                ParticipantSession::restore(participant, engine, &record)
            }
            None => ParticipantSession::new(participant, engine),
        }
    }

    /// Persist the session's record
    pub fn close_session(&self, session: &ParticipantSession) {
        self.store.save(session.participant().id, session.snapshot());
    }

    /// Serve `link` on a new task
    pub fn accept(&self, participant: Participant, link: ServerLink) -> JoinHandle<OriginResult<()>> {
        tokio::spawn(serve_connection(self.clone(), participant, link))
    }

    /// Create an in-process link, serve its server end and return the client end
    pub fn connect(&self, participant: Participant) -> (ClientLink, JoinHandle<OriginResult<()>>) {
        let (server, client) = duplex(self.config.outbox_capacity);
        let handle = self.accept(participant, server);
        (client, handle)
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("config", &self.config)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}
