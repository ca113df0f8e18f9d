//! Selection events and their subscribers

use std::sync::Arc;

use parking_lot::RwLock;

use origin_core::ParticipantId;

/// Events emitted by the selection engine
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionEvent {
    /// Every required layer now holds an origin. Emitted at most once per
    /// completion transition.
    OnboardingComplete {
        participant: ParticipantId,
        /// Value of the sticky flag before the completing mutation
        had_origin_before: bool,
    },
}

impl SelectionEvent {
    pub fn participant(&self) -> ParticipantId {
        match self {
            SelectionEvent::OnboardingComplete { participant, .. } => *participant,
        }
    }
}

/// Receives selection events. Called from connection tasks, so it must not
/// block.
pub trait SelectionListener: Send + Sync {
    fn on_event(&self, event: &SelectionEvent);
}

impl<F> SelectionListener for F
where
    F: Fn(&SelectionEvent) + Send + Sync,
{
    fn on_event(&self, event: &SelectionEvent) {
        self(event)
    }
}

/// Subscriber list shared by every connection of a coordinator
#[derive(Clone, Default)]
pub struct EventHub {
    listeners: Arc<RwLock<Vec<Arc<dyn SelectionListener>>>>,
}

impl EventHub {
    pub fn new() -> Self {
        EventHub::default()
    }

    pub fn subscribe(&self, listener: Arc<dyn SelectionListener>) {
        self.listeners.write().push(listener);
    }

    pub fn publish(&self, event: &SelectionEvent) {
        tracing::debug!(participant = %event.participant(), ?event, "publishing selection event");
        for listener in self.listeners.read().iter() {
            listener.on_event(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
