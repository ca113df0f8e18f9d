//! Assignment state - the authoritative per-participant map

use std::collections::HashMap;

use origin_core::{Assignment, AssignmentRecord, Identifier, Participant, Registry};

/// Where the participant is in its onboarding lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// At least one enabled layer still lacks an origin
    #[default]
    Incomplete,
    /// Completion has been observed for the current epoch
    Complete,
}

/// Authoritative assignments for one participant.
///
/// A layer that was never assigned reads as EMPTY; the map never yields
/// "no value". `had_origin_before` is sticky and survives [`reset`].
///
/// [`reset`]: AssignmentState::reset
#[derive(Clone, Debug, Default)]
pub struct AssignmentState {
    /// Layers in first-assignment order
    order: Vec<Identifier>,
    origins: HashMap<Identifier, Identifier>,
    selecting: bool,
    had_origin_before: bool,
    lifecycle: Lifecycle,
    epoch: u32,
}

impl AssignmentState {
    pub fn new() -> Self {
        AssignmentState::default()
    }

    /// Rebuild from a persisted or synced record.
    ///
    /// The lifecycle starts incomplete; callers that know the restored state
    /// is already complete settle it with [`assume_complete`].
    ///
    /// [`assume_complete`]: AssignmentState::assume_complete
    pub fn from_record(record: &AssignmentRecord) -> Self {
        let mut state = AssignmentState::new();
        for assignment in &record.assignments {
            state.put(assignment.layer.clone(), assignment.origin.clone());
        }
        state.selecting = record.selecting;
        state.had_origin_before = record.had_origin_before
            || record.assignments.iter().any(|a| !a.is_empty());
        state
    }

    pub fn to_record(&self) -> AssignmentRecord {
        AssignmentRecord {
            assignments: self.assignments().collect(),
            selecting: self.selecting,
            had_origin_before: self.had_origin_before,
        }
    }

    /// Origin held for `layer`, EMPTY when none
    pub fn origin(&self, layer: &Identifier) -> Identifier {
        self.origins.get(layer).cloned().unwrap_or_else(Identifier::empty)
    }

    /// Raw map entry; `None` only when the layer was never written
    pub fn get(&self, layer: &Identifier) -> Option<&Identifier> {
        self.origins.get(layer)
    }

    /// Holds a non-EMPTY origin for `layer`
    pub fn has_origin(&self, layer: &Identifier) -> bool {
        self.origins.get(layer).is_some_and(|o| !o.is_empty_origin())
    }

    /// Write one assignment. Returns `true` when the stored value changed.
    pub fn set_origin(&mut self, layer: Identifier, origin: Identifier) -> bool {
        if !origin.is_empty_origin() {
            self.had_origin_before = true;
        }
        self.put(layer, origin)
    }

    fn put(&mut self, layer: Identifier, origin: Identifier) -> bool {
        match self.origins.get_mut(&layer) {
            Some(current) if *current == origin => false,
            Some(current) => {
                *current = origin;
                true
            }
            None => {
                self.order.push(layer.clone());
                self.origins.insert(layer, origin);
                true
            }
        }
    }

    /// Every enabled layer that offers this participant anything holds a
    /// non-EMPTY origin. Layers with no members for the participant are
    /// exempt.
    pub fn has_all_origins(&self, registry: &dyn Registry, participant: &Participant) -> bool {
        registry
            .enabled_layers()
            .into_iter()
            .filter(|layer| layer.has_members_for(participant))
            .all(|layer| self.has_origin(&layer.id))
    }

    /// Assignments in first-assignment order
    pub fn assignments(&self) -> impl Iterator<Item = Assignment> + '_ {
        self.order.iter().map(|layer| Assignment::new(layer.clone(), self.origin(layer)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn is_selecting(&self) -> bool {
        self.selecting
    }

    pub fn set_selecting(&mut self, selecting: bool) {
        self.selecting = selecting;
    }

    #[inline]
    pub fn had_origin_before(&self) -> bool {
        self.had_origin_before
    }

    #[inline]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[inline]
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Feed the current completeness in.
    ///
    /// Returns `true` exactly once per epoch, on the first observation of a
    /// complete state. Observing an incomplete state after completion (an
    /// external grant or reset emptied a layer) opens a new epoch.
    pub fn observe_completion(&mut self, complete: bool) -> bool {
        match (self.lifecycle, complete) {
            (Lifecycle::Incomplete, true) => {
                self.lifecycle = Lifecycle::Complete;
                true
            }
            (Lifecycle::Complete, false) => {
                self.lifecycle = Lifecycle::Incomplete;
                self.epoch = self.epoch.wrapping_add(1);
                false
            }
            _ => false,
        }
    }

    /// Mark complete without reporting a transition (restored sessions)
    pub fn assume_complete(&mut self) {
        self.lifecycle = Lifecycle::Complete;
    }

    /// Set every given layer to EMPTY and start a new lifecycle epoch.
    /// `had_origin_before` is kept.
    pub fn reset<'a>(&mut self, layers: impl IntoIterator<Item = &'a Identifier>) {
        for layer in layers {
            self.put(layer.clone(), Identifier::empty());
        }
        self.selecting = false;
        if self.lifecycle == Lifecycle::Complete {
            self.epoch = self.epoch.wrapping_add(1);
        }
        self.lifecycle = Lifecycle::Incomplete;
    }
}
