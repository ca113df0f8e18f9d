//! Selection engine - candidate resolution, choice application and the
//! auto-assignment sweep

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use origin_core::{
    Assignment, AutoChoose, ChoiceRejection, Identifier, LayerDefinition, OriginDefinition,
    Participant, Registry,
};
use origin_state::AssignmentState;

use crate::SelectionEvent;

/// What the participant asked for
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChoiceRequest {
    Explicit(Identifier),
    Random,
}

/// Result of one sweep pass
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Layers resolved without asking, in sweep order
    pub auto_assigned: Vec<Assignment>,
    /// Layers still waiting for an interactive choice
    pub pending: Vec<Identifier>,
}

impl SweepOutcome {
    #[inline]
    pub fn needs_selection(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Result of one `apply_choice` call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceOutcome {
    pub layer: Identifier,
    /// Authoritative origin for the layer after the call; what gets confirmed
    pub origin: Identifier,
    /// Set when the request was downgraded to EMPTY or ignored
    pub rejection: Option<ChoiceRejection>,
    /// Whether the stored assignment changed
    pub changed: bool,
    pub sweep: SweepOutcome,
    pub event: Option<SelectionEvent>,
}

/// Selection engine for one participant's session.
///
/// Registry lookups go through the injected [`Registry`]; the engine owns
/// only its random source.
pub struct SelectionEngine {
    registry: Arc<dyn Registry>,
    rng: StdRng,
}

impl SelectionEngine {
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        SelectionEngine {
            registry,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic random choices
    pub fn with_seed(registry: Arc<dyn Registry>, seed: u64) -> Self {
        SelectionEngine {
            registry,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn registry(&self) -> &Arc<dyn Registry> {
        &self.registry
    }

    /// Choosable members of `layer` for this participant, ordered by
    /// (impact, order). Unknown layers resolve to nothing.
    pub fn resolve_candidates(
        &self,
        participant: &Participant,
        layer: &Identifier,
    ) -> Vec<&OriginDefinition> {
        let Some(layer) = self.registry.layer(layer) else {
            return Vec::new();
        };
        let mut candidates = layer.choosable_members(self.registry.as_ref(), participant);
        candidates.sort_by(|a, b| a.display_cmp(b));
        candidates
    }

    /// Validate and apply a choice, then sweep.
    ///
    /// Never fails: rejected requests are logged and leave the layer EMPTY
    /// (or untouched for `AlreadyAssigned` and unknown layers). The returned
    /// origin is always the stored value for the layer.
    pub fn apply_choice(
        &mut self,
        state: &mut AssignmentState,
        participant: &Participant,
        layer_id: &Identifier,
        request: ChoiceRequest,
    ) -> ChoiceOutcome {
        let registry = Arc::clone(&self.registry);
        let had_origin_before = state.had_origin_before();

        let (origin, rejection) = match registry.layer(layer_id).filter(|l| l.is_enabled()) {
            None => (None, Some(ChoiceRejection::UnknownLayer(layer_id.clone()))),
            Some(_)
                if state.has_all_origins(registry.as_ref(), participant)
                    && state.has_origin(layer_id) =>
            {
                let rejection = ChoiceRejection::AlreadyAssigned {
                    layer: layer_id.clone(),
                };
                (None, Some(rejection))
            }
            Some(layer) => match &request {
                ChoiceRequest::Explicit(origin) => {
                    match validate_explicit(registry.as_ref(), layer, origin, participant) {
                        Ok(origin) => (Some(origin), None),
                        Err(rejection) => (Some(Identifier::empty()), Some(rejection)),
                    }
                }
                ChoiceRequest::Random => match self.pick_random(registry.as_ref(), layer, participant) {
                    Some(origin) => (Some(origin), None),
                    None => (
                        Some(Identifier::empty()),
                        Some(ChoiceRejection::RandomNotAllowed(layer_id.clone())),
                    ),
                },
            },
        };

        if let Some(rejection) = &rejection {
            tracing::warn!(
                participant = %participant.id,
                name = %participant.name,
                layer = %layer_id,
                request = ?request,
                "rejected origin choice: {}",
                rejection
            );
        }

        let changed = match origin {
            Some(origin) => {
                if rejection.is_none() {
                    tracing::info!(
                        participant = %participant.id,
                        layer = %layer_id,
                        origin = %origin,
                        random = matches!(request, ChoiceRequest::Random),
                        "origin chosen"
                    );
                }
                commit(state, layer_id.clone(), origin)
            }
            None => false,
        };

        let sweep = self.sweep(state, participant, false);
        let event = self.check_completion(state, participant, had_origin_before);

        ChoiceOutcome {
            layer: layer_id.clone(),
            origin: state.origin(layer_id),
            rejection,
            changed,
            sweep,
            event,
        }
    }

    /// Resolve every enabled, unassigned layer that needs no interactive
    /// choice. Layers are visited in registry order.
    ///
    /// Per layer, first match wins:
    /// 1. the layer's default origin, when `include_defaults` is set
    /// 2. no options for this participant: left EMPTY, not pending
    /// 3. the auto-choose policy applies: first candidate in display order,
    ///    else a pick from the random pool
    /// 4. otherwise pending
    pub fn sweep(
        &mut self,
        state: &mut AssignmentState,
        participant: &Participant,
        include_defaults: bool,
    ) -> SweepOutcome {
        let registry = Arc::clone(&self.registry);
        let mut outcome = SweepOutcome::default();

        for layer in registry.enabled_layers() {
            if state.has_origin(&layer.id) {
                continue;
            }

            if include_defaults {
                let default = layer
                    .default_origin
                    .as_ref()
                    .filter(|id| registry.origin(id).is_some());
                if let Some(origin) = default {
                    commit(state, layer.id.clone(), origin.clone());
                    outcome
                        .auto_assigned
                        .push(Assignment::new(layer.id.clone(), origin.clone()));
                    continue;
                }
            }

            let options = layer.option_count(registry.as_ref(), participant);
            if options == 0 {
                continue;
            }

            let auto = match layer.auto_choose {
                AutoChoose::Never => false,
                AutoChoose::SingleOption => options == 1,
                AutoChoose::Always => true,
            };
            if auto {
                if let Some(origin) = self.auto_pick(registry.as_ref(), layer, participant) {
                    commit(state, layer.id.clone(), origin.clone());
                    outcome
                        .auto_assigned
                        .push(Assignment::new(layer.id.clone(), origin));
                    continue;
                }
            }

            outcome.pending.push(layer.id.clone());
        }

        tracing::debug!(
            participant = %participant.id,
            auto_assigned = outcome.auto_assigned.len(),
            pending = outcome.pending.len(),
            "sweep finished"
        );
        outcome
    }

    /// Emit the completion event on an incomplete to complete transition.
    ///
    /// `had_origin_before` must be captured before the mutation that may have
    /// completed the state.
    pub fn check_completion(
        &self,
        state: &mut AssignmentState,
        participant: &Participant,
        had_origin_before: bool,
    ) -> Option<SelectionEvent> {
        let complete = state.has_all_origins(self.registry.as_ref(), participant);
        state
            .observe_completion(complete)
            .then_some(SelectionEvent::OnboardingComplete {
                participant: participant.id,
                had_origin_before,
            })
    }

    fn auto_pick(
        &mut self,
        registry: &dyn Registry,
        layer: &LayerDefinition,
        participant: &Participant,
    ) -> Option<Identifier> {
        let mut candidates = layer.choosable_members(registry, participant);
        candidates.sort_by(|a, b| a.display_cmp(b));
        match candidates.first() {
            Some(first) => Some(first.id.clone()),
            None => self.pick_random(registry, layer, participant),
        }
    }

    /// Uniform pick from the layer's random pool; `None` when random is not
    /// allowed or the pool is empty
    fn pick_random(
        &mut self,
        registry: &dyn Registry,
        layer: &LayerDefinition,
        participant: &Participant,
    ) -> Option<Identifier> {
        if !layer.is_random_allowed() {
            return None;
        }
        let mut pool = layer.random_origins(registry, participant);
        if pool.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..pool.len());
        Some(pool.swap_remove(index))
    }
}

/// Accept an origin that is choosable or a declared member of the layer for
/// this participant
fn validate_explicit(
    registry: &dyn Registry,
    layer: &LayerDefinition,
    origin: &Identifier,
    participant: &Participant,
) -> Result<Identifier, ChoiceRejection> {
    let Some(definition) = registry.origin(origin) else {
        return Err(ChoiceRejection::UnknownOrigin(origin.clone()));
    };
    if definition.is_choosable() || layer.contains(definition, participant) {
        Ok(definition.id.clone())
    } else {
        Err(ChoiceRejection::NotChoosable {
            layer: layer.id.clone(),
            origin: origin.clone(),
        })
    }
}

/// Single mutation path shared by explicit choices, random choices and the
/// sweep
fn commit(state: &mut AssignmentState, layer: Identifier, origin: Identifier) -> bool {
    state.set_origin(layer, origin)
}

impl std::fmt::Debug for SelectionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionEngine").finish_non_exhaustive()
    }
}
