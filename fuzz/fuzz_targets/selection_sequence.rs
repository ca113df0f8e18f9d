#![no_main]

use std::sync::Arc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use origin_core::{
    AutoChoose, Identifier, Impact, LayerDefinition, OriginDefinition, Participant,
    ParticipantId, Registry, StaticRegistry,
};
use origin_runtime::{ChoiceRequest, SelectionEngine};
use origin_state::AssignmentState;

const LAYERS: [&str; 3] = ["class", "origin", "missing"];
const ORIGINS: [&str; 5] = ["human", "elf", "golem", "stranger", "missing"];

#[derive(Debug, Arbitrary)]
enum Step {
    Choose { layer: u8, origin: u8 },
    Random { layer: u8 },
    Sweep { defaults: bool },
}

#[derive(Debug, Arbitrary)]
struct Input {
    seed: u64,
    steps: Vec<Step>,
}

fn id(path: &str) -> Identifier {
    Identifier::origins(path)
}

fn registry() -> Arc<dyn Registry> {
    let registry = StaticRegistry::builder()
        .origin(OriginDefinition::new(id("human")))
        .origin(OriginDefinition::new(id("elf")).with_impact(Impact::High))
        .origin(OriginDefinition::new(id("golem")).unchoosable())
        .origin(OriginDefinition::new(id("stranger")).unchoosable())
        .layer(LayerDefinition::new(id("class")).with_origins(vec![id("human")]))
        .layer(
            LayerDefinition::new(id("origin"))
                .with_order(1)
                .with_origins(vec![id("human"), id("elf"), id("golem")])
                .with_random(true)
                .with_auto_choose(AutoChoose::Never),
        )
        .build()
        .expect("fixture registry is valid");
    Arc::new(registry)
}

// Every step leaves each stored origin resolvable, and the completion event
// fires at most once.
fuzz_target!(|input: Input| {
    let registry = registry();
    let participant = Participant::new(ParticipantId::new(1), "fuzz");
    let mut engine = SelectionEngine::with_seed(registry.clone(), input.seed);
    let mut state = AssignmentState::new();
    let mut events = 0;

    for step in input.steps.into_iter().take(64) {
        match step {
            Step::Choose { layer, origin } => {
                let layer = id(LAYERS[layer as usize % LAYERS.len()]);
                let origin = id(ORIGINS[origin as usize % ORIGINS.len()]);
                let outcome =
                    engine.apply_choice(&mut state, &participant, &layer, ChoiceRequest::Explicit(origin));
                events += usize::from(outcome.event.is_some());
            }
            Step::Random { layer } => {
                let layer = id(LAYERS[layer as usize % LAYERS.len()]);
                let outcome = engine.apply_choice(&mut state, &participant, &layer, ChoiceRequest::Random);
                events += usize::from(outcome.event.is_some());
            }
            Step::Sweep { defaults } => {
                engine.sweep(&mut state, &participant, defaults);
            }
        }

        for assignment in state.assignments() {
            assert!(registry.origin(&assignment.origin).is_some());
        }
        assert!(events <= 1);
    }
});
