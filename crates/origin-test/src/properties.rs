//! Property tests over arbitrary choice sequences

use proptest::prelude::*;

use origin_core::Identifier;
use origin_runtime::{ChoiceRequest, SelectionEngine};
use origin_state::AssignmentState;

use crate::{id, onboarding_registry, participant};

const LAYERS: [&str; 3] = ["class", "origin", "missing"];
const ORIGINS: [&str; 7] = ["warrior", "human", "elf", "dwarf", "golem", "stranger", "ghost"];

#[derive(Clone, Debug)]
enum Op {
    Choose(usize, usize),
    Random(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..LAYERS.len(), 0..ORIGINS.len()).prop_map(|(l, o)| Op::Choose(l, o)),
        (0..LAYERS.len()).prop_map(Op::Random),
    ]
}

proptest! {
    #[test]
    fn prop_completion_is_monotonic(ops in proptest::collection::vec(op(), 1..24), seed in any::<u64>()) {
        let registry = onboarding_registry();
        let p = participant(1);
        let mut engine = SelectionEngine::with_seed(registry.clone(), seed);
        let mut state = AssignmentState::new();
        let mut complete = false;
        let mut events = 0;

        for op in ops {
            let (layer, request) = match op {
                Op::Choose(l, o) => (id(LAYERS[l]), ChoiceRequest::Explicit(id(ORIGINS[o]))),
                Op::Random(l) => (id(LAYERS[l]), ChoiceRequest::Random),
            };
            let outcome = engine.apply_choice(&mut state, &p, &layer, request);
            events += usize::from(outcome.event.is_some());

            let now = state.has_all_origins(registry.as_ref(), &p);
            prop_assert!(!complete || now, "completion reverted after {:?}", layer);
            complete = now;

            // the confirmed value is always what the state holds
            prop_assert_eq!(&outcome.origin, &state.origin(&layer));
        }

        prop_assert!(events <= 1);
        prop_assert_eq!(events == 1, complete);
    }

    #[test]
    fn prop_enabled_layers_always_hold_a_value(ops in proptest::collection::vec(op(), 1..16)) {
        let registry = onboarding_registry();
        let p = participant(2);
        let mut engine = SelectionEngine::with_seed(registry.clone(), 1);
        let mut state = AssignmentState::new();

        for op in ops {
            let layer = match op {
                Op::Choose(l, o) => {
                    let layer = id(LAYERS[l]);
                    engine.apply_choice(&mut state, &p, &layer, ChoiceRequest::Explicit(id(ORIGINS[o])));
                    layer
                }
                Op::Random(l) => {
                    let layer = id(LAYERS[l]);
                    engine.apply_choice(&mut state, &p, &layer, ChoiceRequest::Random);
                    layer
                }
            };
            if registry.layer(&layer).is_some() {
                prop_assert!(state.get(&layer).is_some());
            } else {
                prop_assert!(state.get(&layer).is_none());
            }
            prop_assert!(state.origin(&layer) == Identifier::empty() || state.has_origin(&layer));
        }
    }
}
