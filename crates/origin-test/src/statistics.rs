//! Random choice distribution

use std::collections::HashMap;

use origin_runtime::{ChoiceRequest, SelectionEngine};
use origin_state::AssignmentState;

use crate::{id, participant, random_registry};

const TRIALS: usize = 10_000;

#[test]
fn test_random_choice_is_uniform_under_fixed_seed() {
    let p = participant(1);
    let mut engine = SelectionEngine::with_seed(random_registry(), 0xC0FFEE);
    let mut hits = HashMap::new();

    for _ in 0..TRIALS {
        let mut state = AssignmentState::new();
        let outcome = engine.apply_choice(&mut state, &p, &id("origin"), ChoiceRequest::Random);
        assert!(outcome.rejection.is_none());
        *hits.entry(outcome.origin).or_insert(0usize) += 1;
    }

    assert_eq!(hits.len(), 3);
    for candidate in [id("a"), id("b"), id("c")] {
        let count = hits[&candidate];
        assert!(
            (3000..=3700).contains(&count),
            "{candidate} chosen {count} times out of {TRIALS}"
        );
    }
}

#[test]
fn test_same_seed_same_sequence() {
    let p = participant(1);
    let picks = |seed| {
        let mut engine = SelectionEngine::with_seed(random_registry(), seed);
        (0..32)
            .map(|_| {
                let mut state = AssignmentState::new();
                engine
                    .apply_choice(&mut state, &p, &id("origin"), ChoiceRequest::Random)
                    .origin
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(picks(7), picks(7));
}
