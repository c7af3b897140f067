//! Model validation that reports every defect at once.
//!
//! Each check yields a `Validation`; all of them are combined so a caller
//! fixing a model sees the complete list of violations in a single pass.

use crate::builder::error::ModelViolation;
use crate::core::{Payload, State, StateId, Transition, TransitionKind};
use std::collections::{HashMap, HashSet};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<ModelViolation>>;

/// Validate a complete model.
pub(crate) fn validate_model<S: StateId, E: Payload>(
    states: &[State<S, E>],
    transitions: &[Transition<S, E>],
    initial: &S,
) -> Check {
    let mut checks: Vec<Check> = Vec::new();

    checks.push(if states.is_empty() {
        Validation::fail(ModelViolation::NoStates)
    } else {
        Validation::success(())
    });

    checks.push(if transitions.is_empty() {
        Validation::fail(ModelViolation::NoTransitions)
    } else {
        Validation::success(())
    });

    let mut known = HashSet::new();
    for state in states {
        if !known.insert(state.id()) {
            checks.push(Validation::fail(ModelViolation::DuplicateState {
                state: format!("{:?}", state.id()),
            }));
        }
    }

    if !states.is_empty() && !known.contains(initial) {
        checks.push(Validation::fail(ModelViolation::UnknownInitialState {
            state: format!("{initial:?}"),
        }));
    }

    for transition in transitions {
        for id in [transition.source(), transition.target()] {
            if !known.contains(id) {
                checks.push(Validation::fail(ModelViolation::UnknownTransitionState {
                    source_state: format!("{:?}", transition.source()),
                    target_state: format!("{:?}", transition.target()),
                    state: format!("{id:?}"),
                }));
            }
        }

        if transition.kind() == TransitionKind::Internal
            && transition.source() != transition.target()
        {
            checks.push(Validation::fail(
                ModelViolation::InternalTransitionChangesState {
                    source_state: format!("{:?}", transition.source()),
                    target_state: format!("{:?}", transition.target()),
                },
            ));
        }
    }

    for path in unguarded_cycles(transitions) {
        checks.push(Validation::fail(ModelViolation::UnguardedCycle { path }));
    }

    Validation::all_vec(checks).map(|_| ())
}

/// Cycles the machine would follow forever on entry.
///
/// Only the first triggerless transition of a state is ever taken, so each
/// state has at most one automatic successor. Successors behind a guard or an
/// internal transition are ignored: they may legitimately stop the cascade.
fn unguarded_cycles<S: StateId, E: Payload>(transitions: &[Transition<S, E>]) -> Vec<String> {
    let mut successor: HashMap<&S, Option<&S>> = HashMap::new();
    for transition in transitions.iter().filter(|t| t.is_triggerless()) {
        successor.entry(transition.source()).or_insert_with(|| {
            let unconditional =
                transition.guard().is_none() && transition.kind() != TransitionKind::Internal;
            unconditional.then(|| transition.target())
        });
    }

    let mut cycles = Vec::new();
    let mut finished: HashSet<&S> = HashSet::new();
    for start in transitions.iter().map(Transition::source) {
        if finished.contains(start) {
            continue;
        }

        let mut path: Vec<&S> = vec![start];
        let mut current = start;
        while let Some(Some(next)) = successor.get(current) {
            if let Some(position) = path.iter().position(|s| *s == *next) {
                let mut cycle: Vec<String> =
                    path[position..].iter().map(|s| format!("{s:?}")).collect();
                cycle.push(format!("{next:?}"));
                cycles.push(cycle.join(" -> "));
                break;
            }
            if finished.contains(*next) {
                break;
            }
            path.push(*next);
            current = *next;
        }
        finished.extend(path);
    }
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{external_transition, unguarded_transition, TransitionBuilder};

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestState {
        A,
        B,
        C,
        Missing,
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestEvent {
        Go,
    }

    fn states() -> Vec<State<TestState, TestEvent>> {
        vec![
            State::new(TestState::A),
            State::new(TestState::B),
            State::new(TestState::C),
        ]
    }

    fn violations(check: Check) -> Vec<ModelViolation> {
        match check {
            Validation::Failure(errors) => errors.iter().cloned().collect(),
            Validation::Success(_) => Vec::new(),
        }
    }

    #[test]
    fn valid_model_passes() {
        let transitions = vec![
            external_transition(TestState::A, TestState::B, TestEvent::Go),
            unguarded_transition(TestState::B, TestState::C),
        ];

        assert!(validate_model(&states(), &transitions, &TestState::A).is_success());
    }

    #[test]
    fn empty_model_accumulates_all_violations() {
        let found = violations(validate_model::<TestState, TestEvent>(&[], &[], &TestState::A));

        assert_eq!(found, vec![ModelViolation::NoStates, ModelViolation::NoTransitions]);
    }

    #[test]
    fn unknown_and_duplicate_states_are_reported() {
        let mut defined = states();
        defined.push(State::new(TestState::B));
        let transitions = vec![external_transition(TestState::A, TestState::Missing, TestEvent::Go)];

        let found = violations(validate_model(&defined, &transitions, &TestState::Missing));

        assert_eq!(found.len(), 3);
        assert!(found.contains(&ModelViolation::DuplicateState {
            state: "B".to_string()
        }));
        assert!(found.contains(&ModelViolation::UnknownInitialState {
            state: "Missing".to_string()
        }));
        assert!(found.contains(&ModelViolation::UnknownTransitionState {
            source_state: "A".to_string(),
            target_state: "Missing".to_string(),
            state: "Missing".to_string(),
        }));
    }

    #[test]
    fn internal_transition_must_stay_in_place() {
        let transitions = vec![TransitionBuilder::new()
            .source(TestState::A)
            .target(TestState::B)
            .kind(TransitionKind::Internal)
            .event(TestEvent::Go)
            .build()
            .unwrap()];

        let found = violations(validate_model(&states(), &transitions, &TestState::A));

        assert_eq!(
            found,
            vec![ModelViolation::InternalTransitionChangesState {
                source_state: "A".to_string(),
                target_state: "B".to_string(),
            }]
        );
    }

    #[test]
    fn unguarded_cycle_is_rejected() {
        let transitions = vec![
            external_transition(TestState::A, TestState::B, TestEvent::Go),
            unguarded_transition(TestState::B, TestState::C),
            unguarded_transition(TestState::C, TestState::B),
        ];

        let found = violations(validate_model(&states(), &transitions, &TestState::A));

        assert_eq!(
            found,
            vec![ModelViolation::UnguardedCycle {
                path: "B -> C -> B".to_string()
            }]
        );
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let transitions = vec![unguarded_transition(TestState::A, TestState::A)];

        let found = violations(validate_model::<TestState, TestEvent>(
            &states(),
            &transitions,
            &TestState::A,
        ));

        assert_eq!(
            found,
            vec![ModelViolation::UnguardedCycle {
                path: "A -> A".to_string()
            }]
        );
    }

    #[test]
    fn guarded_cycle_is_allowed() {
        let transitions = vec![
            unguarded_transition(TestState::A, TestState::B),
            TransitionBuilder::new()
                .source(TestState::B)
                .target(TestState::A)
                .when(|_| false)
                .build()
                .unwrap(),
        ];

        assert!(validate_model::<TestState, TestEvent>(&states(), &transitions, &TestState::A)
            .is_success());
    }

    #[test]
    fn only_first_automatic_transition_counts() {
        let transitions = vec![
            unguarded_transition(TestState::A, TestState::C),
            unguarded_transition(TestState::A, TestState::B),
            unguarded_transition(TestState::B, TestState::A),
        ];

        assert!(validate_model::<TestState, TestEvent>(&states(), &transitions, &TestState::A)
            .is_success());
    }
}
