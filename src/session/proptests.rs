//! Property-based tests for session transitions

use super::*;
use crate::transcript::{Role, Transcript};
use proptest::prelude::*;

fn arb_state() -> impl Strategy<Value = SessionState> {
    prop_oneof![Just(SessionState::Idle), Just(SessionState::AwaitingResponse)]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[ a-zA-Z]{0,20}".prop_map(|text| Event::UserSubmit { text }),
        "[a-zA-Z .]{0,30}".prop_map(|answer| Event::RelaySucceeded { answer }),
        "[a-z ]{0,20}".prop_map(|error| Event::RelayFailed { error }),
    ]
}

/// Apply an event the way the view does, ignoring rejections
fn apply(state: &mut SessionState, transcript: &mut Transcript, event: Event) -> bool {
    match transition(state, event) {
        Ok(result) => {
            *state = result.new_state;
            for effect in result.effects {
                if let Effect::AppendTurn(turn) = effect {
                    transcript.push(turn);
                }
            }
            true
        }
        Err(_) => false,
    }
}

proptest! {
    #[test]
    fn prop_transition_is_deterministic(state in arb_state(), event in arb_event()) {
        prop_assert_eq!(transition(&state, event.clone()), transition(&state, event));
    }

    #[test]
    fn prop_busy_refuses_input(text in ".*") {
        prop_assert_eq!(
            transition(&SessionState::AwaitingResponse, Event::UserSubmit { text }),
            Err(TransitionError::Busy)
        );
    }

    #[test]
    fn prop_request_only_when_awaiting(state in arb_state(), event in arb_event()) {
        if let Ok(result) = transition(&state, event) {
            let requested = result.effects.contains(&Effect::RequestAdvice);
            prop_assert_eq!(requested, result.new_state == SessionState::AwaitingResponse);
        }
    }

    #[test]
    fn prop_turns_alternate(events in prop::collection::vec(arb_event(), 0..40)) {
        let mut state = SessionState::Idle;
        let mut transcript = Transcript::new();

        for event in events {
            let before = transcript.len();
            let accepted = apply(&mut state, &mut transcript, event);
            if !accepted {
                prop_assert_eq!(transcript.len(), before);
            }
        }

        let turns = transcript.turns();
        for (i, turn) in turns.iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            prop_assert_eq!(turn.role, expected);
            if turn.role == Role::User {
                prop_assert!(!turn.content.trim().is_empty());
            }
        }
        prop_assert_eq!(state.is_busy(), turns.len() % 2 == 1);
    }
}
