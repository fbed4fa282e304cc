// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use yare::parameterized;

fn finished(phase: PhaseKind, status: PhaseStatus) -> SequenceEvent {
    SequenceEvent::PhaseFinished { phase, status }
}

#[test]
fn starts_idle_and_enters_first_phase() {
    let state = SequenceState::Idle.transition(SequenceEvent::Start);
    assert_eq!(
        state,
        SequenceState::Running {
            phase: PhaseKind::InitialStatus
        }
    );
    assert!(state.is_running());
    assert!(!state.is_terminal());
}

#[test]
fn all_successes_complete_the_sequence() {
    let mut state = SequenceState::Idle.transition(SequenceEvent::Start);
    for phase in PhaseKind::ALL {
        assert_eq!(state.current_phase(), Some(phase));
        state = state.transition(finished(phase, PhaseStatus::Success));
    }
    assert_eq!(state, SequenceState::Completed);
    assert!(state.is_terminal());
}

#[parameterized(
    timed_out = { PhaseStatus::TimedOut },
    aborted = { PhaseStatus::Aborted },
    error = { PhaseStatus::Error },
)]
fn non_success_aborts(status: PhaseStatus) {
    let state = SequenceState::Running {
        phase: PhaseKind::Precool,
    }
    .transition(finished(PhaseKind::Precool, status));
    assert_eq!(
        state,
        SequenceState::Aborted {
            phase: PhaseKind::Precool,
            status
        }
    );
}

#[test]
fn finish_for_other_phase_is_ignored() {
    let state = SequenceState::Running {
        phase: PhaseKind::Precool,
    };
    let next = state.transition(finished(PhaseKind::PumpHeating, PhaseStatus::Success));
    assert_eq!(next, state);
}

#[test]
fn start_while_running_is_ignored() {
    let state = SequenceState::Running {
        phase: PhaseKind::PumpHeating,
    };
    assert_eq!(state.transition(SequenceEvent::Start), state);
}

fn any_status() -> impl Strategy<Value = PhaseStatus> {
    prop_oneof![
        Just(PhaseStatus::Success),
        Just(PhaseStatus::TimedOut),
        Just(PhaseStatus::Aborted),
        Just(PhaseStatus::Error),
    ]
}

proptest! {
    #[test]
    fn terminal_states_absorb_every_event(statuses in prop::collection::vec(any_status(), 0..20)) {
        let mut state = SequenceState::Idle.transition(SequenceEvent::Start);
        let mut phases_seen = 0;
        for status in statuses {
            let before = state;
            let event = match state.current_phase() {
                Some(phase) => finished(phase, status),
                None => SequenceEvent::Start,
            };
            state = state.transition(event);
            if before.is_terminal() {
                prop_assert_eq!(state, before);
            } else {
                phases_seen += 1;
            }
        }
        prop_assert!(phases_seen <= PhaseKind::ALL.len());
    }
}
