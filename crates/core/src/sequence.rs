// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sequence state machine
//!
//! `Idle -> Running(phase) -> {Running(next) | Completed | Aborted}`.
//! The transition function is pure; the engine drives it with the status
//! of each phase it runs. State lives only for one full-sequence run.

use crate::phase::{PhaseKind, PhaseStatus};
use serde::Serialize;

/// The state of one full-sequence run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum SequenceState {
    Idle,
    Running { phase: PhaseKind },
    Completed,
    Aborted { phase: PhaseKind, status: PhaseStatus },
}

/// Events that can change sequence state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceEvent {
    /// Begin at the first phase
    Start,
    /// The running phase returned
    PhaseFinished { phase: PhaseKind, status: PhaseStatus },
}

impl SequenceState {
    /// Pure transition function. Events that do not apply to the current
    /// state leave it unchanged.
    pub fn transition(&self, event: SequenceEvent) -> SequenceState {
        match (*self, event) {
            (SequenceState::Idle, SequenceEvent::Start) => SequenceState::Running {
                phase: PhaseKind::first(),
            },
            (
                SequenceState::Running { phase },
                SequenceEvent::PhaseFinished {
                    phase: finished,
                    status,
                },
            ) if phase == finished => {
                if !status.is_success() {
                    return SequenceState::Aborted { phase, status };
                }
                match phase.next() {
                    Some(next) => SequenceState::Running { phase: next },
                    None => SequenceState::Completed,
                }
            }
            (state, _) => state,
        }
    }

    pub fn current_phase(&self) -> Option<PhaseKind> {
        match self {
            SequenceState::Running { phase } => Some(*phase),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, SequenceState::Running { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SequenceState::Completed | SequenceState::Aborted { .. }
        )
    }
}

impl std::fmt::Display for SequenceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceState::Idle => write!(f, "idle"),
            SequenceState::Running { phase } => write!(f, "running({})", phase),
            SequenceState::Completed => write!(f, "completed"),
            SequenceState::Aborted { phase, status } => {
                write!(f, "aborted({}: {})", phase, status)
            }
        }
    }
}

#[cfg(test)]
#[path = "sequence_tests.rs"]
mod tests;
