// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! GL7 cool-down engine: threshold waits, phase plans, and the sequencer

mod abort;
mod error;
pub mod phases;
mod sequencer;
mod stop;
mod waiter;

pub use abort::AbortSignal;
pub use error::{SequenceError, WaitError};
pub use phases::{Check, PhaseDef, Step};
pub use sequencer::PhaseSequencer;
pub use stop::emergency_stop;
pub use waiter::{ThresholdWaiter, WaitOptions, WaitOutcome, WaitStatus};
