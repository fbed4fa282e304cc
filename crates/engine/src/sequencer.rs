// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Phase sequencer
//!
//! Runs one phase plan at a time. A full run walks the [`SequenceState`]
//! machine from the first phase and stops at the first result that is not
//! `Success`. Running a single phase uses exactly the same code path and
//! keeps no progress between calls.

use crate::phases::{Check, PhaseDef, Step};
use crate::{AbortSignal, SequenceError, ThresholdWaiter, WaitOptions, WaitStatus};
use gl7_adapters::{ControlError, OutputController, TemperatureSource};
use gl7_core::{
    CycleConfig, ExecutionMode, OutputId, PhaseKind, PhaseResult, PhaseStatus, PointId,
    SequenceEvent, SequenceResult, SequenceState,
};
use tracing::Instrument;

/// Why a phase stopped early
struct Failure {
    status: PhaseStatus,
    reason: String,
}

impl Failure {
    fn new(status: PhaseStatus, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
        }
    }

    fn aborted(reason: impl Into<String>) -> Self {
        Self::new(PhaseStatus::Aborted, reason)
    }

    fn error(reason: impl Into<String>) -> Self {
        Self::new(PhaseStatus::Error, reason)
    }
}

fn names(points: &std::collections::BTreeSet<PointId>) -> String {
    points.iter().map(PointId::as_str).collect::<Vec<_>>().join(", ")
}

/// Drives GL7 phases against a temperature source and output controller
pub struct PhaseSequencer<S, C> {
    source: S,
    outputs: C,
    waiter: ThresholdWaiter<S>,
    cycle: CycleConfig,
    mode: ExecutionMode,
    abort: AbortSignal,
}

impl<S, C> PhaseSequencer<S, C>
where
    S: TemperatureSource,
    C: OutputController,
{
    pub fn new(
        source: S,
        outputs: C,
        cycle: CycleConfig,
        mode: ExecutionMode,
        abort: AbortSignal,
    ) -> Self {
        Self {
            waiter: ThresholdWaiter::new(source.clone()),
            source,
            outputs,
            cycle,
            mode,
            abort,
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn abort_signal(&self) -> &AbortSignal {
        &self.abort
    }

    /// The plan `run_phase` would execute for `kind`
    pub fn plan(&self, kind: PhaseKind) -> Result<PhaseDef, SequenceError> {
        PhaseDef::build(kind, &self.cycle)
    }

    /// Run phases from the first, stopping at the first failure
    pub async fn run_full(&self) -> SequenceResult {
        let mut state = SequenceState::Idle.transition(SequenceEvent::Start);
        let mut results = Vec::new();

        while let Some(phase) = state.current_phase() {
            let result = self.run_phase(phase).await;
            state = state.transition(SequenceEvent::PhaseFinished {
                phase,
                status: result.status,
            });
            results.push(result);
        }

        tracing::info!(%state, phases = results.len(), "sequence finished");
        SequenceResult::from_phases(results)
    }

    /// Run one phase in isolation
    pub async fn run_phase(&self, kind: PhaseKind) -> PhaseResult {
        let span = tracing::info_span!("phase", name = kind.name(), index = kind.index());
        async {
            tracing::info!(dry_run = self.mode.is_dry_run(), "starting");

            let start = std::time::Instant::now();
            let result = self.run_phase_inner(kind).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match result.status {
                PhaseStatus::Success => tracing::info!(
                    elapsed_ms,
                    reached = %names(&result.reached),
                    "phase succeeded"
                ),
                status => tracing::warn!(
                    elapsed_ms,
                    %status,
                    reached = %names(&result.reached),
                    pending = %names(&result.pending),
                    error = result.error.as_deref().unwrap_or(""),
                    "phase did not succeed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_phase_inner(&self, kind: PhaseKind) -> PhaseResult {
        let mut result = PhaseResult::new(kind, PhaseStatus::Success);

        let def = match self.plan(kind) {
            Ok(def) => def,
            Err(e) => {
                result.status = PhaseStatus::Aborted;
                result.error = Some(e.to_string());
                self.read_back(&[], &mut result).await;
                return result;
            }
        };

        if let Err(failure) = self.execute(&def, &mut result).await {
            result.status = failure.status;
            result.error = Some(failure.reason);
        }

        // Recorded regardless of outcome
        self.read_back(&def.outputs, &mut result).await;

        if let Some(spec) = &def.running {
            let running = result
                .readings
                .get(&spec.point)
                .is_some_and(|r| spec.is_satisfied_by(&r.temperature));
            result.cycle_running = Some(running);
        }
        result
    }

    async fn execute(&self, def: &PhaseDef, result: &mut PhaseResult) -> Result<(), Failure> {
        if self.abort.is_aborted() {
            return Err(Failure::aborted("aborted by operator before start"));
        }

        // Nothing is written if a precondition fails
        if let Some(check) = self.first_violation(&def.preconditions).await? {
            return Err(Failure::aborted(format!(
                "precondition failed: expected {}",
                check
            )));
        }

        let options = WaitOptions {
            poll_interval: def.poll_interval,
            max_wait: def.max_wait,
        };
        for step in &def.steps {
            if let Step::Wait(specs) = step {
                let outcome = self
                    .waiter
                    .wait_until(specs, options, &self.abort)
                    .await
                    .map_err(|e| Failure::error(e.to_string()))?;
                result.reached.extend(outcome.reached.iter().cloned());
                result.reached.retain(|p| !outcome.pending.contains(p));
                result.pending = outcome.pending.clone();
                result.notes.extend(outcome.regressions);

                match outcome.status {
                    WaitStatus::Success => {}
                    WaitStatus::TimedOut => {
                        return Err(Failure::new(
                            PhaseStatus::TimedOut,
                            format!(
                                "timed out after {:?} waiting for {}",
                                def.max_wait,
                                names(&outcome.pending)
                            ),
                        ));
                    }
                    WaitStatus::Aborted => return Err(Failure::aborted("aborted by operator")),
                }
                continue;
            }

            if self.abort.is_aborted() {
                return Err(Failure::aborted(format!(
                    "aborted by operator before: {}",
                    step
                )));
            }
            self.apply(step)
                .await
                .map_err(|e| Failure::error(format!("{}: {}", step, e)))?;
            if self.mode.is_dry_run() {
                result.notes.push(format!("dry-run: {}", step));
            }
        }

        if def.postconditions.is_empty() {
            return Ok(());
        }
        if self.mode.is_dry_run() {
            result
                .notes
                .push("output postconditions skipped in dry-run".to_string());
            return Ok(());
        }
        if let Some(check) = self.first_violation(&def.postconditions).await? {
            return Err(Failure::error(format!(
                "postcondition failed: expected {}",
                check
            )));
        }
        Ok(())
    }

    async fn apply(&self, step: &Step) -> Result<(), ControlError> {
        match *step {
            Step::Wait(_) => Ok(()),
            Step::Configure { output, params } => {
                self.outputs.configure(output, params, self.mode).await
            }
            Step::SetPower { output, percent } => {
                self.outputs.set_power(output, percent, self.mode).await
            }
            Step::Enable { output, on } => self.outputs.set_enabled(output, on, self.mode).await,
        }
    }

    /// First check that does not hold, reading each output fresh
    async fn first_violation(&self, checks: &[Check]) -> Result<Option<Check>, Failure> {
        for check in checks {
            let status = self.outputs.query(check.output()).await.map_err(|e| {
                Failure::error(format!("querying {}: {}", check.output(), e))
            })?;
            if !check.holds(status.is_energized()) {
                return Ok(Some(*check));
            }
        }
        Ok(None)
    }

    async fn read_back(&self, outputs: &[OutputId], result: &mut PhaseResult) {
        for point in self.source.catalog().ids() {
            match self.source.read(point.as_str()).await {
                Ok(reading) => {
                    result.readings.insert(reading.point.clone(), reading);
                }
                Err(e) => readback_failed(result, format!("readback of {}: {}", point, e)),
            }
        }
        for &output in outputs {
            match self.outputs.query(output).await {
                Ok(status) => {
                    result.outputs.insert(output, status);
                }
                Err(e) => readback_failed(result, format!("readback of {}: {}", output, e)),
            }
        }
    }
}

fn readback_failed(result: &mut PhaseResult, message: String) {
    tracing::error!(%message, "readback failed");
    if result.status.is_success() {
        result.status = PhaseStatus::Error;
        result.error = Some(message);
    } else {
        result.notes.push(message);
    }
}

#[cfg(test)]
#[path = "sequencer_tests.rs"]
mod tests;
