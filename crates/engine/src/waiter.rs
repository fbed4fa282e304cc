// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Multi-point threshold waiter
//!
//! Polls every point named by a set of [`ThresholdSpec`]s until each one is
//! satisfied, the wait budget runs out, or the operator aborts. A satisfied
//! spec is never re-opened; if its point later drifts back across the
//! target the regression is logged and reported in the outcome.
//! Read-only: nothing here touches an output.

use crate::{AbortSignal, WaitError};
use gl7_adapters::{SensorError, TemperatureSource};
use gl7_core::{PhaseStatus, PointId, Snapshot, ThresholdSpec};
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::time::Instant;

/// Polling cadence and budget for one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub poll_interval: Duration,
    pub max_wait: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStatus {
    Success,
    TimedOut,
    Aborted,
}

impl From<WaitStatus> for PhaseStatus {
    fn from(status: WaitStatus) -> Self {
        match status {
            WaitStatus::Success => PhaseStatus::Success,
            WaitStatus::TimedOut => PhaseStatus::TimedOut,
            WaitStatus::Aborted => PhaseStatus::Aborted,
        }
    }
}

/// Result of one wait
#[derive(Debug, Clone, PartialEq)]
pub struct WaitOutcome {
    pub status: WaitStatus,
    /// Points whose specs are all satisfied
    pub reached: BTreeSet<PointId>,
    /// Points with at least one unsatisfied spec
    pub pending: BTreeSet<PointId>,
    /// Latest reading of every point in the wait
    pub readings: Snapshot,
    pub polls: u32,
    pub elapsed: Duration,
    /// One line per spec that was reached and later read back unsatisfied
    pub regressions: Vec<String>,
}

impl WaitOutcome {
    pub fn is_success(&self) -> bool {
        self.status == WaitStatus::Success
    }
}

/// Tracks per-spec progress across polls
struct Progress<'a> {
    specs: &'a [ThresholdSpec],
    satisfied: Vec<bool>,
    regressed: Vec<bool>,
    regressions: Vec<String>,
}

impl<'a> Progress<'a> {
    fn new(specs: &'a [ThresholdSpec]) -> Self {
        Self {
            specs,
            satisfied: vec![false; specs.len()],
            regressed: vec![false; specs.len()],
            regressions: Vec::new(),
        }
    }

    fn update(&mut self, readings: &Snapshot) {
        for (i, spec) in self.specs.iter().enumerate() {
            let Some(reading) = readings.get(&spec.point) else {
                continue;
            };
            let ok = spec.is_satisfied_by(&reading.temperature);
            if !self.satisfied[i] {
                if ok {
                    self.satisfied[i] = true;
                    tracing::info!(
                        point = %spec.point,
                        temperature = %reading.temperature,
                        target = spec.target,
                        "threshold reached"
                    );
                }
            } else if !ok && !self.regressed[i] {
                self.regressed[i] = true;
                tracing::warn!(
                    point = %spec.point,
                    temperature = %reading.temperature,
                    "reached threshold regressed"
                );
                self.regressions.push(format!(
                    "{} regressed after reaching {} (now {})",
                    spec.point, spec, reading.temperature
                ));
            }
        }
    }

    fn is_done(&self) -> bool {
        self.satisfied.iter().all(|s| *s)
    }

    fn pending(&self) -> BTreeSet<PointId> {
        self.specs
            .iter()
            .zip(&self.satisfied)
            .filter(|(_, done)| !**done)
            .map(|(spec, _)| spec.point.clone())
            .collect()
    }

    fn reached(&self) -> BTreeSet<PointId> {
        let pending = self.pending();
        self.specs
            .iter()
            .map(|spec| spec.point.clone())
            .filter(|point| !pending.contains(point))
            .collect()
    }
}

/// Waits for sets of threshold specs to be satisfied
#[derive(Clone)]
pub struct ThresholdWaiter<S> {
    source: S,
}

impl<S: TemperatureSource> ThresholdWaiter<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Poll until every spec is satisfied, `max_wait` elapses, or `abort`
    /// is raised. Points are read once at the start, then every
    /// `poll_interval`, and once more at the deadline.
    ///
    /// A sensor failure ends the wait with an error; unknown points fail
    /// before the first read.
    pub async fn wait_until(
        &self,
        specs: &[ThresholdSpec],
        options: WaitOptions,
        abort: &AbortSignal,
    ) -> Result<WaitOutcome, WaitError> {
        // Canonical ids so specs line up with the snapshot keys
        let mut resolved = Vec::with_capacity(specs.len());
        for spec in specs {
            let point = self
                .source
                .catalog()
                .get(spec.point.as_str())
                .map_err(SensorError::from)?;
            resolved.push(ThresholdSpec {
                point: point.id.clone(),
                ..spec.clone()
            });
        }
        let specs = resolved.as_slice();
        let mut points: Vec<PointId> = Vec::new();
        for spec in specs {
            if !points.contains(&spec.point) {
                points.push(spec.point.clone());
            }
        }

        let start = Instant::now();
        let deadline = start + options.max_wait;
        let mut progress = Progress::new(specs);
        let mut readings = Snapshot::new();
        let mut polls = 0u32;

        let status = loop {
            if abort.is_aborted() {
                break WaitStatus::Aborted;
            }
            if !points.is_empty() {
                readings = self.source.read_all(&points).await?;
                polls += 1;
                progress.update(&readings);
            }
            if progress.is_done() {
                break WaitStatus::Success;
            }
            let now = Instant::now();
            if now >= deadline {
                break WaitStatus::TimedOut;
            }
            tracing::debug!(polls, pending = progress.pending().len(), "waiting");

            let wake = (now + options.poll_interval).min(deadline);
            tokio::select! {
                _ = tokio::time::sleep_until(wake) => {}
                _ = abort.aborted() => break WaitStatus::Aborted,
            }
        };

        let outcome = WaitOutcome {
            status,
            reached: progress.reached(),
            pending: progress.pending(),
            readings,
            polls,
            elapsed: start.elapsed(),
            regressions: progress.regressions,
        };
        tracing::info!(
            status = ?outcome.status,
            polls,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            reached = outcome.reached.len(),
            pending = outcome.pending.len(),
            "wait finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "waiter_tests.rs"]
mod tests;
