// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Phase identifiers and results
//!
//! Results are plain values returned to the caller. Nothing here records
//! which phase ran last; a single phase can be re-run at any time.

use crate::output::{OutputId, OutputStatus};
use crate::point::PointId;
use crate::reading::Snapshot;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// The GL7 cool-down phases, in run order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseKind {
    InitialStatus,
    Precool,
    HeatSwitchVerification,
    PumpHeating,
    He4PumpTransition,
    He3PumpTransition,
    FinalCooldown,
}

impl PhaseKind {
    pub const ALL: [PhaseKind; 7] = [
        PhaseKind::InitialStatus,
        PhaseKind::Precool,
        PhaseKind::HeatSwitchVerification,
        PhaseKind::PumpHeating,
        PhaseKind::He4PumpTransition,
        PhaseKind::He3PumpTransition,
        PhaseKind::FinalCooldown,
    ];

    /// 1-based position in the cycle
    pub fn index(self) -> usize {
        match self {
            PhaseKind::InitialStatus => 1,
            PhaseKind::Precool => 2,
            PhaseKind::HeatSwitchVerification => 3,
            PhaseKind::PumpHeating => 4,
            PhaseKind::He4PumpTransition => 5,
            PhaseKind::He3PumpTransition => 6,
            PhaseKind::FinalCooldown => 7,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.index() == index)
    }

    pub fn first() -> Self {
        PhaseKind::InitialStatus
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn name(self) -> &'static str {
        match self {
            PhaseKind::InitialStatus => "initial-status",
            PhaseKind::Precool => "precool",
            PhaseKind::HeatSwitchVerification => "heat-switch-verification",
            PhaseKind::PumpHeating => "pump-heating",
            PhaseKind::He4PumpTransition => "he4-pump-transition",
            PhaseKind::He3PumpTransition => "he3-pump-transition",
            PhaseKind::FinalCooldown => "final-cooldown",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PhaseKind::InitialStatus => "read all points and output states",
            PhaseKind::Precool => "wait for both heads to reach the precool target",
            PhaseKind::HeatSwitchVerification => {
                "confirm heat switches are off and heads are still cold"
            }
            PhaseKind::PumpHeating => "energize both pump heaters, wait for heads to settle",
            PhaseKind::He4PumpTransition => "4He pump heater off, then 4He heat switch on",
            PhaseKind::He3PumpTransition => "3He pump heater off, then 3He heat switch on",
            PhaseKind::FinalCooldown => "wait for the 4He head to approach base temperature",
        }
    }
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for PhaseKind {
    type Err = String;

    /// Accepts a phase name or its 1-based index
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<usize>() {
            return Self::from_index(index)
                .ok_or_else(|| format!("phase index {} is outside 1..=7", index));
        }
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown phase: {}", s))
    }
}

/// Outcome of one phase execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseStatus {
    Success,
    /// A wait exhausted its budget; no mutations after it ran
    TimedOut,
    /// Operator cancel or failed precondition
    Aborted,
    /// Transport, sensor, or postcondition failure
    Error,
}

impl PhaseStatus {
    pub fn is_success(self) -> bool {
        matches!(self, PhaseStatus::Success)
    }
}

impl std::fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PhaseStatus::Success => "success",
            PhaseStatus::TimedOut => "timed-out",
            PhaseStatus::Aborted => "aborted",
            PhaseStatus::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Structured record of one phase execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseResult {
    pub phase: PhaseKind,
    pub index: usize,
    pub status: PhaseStatus,
    /// Final read-back, recorded regardless of outcome
    pub readings: Snapshot,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<OutputId, OutputStatus>,
    pub reached: BTreeSet<PointId>,
    pub pending: BTreeSet<PointId>,
    pub notes: Vec<String>,
    /// Set only by the final phase: true once the cycle is running at base temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_running: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PhaseResult {
    pub fn new(phase: PhaseKind, status: PhaseStatus) -> Self {
        Self {
            phase,
            index: phase.index(),
            status,
            readings: Snapshot::new(),
            outputs: BTreeMap::new(),
            reached: BTreeSet::new(),
            pending: BTreeSet::new(),
            notes: Vec::new(),
            cycle_running: None,
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Status and reached/pending sets match, ignoring timestamps and notes
    pub fn same_outcome(&self, other: &PhaseResult) -> bool {
        self.phase == other.phase
            && self.status == other.status
            && self.reached == other.reached
            && self.pending == other.pending
            && self.cycle_running == other.cycle_running
    }
}

impl std::fmt::Display for PhaseResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Phase {} ({}): {}", self.index, self.phase, self.status)?;
        for reading in self.readings.values() {
            writeln!(f, "  {}", reading)?;
        }
        for status in self.outputs.values() {
            writeln!(f, "  {}", status)?;
        }
        if !self.reached.is_empty() {
            let names: Vec<&str> = self.reached.iter().map(PointId::as_str).collect();
            writeln!(f, "  reached: {}", names.join(", "))?;
        }
        if !self.pending.is_empty() {
            let names: Vec<&str> = self.pending.iter().map(PointId::as_str).collect();
            writeln!(f, "  pending: {}", names.join(", "))?;
        }
        if let Some(running) = self.cycle_running {
            let verdict = if running { "running" } else { "not yet running" };
            writeln!(f, "  GL7 cycle: {}", verdict)?;
        }
        for note in &self.notes {
            writeln!(f, "  note: {}", note)?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "  error: {}", error)?;
        }
        Ok(())
    }
}

/// Results of a full-sequence run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceResult {
    pub phases: Vec<PhaseResult>,
    /// First phase that did not succeed, if any
    pub first_failure: Option<PhaseKind>,
}

impl SequenceResult {
    pub fn from_phases(phases: Vec<PhaseResult>) -> Self {
        let first_failure = phases.iter().find(|r| !r.is_success()).map(|r| r.phase);
        Self {
            phases,
            first_failure,
        }
    }

    /// True only if every phase ran and succeeded
    pub fn is_success(&self) -> bool {
        self.first_failure.is_none() && self.phases.len() == PhaseKind::ALL.len()
    }

    pub fn last(&self) -> Option<&PhaseResult> {
        self.phases.last()
    }
}

impl std::fmt::Display for SequenceResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for result in &self.phases {
            write!(f, "{}", result)?;
        }
        match self.first_failure {
            Some(phase) => writeln!(f, "Sequence aborted at phase {} ({})", phase.index(), phase),
            None if self.is_success() => writeln!(f, "Sequence completed"),
            None => writeln!(f, "Sequence incomplete"),
        }
    }
}

#[cfg(test)]
#[path = "phase_tests.rs"]
mod tests;
