// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Phase plans for the GL7 cycle
//!
//! Each phase is a stateless definition built from [`CycleConfig`]: checks
//! that must hold before it starts, an ordered list of waits and output
//! mutations, and checks that must hold after. The sequencer interprets
//! the plan; nothing here performs I/O.

use crate::SequenceError;
use gl7_core::point::{HE3_HEAD, HE4_HEAD};
use gl7_core::{CycleConfig, OutputId, OutputParams, PhaseKind, ThresholdSpec};
use std::time::Duration;

/// A condition on one output's read-back state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Energized(OutputId),
    NotEnergized(OutputId),
}

impl Check {
    pub fn output(self) -> OutputId {
        match self {
            Check::Energized(o) | Check::NotEnergized(o) => o,
        }
    }

    pub fn holds(self, energized: bool) -> bool {
        match self {
            Check::Energized(_) => energized,
            Check::NotEnergized(_) => !energized,
        }
    }
}

impl std::fmt::Display for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let output = self.output();
        let state = match self {
            Check::Energized(_) => "on",
            Check::NotEnergized(_) => "off",
        };
        write!(f, "{} ({}) is {}", output, output.label(), state)
    }
}

/// One ordered action within a phase
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Block until every spec holds
    Wait(Vec<ThresholdSpec>),
    Configure { output: OutputId, params: OutputParams },
    SetPower { output: OutputId, percent: f64 },
    Enable { output: OutputId, on: bool },
}

impl Step {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Step::Wait(_))
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Wait(specs) => {
                let specs: Vec<String> = specs.iter().map(ToString::to_string).collect();
                write!(f, "wait until {}", specs.join(", "))
            }
            Step::Configure {
                output,
                params: OutputParams::Mode { mode, .. },
            } => write!(f, "put {} in {} mode", output, mode),
            Step::Configure { output, .. } => write!(f, "configure {}", output),
            Step::SetPower { output, percent } => write!(f, "set {} to {:.1}%", output, percent),
            Step::Enable { output, on } => {
                write!(f, "turn {} {}", output, if *on { "on" } else { "off" })
            }
        }
    }
}

/// Plan for one phase
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseDef {
    pub kind: PhaseKind,
    pub preconditions: Vec<Check>,
    pub steps: Vec<Step>,
    pub postconditions: Vec<Check>,
    /// Outputs read back into the result
    pub outputs: Vec<OutputId>,
    /// Terminal predicate reported as `cycle_running`
    pub running: Option<ThresholdSpec>,
    pub poll_interval: Duration,
    pub max_wait: Duration,
}

fn heads_at_most(target: f64, label: &str) -> Step {
    Step::Wait(vec![
        ThresholdSpec::at_most(HE3_HEAD, target).with_label(label),
        ThresholdSpec::at_most(HE4_HEAD, target).with_label(label),
    ])
}

fn pump_power(
    output: OutputId,
    power: Option<f64>,
    key: &'static str,
) -> Result<f64, SequenceError> {
    power.ok_or(SequenceError::MissingPower { output, key })
}

const SWITCHES_OFF: [Check; 2] = [
    Check::NotEnergized(OutputId::Switch3),
    Check::NotEnergized(OutputId::Switch4),
];

impl PhaseDef {
    fn empty(kind: PhaseKind, cycle: &CycleConfig) -> Self {
        Self {
            kind,
            preconditions: Vec::new(),
            steps: Vec::new(),
            postconditions: Vec::new(),
            outputs: Vec::new(),
            running: None,
            poll_interval: cycle.poll_interval,
            max_wait: cycle.max_wait_for(kind),
        }
    }

    /// Build the plan for `kind`. Fails only when the phase needs a
    /// setting the configuration does not provide.
    pub fn build(kind: PhaseKind, cycle: &CycleConfig) -> Result<Self, SequenceError> {
        let mut def = Self::empty(kind, cycle);
        match kind {
            PhaseKind::InitialStatus => {
                def.outputs = OutputId::ALL.to_vec();
            }
            PhaseKind::Precool => {
                def.steps = vec![heads_at_most(cycle.precool_k, "precool")];
            }
            PhaseKind::HeatSwitchVerification => {
                def.preconditions = SWITCHES_OFF.to_vec();
                def.steps = vec![heads_at_most(cycle.precool_k, "switches open")];
                def.outputs = vec![OutputId::Switch3, OutputId::Switch4];
            }
            PhaseKind::PumpHeating => {
                let he4 = pump_power(OutputId::Heater1, cycle.he4_pump_power, "he4_pump_power")?;
                let he3 = pump_power(OutputId::Heater2, cycle.he3_pump_power, "he3_pump_power")?;
                def.preconditions = SWITCHES_OFF.to_vec();
                def.steps = vec![
                    Step::Configure {
                        output: OutputId::Heater1,
                        params: OutputParams::open_loop(),
                    },
                    Step::SetPower {
                        output: OutputId::Heater1,
                        percent: he4,
                    },
                    Step::Configure {
                        output: OutputId::Heater2,
                        params: OutputParams::open_loop(),
                    },
                    Step::SetPower {
                        output: OutputId::Heater2,
                        percent: he3,
                    },
                    heads_at_most(cycle.pump_heating_k, "pumps heated"),
                ];
                def.outputs = vec![OutputId::Heater1, OutputId::Heater2];
            }
            PhaseKind::He4PumpTransition => {
                // Heater off strictly before the switch closes
                def.steps = vec![
                    heads_at_most(cycle.he4_transition_k, "4He transition"),
                    Step::Enable {
                        output: OutputId::Heater1,
                        on: false,
                    },
                    Step::Enable {
                        output: OutputId::Switch3,
                        on: true,
                    },
                ];
                def.postconditions = vec![
                    Check::NotEnergized(OutputId::Heater1),
                    Check::Energized(OutputId::Switch3),
                ];
                def.outputs = vec![OutputId::Heater1, OutputId::Switch3];
            }
            PhaseKind::He3PumpTransition => {
                def.steps = vec![
                    heads_at_most(cycle.he3_transition_k, "3He transition"),
                    Step::Enable {
                        output: OutputId::Heater2,
                        on: false,
                    },
                    Step::Enable {
                        output: OutputId::Switch4,
                        on: true,
                    },
                ];
                def.postconditions = vec![
                    Check::NotEnergized(OutputId::Heater2),
                    Check::Energized(OutputId::Switch4),
                ];
                def.outputs = vec![OutputId::Heater2, OutputId::Switch4];
            }
            PhaseKind::FinalCooldown => {
                def.steps = vec![Step::Wait(vec![ThresholdSpec::at_most(
                    HE4_HEAD,
                    cycle.approach_k,
                )
                .with_label("approaching base")])];
                def.postconditions = vec![
                    Check::NotEnergized(OutputId::Heater1),
                    Check::NotEnergized(OutputId::Heater2),
                    Check::Energized(OutputId::Switch3),
                    Check::Energized(OutputId::Switch4),
                ];
                def.outputs = OutputId::ALL.to_vec();
                def.running =
                    Some(ThresholdSpec::at_most(HE4_HEAD, cycle.running_k).with_label("running"));
            }
        }
        Ok(def)
    }

    pub fn has_mutations(&self) -> bool {
        self.steps.iter().any(Step::is_mutation)
    }
}

impl std::fmt::Display for PhaseDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for check in &self.preconditions {
            writeln!(f, "require {}", check)?;
        }
        for step in &self.steps {
            writeln!(f, "{}", step)?;
        }
        for check in &self.postconditions {
            writeln!(f, "verify {}", check)?;
        }
        if let Some(running) = &self.running {
            writeln!(f, "report {}", running)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "phases_tests.rs"]
mod tests;
