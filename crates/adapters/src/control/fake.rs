// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake output controller for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{heater_on_rejected, ControlError, OutputController};
use crate::transport::TransportError;
use async_trait::async_trait;
use gl7_core::{
    AnalogConfig, ExecutionMode, HeaterSetup, OutputId, OutputMode, OutputParams, OutputStatus,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

/// Recorded controller call
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCall {
    SetPower {
        output: OutputId,
        percent: f64,
        mode: ExecutionMode,
    },
    SetEnabled {
        output: OutputId,
        on: bool,
        mode: ExecutionMode,
    },
    Configure {
        output: OutputId,
        params: OutputParams,
        mode: ExecutionMode,
    },
    Query {
        output: OutputId,
    },
}

impl ControlCall {
    pub fn output(&self) -> OutputId {
        match self {
            ControlCall::SetPower { output, .. }
            | ControlCall::SetEnabled { output, .. }
            | ControlCall::Configure { output, .. }
            | ControlCall::Query { output } => *output,
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(self, ControlCall::Query { .. })
    }
}

struct FakeControlState {
    outputs: BTreeMap<OutputId, OutputStatus>,
    failing: HashSet<OutputId>,
    calls: Vec<ControlCall>,
}

/// Stateful fake with the same validation as the real controller.
///
/// Rejected parameters are not recorded, mirroring the real controller
/// which never writes them to the wire.
#[derive(Clone)]
pub struct FakeOutputController {
    switch_volts: f64,
    inner: Arc<Mutex<FakeControlState>>,
}

impl Default for FakeOutputController {
    fn default() -> Self {
        Self::new()
    }
}

fn initial_status(output: OutputId) -> OutputStatus {
    match HeaterSetup::recommended(output) {
        Some(setup) => OutputStatus::Heater {
            output,
            manual_percent: 0.0,
            mode: OutputMode::OpenLoop,
            input: 0,
            range: 0,
            setup,
            output_percent: 0.0,
        },
        None => OutputStatus::Switch {
            output,
            analog: AnalogConfig {
                input: 0,
                ..AnalogConfig::switch_on(5.0)
            },
            output_percent: 0.0,
        },
    }
}

impl FakeOutputController {
    /// All heaters and switches start off
    pub fn new() -> Self {
        let outputs = OutputId::ALL
            .into_iter()
            .map(|o| (o, initial_status(o)))
            .collect();
        Self {
            switch_volts: 5.0,
            inner: Arc::new(Mutex::new(FakeControlState {
                outputs,
                failing: HashSet::new(),
                calls: Vec::new(),
            })),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeControlState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Preset an output's state without recording a call
    pub fn set_status(&self, status: OutputStatus) {
        self.state().outputs.insert(status.output(), status);
    }

    /// Preset a switch on or off without recording a call
    pub fn set_switch(&self, output: OutputId, on: bool) {
        let mut state = self.state();
        if let Some(OutputStatus::Switch {
            analog,
            output_percent,
            ..
        }) = state.outputs.get_mut(&output)
        {
            analog.input = u8::from(on);
            *output_percent = if on { 50.0 } else { 0.0 };
        }
    }

    /// Make every call touching `output` fail with a transport error
    pub fn fail(&self, output: OutputId) {
        self.state().failing.insert(output);
    }

    pub fn status(&self, output: OutputId) -> Option<OutputStatus> {
        self.state().outputs.get(&output).copied()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ControlCall> {
        self.state().calls.clone()
    }

    /// Recorded mutation calls, in order
    pub fn mutations(&self) -> Vec<ControlCall> {
        self.calls().into_iter().filter(|c| c.is_mutation()).collect()
    }

    fn record(&self, call: ControlCall) -> Result<(), ControlError> {
        let mut state = self.state();
        let output = call.output();
        state.calls.push(call);
        if state.failing.contains(&output) {
            return Err(ControlError::Transport(TransportError::Timeout {
                command: format!("output {}", output.number()),
            }));
        }
        Ok(())
    }

    fn apply(&self, output: OutputId, f: impl FnOnce(&mut OutputStatus)) {
        if let Some(status) = self.state().outputs.get_mut(&output) {
            f(status);
        }
    }
}

#[async_trait]
impl OutputController for FakeOutputController {
    async fn set_power(
        &self,
        output: OutputId,
        percent: f64,
        mode: ExecutionMode,
    ) -> Result<(), ControlError> {
        output.validate_power(percent)?;
        self.record(ControlCall::SetPower {
            output,
            percent,
            mode,
        })?;
        if mode.is_dry_run() {
            return Ok(());
        }
        self.apply(output, |status| {
            if let OutputStatus::Heater {
                manual_percent,
                output_percent,
                ..
            } = status
            {
                *manual_percent = percent;
                *output_percent = percent;
            }
        });
        Ok(())
    }

    async fn set_enabled(
        &self,
        output: OutputId,
        on: bool,
        mode: ExecutionMode,
    ) -> Result<(), ControlError> {
        if output.is_heater() && on {
            return Err(heater_on_rejected(output).into());
        }
        if !output.is_heater() && on {
            output.validate_switch_volts(self.switch_volts)?;
        }
        self.record(ControlCall::SetEnabled { output, on, mode })?;
        if mode.is_dry_run() {
            return Ok(());
        }
        let volts = self.switch_volts;
        self.apply(output, |status| match status {
            OutputStatus::Heater {
                manual_percent,
                output_percent,
                ..
            } => {
                *manual_percent = 0.0;
                *output_percent = 0.0;
            }
            OutputStatus::Switch {
                analog,
                output_percent,
                ..
            } => {
                if on {
                    *analog = AnalogConfig::switch_on(volts);
                    *output_percent = 50.0;
                } else {
                    analog.input = 0;
                    *output_percent = 0.0;
                }
            }
        });
        Ok(())
    }

    async fn configure(
        &self,
        output: OutputId,
        params: OutputParams,
        mode: ExecutionMode,
    ) -> Result<(), ControlError> {
        output.validate(&params)?;
        self.record(ControlCall::Configure {
            output,
            params,
            mode,
        })?;
        if mode.is_dry_run() {
            return Ok(());
        }
        self.apply(output, |status| match (status, params) {
            (
                OutputStatus::Heater {
                    mode: m, input: i, ..
                },
                OutputParams::Mode { mode, input, .. },
            ) => {
                *m = mode;
                *i = input;
            }
            (OutputStatus::Heater { range, .. }, OutputParams::Range(r)) => *range = r,
            (OutputStatus::Heater { setup, .. }, OutputParams::HeaterSetup(s)) => *setup = s,
            (OutputStatus::Switch { analog, .. }, OutputParams::Analog(a)) => *analog = a,
            _ => {}
        });
        Ok(())
    }

    async fn query(&self, output: OutputId) -> Result<OutputStatus, ControlError> {
        self.record(ControlCall::Query { output })?;
        let status = self.status(output).ok_or_else(|| {
            ControlError::Transport(TransportError::NoResponse {
                command: format!("status {}", output.number()),
            })
        })?;
        Ok(status)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
