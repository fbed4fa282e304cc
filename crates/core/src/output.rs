// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Controllable outputs and their physical limits
//!
//! The instrument has four outputs: two pump heaters (current actuators)
//! and two heat switches (analog voltage outputs). Every parameter is
//! validated against the output's limits before anything is written;
//! out-of-bound values are rejected, never clamped.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors from output validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OutputError {
    #[error("invalid parameters for {output}: {reason}")]
    InvalidOutputParams { output: OutputId, reason: String },
    #[error("unknown output: {0} (expected heater1, heater2, switch3 or switch4)")]
    UnknownOutput(String),
}

/// Whether mutations reach the instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    /// Log the command that would be sent, write nothing
    #[default]
    DryRun,
    Execute,
}

impl ExecutionMode {
    pub fn is_dry_run(self) -> bool {
        matches!(self, ExecutionMode::DryRun)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputKind {
    Heater,
    Switch,
}

/// Per-output limits, fixed by the wiring of the cryostat
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputLimits {
    Heater {
        /// Highest HTRSET max-current code the output supports
        max_current_code: u8,
        /// Upper bound for a user-specified max current, in amps
        max_user_current: f64,
    },
    Switch {
        max_volts: f64,
        bipolar: bool,
    },
}

pub const MAX_PERCENT: f64 = 100.0;
const MAX_INPUT: u8 = 8;

/// One of the four physical outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputId {
    /// 4He pump heater, output 1
    Heater1,
    /// 3He pump heater, output 2
    Heater2,
    /// 4He heat switch, analog output 3
    Switch3,
    /// 3He heat switch, analog output 4
    Switch4,
}

impl OutputId {
    pub const ALL: [OutputId; 4] = [
        OutputId::Heater1,
        OutputId::Heater2,
        OutputId::Switch3,
        OutputId::Switch4,
    ];

    /// Instrument output number
    pub fn number(self) -> u8 {
        match self {
            OutputId::Heater1 => 1,
            OutputId::Heater2 => 2,
            OutputId::Switch3 => 3,
            OutputId::Switch4 => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.number() == n)
    }

    pub fn kind(self) -> OutputKind {
        match self {
            OutputId::Heater1 | OutputId::Heater2 => OutputKind::Heater,
            OutputId::Switch3 | OutputId::Switch4 => OutputKind::Switch,
        }
    }

    pub fn is_heater(self) -> bool {
        self.kind() == OutputKind::Heater
    }

    pub fn label(self) -> &'static str {
        match self {
            OutputId::Heater1 => "4He pump heater",
            OutputId::Heater2 => "3He pump heater",
            OutputId::Switch3 => "4He heat switch",
            OutputId::Switch4 => "3He heat switch",
        }
    }

    pub fn limits(self) -> OutputLimits {
        match self {
            OutputId::Heater1 => OutputLimits::Heater {
                max_current_code: 4,
                max_user_current: 2.0,
            },
            OutputId::Heater2 => OutputLimits::Heater {
                max_current_code: 3,
                max_user_current: 1.732,
            },
            OutputId::Switch3 | OutputId::Switch4 => OutputLimits::Switch {
                max_volts: 10.0,
                bipolar: false,
            },
        }
    }

    fn invalid(self, reason: impl Into<String>) -> OutputError {
        OutputError::InvalidOutputParams {
            output: self,
            reason: reason.into(),
        }
    }

    /// Check a manual output percentage
    pub fn validate_power(self, percent: f64) -> Result<(), OutputError> {
        if !self.is_heater() {
            return Err(self.invalid("power can only be set on a heater; use on/off for switches"));
        }
        if !percent.is_finite() || !(0.0..=MAX_PERCENT).contains(&percent) {
            return Err(self.invalid(format!(
                "power {}% is outside 0..={}%",
                percent, MAX_PERCENT
            )));
        }
        Ok(())
    }

    /// Check switch on-voltage
    pub fn validate_switch_volts(self, volts: f64) -> Result<(), OutputError> {
        match self.limits() {
            OutputLimits::Switch { max_volts, .. } => {
                if !volts.is_finite() || volts <= 0.0 || volts > max_volts {
                    return Err(self.invalid(format!(
                        "switch voltage {} V is outside (0, {}] V",
                        volts, max_volts
                    )));
                }
                Ok(())
            }
            OutputLimits::Heater { .. } => Err(self.invalid("not a switch output")),
        }
    }

    /// Check configuration parameters against this output's limits
    pub fn validate(self, params: &OutputParams) -> Result<(), OutputError> {
        match (params, self.limits()) {
            (OutputParams::Mode { mode, input, .. }, limits) => {
                if *input > MAX_INPUT {
                    return Err(self.invalid(format!("control input {} is outside 0..=8", input)));
                }
                let heater = matches!(limits, OutputLimits::Heater { .. });
                if heater && matches!(mode, OutputMode::MonitorOut | OutputMode::WarmUp) {
                    return Err(self.invalid(format!("mode {} is only valid on analog outputs", mode)));
                }
                Ok(())
            }
            (OutputParams::Range(range), limits) => {
                let max = match limits {
                    OutputLimits::Heater { .. } => 5,
                    OutputLimits::Switch { .. } => 1,
                };
                if *range > max {
                    return Err(self.invalid(format!("range {} is outside 0..={}", range, max)));
                }
                Ok(())
            }
            (
                OutputParams::HeaterSetup(setup),
                OutputLimits::Heater {
                    max_current_code,
                    max_user_current,
                },
            ) => {
                if !matches!(setup.resistance, 1 | 2) {
                    return Err(self.invalid(format!(
                        "heater resistance setting {} must be 1 (25 ohm) or 2 (50 ohm)",
                        setup.resistance
                    )));
                }
                if setup.max_current > max_current_code {
                    return Err(self.invalid(format!(
                        "max current code {} is outside 0..={}",
                        setup.max_current, max_current_code
                    )));
                }
                if !setup.max_user_current.is_finite()
                    || setup.max_user_current < 0.0
                    || setup.max_user_current > max_user_current
                {
                    return Err(self.invalid(format!(
                        "user max current {} A exceeds {} A",
                        setup.max_user_current, max_user_current
                    )));
                }
                if !matches!(setup.display, 1 | 2) {
                    return Err(self.invalid(format!(
                        "heater display {} must be 1 (current) or 2 (power)",
                        setup.display
                    )));
                }
                Ok(())
            }
            (OutputParams::HeaterSetup(_), OutputLimits::Switch { .. }) => {
                Err(self.invalid("heater setup applies only to heater outputs"))
            }
            (OutputParams::Analog(analog), OutputLimits::Switch { max_volts, bipolar }) => {
                if analog.input > MAX_INPUT {
                    return Err(self.invalid(format!("analog input {} is outside 0..=8", analog.input)));
                }
                if !(1..=3).contains(&analog.units) {
                    return Err(self.invalid(format!("analog units {} is outside 1..=3", analog.units)));
                }
                for value in [analog.high, analog.low] {
                    if !value.is_finite() || value.abs() > max_volts {
                        return Err(self.invalid(format!(
                            "analog limit {} V exceeds {} V",
                            value, max_volts
                        )));
                    }
                    if !bipolar && value < 0.0 {
                        return Err(self.invalid("negative voltage on a unipolar output"));
                    }
                }
                if analog.bipolar && !bipolar {
                    return Err(self.invalid("bipolar polarity is not allowed on this output"));
                }
                Ok(())
            }
            (OutputParams::Analog(_), OutputLimits::Heater { .. }) => {
                Err(self.invalid("analog configuration applies only to switch outputs"))
            }
        }
    }
}

impl std::fmt::Display for OutputId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputId::Heater1 => "heater1",
            OutputId::Heater2 => "heater2",
            OutputId::Switch3 => "switch3",
            OutputId::Switch4 => "switch4",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for OutputId {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heater1" | "1" => Ok(OutputId::Heater1),
            "heater2" | "2" => Ok(OutputId::Heater2),
            "switch3" | "3" => Ok(OutputId::Switch3),
            "switch4" | "4" => Ok(OutputId::Switch4),
            _ => Err(OutputError::UnknownOutput(s.to_string())),
        }
    }
}

/// OUTMODE control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    Off,
    ClosedLoop,
    Zone,
    OpenLoop,
    MonitorOut,
    WarmUp,
}

impl OutputMode {
    pub fn code(self) -> u8 {
        match self {
            OutputMode::Off => 0,
            OutputMode::ClosedLoop => 1,
            OutputMode::Zone => 2,
            OutputMode::OpenLoop => 3,
            OutputMode::MonitorOut => 4,
            OutputMode::WarmUp => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(OutputMode::Off),
            1 => Some(OutputMode::ClosedLoop),
            2 => Some(OutputMode::Zone),
            3 => Some(OutputMode::OpenLoop),
            4 => Some(OutputMode::MonitorOut),
            5 => Some(OutputMode::WarmUp),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputMode::Off => "off",
            OutputMode::ClosedLoop => "closed-loop",
            OutputMode::Zone => "zone",
            OutputMode::OpenLoop => "open-loop",
            OutputMode::MonitorOut => "monitor-out",
            OutputMode::WarmUp => "warm-up",
        };
        write!(f, "{}", name)
    }
}

/// HTRSET heater setup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeaterSetup {
    /// 1 = 25 ohm, 2 = 50 ohm
    pub resistance: u8,
    /// 0 = user specified, otherwise a fixed current code
    pub max_current: u8,
    pub max_user_current: f64,
    /// 1 = current, 2 = power
    pub display: u8,
}

impl HeaterSetup {
    /// Recommended setup for a pump heater output
    pub fn recommended(output: OutputId) -> Option<Self> {
        match output {
            OutputId::Heater1 => Some(Self {
                resistance: 2,
                max_current: 0,
                max_user_current: 0.1,
                display: 1,
            }),
            OutputId::Heater2 => Some(Self {
                resistance: 1,
                max_current: 0,
                max_user_current: 1.732,
                display: 1,
            }),
            OutputId::Switch3 | OutputId::Switch4 => None,
        }
    }
}

/// ANALOG output configuration for a heat switch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalogConfig {
    /// Input the output follows, 0 = none (switch off)
    pub input: u8,
    /// 1 = Kelvin, 2 = Celsius, 3 = sensor units
    pub units: u8,
    pub high: f64,
    pub low: f64,
    pub bipolar: bool,
}

impl AnalogConfig {
    /// Configuration that energizes a heat switch at `volts`
    pub fn switch_on(volts: f64) -> Self {
        Self {
            input: 1,
            units: 1,
            high: volts,
            low: 0.0,
            bipolar: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.input != 0
    }
}

/// A configuration change for one output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "param", content = "value", rename_all = "kebab-case")]
pub enum OutputParams {
    Mode {
        mode: OutputMode,
        input: u8,
        powerup_enable: bool,
    },
    Range(u8),
    HeaterSetup(HeaterSetup),
    Analog(AnalogConfig),
}

impl OutputParams {
    /// Manual (open-loop) mode with no control input
    pub fn open_loop() -> Self {
        OutputParams::Mode {
            mode: OutputMode::OpenLoop,
            input: 0,
            powerup_enable: false,
        }
    }
}

/// State of one output as read back from the instrument
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum OutputStatus {
    Heater {
        output: OutputId,
        manual_percent: f64,
        mode: OutputMode,
        input: u8,
        range: u8,
        setup: HeaterSetup,
        /// Actual heater output from HTR?
        output_percent: f64,
    },
    Switch {
        output: OutputId,
        analog: AnalogConfig,
        /// Actual analog output from AOUT?
        output_percent: f64,
    },
}

impl OutputStatus {
    pub fn output(&self) -> OutputId {
        match self {
            OutputStatus::Heater { output, .. } | OutputStatus::Switch { output, .. } => *output,
        }
    }

    /// Whether the output is delivering (or commanded to deliver) power
    pub fn is_energized(&self) -> bool {
        match self {
            OutputStatus::Heater {
                manual_percent,
                output_percent,
                ..
            } => *manual_percent > 0.0 || *output_percent > 0.0,
            OutputStatus::Switch { analog, .. } => analog.is_enabled(),
        }
    }
}

impl std::fmt::Display for OutputStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.is_energized() { "ON" } else { "OFF" };
        match self {
            OutputStatus::Heater {
                output,
                manual_percent,
                mode,
                range,
                output_percent,
                ..
            } => write!(
                f,
                "{:<8} {:<16} {:<3} manual {:.1}%, mode {}, range {}, output {:.1}%",
                output.to_string(),
                output.label(),
                state,
                manual_percent,
                mode,
                range,
                output_percent
            ),
            OutputStatus::Switch {
                output,
                analog,
                output_percent,
            } => write!(
                f,
                "{:<8} {:<16} {:<3} input {}, {:.2}..{:.2} V, output {:.1}%",
                output.to_string(),
                output.label(),
                state,
                analog.input,
                analog.low,
                analog.high,
                output_percent
            ),
        }
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
