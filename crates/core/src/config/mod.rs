// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration
//!
//! Loaded from TOML. Every section and field is optional; defaults match
//! the GL7 wiring and the Lakeshore 350 serial settings.

use crate::output::OutputId;
use crate::phase::PhaseKind;
use crate::point::CalibrationRef;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "gl7.toml";

/// Errors loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub serial: SerialConfig,
    pub calibration: CalibrationConfig,
    pub cycle: CycleConfig,
    pub log: LogConfig,
}

/// Serial link settings. Framing (7 data bits, odd parity, 1 stop bit)
/// is fixed by the instrument and not configurable.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SerialConfig {
    pub port: Option<String>,
    pub baud: u32,
    /// Read timeout for one reply
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Delay between writing a command and reading its reply
    #[serde(with = "humantime_serde")]
    pub settle: Duration,
    /// Extra attempts after a timeout or empty reply
    pub retries: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud: 57_600,
            timeout: Duration::from_secs(2),
            settle: Duration::from_millis(300),
            retries: 2,
        }
    }
}

/// Calibration CSV files, relative paths resolve against the config file
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalibrationConfig {
    pub he3_head: PathBuf,
    pub he4_head: PathBuf,
    pub pump: PathBuf,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            he3_head: PathBuf::from("calibration/3_head_cal.csv"),
            he4_head: PathBuf::from("calibration/4_head_cal.csv"),
            pump: PathBuf::from("calibration/pumps_switches_cal.csv"),
        }
    }
}

impl CalibrationConfig {
    pub fn path(&self, table: CalibrationRef) -> &Path {
        match table {
            CalibrationRef::He3Head => &self.he3_head,
            CalibrationRef::He4Head => &self.he4_head,
            CalibrationRef::Pump => &self.pump,
        }
    }

    fn rebase(&mut self, dir: &Path) {
        for path in [&mut self.he3_head, &mut self.he4_head, &mut self.pump] {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }
    }
}

/// Per-phase overrides for the wait budget
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaxWaits {
    #[serde(with = "humantime_serde")]
    pub precool: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub heat_switch_verification: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub pump_heating: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub he4_pump_transition: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub he3_pump_transition: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub final_cooldown: Option<Duration>,
}

impl MaxWaits {
    pub fn get(&self, phase: PhaseKind) -> Option<Duration> {
        match phase {
            PhaseKind::InitialStatus => None,
            PhaseKind::Precool => self.precool,
            PhaseKind::HeatSwitchVerification => self.heat_switch_verification,
            PhaseKind::PumpHeating => self.pump_heating,
            PhaseKind::He4PumpTransition => self.he4_pump_transition,
            PhaseKind::He3PumpTransition => self.he3_pump_transition,
            PhaseKind::FinalCooldown => self.final_cooldown,
        }
    }
}

/// Cycle thresholds, timing, and heater powers
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CycleConfig {
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Default budget for each wait
    #[serde(with = "humantime_serde")]
    pub max_wait: Duration,
    pub max_waits: MaxWaits,
    pub precool_k: f64,
    pub pump_heating_k: f64,
    pub he4_transition_k: f64,
    pub he3_transition_k: f64,
    /// 4He head temperature at which the cycle is approaching base
    pub approach_k: f64,
    /// 4He head temperature at which the cycle is running
    pub running_k: f64,
    /// Manual output percent for the 4He pump heater (output 1)
    pub he4_pump_power: Option<f64>,
    /// Manual output percent for the 3He pump heater (output 2)
    pub he3_pump_power: Option<f64>,
    pub switch_volts: f64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            max_wait: Duration::from_secs(2 * 60 * 60),
            max_waits: MaxWaits::default(),
            precool_k: 10.0,
            pump_heating_k: 4.0,
            he4_transition_k: 4.0,
            he3_transition_k: 2.0,
            approach_k: 0.5,
            running_k: 0.3,
            he4_pump_power: None,
            he3_pump_power: None,
            switch_volts: 5.0,
        }
    }
}

impl CycleConfig {
    /// Wait budget for a phase, falling back to the global default
    pub fn max_wait_for(&self, phase: PhaseKind) -> Duration {
        self.max_waits.get(phase).unwrap_or(self.max_wait)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid("cycle.poll_interval must be non-zero".into()));
        }
        let thresholds = [
            ("precool_k", self.precool_k),
            ("pump_heating_k", self.pump_heating_k),
            ("he4_transition_k", self.he4_transition_k),
            ("he3_transition_k", self.he3_transition_k),
            ("approach_k", self.approach_k),
            ("running_k", self.running_k),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "cycle.{} must be a positive temperature, got {}",
                    name, value
                )));
            }
        }
        if self.running_k > self.approach_k {
            return Err(ConfigError::Invalid(format!(
                "cycle.running_k ({}) must not exceed cycle.approach_k ({})",
                self.running_k, self.approach_k
            )));
        }
        let powers = [
            (OutputId::Heater1, self.he4_pump_power),
            (OutputId::Heater2, self.he3_pump_power),
        ];
        for (output, power) in powers {
            if let Some(percent) = power {
                output
                    .validate_power(percent)
                    .map_err(|e| ConfigError::Invalid(e.to_string()))?;
            }
        }
        OutputId::Switch3
            .validate_switch_volts(self.switch_volts)
            .and_then(|_| OutputId::Switch4.validate_switch_volts(self.switch_volts))
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Also write logs to this file
    pub file: Option<PathBuf>,
}

impl Config {
    /// Parse and validate TOML text. `origin` names the source in errors.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file. Relative paths inside it resolve against its directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text, &path.display().to_string())?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            config.calibration.rebase(dir);
            if let Some(file) = config.log.file.as_mut().filter(|f| f.is_relative()) {
                *file = dir.join(&*file);
            }
        }
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load `explicit` if given, else `gl7.toml` in `dir` if present, else defaults
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            return Self::load(&candidate);
        }
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.serial.baud == 0 {
            return Err(ConfigError::Invalid("serial.baud must be non-zero".into()));
        }
        self.cycle.validate()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
