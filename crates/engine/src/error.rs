// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use gl7_adapters::SensorError;
use gl7_core::OutputId;
use thiserror::Error;

/// A wait that could not keep polling
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WaitError {
    #[error("sensor failure during wait: {0}")]
    Sensor(#[from] SensorError),
}

/// Failures outside a single phase's wait/mutate steps
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SequenceError {
    #[error("no pump power configured for {output}: set cycle.{key}")]
    MissingPower { output: OutputId, key: &'static str },
    #[error("emergency stop incomplete: {}", .0.join("; "))]
    EmergencyStop(Vec<String>),
}
