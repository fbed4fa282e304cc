// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gl7-core: Core library for the gl7 cool-down supervisor
//!
//! This crate provides:
//! - The measurement catalog, readings, and calibration tables
//! - Output identifiers with their physical limits
//! - Threshold specs, phase kinds, and phase/sequence results
//! - The pure sequence state machine
//! - TOML configuration

pub mod clock;

pub mod calibration;
pub mod config;
pub mod output;
pub mod phase;
pub mod point;
pub mod reading;
pub mod sequence;
pub mod threshold;

// Re-exports
pub use calibration::{CalibrationError, CalibrationTable};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{Config, ConfigError, CycleConfig, LogConfig, SerialConfig};
pub use output::{
    AnalogConfig, ExecutionMode, HeaterSetup, OutputError, OutputId, OutputKind, OutputLimits,
    OutputMode, OutputParams, OutputStatus,
};
pub use phase::{PhaseKind, PhaseResult, PhaseStatus, SequenceResult};
pub use point::{Catalog, CatalogError, MeasurementPoint, PointId, PointKind};
pub use reading::{Reading, Snapshot, Temperature};
pub use sequence::{SequenceEvent, SequenceState};
pub use threshold::{Comparator, ThresholdSpec};
