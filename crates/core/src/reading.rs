// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Temperature readings

use crate::point::PointId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A calibrated temperature, or the instrument's over-range sentinel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Temperature {
    Kelvin(f64),
    /// Outside the sensor's valid domain. Never satisfies a threshold.
    OverRange,
}

impl Temperature {
    pub fn kelvin(&self) -> Option<f64> {
        match self {
            Temperature::Kelvin(k) => Some(*k),
            Temperature::OverRange => None,
        }
    }

    pub fn is_over_range(&self) -> bool {
        matches!(self, Temperature::OverRange)
    }
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Temperature::Kelvin(k) => write!(f, "{:.3} K", k),
            Temperature::OverRange => write!(f, "OVER-RANGE"),
        }
    }
}

/// One sample of one measurement point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub point: PointId,
    /// Sensor units (ohms or volts) for calibrated points
    pub raw: Option<f64>,
    pub temperature: Temperature,
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    pub fn new(
        point: PointId,
        raw: Option<f64>,
        temperature: Temperature,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            point,
            raw,
            temperature,
            timestamp,
        }
    }
}

impl std::fmt::Display for Reading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:<14} {}", self.point.as_str(), self.temperature)?;
        if let Some(raw) = self.raw {
            write!(f, " (raw {:.4})", raw)?;
        }
        Ok(())
    }
}

/// Point-to-reading mapping for one poll
pub type Snapshot = BTreeMap<PointId, Reading>;
