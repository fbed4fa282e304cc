// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Measurement points and the instrument catalog
//!
//! The catalog is built once at startup and never mutated. Every point
//! maps to a single instrument input and, for points that are not
//! natively temperature-scaled, to a calibration table.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const HE3_HEAD: &str = "3He Head";
pub const HE4_HEAD: &str = "4He Head";
pub const STAGE_4K: &str = "4K Stage";
pub const STAGE_50K: &str = "50K Stage";
pub const DEVICE_STAGE: &str = "Device Stage";
pub const HE3_PUMP: &str = "3He Pump";
pub const HE4_PUMP: &str = "4He Pump";

/// Errors from catalog lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("unknown measurement point: {0}")]
    UnknownPoint(String),
}

/// Name of a measurement point
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(pub String);

impl PointId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PointId {
    fn from(s: String) -> Self {
        PointId(s)
    }
}

impl From<&str> for PointId {
    fn from(s: &str) -> Self {
        PointId(s.to_string())
    }
}

/// How the instrument reports a point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointKind {
    /// Natively temperature-scaled (KRDG?)
    Kelvin,
    /// Sensor resistance in ohms (SRDG?), needs calibration
    Resistance,
    /// Sensor voltage (VRDG?), needs calibration
    Voltage,
}

impl PointKind {
    pub fn needs_calibration(self) -> bool {
        !matches!(self, PointKind::Kelvin)
    }
}

/// Which calibration table converts a point's raw value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalibrationRef {
    He3Head,
    He4Head,
    Pump,
}

impl std::fmt::Display for CalibrationRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CalibrationRef::He3Head => "he3_head",
            CalibrationRef::He4Head => "he4_head",
            CalibrationRef::Pump => "pump",
        };
        write!(f, "{}", name)
    }
}

/// A named place on the cryostat where temperature is measured
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementPoint {
    pub id: PointId,
    /// Instrument input or scanner channel, e.g. "A", "D2"
    pub channel: String,
    pub kind: PointKind,
    pub calibration: Option<CalibrationRef>,
}

impl MeasurementPoint {
    pub fn kelvin(id: &str, channel: &str) -> Self {
        Self {
            id: id.into(),
            channel: channel.to_string(),
            kind: PointKind::Kelvin,
            calibration: None,
        }
    }

    pub fn calibrated(id: &str, channel: &str, kind: PointKind, table: CalibrationRef) -> Self {
        Self {
            id: id.into(),
            channel: channel.to_string(),
            kind,
            calibration: Some(table),
        }
    }

    /// Channels on the 3062 scanner option read 0.0 when nothing is connected
    pub fn is_scanner_channel(&self) -> bool {
        matches!(self.channel.as_str(), "D2" | "D3" | "D4" | "D5")
    }
}

/// Immutable set of measurement points
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    points: Vec<MeasurementPoint>,
}

impl Catalog {
    pub fn new(points: Vec<MeasurementPoint>) -> Self {
        Self { points }
    }

    /// The GL7 wiring of the Lakeshore 350 inputs
    pub fn gl7() -> Self {
        Self::new(vec![
            MeasurementPoint::calibrated(
                HE3_HEAD,
                "A",
                PointKind::Resistance,
                CalibrationRef::He3Head,
            ),
            MeasurementPoint::calibrated(
                HE4_HEAD,
                "C",
                PointKind::Resistance,
                CalibrationRef::He4Head,
            ),
            MeasurementPoint::kelvin(STAGE_4K, "D2"),
            MeasurementPoint::kelvin(STAGE_50K, "D3"),
            MeasurementPoint::kelvin(DEVICE_STAGE, "B"),
            MeasurementPoint::calibrated(HE3_PUMP, "D4", PointKind::Voltage, CalibrationRef::Pump),
            MeasurementPoint::calibrated(HE4_PUMP, "D5", PointKind::Voltage, CalibrationRef::Pump),
        ])
    }

    /// Look up a point by id, ignoring ASCII case
    pub fn get(&self, id: &str) -> Result<&MeasurementPoint, CatalogError> {
        self.points
            .iter()
            .find(|p| p.id.as_str().eq_ignore_ascii_case(id.trim()))
            .ok_or_else(|| CatalogError::UnknownPoint(id.to_string()))
    }

    /// Resolve a list of names into catalog ids
    pub fn resolve<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<PointId>, CatalogError> {
        ids.iter()
            .map(|id| self.get(id.as_ref()).map(|p| p.id.clone()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MeasurementPoint> {
        self.points.iter()
    }

    pub fn ids(&self) -> Vec<PointId> {
        self.points.iter().map(|p| p.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::gl7()
    }
}

#[cfg(test)]
#[path = "point_tests.rs"]
mod tests;
