// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sensor calibration tables
//!
//! Converts a raw sensor value (ohms or volts) into Kelvin by
//! piecewise-linear interpolation over a fixed table. Values outside the
//! table's domain have no temperature; callers report them as over-range.

use std::path::Path;
use thiserror::Error;

/// Errors building or loading a calibration table
#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("failed to read calibration file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("calibration table needs at least two distinct points, got {0}")]
    TooFewPoints(usize),
    #[error("calibration table contains a non-finite value")]
    NonFinite,
}

/// Ordered (raw, kelvin) pairs, strictly increasing in raw value
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    points: Vec<(f64, f64)>,
}

impl CalibrationTable {
    /// Build a table from (raw, kelvin) pairs in any order
    pub fn from_pairs(mut pairs: Vec<(f64, f64)>) -> Result<Self, CalibrationError> {
        if pairs.iter().any(|(r, k)| !r.is_finite() || !k.is_finite()) {
            return Err(CalibrationError::NonFinite);
        }
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        pairs.dedup_by(|b, a| a.0 == b.0);
        if pairs.len() < 2 {
            return Err(CalibrationError::TooFewPoints(pairs.len()));
        }
        Ok(Self { points: pairs })
    }

    /// Parse the `temperature,raw` CSV layout. The first line is a header;
    /// rows that do not parse are skipped.
    pub fn from_csv_str(text: &str) -> Result<Self, CalibrationError> {
        let pairs = text
            .lines()
            .skip(1)
            .filter_map(|line| {
                let mut cols = line.split(',').map(str::trim);
                let kelvin = cols.next()?.parse::<f64>().ok()?;
                let raw = cols.next()?.parse::<f64>().ok()?;
                Some((raw, kelvin))
            })
            .collect();
        Self::from_pairs(pairs)
    }

    pub fn load(path: &Path) -> Result<Self, CalibrationError> {
        let text = std::fs::read_to_string(path).map_err(|source| CalibrationError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_csv_str(&text)
    }

    /// Inclusive raw-value domain of the table
    pub fn domain(&self) -> (f64, f64) {
        let first = self.points.first().map_or(0.0, |p| p.0);
        let last = self.points.last().map_or(0.0, |p| p.0);
        (first, last)
    }

    /// Interpolated temperature for a raw value, `None` outside the domain
    pub fn lookup(&self, raw: f64) -> Option<f64> {
        let (lo, hi) = self.domain();
        if !raw.is_finite() || raw < lo || raw > hi {
            return None;
        }
        // First index whose raw value is >= the query
        let idx = self.points.partition_point(|p| p.0 < raw);
        let (r1, k1) = *self.points.get(idx)?;
        if idx == 0 || r1 == raw {
            return Some(k1);
        }
        let (r0, k0) = *self.points.get(idx - 1)?;
        Some(k0 + (raw - r0) * (k1 - k0) / (r1 - r0))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
#[path = "calibration_tests.rs"]
mod tests;
