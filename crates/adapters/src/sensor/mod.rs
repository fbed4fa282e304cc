// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Temperature sources

mod instrument;

pub use instrument::{CalibrationSet, InstrumentTemperatureSource};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeTemperatureSource, SensorCall};

use async_trait::async_trait;
use gl7_core::{Catalog, CatalogError, PointId, Reading, Snapshot};
use thiserror::Error;

/// Errors from reading a measurement point
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("unknown measurement point: {0}")]
    UnknownPoint(String),
    #[error("unknown input channel: {0} (expected A-D or D1-D5)")]
    UnknownChannel(String),
    #[error("failed to read {point}: {cause}")]
    SensorRead { point: PointId, cause: String },
}

impl From<CatalogError> for SensorError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::UnknownPoint(name) => SensorError::UnknownPoint(name),
        }
    }
}

impl SensorError {
    pub fn read(point: &PointId, cause: impl std::fmt::Display) -> Self {
        SensorError::SensorRead {
            point: point.clone(),
            cause: cause.to_string(),
        }
    }
}

/// Source of calibrated temperatures for catalog points
///
/// Over-range is a valid reading, not an error.
#[async_trait]
pub trait TemperatureSource: Clone + Send + Sync + 'static {
    /// The fixed set of points this source can read
    fn catalog(&self) -> &Catalog;

    /// Read one point by name
    async fn read(&self, point: &str) -> Result<Reading, SensorError>;

    /// Read several points. Unknown names fail before any I/O.
    async fn read_all(&self, points: &[PointId]) -> Result<Snapshot, SensorError> {
        for point in points {
            self.catalog().get(point.as_str())?;
        }
        let mut snapshot = Snapshot::new();
        for point in points {
            let reading = self.read(point.as_str()).await?;
            snapshot.insert(reading.point.clone(), reading);
        }
        Ok(snapshot)
    }
}
