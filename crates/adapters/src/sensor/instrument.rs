// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Temperature source backed by the instrument

use super::{SensorError, TemperatureSource};
use crate::protocol::{self, Measured};
use crate::transport::Transport;
use async_trait::async_trait;
use gl7_core::calibration::{CalibrationError, CalibrationTable};
use gl7_core::config::CalibrationConfig;
use gl7_core::point::CalibrationRef;
use gl7_core::{
    Catalog, Clock, MeasurementPoint, PointId, PointKind, Reading, Snapshot, SystemClock,
    Temperature,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Calibration tables, loaded from disk on first use
#[derive(Debug, Default)]
pub struct CalibrationSet {
    paths: Option<CalibrationConfig>,
    tables: Mutex<HashMap<CalibrationRef, Arc<CalibrationTable>>>,
}

impl CalibrationSet {
    pub fn from_config(paths: CalibrationConfig) -> Self {
        Self {
            paths: Some(paths),
            tables: Mutex::new(HashMap::new()),
        }
    }

    /// Use an in-memory table instead of a file
    pub fn with_table(self, which: CalibrationRef, table: CalibrationTable) -> Self {
        self.tables
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(which, Arc::new(table));
        self
    }

    /// Failed loads are not cached, so a fixed file is picked up next time
    pub fn table(&self, which: CalibrationRef) -> Result<Arc<CalibrationTable>, CalibrationError> {
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(table) = tables.get(&which) {
            return Ok(Arc::clone(table));
        }
        let paths = self.paths.clone().unwrap_or_default();
        let path = paths.path(which);
        let table = Arc::new(CalibrationTable::load(path)?);
        tracing::info!(table = %which, path = %path.display(), points = table.len(), "calibration loaded");
        tables.insert(which, Arc::clone(&table));
        Ok(table)
    }
}

/// Reads catalog points through a [`Transport`], one round-trip per point
#[derive(Clone)]
pub struct InstrumentTemperatureSource<T, C = SystemClock> {
    transport: T,
    catalog: Arc<Catalog>,
    calibrations: Arc<CalibrationSet>,
    clock: C,
}

impl<T: Transport> InstrumentTemperatureSource<T, SystemClock> {
    pub fn new(transport: T, catalog: Catalog, calibrations: CalibrationSet) -> Self {
        Self::with_clock(transport, catalog, calibrations, SystemClock)
    }
}

impl<T: Transport, C: Clock> InstrumentTemperatureSource<T, C> {
    pub fn with_clock(
        transport: T,
        catalog: Catalog,
        calibrations: CalibrationSet,
        clock: C,
    ) -> Self {
        Self {
            transport,
            catalog: Arc::new(catalog),
            calibrations: Arc::new(calibrations),
            clock,
        }
    }

    /// Instrument identification string (*IDN?)
    pub async fn identify(&self) -> Result<String, crate::TransportError> {
        self.transport.query(&protocol::identify()).await
    }

    /// Kelvin reading of any input or scanner channel, catalog or not.
    /// The status check and over-range rules match catalog points.
    pub async fn read_channel(&self, channel: &str) -> Result<Reading, SensorError> {
        let channel = protocol::input_channel(channel)
            .ok_or_else(|| SensorError::UnknownChannel(channel.to_string()))?;
        let point = MeasurementPoint::kelvin(&format!("Input {}", channel), &channel);
        self.read_point(&point).await
    }

    async fn read_point(&self, point: &MeasurementPoint) -> Result<Reading, SensorError> {
        let (raw, temperature) = match point.kind {
            PointKind::Kelvin => (None, self.read_kelvin(point).await?),
            PointKind::Resistance | PointKind::Voltage => self.read_calibrated(point).await?,
        };
        Ok(Reading::new(
            point.id.clone(),
            raw,
            temperature,
            self.clock.now(),
        ))
    }

    /// RDGST? and KRDG? in one exchange; a status over-range bit wins
    async fn read_kelvin(&self, point: &MeasurementPoint) -> Result<Temperature, SensorError> {
        let reading_cmd = protocol::reading_query(PointKind::Kelvin, &point.channel);
        let command = protocol::join(&[protocol::status_query(&point.channel), reading_cmd.clone()]);
        let reply = self
            .transport
            .query(&command)
            .await
            .map_err(|e| SensorError::read(&point.id, e))?;

        let parts = protocol::split(&reply);
        let [status, value] = *parts.as_slice() else {
            return Err(SensorError::read(
                &point.id,
                protocol::ReplyError {
                    command,
                    reply: reply.clone(),
                },
            ));
        };
        if protocol::status_is_over_range(status) {
            return Ok(Temperature::OverRange);
        }
        let measured = protocol::parse_reading(
            &reading_cmd,
            value,
            PointKind::Kelvin,
            point.is_scanner_channel(),
        )
        .map_err(|e| SensorError::read(&point.id, e))?;
        Ok(match measured {
            Measured::Value(k) => Temperature::Kelvin(k),
            Measured::OverRange => Temperature::OverRange,
        })
    }

    /// Raw sensor value plus calibration; values outside the table are over-range
    async fn read_calibrated(
        &self,
        point: &MeasurementPoint,
    ) -> Result<(Option<f64>, Temperature), SensorError> {
        let command = protocol::reading_query(point.kind, &point.channel);
        let reply = self
            .transport
            .query(&command)
            .await
            .map_err(|e| SensorError::read(&point.id, e))?;
        let measured = protocol::parse_reading(&command, &reply, point.kind, false)
            .map_err(|e| SensorError::read(&point.id, e))?;

        let raw = match measured {
            Measured::OverRange => return Ok((None, Temperature::OverRange)),
            // No valid sensor value; nothing to calibrate
            Measured::Value(raw) if raw <= 0.0 => return Ok((Some(raw), Temperature::OverRange)),
            Measured::Value(raw) => raw,
        };

        let Some(which) = point.calibration else {
            return Err(SensorError::read(&point.id, "no calibration table for point"));
        };
        let table = self
            .calibrations
            .table(which)
            .map_err(|e| SensorError::read(&point.id, format!("calibration unavailable: {}", e)))?;
        let temperature = table
            .lookup(raw)
            .map_or(Temperature::OverRange, Temperature::Kelvin);
        Ok((Some(raw), temperature))
    }
}

#[async_trait]
impl<T: Transport, C: Clock> TemperatureSource for InstrumentTemperatureSource<T, C> {
    fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    async fn read(&self, point: &str) -> Result<Reading, SensorError> {
        let point = self.catalog.get(point)?.clone();
        self.read_point(&point).await
    }

    /// Points sharing an input and reading kind cost one exchange
    async fn read_all(&self, points: &[PointId]) -> Result<Snapshot, SensorError> {
        let resolved = points
            .iter()
            .map(|id| self.catalog.get(id.as_str()).cloned())
            .collect::<Result<Vec<_>, _>>()?;

        let mut by_input: HashMap<(String, PointKind), Reading> = HashMap::new();
        let mut snapshot = Snapshot::new();
        for point in resolved {
            let key = (point.channel.clone(), point.kind);
            let reading = match by_input.get(&key) {
                Some(shared) => Reading {
                    point: point.id.clone(),
                    ..shared.clone()
                },
                None => {
                    let reading = self.read_point(&point).await?;
                    by_input.insert(key, reading.clone());
                    reading
                }
            };
            snapshot.insert(point.id.clone(), reading);
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
#[path = "instrument_tests.rs"]
mod tests;
