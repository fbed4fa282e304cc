// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake temperature source for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{SensorError, TemperatureSource};
use async_trait::async_trait;
use gl7_core::{Catalog, Clock, FakeClock, PointId, Reading, Temperature};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Recorded sensor call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorCall {
    Read { point: PointId },
}

#[derive(Default)]
struct FakeSensorState {
    /// The nth read of a point returns trace[n], repeating the last value
    traces: HashMap<PointId, Vec<Temperature>>,
    reads: HashMap<PointId, usize>,
    failing: HashSet<PointId>,
    calls: Vec<SensorCall>,
}

/// Fake temperature source driven by per-point traces.
/// Points without a trace read as over-range.
#[derive(Clone)]
pub struct FakeTemperatureSource {
    catalog: Arc<Catalog>,
    clock: FakeClock,
    inner: Arc<Mutex<FakeSensorState>>,
}

impl Default for FakeTemperatureSource {
    fn default() -> Self {
        Self::new(Catalog::gl7())
    }
}

impl FakeTemperatureSource {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            clock: FakeClock::new(),
            inner: Arc::new(Mutex::new(FakeSensorState::default())),
        }
    }

    fn id(&self, point: &str) -> PointId {
        self.catalog
            .get(point)
            .map(|p| p.id.clone())
            .unwrap_or_else(|_| PointId::from(point))
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeSensorState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Hold a point at a fixed temperature
    pub fn set_temperature(&self, point: &str, kelvin: f64) {
        self.set_trace(point, vec![Temperature::Kelvin(kelvin)]);
    }

    pub fn set_over_range(&self, point: &str) {
        self.set_trace(point, vec![Temperature::OverRange]);
    }

    /// Replace a point's trace and restart it from the beginning
    pub fn set_trace(&self, point: &str, trace: Vec<Temperature>) {
        let id = self.id(point);
        let mut state = self.state();
        state.reads.remove(&id);
        state.traces.insert(id, trace);
    }

    /// Trace starting at `start` K and moving `step` K per read
    pub fn set_ramp(&self, point: &str, start: f64, step: f64, reads: usize) {
        let trace = (0..reads)
            .map(|i| Temperature::Kelvin(start + step * i as f64))
            .collect();
        self.set_trace(point, trace);
    }

    /// Make reads of a point fail
    pub fn fail(&self, point: &str) {
        let id = self.id(point);
        self.state().failing.insert(id);
    }

    pub fn recover(&self, point: &str) {
        let id = self.id(point);
        self.state().failing.remove(&id);
    }

    pub fn read_count(&self, point: &str) -> usize {
        let id = self.id(point);
        self.state()
            .reads
            .get(&id)
            .copied()
            .unwrap_or(0)
    }

    pub fn clock(&self) -> &FakeClock {
        &self.clock
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<SensorCall> {
        self.state().calls.clone()
    }
}

#[async_trait]
impl TemperatureSource for FakeTemperatureSource {
    fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    async fn read(&self, point: &str) -> Result<Reading, SensorError> {
        let id = self.catalog.get(point)?.id.clone();
        let mut state = self.state();
        state.calls.push(SensorCall::Read { point: id.clone() });

        if state.failing.contains(&id) {
            return Err(SensorError::read(&id, "simulated sensor failure"));
        }

        let n = state.reads.entry(id.clone()).or_insert(0);
        let index = *n;
        *n += 1;

        let temperature = state
            .traces
            .get(&id)
            .and_then(|trace| trace.get(index).or_else(|| trace.last()))
            .copied()
            .unwrap_or(Temperature::OverRange);

        Ok(Reading::new(id, None, temperature, self.clock.now()))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
