// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::control::{ControlError, OutputController};
use crate::sensor::{SensorError, TemperatureSource};
use async_trait::async_trait;
use gl7_core::{
    Catalog, ExecutionMode, OutputId, OutputParams, OutputStatus, PointId, Reading, Snapshot,
};
use tracing::Instrument;

/// Wrapper that adds tracing to any TemperatureSource
#[derive(Clone)]
pub struct TracedTemperatureSource<S> {
    inner: S,
}

impl<S> TracedTemperatureSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: TemperatureSource> TemperatureSource for TracedTemperatureSource<S> {
    fn catalog(&self) -> &Catalog {
        self.inner.catalog()
    }

    async fn read(&self, point: &str) -> Result<Reading, SensorError> {
        let span = tracing::info_span!("sensor.read", point);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.read(point).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(reading) => tracing::debug!(
                    temperature = %reading.temperature,
                    raw = ?reading.raw,
                    elapsed_ms,
                    "read"
                ),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "read failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn read_all(&self, points: &[PointId]) -> Result<Snapshot, SensorError> {
        let span = tracing::info_span!("sensor.read_all", points = points.len());
        async {
            let start = std::time::Instant::now();
            let result = self.inner.read_all(points).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(snapshot) => tracing::debug!(read = snapshot.len(), elapsed_ms, "read all"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "read failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any OutputController
#[derive(Clone)]
pub struct TracedOutputController<C> {
    inner: C,
}

impl<C> TracedOutputController<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

fn log_mutation(result: &Result<(), ControlError>, elapsed: std::time::Duration) {
    let elapsed_ms = elapsed.as_millis() as u64;
    match result {
        Ok(()) => tracing::info!(elapsed_ms, "applied"),
        // Rejections never reach the instrument
        Err(e) if e.is_invalid_params() => tracing::warn!(error = %e, "rejected"),
        Err(e) => tracing::error!(elapsed_ms, error = %e, "failed"),
    }
}

#[async_trait]
impl<C: OutputController> OutputController for TracedOutputController<C> {
    async fn set_power(
        &self,
        output: OutputId,
        percent: f64,
        mode: ExecutionMode,
    ) -> Result<(), ControlError> {
        let span = tracing::info_span!(
            "output.set_power",
            %output,
            percent,
            dry_run = mode.is_dry_run()
        );
        async {
            let start = std::time::Instant::now();
            let result = self.inner.set_power(output, percent, mode).await;
            log_mutation(&result, start.elapsed());
            result
        }
        .instrument(span)
        .await
    }

    async fn set_enabled(
        &self,
        output: OutputId,
        on: bool,
        mode: ExecutionMode,
    ) -> Result<(), ControlError> {
        let span = tracing::info_span!(
            "output.set_enabled",
            %output,
            on,
            dry_run = mode.is_dry_run()
        );
        async {
            let start = std::time::Instant::now();
            let result = self.inner.set_enabled(output, on, mode).await;
            log_mutation(&result, start.elapsed());
            result
        }
        .instrument(span)
        .await
    }

    async fn configure(
        &self,
        output: OutputId,
        params: OutputParams,
        mode: ExecutionMode,
    ) -> Result<(), ControlError> {
        let span = tracing::info_span!(
            "output.configure",
            %output,
            ?params,
            dry_run = mode.is_dry_run()
        );
        async {
            let start = std::time::Instant::now();
            let result = self.inner.configure(output, params, mode).await;
            log_mutation(&result, start.elapsed());
            result
        }
        .instrument(span)
        .await
    }

    async fn query(&self, output: OutputId) -> Result<OutputStatus, ControlError> {
        let result = self.inner.query(output).await;
        tracing::trace!(%output, energized = ?result.as_ref().ok().map(|s| s.is_energized()), "queried");
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
