// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output controller backed by the instrument

use super::{heater_on_rejected, ControlError, OutputController};
use crate::protocol;
use crate::transport::Transport;
use async_trait::async_trait;
use gl7_core::{ExecutionMode, OutputId, OutputKind, OutputParams, OutputStatus};

/// Drives outputs through a [`Transport`]: one write per mutation, one
/// compound query per read-back
#[derive(Clone)]
pub struct InstrumentOutputController<T> {
    transport: T,
    switch_volts: f64,
}

impl<T: Transport> InstrumentOutputController<T> {
    pub fn new(transport: T, switch_volts: f64) -> Self {
        Self {
            transport,
            switch_volts,
        }
    }

    async fn write(
        &self,
        output: OutputId,
        command: String,
        mode: ExecutionMode,
    ) -> Result<(), ControlError> {
        if mode.is_dry_run() {
            tracing::info!(%output, command, "would send");
            return Ok(());
        }
        tracing::debug!(%output, command, "sending");
        self.transport.send(&command).await?;
        Ok(())
    }
}

#[async_trait]
impl<T: Transport> OutputController for InstrumentOutputController<T> {
    async fn set_power(
        &self,
        output: OutputId,
        percent: f64,
        mode: ExecutionMode,
    ) -> Result<(), ControlError> {
        output.validate_power(percent)?;
        self.write(output, protocol::set_manual_output(output, percent), mode)
            .await
    }

    async fn set_enabled(
        &self,
        output: OutputId,
        on: bool,
        mode: ExecutionMode,
    ) -> Result<(), ControlError> {
        let command = match (output.kind(), on) {
            (OutputKind::Heater, false) => protocol::set_manual_output(output, 0.0),
            (OutputKind::Heater, true) => return Err(heater_on_rejected(output).into()),
            (OutputKind::Switch, true) => {
                output.validate_switch_volts(self.switch_volts)?;
                protocol::switch_on(output, self.switch_volts)
            }
            (OutputKind::Switch, false) => protocol::switch_off(output),
        };
        self.write(output, command, mode).await
    }

    async fn configure(
        &self,
        output: OutputId,
        params: OutputParams,
        mode: ExecutionMode,
    ) -> Result<(), ControlError> {
        output.validate(&params)?;
        self.write(output, protocol::configure(output, &params), mode)
            .await
    }

    async fn query(&self, output: OutputId) -> Result<OutputStatus, ControlError> {
        let command = protocol::join(&protocol::status_queries(output));
        let reply = self.transport.query(&command).await?;
        Ok(protocol::parse_status(output, &command, &reply)?)
    }
}

#[cfg(test)]
#[path = "instrument_tests.rs"]
mod tests;
