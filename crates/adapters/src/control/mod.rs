// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Heater and heat-switch control

mod instrument;

pub use instrument::InstrumentOutputController;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{ControlCall, FakeOutputController};

use crate::protocol::ReplyError;
use crate::transport::TransportError;
use async_trait::async_trait;
use gl7_core::{ExecutionMode, OutputError, OutputId, OutputParams, OutputStatus};
use thiserror::Error;

/// Errors from output control
#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    InvalidOutputParams(#[from] OutputError),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error(transparent)]
    MalformedReply(#[from] ReplyError),
}

impl ControlError {
    pub fn is_invalid_params(&self) -> bool {
        matches!(self, ControlError::InvalidOutputParams(_))
    }
}

/// Adapter for the four controllable outputs
///
/// Parameters are validated before anything is written. Every mutation
/// takes an [`ExecutionMode`]; in dry-run the command is logged instead
/// of sent. Nothing is cached: `query` always reads the instrument.
#[async_trait]
pub trait OutputController: Clone + Send + Sync + 'static {
    /// Set a heater's manual output percentage
    async fn set_power(
        &self,
        output: OutputId,
        percent: f64,
        mode: ExecutionMode,
    ) -> Result<(), ControlError>;

    /// Switch an output on or off. Heaters can only be switched off here.
    async fn set_enabled(
        &self,
        output: OutputId,
        on: bool,
        mode: ExecutionMode,
    ) -> Result<(), ControlError>;

    /// Apply one configuration change
    async fn configure(
        &self,
        output: OutputId,
        params: OutputParams,
        mode: ExecutionMode,
    ) -> Result<(), ControlError>;

    /// Read the output's state back from the instrument
    async fn query(&self, output: OutputId) -> Result<OutputStatus, ControlError>;
}

/// Heaters have no "on" without a power level
pub(crate) fn heater_on_rejected(output: OutputId) -> OutputError {
    OutputError::InvalidOutputParams {
        output,
        reason: "heaters are turned on with set_power".to_string(),
    }
}
