// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Emergency heater stop

use crate::SequenceError;
use gl7_adapters::OutputController;
use gl7_core::{ExecutionMode, OutputId, OutputStatus};

const HEATERS: [OutputId; 2] = [OutputId::Heater1, OutputId::Heater2];

/// Turn both pump heaters off and read them back.
///
/// Always executes, whatever mode the caller runs in. Every heater is
/// attempted even if an earlier one fails.
pub async fn emergency_stop<C: OutputController>(
    outputs: &C,
) -> Result<Vec<OutputStatus>, SequenceError> {
    tracing::warn!("emergency stop: turning pump heaters off");

    let mut failures = Vec::new();
    for heater in HEATERS {
        if let Err(e) = outputs
            .set_enabled(heater, false, ExecutionMode::Execute)
            .await
        {
            tracing::error!(%heater, error = %e, "heater off failed");
            failures.push(format!("{}: {}", heater, e));
        }
    }

    let mut statuses = Vec::with_capacity(HEATERS.len());
    for heater in HEATERS {
        match outputs.query(heater).await {
            Ok(status) => statuses.push(status),
            Err(e) => failures.push(format!("{} readback: {}", heater, e)),
        }
    }

    if failures.is_empty() {
        tracing::info!("pump heaters off");
        Ok(statuses)
    } else {
        Err(SequenceError::EmergencyStop(failures))
    }
}

#[cfg(test)]
#[path = "stop_tests.rs"]
mod tests;
