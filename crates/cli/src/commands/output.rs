// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Heater and heat-switch commands

use crate::context::{Context, Instrument};
use crate::error::CliError;
use crate::output::print_list;
use clap::{Args, Subcommand};
use gl7_adapters::OutputController;
use gl7_core::OutputId;
use std::process::ExitCode;

#[derive(Args)]
pub struct OutputArgs {
    #[command(subcommand)]
    pub command: OutputCommand,
}

#[derive(Subcommand)]
pub enum OutputCommand {
    /// Show output state (default: all four outputs)
    Query {
        /// heater1|heater2|switch3|switch4, or 1-4
        output: Option<OutputId>,
    },
    /// Set a pump heater's manual output percent
    Set {
        output: OutputId,
        #[arg(allow_negative_numbers = true)]
        percent: f64,
    },
    /// Turn a heat switch on
    On { output: OutputId },
    /// Turn a heater or heat switch off
    Off { output: OutputId },
    /// Turn both pump heaters off now (always executes)
    Stop,
}

/// Reject a command before the port is opened if it can never succeed
pub fn validate(command: &OutputCommand, switch_volts: f64) -> Result<(), CliError> {
    match *command {
        OutputCommand::Set { output, percent } => output
            .validate_power(percent)
            .map_err(CliError::invalid_output),
        OutputCommand::On { output } if output.is_heater() => Err(CliError::new(format!(
            "{} cannot simply be turned on",
            output
        ))
        .with_context("a heater needs a power level")
        .with_suggestion(format!("gl7 --execute output set {} <PERCENT>", output))),
        OutputCommand::On { output } => output
            .validate_switch_volts(switch_volts)
            .map_err(CliError::invalid_output),
        OutputCommand::Query { .. } | OutputCommand::Off { .. } | OutputCommand::Stop => Ok(()),
    }
}

pub async fn handle(args: OutputArgs, ctx: Context) -> anyhow::Result<ExitCode> {
    validate(&args.command, ctx.config.cycle.switch_volts)?;
    let instrument = ctx.open_instrument()?;

    match args.command {
        OutputCommand::Query { output } => {
            let outputs = output.map_or_else(|| OutputId::ALL.to_vec(), |o| vec![o]);
            query(&instrument, &outputs, &ctx).await?;
        }
        OutputCommand::Set { output, percent } => {
            instrument
                .outputs
                .set_power(output, percent, ctx.mode)
                .await?;
            report(&instrument, output, &ctx).await?;
        }
        OutputCommand::On { output } => {
            instrument.outputs.set_enabled(output, true, ctx.mode).await?;
            report(&instrument, output, &ctx).await?;
        }
        OutputCommand::Off { output } => {
            instrument
                .outputs
                .set_enabled(output, false, ctx.mode)
                .await?;
            report(&instrument, output, &ctx).await?;
        }
        OutputCommand::Stop => {
            let statuses = gl7_engine::emergency_stop(&instrument.outputs).await?;
            print_list(&statuses, ctx.format);
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn query(instrument: &Instrument, outputs: &[OutputId], ctx: &Context) -> anyhow::Result<()> {
    let mut statuses = Vec::with_capacity(outputs.len());
    for &output in outputs {
        statuses.push(instrument.outputs.query(output).await?);
    }
    print_list(&statuses, ctx.format);
    Ok(())
}

/// Show the state after a mutation, or say nothing was sent
async fn report(instrument: &Instrument, output: OutputId, ctx: &Context) -> anyhow::Result<()> {
    if ctx.mode.is_dry_run() {
        eprintln!(
            "dry-run: {} not changed (pass --execute to send the command)",
            output
        );
        return Ok(());
    }
    query(instrument, &[output], ctx).await
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
