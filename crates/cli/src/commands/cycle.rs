// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cycle commands

use crate::context::Context;
use crate::error::CliError;
use crate::output::{print, print_list, OutputFormat};
use clap::{Args, Subcommand};
use gl7_core::config::MaxWaits;
use gl7_core::{CycleConfig, PhaseKind};
use gl7_engine::{emergency_stop, AbortSignal, PhaseDef, PhaseSequencer};
use serde::Serialize;
use std::fmt;
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Exit code when a phase does not succeed
pub const PHASE_FAILED: u8 = 2;

#[derive(Args)]
pub struct CycleArgs {
    #[command(subcommand)]
    pub command: Option<CycleCommand>,

    /// Run a single phase, by name or index (see `gl7 cycle list`)
    #[arg(long)]
    pub phase: Option<String>,

    /// Wait budget for every phase, e.g. "90m"
    #[arg(long, value_parser = humantime::parse_duration)]
    pub max_wait: Option<Duration>,

    /// Interval between temperature polls, e.g. "5s"
    #[arg(long, value_parser = humantime::parse_duration)]
    pub poll: Option<Duration>,
}

#[derive(Subcommand)]
pub enum CycleCommand {
    /// List the phases and what each one does
    List,
}

#[derive(Serialize)]
struct PhaseInfo {
    index: usize,
    name: &'static str,
    description: &'static str,
    steps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unavailable: Option<String>,
}

impl PhaseInfo {
    fn new(kind: PhaseKind, cycle: &CycleConfig) -> Self {
        let (steps, unavailable) = match PhaseDef::build(kind, cycle) {
            Ok(def) => (def.to_string().lines().map(String::from).collect(), None),
            Err(e) => (Vec::new(), Some(e.to_string())),
        };
        Self {
            index: kind.index(),
            name: kind.name(),
            description: kind.description(),
            steps,
            unavailable,
        }
    }
}

impl fmt::Display for PhaseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {:<26} {}", self.index, self.name, self.description)?;
        for step in &self.steps {
            write!(f, "\n     - {}", step)?;
        }
        if let Some(reason) = &self.unavailable {
            write!(f, "\n     ! {}", reason)?;
        }
        Ok(())
    }
}

/// Ctrl-C handling: the first press aborts the run, the second stops the heaters
struct Interrupts {
    stop: Arc<Notify>,
}

impl Interrupts {
    fn install(abort: AbortSignal) -> anyhow::Result<Self> {
        let stop = Arc::new(Notify::new());
        let notify = Arc::clone(&stop);
        let presses = AtomicUsize::new(0);
        ctrlc::set_handler(move || {
            if presses.fetch_add(1, Ordering::SeqCst) == 0 {
                eprintln!("\ninterrupt: aborting at the next poll (Ctrl-C again stops the pump heaters)");
                abort.abort();
            } else {
                notify.notify_one();
            }
        })?;
        Ok(Self { stop })
    }

    async fn stop_requested(&self) {
        self.stop.notified().await
    }
}

fn apply_overrides(args: &CycleArgs, mut cycle: CycleConfig) -> Result<CycleConfig, CliError> {
    if let Some(max_wait) = args.max_wait {
        cycle.max_wait = max_wait;
        cycle.max_waits = MaxWaits::default();
    }
    if let Some(poll) = args.poll {
        cycle.poll_interval = poll;
    }
    cycle.validate().map_err(CliError::config)?;
    Ok(cycle)
}

pub async fn handle(args: CycleArgs, ctx: Context) -> anyhow::Result<ExitCode> {
    let cycle = apply_overrides(&args, ctx.config.cycle.clone())?;

    if let Some(CycleCommand::List) = args.command {
        let phases: Vec<PhaseInfo> = PhaseKind::ALL
            .into_iter()
            .map(|kind| PhaseInfo::new(kind, &cycle))
            .collect();
        print_list(&phases, ctx.format);
        return Ok(ExitCode::SUCCESS);
    }

    // Everything the operator typed is checked before the port opens
    let phase = args
        .phase
        .as_deref()
        .map(str::parse::<PhaseKind>)
        .transpose()
        .map_err(CliError::unknown_phase)?;

    let instrument = ctx.open_instrument()?;
    let abort = AbortSignal::new();
    let interrupts = Interrupts::install(abort.clone())?;
    if ctx.mode.is_dry_run() {
        eprintln!("dry-run: outputs will not be changed (pass --execute to send commands)");
    }

    let sequencer = PhaseSequencer::new(
        instrument.source,
        instrument.outputs.clone(),
        cycle,
        ctx.mode,
        abort,
    );

    let succeeded = tokio::select! {
        succeeded = run(&sequencer, phase, ctx.format) => succeeded,
        _ = interrupts.stop_requested() => {
            eprintln!("stopping pump heaters");
            let statuses = emergency_stop(&instrument.outputs).await?;
            for status in &statuses {
                eprintln!("  {}", status);
            }
            false
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(PHASE_FAILED)
    })
}

async fn run<S, C>(
    sequencer: &PhaseSequencer<S, C>,
    phase: Option<PhaseKind>,
    format: OutputFormat,
) -> bool
where
    S: gl7_adapters::TemperatureSource,
    C: gl7_adapters::OutputController,
{
    match phase {
        Some(kind) => {
            let result = sequencer.run_phase(kind).await;
            print(&result, format);
            result.is_success()
        }
        None => {
            let result = sequencer.run_full().await;
            print(&result, format);
            result.is_success()
        }
    }
}

#[cfg(test)]
#[path = "cycle_tests.rs"]
mod tests;
