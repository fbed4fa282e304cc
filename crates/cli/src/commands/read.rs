// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Temperature readout and recording

use crate::context::Context;
use crate::error::CliError;
use crate::output::{print_list, OutputFormat};
use clap::Args;
use gl7_adapters::protocol;
use gl7_adapters::TemperatureSource;
use gl7_core::{Catalog, PointId, Reading, Snapshot};
use gl7_engine::AbortSignal;
use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

#[derive(Args)]
pub struct ReadArgs {
    /// Points to read, e.g. "3He Head" (default: every point)
    pub points: Vec<String>,

    /// Read an input or scanner channel directly (A-D, D1-D5), bypassing the catalog
    #[arg(long = "channel", value_name = "CH", conflicts_with_all = ["points", "watch"])]
    pub channels: Vec<String>,

    /// Keep reading every INTERVAL (e.g. "10s") until Ctrl-C
    #[arg(long, value_name = "INTERVAL", value_parser = humantime::parse_duration)]
    pub watch: Option<Duration>,
}

/// Resolve point names against the catalog; none means all
pub fn resolve_points(catalog: &Catalog, names: &[String]) -> Result<Vec<PointId>, CliError> {
    if names.is_empty() {
        return Ok(catalog.ids());
    }
    catalog
        .resolve(names)
        .map_err(|e| CliError::unknown_point(e, catalog))
}

pub fn resolve_channels(names: &[String]) -> Result<Vec<String>, CliError> {
    names
        .iter()
        .map(|name| protocol::input_channel(name).ok_or_else(|| CliError::unknown_channel(name)))
        .collect()
}

fn check_interval(every: Duration) -> Result<Duration, CliError> {
    if every.is_zero() {
        return Err(CliError::new("--watch interval must be non-zero")
            .with_suggestion("for example: gl7 read --watch 10s"));
    }
    Ok(every)
}

pub async fn handle(args: ReadArgs, ctx: Context) -> anyhow::Result<ExitCode> {
    if !args.channels.is_empty() {
        let channels = resolve_channels(&args.channels)?;
        let instrument = ctx.open_instrument()?;
        let mut readings = Vec::with_capacity(channels.len());
        for channel in &channels {
            readings.push(instrument.source.inner().read_channel(channel).await?);
        }
        print_list(&readings, ctx.format);
        return Ok(ExitCode::SUCCESS);
    }

    let points = resolve_points(&Catalog::gl7(), &args.points)?;
    let watch = args.watch.map(check_interval).transpose()?;
    let instrument = ctx.open_instrument()?;

    if let Some(every) = watch {
        let abort = AbortSignal::new();
        let handler = abort.clone();
        ctrlc::set_handler(move || handler.abort())?;

        let mut stdout = std::io::stdout();
        let written = record(&instrument.source, &points, every, &abort, ctx.format, &mut stdout).await?;
        tracing::info!(snapshots = written, "recording stopped");
        return Ok(ExitCode::SUCCESS);
    }

    let snapshot = instrument.source.read_all(&points).await?;
    let readings: Vec<Reading> = points
        .iter()
        .filter_map(|id| snapshot.get(id).cloned())
        .collect();
    print_list(&readings, ctx.format);
    Ok(ExitCode::SUCCESS)
}

/// Read `points` every `every` until `abort` is raised, writing one
/// snapshot per tick: a JSON object per line, or a block of text.
///
/// A failed read skips that tick; recording carries on. Returns the
/// number of snapshots written.
pub async fn record<S: TemperatureSource, W: Write>(
    source: &S,
    points: &[PointId],
    every: Duration,
    abort: &AbortSignal,
    format: OutputFormat,
    out: &mut W,
) -> std::io::Result<u64> {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut written = 0;

    loop {
        tokio::select! {
            biased;
            _ = abort.aborted() => break,
            _ = ticker.tick() => {}
        }
        match source.read_all(points).await {
            Ok(snapshot) => {
                write_snapshot(out, points, &snapshot, format)?;
                written += 1;
            }
            Err(e) => tracing::warn!(error = %e, "snapshot skipped"),
        }
    }
    Ok(written)
}

fn write_snapshot<W: Write>(
    out: &mut W,
    points: &[PointId],
    snapshot: &Snapshot,
    format: OutputFormat,
) -> std::io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, snapshot)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            for reading in points.iter().filter_map(|id| snapshot.get(id)) {
                writeln!(out, "{}", reading)?;
            }
            writeln!(out)?;
        }
    }
    out.flush()
}

#[cfg(test)]
#[path = "read_tests.rs"]
mod tests;
