// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gl7 - GL7 sorption cooler cycle control

mod commands;
mod completions;
mod context;
mod error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{cycle, info, output as output_cmd, read};
use completions::{generate_completions, CompletionsArgs};
use context::Context;
use error::CliError;
use gl7_core::{Config, ExecutionMode};
use output::OutputFormat;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "gl7",
    version,
    about = "GL7 sorption cooler cool-down control over a Lakeshore 350"
)]
struct Cli {
    /// Config file (default: ./gl7.toml if present)
    #[arg(long, global = true, env = "GL7_CONFIG")]
    config: Option<PathBuf>,

    /// Serial port of the temperature controller
    #[arg(long, global = true, env = "GL7_PORT")]
    port: Option<String>,

    /// Send commands to the instrument (default is a dry run)
    #[arg(long, global = true)]
    execute: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the cool-down cycle, or one phase of it
    Cycle(cycle::CycleArgs),
    /// Read temperatures
    Read(read::ReadArgs),
    /// Query or drive heaters and heat switches
    Output(output_cmd::OutputArgs),
    /// Identify the instrument
    Info,
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    // Usage errors share exit code 1 with every other operator error
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<CliError>() {
                Some(err) => eprint!("{}", err),
                None => eprintln!("error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    if let Commands::Completions(args) = cli.command {
        generate_completions::<Cli>(args.shell);
        return Ok(ExitCode::SUCCESS);
    }

    let cwd = std::env::current_dir()?;
    let config = Config::discover(cli.config.as_deref(), &cwd).map_err(CliError::config)?;
    let _guard = setup_logging(cli.verbose, config.log.file.as_deref())?;

    let ctx = Context {
        config,
        port: cli.port,
        mode: if cli.execute {
            ExecutionMode::Execute
        } else {
            ExecutionMode::DryRun
        },
        format: cli.format,
    };

    match cli.command {
        Commands::Cycle(args) => cycle::handle(args, ctx).await,
        Commands::Read(args) => read::handle(args, ctx).await,
        Commands::Output(args) => output_cmd::handle(args, ctx).await,
        Commands::Info => info::handle(ctx).await,
        Commands::Completions(_) => Ok(ExitCode::SUCCESS),
    }
}

/// Log to stderr, and to a file as well when one is configured.
/// The returned guard flushes the file writer on drop.
fn setup_logging(
    verbose: u8,
    file: Option<&Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("log file has no name: {}", path.display()))?;
            std::fs::create_dir_all(dir)?;

            let file_appender = tracing_appender::rolling::never(dir, name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (
                Some(fmt::layer().with_writer(non_blocking).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}
