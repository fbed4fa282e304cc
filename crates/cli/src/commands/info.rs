// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instrument identification

use crate::context::Context;
use crate::output::print;
use serde::Serialize;
use std::fmt;
use std::process::ExitCode;

#[derive(Serialize)]
struct InstrumentInfo {
    port: String,
    identity: String,
    mode: &'static str,
}

impl fmt::Display for InstrumentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "port:     {}", self.port)?;
        writeln!(f, "identity: {}", self.identity)?;
        writeln!(f, "mode:     {}", self.mode)
    }
}

pub async fn handle(ctx: Context) -> anyhow::Result<ExitCode> {
    let instrument = ctx.open_instrument()?;
    let identity = instrument.source.inner().identify().await?;

    let info = InstrumentInfo {
        port: instrument.port,
        identity,
        mode: if ctx.mode.is_dry_run() {
            "dry-run"
        } else {
            "execute"
        },
    };
    print(&info, ctx.format);
    Ok(ExitCode::SUCCESS)
}
