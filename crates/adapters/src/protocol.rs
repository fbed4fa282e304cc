// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lakeshore 350 command vocabulary and reply parsing
//!
//! Only this module knows the command syntax. Several queries can share
//! one round-trip by joining them with `;`; the replies come back in the
//! same order, also `;`-separated.

use gl7_core::{AnalogConfig, HeaterSetup, OutputId, OutputMode, OutputParams, PointKind};
use thiserror::Error;

/// RDGST? bit for temperature over-range
const STATUS_TEMP_OVER: u32 = 32;
/// Replies longer than this are line noise from an over-range input
const MAX_NUMERIC_REPLY: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed reply to {command}: {reply:?}")]
pub struct ReplyError {
    pub command: String,
    pub reply: String,
}

impl ReplyError {
    fn new(command: &str, reply: &str) -> Self {
        Self {
            command: command.to_string(),
            reply: reply.to_string(),
        }
    }
}

/// A parsed numeric reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measured {
    Value(f64),
    OverRange,
}

/// Commands use the shortest float text that round-trips ("0.0", "1.732")
fn num(value: f64) -> String {
    format!("{:?}", value)
}

pub fn join(queries: &[String]) -> String {
    queries.join(";")
}

pub fn split(reply: &str) -> Vec<&str> {
    reply.split(';').map(str::trim).collect()
}

// --- input queries ---------------------------------------------------------

pub fn reading_query(kind: PointKind, channel: &str) -> String {
    match kind {
        PointKind::Kelvin => format!("KRDG? {}", channel),
        PointKind::Resistance => format!("SRDG? {}", channel),
        PointKind::Voltage => format!("VRDG? {}", channel),
    }
}

pub fn status_query(channel: &str) -> String {
    format!("RDGST? {}", channel)
}

/// Canonical name of a sensor input (`A`-`D`) or scanner channel
/// (`D1`-`D5`), or `None` if the instrument has no such input
pub fn input_channel(name: &str) -> Option<String> {
    let name = name.trim().to_ascii_uppercase();
    match name.as_str() {
        "A" | "B" | "C" | "D" | "D1" | "D2" | "D3" | "D4" | "D5" => Some(name),
        _ => None,
    }
}

pub fn identify() -> String {
    "*IDN?".to_string()
}

/// Parse a reading reply. Over-range shows up as garbage, as marker text,
/// or (for Kelvin points on scanner channels) as an exact 0.0.
pub fn parse_reading(
    command: &str,
    reply: &str,
    kind: PointKind,
    scanner_channel: bool,
) -> Result<Measured, ReplyError> {
    let reply = reply.trim();
    if reply.is_empty() {
        return Err(ReplyError::new(command, reply));
    }
    if reply.len() > MAX_NUMERIC_REPLY || reply.contains('`') || reply.contains('\0') {
        return Ok(Measured::OverRange);
    }
    if let Ok(value) = reply.parse::<f64>() {
        if !value.is_finite() {
            return Ok(Measured::OverRange);
        }
        if kind == PointKind::Kelvin && scanner_channel && value == 0.0 {
            return Ok(Measured::OverRange);
        }
        return Ok(Measured::Value(value));
    }
    let marker = match kind {
        PointKind::Kelvin => 'T',
        PointKind::Resistance => 'R',
        PointKind::Voltage => 'V',
    };
    let upper = reply.to_ascii_uppercase();
    let dotted = format!("{}.", marker);
    let underscored = format!("{}_", marker);
    if upper.contains("OVER") || upper.contains(&dotted) || upper.contains(&underscored) {
        return Ok(Measured::OverRange);
    }
    Err(ReplyError::new(command, reply))
}

/// True if an RDGST? reply flags temperature over-range. Unparseable
/// status is not treated as over-range; the reading itself decides.
pub fn status_is_over_range(reply: &str) -> bool {
    reply
        .trim()
        .parse::<u32>()
        .map(|code| code & STATUS_TEMP_OVER != 0)
        .unwrap_or(false)
}

// --- output commands -------------------------------------------------------

pub fn set_manual_output(output: OutputId, percent: f64) -> String {
    format!("MOUT {},{}", output.number(), num(percent))
}

pub fn switch_on(output: OutputId, volts: f64) -> String {
    configure(output, &OutputParams::Analog(AnalogConfig::switch_on(volts)))
}

pub fn switch_off(output: OutputId) -> String {
    format!("ANALOG {},0", output.number())
}

pub fn configure(output: OutputId, params: &OutputParams) -> String {
    let n = output.number();
    match params {
        OutputParams::Mode {
            mode,
            input,
            powerup_enable,
        } => format!(
            "OUTMODE {},{},{},{}",
            n,
            mode.code(),
            input,
            u8::from(*powerup_enable)
        ),
        OutputParams::Range(range) => format!("RANGE {},{}", n, range),
        OutputParams::HeaterSetup(setup) => format!(
            "HTRSET {},{},{},{},{}",
            n,
            setup.resistance,
            setup.max_current,
            num(setup.max_user_current),
            setup.display
        ),
        OutputParams::Analog(analog) => format!(
            "ANALOG {},{},{},{},{},{}",
            n,
            analog.input,
            analog.units,
            num(analog.high),
            num(analog.low),
            u8::from(analog.bipolar)
        ),
    }
}

/// One compound query that reads back everything about an output
pub fn status_queries(output: OutputId) -> Vec<String> {
    let n = output.number();
    if output.is_heater() {
        vec![
            format!("MOUT? {}", n),
            format!("OUTMODE? {}", n),
            format!("RANGE? {}", n),
            format!("HTRSET? {}", n),
            format!("HTR? {}", n),
        ]
    } else {
        vec![format!("ANALOG? {}", n), format!("AOUT? {}", n)]
    }
}

// --- reply parsing ---------------------------------------------------------

fn field<T: std::str::FromStr>(parts: &[&str], i: usize) -> Option<T> {
    parts.get(i)?.trim().parse().ok()
}

fn fields(reply: &str) -> Vec<&str> {
    reply.split(',').map(str::trim).collect()
}

/// Parse the replies to `status_queries(output)`
pub fn parse_status(
    output: OutputId,
    command: &str,
    reply: &str,
) -> Result<gl7_core::OutputStatus, ReplyError> {
    let bad = || ReplyError::new(command, reply);
    let parts = split(reply);

    if output.is_heater() {
        let [mout, outmode, range, htrset, htr] = *parts.as_slice() else {
            return Err(bad());
        };
        let mode = fields(outmode);
        let setup = fields(htrset);
        Ok(gl7_core::OutputStatus::Heater {
            output,
            manual_percent: field(&[mout], 0).ok_or_else(bad)?,
            mode: field::<u8>(&mode, 0)
                .and_then(OutputMode::from_code)
                .ok_or_else(bad)?,
            input: field(&mode, 1).ok_or_else(bad)?,
            range: field(&[range], 0).ok_or_else(bad)?,
            setup: HeaterSetup {
                resistance: field(&setup, 0).ok_or_else(bad)?,
                max_current: field(&setup, 1).ok_or_else(bad)?,
                max_user_current: field(&setup, 2).ok_or_else(bad)?,
                display: field(&setup, 3).ok_or_else(bad)?,
            },
            output_percent: field(&[htr], 0).ok_or_else(bad)?,
        })
    } else {
        let [analog, aout] = *parts.as_slice() else {
            return Err(bad());
        };
        let analog = fields(analog);
        Ok(gl7_core::OutputStatus::Switch {
            output,
            analog: AnalogConfig {
                input: field(&analog, 0).ok_or_else(bad)?,
                units: field(&analog, 1).ok_or_else(bad)?,
                high: field(&analog, 2).ok_or_else(bad)?,
                low: field(&analog, 3).ok_or_else(bad)?,
                bipolar: field::<u8>(&analog, 4).ok_or_else(bad)? != 0,
            },
            output_percent: field(&[aout], 0).ok_or_else(bad)?,
        })
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
