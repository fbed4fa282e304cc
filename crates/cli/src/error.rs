// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.
//!
//! Every error says what went wrong, why it might have happened, and how
//! to fix it.

use gl7_core::{Catalog, CatalogError, ConfigError, OutputError};
use std::fmt;

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct CliError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
    /// Original error if any
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CliError {
    /// Create a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    /// Add context about why this error might have happened.
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    /// Add a suggestion for how to fix this error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Set the source error that caused this error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Common error builders for typical failure scenarios.
impl CliError {
    /// No serial port from the command line, environment, or config
    pub fn no_port(available: &[String]) -> Self {
        let mut err = CliError::new("no serial port configured")
            .with_context("the temperature controller is reached over a serial port");
        if available.is_empty() {
            err = err.with_context("no serial ports were detected on this machine");
        } else {
            err = err.with_context(format!("detected ports: {}", available.join(", ")));
        }
        err.with_suggestion("pass the port explicitly: gl7 --port /dev/ttyUSB0 ...")
            .with_suggestion("or set GL7_PORT, or `port` under [serial] in gl7.toml")
    }

    pub fn port_open(port: &str, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        CliError::new(format!("cannot open serial port {}", port))
            .with_context(source.to_string())
            .with_suggestion("check the cable and that no other program holds the port")
            .with_suggestion("check that your user may access the device (e.g. the dialout group)")
            .with_source(source)
    }

    pub fn config(err: ConfigError) -> Self {
        CliError::new("invalid configuration")
            .with_context(err.to_string())
            .with_suggestion("fix the file, or run without --config to use built-in defaults")
            .with_source(err)
    }

    pub fn unknown_point(err: CatalogError, catalog: &Catalog) -> Self {
        let names: Vec<String> = catalog.ids().iter().map(ToString::to_string).collect();
        CliError::new(err.to_string())
            .with_context(format!("known points: {}", names.join(", ")))
            .with_suggestion("quote names with spaces: gl7 read \"3He Head\"")
            .with_source(err)
    }

    pub fn unknown_channel(name: &str) -> Self {
        CliError::new(format!("unknown input channel: {}", name))
            .with_context("the Lakeshore 350 has inputs A-D and scanner channels D1-D5")
            .with_suggestion("read catalog points by name instead: gl7 read \"4K Stage\"")
    }

    pub fn invalid_output(err: OutputError) -> Self {
        CliError::new(err.to_string())
            .with_context("nothing was sent to the instrument")
            .with_suggestion("heater power is a percentage from 0 to 100")
            .with_suggestion("heat switches are driven with: gl7 output on|off <switch3|switch4>")
            .with_source(err)
    }

    pub fn unknown_phase(reason: String) -> Self {
        CliError::new(reason)
            .with_suggestion("list phases with: gl7 cycle list")
            .with_suggestion("phases are given by name (precool) or index (2)")
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
