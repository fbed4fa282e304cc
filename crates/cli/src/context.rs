// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Global options and instrument wiring shared by every command

use crate::error::CliError;
use crate::output::OutputFormat;
use gl7_adapters::sensor::CalibrationSet;
use gl7_adapters::{
    InstrumentOutputController, InstrumentTemperatureSource, SerialTransport,
    TracedOutputController, TracedTemperatureSource,
};
use gl7_core::{Catalog, Config, ExecutionMode};

pub type Source = TracedTemperatureSource<InstrumentTemperatureSource<SerialTransport>>;
pub type Outputs = TracedOutputController<InstrumentOutputController<SerialTransport>>;

/// The temperature controller, opened on one serial port
pub struct Instrument {
    pub port: String,
    pub source: Source,
    pub outputs: Outputs,
}

pub struct Context {
    pub config: Config,
    /// `--port` / `GL7_PORT`, taking precedence over the config file
    pub port: Option<String>,
    pub mode: ExecutionMode,
    pub format: OutputFormat,
}

impl Context {
    pub fn port(&self) -> Result<String, CliError> {
        self.port
            .clone()
            .or_else(|| self.config.serial.port.clone())
            .ok_or_else(|| CliError::no_port(&SerialTransport::available_ports()))
    }

    /// Open the serial port and build traced adapters over it.
    /// Sensor reads and output commands share one transport.
    pub fn open_instrument(&self) -> Result<Instrument, CliError> {
        let port = self.port()?;
        let transport = SerialTransport::open(&port, &self.config.serial)
            .map_err(|e| CliError::port_open(&port, e))?;
        tracing::info!(port = %port, "opened instrument");

        let calibrations = CalibrationSet::from_config(self.config.calibration.clone());
        let source = InstrumentTemperatureSource::new(transport.clone(), Catalog::gl7(), calibrations);
        let outputs = InstrumentOutputController::new(transport, self.config.cycle.switch_volts);

        Ok(Instrument {
            port,
            source: TracedTemperatureSource::new(source),
            outputs: TracedOutputController::new(outputs),
        })
    }
}
