// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serial port transport for the Lakeshore 350

use super::{Transport, TransportError};
use async_trait::async_trait;
use gl7_core::SerialConfig;
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{ErrorKind, Read, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Longest reply accepted before giving up on a line terminator
const MAX_REPLY_LEN: usize = 256;

/// Serial transport. Clones share one port; each exchange holds the port
/// lock from write to end of reply.
#[derive(Clone)]
pub struct SerialTransport {
    port: Arc<Mutex<Box<dyn SerialPort>>>,
    name: String,
    settle: Duration,
    retries: u32,
}

impl SerialTransport {
    /// Open `port_name` at 7 data bits, odd parity, 1 stop bit
    pub fn open(port_name: &str, config: &SerialConfig) -> Result<Self, TransportError> {
        let port = serialport::new(port_name, config.baud)
            .data_bits(DataBits::Seven)
            .parity(Parity::Odd)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.timeout)
            .open()
            .map_err(|e| TransportError::Open {
                port: port_name.to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!(port = port_name, baud = config.baud, "serial port open");

        Ok(Self {
            port: Arc::new(Mutex::new(port)),
            name: port_name.to_string(),
            settle: config.settle,
            retries: config.retries,
        })
    }

    /// Names of serial ports present on this machine
    pub fn available_ports() -> Vec<String> {
        serialport::available_ports()
            .map(|ports| ports.into_iter().map(|p| p.port_name).collect())
            .unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run one exchange on a blocking thread while holding the port
    async fn exchange(
        &self,
        command: &str,
        expect_reply: bool,
    ) -> Result<Option<String>, TransportError> {
        let port = Arc::clone(&self.port);
        let command = command.to_string();
        let settle = self.settle;

        tokio::task::spawn_blocking(move || {
            let mut guard = port.lock().unwrap_or_else(|e| e.into_inner());
            exchange_blocking(&mut **guard, &command, expect_reply, settle)
        })
        .await
        .map_err(|e| TransportError::Io(std::io::Error::other(e)))?
    }
}

fn exchange_blocking(
    port: &mut dyn SerialPort,
    command: &str,
    expect_reply: bool,
    settle: Duration,
) -> Result<Option<String>, TransportError> {
    // Drop any stale bytes from an earlier timed-out exchange
    let _ = port.clear(ClearBuffer::Input);

    port.write_all(format!("{}\n", command).as_bytes())?;
    port.flush()?;
    std::thread::sleep(settle);

    if !expect_reply {
        return Ok(None);
    }

    let mut reply = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match port.read(&mut byte) {
            Ok(0) => break,
            Ok(_) if byte[0] == b'\n' => break,
            Ok(_) => {
                reply.push(byte[0]);
                if reply.len() >= MAX_REPLY_LEN {
                    break;
                }
            }
            Err(e) if e.kind() == ErrorKind::TimedOut => {
                if reply.is_empty() {
                    return Err(TransportError::Timeout {
                        command: command.to_string(),
                    });
                }
                break;
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(Some(String::from_utf8_lossy(&reply).trim().to_string()))
}

#[async_trait]
impl Transport for SerialTransport {
    async fn send(&self, command: &str) -> Result<(), TransportError> {
        self.exchange(command, false).await.map(|_| ())
    }

    async fn query(&self, command: &str) -> Result<String, TransportError> {
        let mut last_error = TransportError::NoResponse {
            command: command.to_string(),
        };

        for attempt in 0..=self.retries {
            match self.exchange(command, true).await {
                Ok(Some(reply)) if !reply.is_empty() => return Ok(reply),
                Ok(_) => {
                    last_error = TransportError::NoResponse {
                        command: command.to_string(),
                    }
                }
                Err(e @ TransportError::Timeout { .. }) => last_error = e,
                Err(e) => return Err(e),
            }
            if attempt < self.retries {
                tracing::warn!(command, attempt = attempt + 1, error = %last_error, "retrying");
            }
        }

        Err(last_error)
    }
}
