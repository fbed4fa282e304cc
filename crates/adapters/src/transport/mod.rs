// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command/response transport to the instrument
//!
//! The link is a single exclusive resource: implementations must never
//! interleave two exchanges.

mod serial;

pub use serial::SerialTransport;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeTransport, TransportCall};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the transport
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to open {port}: {reason}")]
    Open { port: String, reason: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("timed out waiting for reply to {command}")]
    Timeout { command: String },
    #[error("no response to {command}")]
    NoResponse { command: String },
}

/// Adapter for the serial command/response exchange
#[async_trait]
pub trait Transport: Clone + Send + Sync + 'static {
    /// Write a command that produces no reply
    async fn send(&self, command: &str) -> Result<(), TransportError>;

    /// Write a query and read one reply line (trimmed)
    async fn query(&self, command: &str) -> Result<String, TransportError>;
}
