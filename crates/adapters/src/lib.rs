// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the temperature controller

pub mod control;
pub mod protocol;
pub mod sensor;
pub mod traced;
pub mod transport;

pub use control::{ControlError, InstrumentOutputController, OutputController};
pub use protocol::ReplyError;
pub use sensor::{InstrumentTemperatureSource, SensorError, TemperatureSource};
pub use traced::{TracedOutputController, TracedTemperatureSource};
pub use transport::{SerialTransport, Transport, TransportError};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use control::{ControlCall, FakeOutputController};
#[cfg(any(test, feature = "test-support"))]
pub use sensor::{FakeTemperatureSource, SensorCall};
#[cfg(any(test, feature = "test-support"))]
pub use transport::{FakeTransport, TransportCall};
