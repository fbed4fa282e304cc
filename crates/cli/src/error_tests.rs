// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use gl7_core::OutputId;

#[test]
fn error_display() {
    let err = CliError::new("Something went wrong")
        .with_context("First context")
        .with_context("Second context")
        .with_suggestion("Try this")
        .with_suggestion("Or this");

    let output = format!("{}", err);
    assert!(output.contains("error: Something went wrong"));
    assert!(output.contains("-> First context"));
    assert!(output.contains("-> Second context"));
    assert!(output.contains("1. Try this"));
    assert!(output.contains("2. Or this"));
}

#[test]
fn no_port_lists_detected_ports() {
    let err = CliError::no_port(&["/dev/ttyUSB0".to_string()]);
    let output = err.to_string();
    assert!(output.contains("no serial port configured"));
    assert!(output.contains("/dev/ttyUSB0"));
    assert!(output.contains("GL7_PORT"));
}

#[test]
fn unknown_point_lists_catalog() {
    let catalog = Catalog::gl7();
    let err = CliError::unknown_point(CatalogError::UnknownPoint("1K Pot".into()), &catalog);
    let output = err.to_string();
    assert!(output.contains("unknown measurement point: 1K Pot"));
    assert!(output.contains("3He Head"));
}

#[test]
fn invalid_output_says_nothing_was_sent() {
    let err = OutputId::Heater1.validate_power(150.0).unwrap_err();
    let output = CliError::invalid_output(err).to_string();
    assert!(output.contains("heater1"));
    assert!(output.contains("nothing was sent"));
}
