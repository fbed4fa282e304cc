// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI integration tests for help, phase listing, and completions

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(deprecated)]

mod common;

use common::{Project, POWERED_CONFIG};
use predicates::prelude::*;

#[test]
fn help_lists_commands() {
    Project::empty()
        .gl7()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("cycle"))
        .stdout(predicate::str::contains("read"))
        .stdout(predicate::str::contains("output"))
        .stdout(predicate::str::contains("--execute"));
}

#[test]
fn cycle_list_shows_every_phase_in_order() {
    let output = Project::empty()
        .gl7()
        .args(["cycle", "list"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();

    let names = [
        "1. initial-status",
        "2. precool",
        "3. heat-switch-verification",
        "4. pump-heating",
        "5. he4-pump-transition",
        "6. he3-pump-transition",
        "7. final-cooldown",
    ];
    let positions: Vec<usize> = names.iter().map(|n| text.find(n).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(text.contains("turn heater1 off"));
}

#[test]
fn cycle_list_explains_missing_pump_power() {
    Project::empty()
        .gl7()
        .args(["cycle", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cycle.he4_pump_power"));
}

#[test]
fn cycle_list_uses_config_file() {
    let project = Project::empty();
    project.file("gl7.toml", POWERED_CONFIG);

    project
        .gl7()
        .args(["cycle", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("set heater1 to 40.0%"))
        .stdout(predicate::str::contains("set heater2 to 30.0%"));
}

#[test]
fn cycle_list_as_json() {
    let output = Project::empty()
        .gl7()
        .args(["--format", "json", "cycle", "list"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let phases: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let phases = phases.as_array().unwrap();
    assert_eq!(phases.len(), 7);
    assert_eq!(phases[0]["name"], "initial-status");
    assert_eq!(phases[6]["index"], 7);
}

#[test]
fn completions_mention_binary() {
    Project::empty()
        .gl7()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gl7"));
}
