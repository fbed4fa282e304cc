// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn over_range_power_is_rejected_before_opening_port() {
    let err = validate(
        &OutputCommand::Set {
            output: OutputId::Heater1,
            percent: 150.0,
        },
        5.0,
    )
    .unwrap_err();
    assert!(err.message.contains("heater1"));
}

#[test]
fn power_on_a_switch_is_rejected() {
    let cmd = OutputCommand::Set {
        output: OutputId::Switch3,
        percent: 10.0,
    };
    assert!(validate(&cmd, 5.0).is_err());
}

#[test]
fn heaters_cannot_be_switched_on() {
    let err = validate(
        &OutputCommand::On {
            output: OutputId::Heater2,
        },
        5.0,
    )
    .unwrap_err();
    assert!(err.to_string().contains("output set heater2"));
}

#[test]
fn read_only_and_off_commands_pass() {
    for cmd in [
        OutputCommand::Query { output: None },
        OutputCommand::Off {
            output: OutputId::Heater1,
        },
        OutputCommand::Stop,
        OutputCommand::On {
            output: OutputId::Switch4,
        },
    ] {
        assert!(validate(&cmd, 5.0).is_ok());
    }
}
