// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use gl7_core::OutputStatus;
use yare::parameterized;

#[parameterized(
    kelvin = { PointKind::Kelvin, "D2", "KRDG? D2" },
    resistance = { PointKind::Resistance, "A", "SRDG? A" },
    voltage = { PointKind::Voltage, "D5", "VRDG? D5" },
)]
fn reading_queries(kind: PointKind, channel: &str, expected: &str) {
    assert_eq!(reading_query(kind, channel), expected);
}

#[parameterized(
    plain = { "+4.2150", Measured::Value(4.215) },
    garbage = { "+4.2150`````````````", Measured::OverRange },
    nul = { "1\u{0}", Measured::OverRange },
    marker = { "T.OVER", Measured::OverRange },
    underscore = { "t_over", Measured::OverRange },
)]
fn kelvin_replies(reply: &str, expected: Measured) {
    assert_eq!(
        parse_reading("KRDG? B", reply, PointKind::Kelvin, false).unwrap(),
        expected
    );
}

#[test]
fn zero_on_scanner_channel_is_over_range() {
    assert_eq!(
        parse_reading("KRDG? D2", "+0.0000", PointKind::Kelvin, true).unwrap(),
        Measured::OverRange
    );
    assert_eq!(
        parse_reading("KRDG? B", "+0.0000", PointKind::Kelvin, false).unwrap(),
        Measured::Value(0.0)
    );
}

#[test]
fn markers_depend_on_reading_kind() {
    assert_eq!(
        parse_reading("SRDG? A", "R.OVER", PointKind::Resistance, false).unwrap(),
        Measured::OverRange
    );
    assert!(parse_reading("VRDG? D4", "R.X", PointKind::Voltage, false).is_err());
}

#[test]
fn empty_or_junk_reply_is_malformed() {
    let err = parse_reading("SRDG? A", "", PointKind::Resistance, false).unwrap_err();
    assert_eq!(err.command, "SRDG? A");
    assert!(parse_reading("SRDG? A", "hello", PointKind::Resistance, false).is_err());
}

#[parameterized(
    clear = { "0", false },
    temp_over = { "32", true },
    mixed = { "48", true },
    other_bits = { "16", false },
    junk = { "x", false },
)]
fn status_bits(reply: &str, over: bool) {
    assert_eq!(status_is_over_range(reply), over);
}

#[test]
fn output_commands_match_instrument_syntax() {
    assert_eq!(set_manual_output(OutputId::Heater1, 0.0), "MOUT 1,0.0");
    assert_eq!(set_manual_output(OutputId::Heater2, 37.5), "MOUT 2,37.5");
    assert_eq!(switch_on(OutputId::Switch3, 5.0), "ANALOG 3,1,1,5.0,0.0,0");
    assert_eq!(switch_off(OutputId::Switch4), "ANALOG 4,0");
    assert_eq!(
        configure(OutputId::Heater1, &OutputParams::open_loop()),
        "OUTMODE 1,3,0,0"
    );
    assert_eq!(
        configure(
            OutputId::Heater1,
            &OutputParams::HeaterSetup(HeaterSetup::recommended(OutputId::Heater1).unwrap())
        ),
        "HTRSET 1,2,0,0.1,1"
    );
    assert_eq!(configure(OutputId::Heater2, &OutputParams::Range(3)), "RANGE 2,3");
}

#[test]
fn status_queries_are_compound() {
    assert_eq!(
        join(&status_queries(OutputId::Heater1)),
        "MOUT? 1;OUTMODE? 1;RANGE? 1;HTRSET? 1;HTR? 1"
    );
    assert_eq!(join(&status_queries(OutputId::Switch4)), "ANALOG? 4;AOUT? 4");
}

#[test]
fn heater_status_parses() {
    let status = parse_status(
        OutputId::Heater2,
        "q",
        "+25.000;3,0,0;3;1,0,+1.732,1;+24.900",
    )
    .unwrap();
    match status {
        OutputStatus::Heater {
            manual_percent,
            mode,
            range,
            setup,
            output_percent,
            ..
        } => {
            assert_eq!(manual_percent, 25.0);
            assert_eq!(mode, OutputMode::OpenLoop);
            assert_eq!(range, 3);
            assert_eq!(setup.max_user_current, 1.732);
            assert_eq!(output_percent, 24.9);
        }
        other => panic!("expected heater status, got {:?}", other),
    }
}

#[test]
fn switch_status_parses() {
    let status = parse_status(OutputId::Switch3, "q", "1,1,+5.000,+0.000,0;+100.0").unwrap();
    assert!(status.is_energized());
    let status = parse_status(OutputId::Switch3, "q", "0,1,+5.000,+0.000,0;+0.0").unwrap();
    assert!(!status.is_energized());
}

#[test]
fn short_status_reply_is_malformed() {
    assert!(parse_status(OutputId::Heater1, "q", "+0.000;3,0,0").is_err());
    assert!(parse_status(OutputId::Switch4, "q", "1,1,+5.0").is_err());
}

#[parameterized(
    input = { "a", Some("A") },
    scanner = { " d5 ", Some("D5") },
    bare_number = { "5", None },
    past_scanner = { "D6", None },
    empty = { "", None },
)]
fn input_channels(name: &str, expected: Option<&str>) {
    assert_eq!(input_channel(name).as_deref(), expected);
}
