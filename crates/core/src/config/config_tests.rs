// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;

#[test]
fn empty_config_uses_defaults() {
    let config = Config::from_toml_str("", "inline").unwrap();
    assert_eq!(config.serial.baud, 57_600);
    assert_eq!(config.serial.timeout, Duration::from_secs(2));
    assert_eq!(config.serial.settle, Duration::from_millis(300));
    assert_eq!(config.cycle.precool_k, 10.0);
    assert_eq!(config.cycle.running_k, 0.3);
    assert_eq!(config.cycle.he4_pump_power, None);
    assert_eq!(config.cycle.switch_volts, 5.0);
}

#[test]
fn durations_parse_with_units() {
    let text = r#"
        [cycle]
        poll_interval = "500ms"
        max_wait = "3h"

        [cycle.max_waits]
        precool = "6h"
    "#;
    let config = Config::from_toml_str(text, "inline").unwrap();
    assert_eq!(config.cycle.poll_interval, Duration::from_millis(500));
    assert_eq!(
        config.cycle.max_wait_for(PhaseKind::Precool),
        Duration::from_secs(6 * 3600)
    );
    assert_eq!(
        config.cycle.max_wait_for(PhaseKind::PumpHeating),
        Duration::from_secs(3 * 3600)
    );
}

#[test]
fn unknown_fields_are_rejected() {
    let err = Config::from_toml_str("[serial]\nparity = \"even\"\n", "inline").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn out_of_range_heater_power_is_invalid() {
    let err = Config::from_toml_str("[cycle]\nhe4_pump_power = 150.0\n", "inline").unwrap_err();
    assert!(err.to_string().contains("heater1"), "got: {}", err);
}

#[test]
fn running_above_approach_is_invalid() {
    let text = "[cycle]\napproach_k = 0.3\nrunning_k = 0.5\n";
    let err = Config::from_toml_str(text, "inline").unwrap_err();
    assert!(err.to_string().contains("running_k"));
}

#[test]
fn non_positive_threshold_is_invalid() {
    let err = Config::from_toml_str("[cycle]\nprecool_k = 0.0\n", "inline").unwrap_err();
    assert!(err.to_string().contains("precool_k"));
}

#[test]
fn zero_poll_interval_is_invalid() {
    let err = Config::from_toml_str("[cycle]\npoll_interval = \"0s\"\n", "inline").unwrap_err();
    assert!(err.to_string().contains("poll_interval"));
}

#[test]
fn switch_volts_are_checked() {
    let err = Config::from_toml_str("[cycle]\nswitch_volts = 24.0\n", "inline").unwrap_err();
    assert!(err.to_string().contains("switch voltage"));
}

#[test]
fn load_rebases_relative_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gl7.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "[calibration]\nhe3_head = \"cal/3.csv\"\npump = \"/abs/pump.csv\"").unwrap();
    writeln!(file, "[log]\nfile = \"gl7.log\"").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.calibration.he3_head, dir.path().join("cal/3.csv"));
    assert_eq!(config.calibration.pump, PathBuf::from("/abs/pump.csv"));
    assert_eq!(config.log.file, Some(dir.path().join("gl7.log")));
    assert_eq!(
        config.calibration.path(CalibrationRef::He4Head),
        dir.path().join("calibration/4_head_cal.csv")
    );
}

#[test]
fn discover_prefers_explicit_then_local_then_default() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::discover(None, dir.path()).unwrap();
    assert!(config.serial.port.is_none());

    std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "[serial]\nport = \"/dev/ttyUSB3\"\n")
        .unwrap();
    let config = Config::discover(None, dir.path()).unwrap();
    assert_eq!(config.serial.port.as_deref(), Some("/dev/ttyUSB3"));

    let explicit = dir.path().join("other.toml");
    std::fs::write(&explicit, "[serial]\nport = \"COM4\"\n").unwrap();
    let config = Config::discover(Some(&explicit), dir.path()).unwrap();
    assert_eq!(config.serial.port.as_deref(), Some("COM4"));
}

#[test]
fn missing_explicit_file_is_a_read_error() {
    let err = Config::load(Path::new("/nonexistent/gl7.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}
