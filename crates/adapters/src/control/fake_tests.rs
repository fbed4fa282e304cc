// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn outputs_start_off() {
    let ctl = FakeOutputController::new();
    for output in OutputId::ALL {
        assert!(!ctl.query(output).await.unwrap().is_energized());
    }
}

#[tokio::test]
async fn invalid_power_leaves_state_unchanged() {
    let ctl = FakeOutputController::new();
    ctl.set_power(OutputId::Heater1, 20.0, ExecutionMode::Execute)
        .await
        .unwrap();
    let before = ctl.query(OutputId::Heater1).await.unwrap();

    let err = ctl
        .set_power(OutputId::Heater1, 150.0, ExecutionMode::Execute)
        .await
        .unwrap_err();
    assert!(err.is_invalid_params());
    assert_eq!(ctl.query(OutputId::Heater1).await.unwrap(), before);
}

#[tokio::test]
async fn dry_run_records_but_does_not_mutate() {
    let ctl = FakeOutputController::new();
    ctl.set_enabled(OutputId::Switch3, true, ExecutionMode::DryRun)
        .await
        .unwrap();
    assert!(!ctl.status(OutputId::Switch3).unwrap().is_energized());
    assert_eq!(ctl.mutations().len(), 1);
}

#[tokio::test]
async fn switch_on_and_off() {
    let ctl = FakeOutputController::new();
    ctl.set_enabled(OutputId::Switch4, true, ExecutionMode::Execute)
        .await
        .unwrap();
    assert!(ctl.status(OutputId::Switch4).unwrap().is_energized());
    ctl.set_enabled(OutputId::Switch4, false, ExecutionMode::Execute)
        .await
        .unwrap();
    assert!(!ctl.status(OutputId::Switch4).unwrap().is_energized());
}

#[tokio::test]
async fn configure_applies_mode() {
    let ctl = FakeOutputController::new();
    ctl.configure(
        OutputId::Heater2,
        OutputParams::Mode {
            mode: OutputMode::ClosedLoop,
            input: 2,
            powerup_enable: false,
        },
        ExecutionMode::Execute,
    )
    .await
    .unwrap();
    assert!(matches!(
        ctl.status(OutputId::Heater2),
        Some(OutputStatus::Heater {
            mode: OutputMode::ClosedLoop,
            input: 2,
            ..
        })
    ));
}

#[tokio::test]
async fn failing_output_returns_transport_error() {
    let ctl = FakeOutputController::new();
    ctl.fail(OutputId::Heater2);
    let err = ctl
        .set_enabled(OutputId::Heater2, false, ExecutionMode::Execute)
        .await
        .unwrap_err();
    assert!(matches!(err, ControlError::Transport(_)));
}

#[tokio::test]
async fn preset_switch_is_not_recorded() {
    let ctl = FakeOutputController::new();
    ctl.set_switch(OutputId::Switch3, true);
    assert!(ctl.status(OutputId::Switch3).unwrap().is_energized());
    assert!(ctl.calls().is_empty());
}

#[tokio::test]
async fn rejected_calls_are_not_recorded() {
    let ctl = FakeOutputController::new();
    let _ = ctl
        .set_power(OutputId::Switch3, 10.0, ExecutionMode::Execute)
        .await;
    assert!(ctl.mutations().is_empty());
}
