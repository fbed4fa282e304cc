// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use gl7_adapters::{ControlCall, FakeOutputController, FakeTemperatureSource};
use gl7_core::{HeaterSetup, OutputMode, OutputStatus};
use std::collections::BTreeSet;
use std::time::Duration;

const TICK: Duration = Duration::from_secs(2);

fn cycle() -> CycleConfig {
    CycleConfig {
        poll_interval: TICK,
        max_wait: TICK * 30,
        he4_pump_power: Some(40.0),
        he3_pump_power: Some(30.0),
        ..CycleConfig::default()
    }
}

/// Every point already at base temperature
fn cold_source() -> FakeTemperatureSource {
    let source = FakeTemperatureSource::default();
    source.set_temperature("3He Head", 0.25);
    source.set_temperature("4He Head", 0.25);
    source.set_temperature("4K Stage", 3.1);
    source.set_temperature("50K Stage", 41.0);
    source.set_temperature("Device Stage", 0.26);
    source.set_temperature("3He Pump", 5.0);
    source.set_temperature("4He Pump", 4.2);
    source
}

fn sequencer(
    source: &FakeTemperatureSource,
    ctl: &FakeOutputController,
    mode: ExecutionMode,
) -> PhaseSequencer<FakeTemperatureSource, FakeOutputController> {
    PhaseSequencer::new(
        source.clone(),
        ctl.clone(),
        cycle(),
        mode,
        AbortSignal::new(),
    )
}

fn heater_on(ctl: &FakeOutputController, output: OutputId, percent: f64) {
    ctl.set_status(OutputStatus::Heater {
        output,
        manual_percent: percent,
        mode: OutputMode::OpenLoop,
        input: 0,
        range: 0,
        setup: HeaterSetup::recommended(output).unwrap(),
        output_percent: percent,
    });
}

fn enabled(output: OutputId, on: bool) -> ControlCall {
    ControlCall::SetEnabled {
        output,
        on,
        mode: ExecutionMode::Execute,
    }
}

#[tokio::test(start_paused = true)]
async fn initial_status_reads_everything() {
    let source = cold_source();
    let ctl = FakeOutputController::new();

    let result = sequencer(&source, &ctl, ExecutionMode::Execute)
        .run_phase(PhaseKind::InitialStatus)
        .await;

    assert_eq!(result.status, PhaseStatus::Success);
    assert_eq!(result.index, 1);
    assert_eq!(result.readings.len(), 7);
    assert_eq!(result.outputs.len(), 4);
    assert!(ctl.mutations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn he4_transition_turns_heater_off_before_switch_on() {
    let source = cold_source();
    let ctl = FakeOutputController::new();
    heater_on(&ctl, OutputId::Heater1, 40.0);

    let result = sequencer(&source, &ctl, ExecutionMode::Execute)
        .run_phase(PhaseKind::He4PumpTransition)
        .await;

    assert_eq!(result.status, PhaseStatus::Success, "{}", result);
    assert_eq!(
        ctl.mutations(),
        vec![enabled(OutputId::Heater1, false), enabled(OutputId::Switch3, true)]
    );
    assert!(!result.outputs[&OutputId::Heater1].is_energized());
    assert!(result.outputs[&OutputId::Switch3].is_energized());
}

#[tokio::test(start_paused = true)]
async fn timed_out_transition_mutates_nothing() {
    let source = cold_source();
    source.set_temperature("4He Head", 6.0);
    let ctl = FakeOutputController::new();
    heater_on(&ctl, OutputId::Heater1, 40.0);

    let result = sequencer(&source, &ctl, ExecutionMode::Execute)
        .run_phase(PhaseKind::He4PumpTransition)
        .await;

    assert_eq!(result.status, PhaseStatus::TimedOut);
    assert_eq!(result.reached, BTreeSet::from([PointId::from("3He Head")]));
    assert_eq!(result.pending, BTreeSet::from([PointId::from("4He Head")]));
    assert!(ctl.mutations().is_empty());
    assert!(ctl.status(OutputId::Heater1).unwrap().is_energized());
    assert!(result.error.unwrap().contains("4He Head"));
    // Readback still happens
    assert_eq!(result.readings.len(), 7);
}

#[tokio::test(start_paused = true)]
async fn dry_run_records_intent_without_writing() {
    let source = cold_source();
    let ctl = FakeOutputController::new();
    heater_on(&ctl, OutputId::Heater1, 40.0);

    let result = sequencer(&source, &ctl, ExecutionMode::DryRun)
        .run_phase(PhaseKind::He4PumpTransition)
        .await;

    assert_eq!(result.status, PhaseStatus::Success);
    assert!(ctl
        .mutations()
        .iter()
        .all(|c| matches!(c, ControlCall::SetEnabled { mode: ExecutionMode::DryRun, .. })));
    assert!(ctl.status(OutputId::Heater1).unwrap().is_energized());
    assert!(!ctl.status(OutputId::Switch3).unwrap().is_energized());
    assert!(result
        .notes
        .iter()
        .any(|n| n.contains("postconditions skipped")));
    assert!(result.notes.iter().any(|n| n == "dry-run: turn heater1 off"));
}

#[tokio::test(start_paused = true)]
async fn pump_heating_without_powers_aborts_before_writing() {
    let source = cold_source();
    let ctl = FakeOutputController::new();
    let sequencer = PhaseSequencer::new(
        source,
        ctl.clone(),
        CycleConfig::default(),
        ExecutionMode::Execute,
        AbortSignal::new(),
    );

    let result = sequencer.run_phase(PhaseKind::PumpHeating).await;

    assert_eq!(result.status, PhaseStatus::Aborted);
    assert!(result.error.unwrap().contains("he4_pump_power"));
    assert!(ctl.mutations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn pump_heating_with_closed_switch_aborts_before_writing() {
    let source = cold_source();
    let ctl = FakeOutputController::new();
    ctl.set_switch(OutputId::Switch3, true);

    let result = sequencer(&source, &ctl, ExecutionMode::Execute)
        .run_phase(PhaseKind::PumpHeating)
        .await;

    assert_eq!(result.status, PhaseStatus::Aborted);
    assert!(result.error.unwrap().contains("switch3"));
    assert!(ctl.mutations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn pump_heating_configures_then_powers_each_heater() {
    let source = cold_source();
    let ctl = FakeOutputController::new();

    let result = sequencer(&source, &ctl, ExecutionMode::Execute)
        .run_phase(PhaseKind::PumpHeating)
        .await;

    assert_eq!(result.status, PhaseStatus::Success);
    let outputs: Vec<(OutputId, bool)> = ctl
        .mutations()
        .iter()
        .map(|c| (c.output(), matches!(c, ControlCall::SetPower { .. })))
        .collect();
    assert_eq!(
        outputs,
        vec![
            (OutputId::Heater1, false),
            (OutputId::Heater1, true),
            (OutputId::Heater2, false),
            (OutputId::Heater2, true),
        ]
    );
    assert!(result.outputs[&OutputId::Heater1].is_energized());
    assert!(result.outputs[&OutputId::Heater2].is_energized());
}

#[tokio::test(start_paused = true)]
async fn sensor_failure_during_wait_is_an_error() {
    let source = cold_source();
    source.fail("3He Head");
    let ctl = FakeOutputController::new();

    let result = sequencer(&source, &ctl, ExecutionMode::Execute)
        .run_phase(PhaseKind::He3PumpTransition)
        .await;

    assert_eq!(result.status, PhaseStatus::Error);
    assert!(result.error.unwrap().contains("sensor failure"));
    assert!(ctl.mutations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn control_failure_stops_remaining_mutations() {
    let source = cold_source();
    let ctl = FakeOutputController::new();
    heater_on(&ctl, OutputId::Heater2, 30.0);
    ctl.fail(OutputId::Heater2);

    let result = sequencer(&source, &ctl, ExecutionMode::Execute)
        .run_phase(PhaseKind::He3PumpTransition)
        .await;

    assert_eq!(result.status, PhaseStatus::Error);
    assert!(result.error.unwrap().contains("turn heater2 off"));
    // The switch must never close while the heater state is unknown
    assert!(!ctl.status(OutputId::Switch4).unwrap().is_energized());
}

#[tokio::test(start_paused = true)]
async fn final_cooldown_reports_running_state() {
    let source = cold_source();
    let ctl = FakeOutputController::new();
    ctl.set_switch(OutputId::Switch3, true);
    ctl.set_switch(OutputId::Switch4, true);

    let result = sequencer(&source, &ctl, ExecutionMode::Execute)
        .run_phase(PhaseKind::FinalCooldown)
        .await;

    assert_eq!(result.status, PhaseStatus::Success);
    assert_eq!(result.cycle_running, Some(true));
}

#[tokio::test(start_paused = true)]
async fn final_cooldown_can_succeed_before_running() {
    let source = cold_source();
    source.set_temperature("4He Head", 0.45);
    let ctl = FakeOutputController::new();
    ctl.set_switch(OutputId::Switch3, true);
    ctl.set_switch(OutputId::Switch4, true);

    let result = sequencer(&source, &ctl, ExecutionMode::Execute)
        .run_phase(PhaseKind::FinalCooldown)
        .await;

    assert_eq!(result.status, PhaseStatus::Success);
    assert_eq!(result.cycle_running, Some(false));
}

#[tokio::test(start_paused = true)]
async fn final_cooldown_with_open_switch_fails_postcondition() {
    let source = cold_source();
    let ctl = FakeOutputController::new();
    ctl.set_switch(OutputId::Switch3, true);

    let result = sequencer(&source, &ctl, ExecutionMode::Execute)
        .run_phase(PhaseKind::FinalCooldown)
        .await;

    assert_eq!(result.status, PhaseStatus::Error);
    assert!(result
        .error
        .unwrap()
        .contains("expected switch4 (3He heat switch) is on"));
}

#[tokio::test(start_paused = true)]
async fn full_run_completes_every_phase() {
    let source = cold_source();
    let ctl = FakeOutputController::new();

    let result = sequencer(&source, &ctl, ExecutionMode::Execute)
        .run_full()
        .await;

    assert!(result.is_success(), "{}", result);
    assert_eq!(result.phases.len(), PhaseKind::ALL.len());
    assert_eq!(result.last().unwrap().cycle_running, Some(true));
}

#[tokio::test(start_paused = true)]
async fn full_run_stops_at_first_failure() {
    let source = cold_source();
    let ctl = FakeOutputController::new();
    let sequencer = PhaseSequencer::new(
        source,
        ctl.clone(),
        CycleConfig {
            he4_pump_power: None,
            ..cycle()
        },
        ExecutionMode::Execute,
        AbortSignal::new(),
    );

    let result = sequencer.run_full().await;

    assert!(!result.is_success());
    assert_eq!(result.first_failure, Some(PhaseKind::PumpHeating));
    assert_eq!(result.phases.len(), 4);
    assert!(ctl.mutations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancel_during_precool_aborts_without_mutations() {
    let source = cold_source();
    source.set_temperature("3He Head", 40.0);
    source.set_temperature("4He Head", 40.0);
    let ctl = FakeOutputController::new();
    let abort = AbortSignal::new();
    let sequencer = PhaseSequencer::new(
        source,
        ctl.clone(),
        cycle(),
        ExecutionMode::Execute,
        abort.clone(),
    );

    tokio::spawn(async move {
        tokio::time::sleep(TICK * 3).await;
        abort.abort();
    });
    let result = sequencer.run_full().await;

    assert_eq!(result.first_failure, Some(PhaseKind::Precool));
    assert_eq!(result.last().unwrap().status, PhaseStatus::Aborted);
    assert_eq!(result.phases.len(), 2);
    assert!(ctl.mutations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn raised_abort_stops_phase_before_it_starts() {
    let source = cold_source();
    let ctl = FakeOutputController::new();
    let sequencer = sequencer(&source, &ctl, ExecutionMode::Execute);
    sequencer.abort_signal().abort();

    let result = sequencer.run_phase(PhaseKind::PumpHeating).await;

    assert_eq!(result.status, PhaseStatus::Aborted);
    assert!(ctl.mutations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn individual_phases_match_full_run() {
    let full_source = cold_source();
    let full_ctl = FakeOutputController::new();
    let full = sequencer(&full_source, &full_ctl, ExecutionMode::Execute)
        .run_full()
        .await;

    let step_source = cold_source();
    let step_ctl = FakeOutputController::new();
    let mut individual = Vec::new();
    for kind in PhaseKind::ALL {
        // A fresh sequencer per step: no progress carries over
        let result = sequencer(&step_source, &step_ctl, ExecutionMode::Execute)
            .run_phase(kind)
            .await;
        individual.push(result);
    }

    assert_eq!(full.phases.len(), individual.len());
    for (a, b) in full.phases.iter().zip(&individual) {
        assert!(a.same_outcome(b), "{} vs {}", a, b);
    }
    assert_eq!(full_ctl.mutations(), step_ctl.mutations());
}

#[tokio::test(start_paused = true)]
async fn individual_phases_match_full_run_with_falling_heads() {
    fn falling() -> FakeTemperatureSource {
        let source = cold_source();
        source.set_ramp("3He Head", 15.0, -0.5, 30);
        source.set_ramp("4He Head", 15.0, -0.5, 30);
        source
    }

    let full = sequencer(&falling(), &FakeOutputController::new(), ExecutionMode::Execute)
        .run_full()
        .await;

    let step_source = falling();
    let step_ctl = FakeOutputController::new();
    let mut individual = Vec::new();
    for kind in PhaseKind::ALL {
        let result = sequencer(&step_source, &step_ctl, ExecutionMode::Execute)
            .run_phase(kind)
            .await;
        let done = !result.is_success();
        individual.push(result);
        if done {
            break;
        }
    }

    assert_eq!(full.phases.len(), individual.len());
    for (a, b) in full.phases.iter().zip(&individual) {
        assert!(a.same_outcome(b), "{} vs {}", a, b);
    }
}
