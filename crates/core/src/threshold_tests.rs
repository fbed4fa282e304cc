// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use yare::parameterized;

#[parameterized(
    below = { 9.5, true },
    equal = { 10.0, true },
    above = { 10.5, false },
)]
fn at_most_compares_inclusively(kelvin: f64, expected: bool) {
    let spec = ThresholdSpec::at_most("3He Head", 10.0);
    assert_eq!(spec.is_satisfied_by(&Temperature::Kelvin(kelvin)), expected);
}

#[parameterized(
    below = { 9.5, false },
    equal = { 10.0, true },
    above = { 10.5, true },
)]
fn at_least_compares_inclusively(kelvin: f64, expected: bool) {
    let spec = ThresholdSpec::at_least("4K Stage", 10.0);
    assert_eq!(spec.is_satisfied_by(&Temperature::Kelvin(kelvin)), expected);
}

#[test]
fn nan_never_satisfies() {
    let spec = ThresholdSpec::at_most("3He Head", 10.0);
    assert!(!spec.is_satisfied_by(&Temperature::Kelvin(f64::NAN)));
}

#[test]
fn display_includes_label() {
    let spec = ThresholdSpec::at_most("4He Head", 0.3).with_label("cycle running");
    assert_eq!(spec.to_string(), "cycle running: 4He Head <= 0.3 K");
}

proptest! {
    #[test]
    fn over_range_never_satisfies(target in -1000.0f64..1000.0, at_most in any::<bool>()) {
        let spec = if at_most {
            ThresholdSpec::at_most("p", target)
        } else {
            ThresholdSpec::at_least("p", target)
        };
        prop_assert!(!spec.is_satisfied_by(&Temperature::OverRange));
    }
}
