// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Temperature threshold predicates

use crate::point::PointId;
use crate::reading::Temperature;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Comparator {
    /// Temperature <= target
    AtMost,
    /// Temperature >= target
    AtLeast,
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Comparator::AtMost => write!(f, "<="),
            Comparator::AtLeast => write!(f, ">="),
        }
    }
}

/// A single point's exit condition within a wait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSpec {
    pub point: PointId,
    pub comparator: Comparator,
    /// Kelvin
    pub target: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ThresholdSpec {
    pub fn at_most(point: impl Into<PointId>, target: f64) -> Self {
        Self {
            point: point.into(),
            comparator: Comparator::AtMost,
            target,
            label: None,
        }
    }

    pub fn at_least(point: impl Into<PointId>, target: f64) -> Self {
        Self {
            point: point.into(),
            comparator: Comparator::AtLeast,
            target,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Over-range never satisfies, whichever way the comparison points
    pub fn is_satisfied_by(&self, temperature: &Temperature) -> bool {
        match temperature {
            Temperature::OverRange => false,
            Temperature::Kelvin(k) if !k.is_finite() => false,
            Temperature::Kelvin(k) => match self.comparator {
                Comparator::AtMost => *k <= self.target,
                Comparator::AtLeast => *k >= self.target,
            },
        }
    }
}

impl std::fmt::Display for ThresholdSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(label) = &self.label {
            write!(f, "{}: ", label)?;
        }
        write!(f, "{} {} {} K", self.point, self.comparator, self.target)
    }
}

#[cfg(test)]
#[path = "threshold_tests.rs"]
mod tests;
