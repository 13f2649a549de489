//! Four-step degree of success.
//!
//! A check succeeds when it meets the DC. Beating the DC by 10 or more, or a
//! natural 20 on a d20, raises the result one step; missing by 10 or more, or
//! a natural 1, lowers it one step. Both shifts can apply together and the
//! result is clamped to the four degrees.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DegreeOfSuccess {
    CriticalFailure,
    Failure,
    Success,
    CriticalSuccess,
}

impl DegreeOfSuccess {
    pub fn all() -> [DegreeOfSuccess; 4] {
        [
            DegreeOfSuccess::CriticalFailure,
            DegreeOfSuccess::Failure,
            DegreeOfSuccess::Success,
            DegreeOfSuccess::CriticalSuccess,
        ]
    }

    pub fn index(self) -> i32 {
        self as i32
    }

    /// Degree at `index`, clamped into `0..=3`.
    pub fn from_index(index: i32) -> Self {
        match index {
            i32::MIN..=0 => DegreeOfSuccess::CriticalFailure,
            1 => DegreeOfSuccess::Failure,
            2 => DegreeOfSuccess::Success,
            _ => DegreeOfSuccess::CriticalSuccess,
        }
    }

    /// Move `steps` degrees up (positive) or down (negative).
    pub fn shift(self, steps: i32) -> Self {
        Self::from_index(self.index() + steps)
    }

    pub fn succeeded(self) -> bool {
        matches!(
            self,
            DegreeOfSuccess::Success | DegreeOfSuccess::CriticalSuccess
        )
    }

    pub fn failed(self) -> bool {
        !self.succeeded()
    }

    pub fn name(self) -> &'static str {
        match self {
            DegreeOfSuccess::CriticalFailure => "Critical Failure",
            DegreeOfSuccess::Failure => "Failure",
            DegreeOfSuccess::Success => "Success",
            DegreeOfSuccess::CriticalSuccess => "Critical Success",
        }
    }
}

impl fmt::Display for DegreeOfSuccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Classify a roll from `diff = value - dc` and the natural faces showing on
/// its d20s.
pub fn classify(diff: i32, d20_faces: &[u32]) -> DegreeOfSuccess {
    let mut index = if diff >= 0 { 2 } else { 1 };
    if diff <= -10 {
        index -= 1;
    }
    if d20_faces.contains(&1) {
        index -= 1;
    }
    if diff >= 10 {
        index += 1;
    }
    if d20_faces.contains(&20) {
        index += 1;
    }
    DegreeOfSuccess::from_index(index)
}
