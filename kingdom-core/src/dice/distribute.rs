//! Reconstructing per-element values from a recorded aggregate.
//!
//! Both algorithms are greedy: earlier elements (and earlier dice) saturate
//! first. Anything beyond total capacity is dropped.

use super::element::{Element, MAX_DIE_SIZE};
use super::notation::{self, ParseError};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// How a keep-all die set splits its value across physical dice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Spread {
    /// Leftmost dice take as much as possible, leaving 1 for each later die.
    #[default]
    FrontLoaded,
    /// Even split with the remainder on the first die. Faces are clamped
    /// to the die size and the clamped excess is dropped, so this is not an
    /// exact replay of the aggregate.
    Even,
}

/// Per-element values for `expression` that sum to `target`.
pub fn distribute(expression: &str, target: i32) -> Result<Vec<i32>, ParseError> {
    let pool = notation::parse(expression)?;
    Ok(distribute_over(pool.elements(), target))
}

/// Like [`distribute`], but an absent target yields no assignment at all.
pub fn distribute_optional(expression: &str, target: Option<i32>) -> Result<Vec<i32>, ParseError> {
    match target {
        Some(target) => distribute(expression, target),
        None => Ok(Vec::new()),
    }
}

/// Start every element at its minimum, then hand out the rest left to right.
pub fn distribute_over(elements: &[Element], target: i32) -> Vec<i32> {
    let mut values: Vec<i32> = elements.iter().map(|e| e.range().min).collect();
    let floor = values.iter().fold(0i64, |acc, &value| acc + i64::from(value));
    let mut remaining = i64::from(target) - floor;

    for (value, element) in values.iter_mut().zip(elements) {
        let eaten = remaining.clamp(0, i64::from(element.range().span())) as i32;
        *value += eaten;
        remaining -= i64::from(eaten);
    }

    if remaining != 0 {
        trace!(target, remaining, "target outside pool capacity, remainder dropped");
    }
    values
}

/// Faces for `length` dice of `size` sides summing to `target`.
///
/// Each die takes as much as it can while every later die keeps at least 1,
/// so `(3, 6, 10)` gives `[6, 3, 1]`.
pub fn distribute_across_dice(length: usize, size: u32, target: i32) -> Vec<u32> {
    let size = size.clamp(1, MAX_DIE_SIZE) as i32;
    let mut remaining = target;
    (0..length)
        .map(|index| {
            let headroom = (length - index - 1) as i32;
            let face = remaining.saturating_sub(headroom).clamp(1, size);
            remaining = remaining.saturating_sub(face);
            face as u32
        })
        .collect()
}

/// Faces for `length` dice summing to `total` without positional detail.
///
/// Whatever the first die cannot hold after clamping is not carried over:
/// `(3, 6, 17)` gives `[6, 5, 5]`, which sums to 16.
pub fn spread_evenly(length: usize, size: u32, total: i32) -> Vec<u32> {
    if length == 0 {
        return Vec::new();
    }
    let size = size.clamp(1, MAX_DIE_SIZE) as i32;
    let base = total / length as i32;
    let remainder = total % length as i32;
    (0..length)
        .map(|index| {
            let face = if index == 0 { base + remainder } else { base };
            face.clamp(1, size) as u32
        })
        .collect()
}
