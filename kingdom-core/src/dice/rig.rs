//! Deterministic roll overrides.
//!
//! A [`Roller`] owns an RNG and a pair of FIFO [`RigQueues`]. In rigged mode
//! each die roll first draws from the per-die queue and each pool roll from
//! the per-pool queue; an empty queue falls back to the RNG.

use super::element::Range;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Queued values for rigged rolls, consumed in enqueue order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RigQueues {
    dice: VecDeque<i32>,
    pools: VecDeque<i32>,
}

impl RigQueues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dice(mut self, values: impl IntoIterator<Item = i32>) -> Self {
        self.dice.extend(values);
        self
    }

    pub fn with_pools(mut self, values: impl IntoIterator<Item = i32>) -> Self {
        self.pools.extend(values);
        self
    }

    pub fn push_die(&mut self, value: i32) {
        self.dice.push_back(value);
    }

    pub fn push_pool(&mut self, value: i32) {
        self.pools.push_back(value);
    }

    pub fn pop_die(&mut self) -> Option<i32> {
        self.dice.pop_front()
    }

    pub fn pop_pool(&mut self) -> Option<i32> {
        self.pools.pop_front()
    }

    pub fn dice_remaining(&self) -> usize {
        self.dice.len()
    }

    pub fn pools_remaining(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dice.is_empty() && self.pools.is_empty()
    }
}

/// Whether rolls consult the rig queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RollMode {
    #[default]
    Random,
    Rigged,
}

/// Source of die faces and pool totals for one session or test run.
#[derive(Debug, Clone)]
pub struct Roller<R = StdRng> {
    rng: R,
    rig: RigQueues,
    mode: RollMode,
}

impl Roller<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible roller for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Roller<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            rig: RigQueues::new(),
            mode: RollMode::Random,
        }
    }

    /// Install rig queues and switch to rigged mode.
    pub fn with_rig(mut self, rig: RigQueues) -> Self {
        self.rig = rig;
        self.mode = RollMode::Rigged;
        self
    }

    pub fn with_mode(mut self, mode: RollMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> RollMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: RollMode) {
        self.mode = mode;
    }

    pub fn is_rigged(&self) -> bool {
        self.mode == RollMode::Rigged
    }

    pub fn rig(&self) -> &RigQueues {
        &self.rig
    }

    pub fn rig_mut(&mut self) -> &mut RigQueues {
        &mut self.rig
    }

    /// Roll one face of a `size`-sided die.
    ///
    /// One-sided dice are never rigged, so a flat posing as a die does not
    /// swallow a queued value.
    pub fn die_face(&mut self, size: u32) -> u32 {
        let size = size.max(1);
        if self.is_rigged() && size > 1 {
            if let Some(queued) = self.rig.pop_die() {
                let face = queued.clamp(1, size as i32) as u32;
                if face as i32 != queued {
                    warn!(queued, size, face, "rigged die value out of range, clamped");
                }
                debug!(size, face, remaining = self.rig.dice_remaining(), "rigged die roll");
                return face;
            }
        }
        self.rng.gen_range(1..=size)
    }

    /// A rigged aggregate for a pool spanning `range`, if one is queued.
    pub fn pool_total(&mut self, range: Range) -> Option<i32> {
        if !self.is_rigged() {
            return None;
        }
        let queued = self.rig.pop_pool()?;
        let total = range.clamp(queued);
        if total != queued {
            warn!(
                queued,
                min = range.min,
                max = range.max,
                "rigged pool total out of range, clamped"
            );
        }
        debug!(total, remaining = self.rig.pools_remaining(), "rigged pool roll");
        Some(total)
    }
}
