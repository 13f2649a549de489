//! Testing utilities for kingdom checks.
//!
//! This module provides:
//! - `FixedDomain`, an in-memory [`CheckDomain`] with scripted scores and bonuses
//! - Rigged roller constructors for deterministic dice

use crate::aggregator::CheckDomain;
use crate::bonus::{Ability, Bonus};
use crate::dice::{RigQueues, Roller};
use rand::rngs::StdRng;

/// Seed used by every roller built here, so unrigged draws repeat too.
pub const TEST_SEED: u64 = 0x6b696e67;

/// A domain with fixed ability scores, level and bonus list.
#[derive(Debug, Clone, Default)]
pub struct FixedDomain {
    scores: [i32; 4],
    level: i32,
    bonuses: Vec<Bonus>,
}

impl FixedDomain {
    /// A domain at `level` with every ability score at 0.
    pub fn new(level: i32) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    pub fn with_score(mut self, ability: Ability, score: i32) -> Self {
        self.scores[ability.index()] = score;
        self
    }

    pub fn with_bonus(mut self, bonus: Bonus) -> Self {
        self.bonuses.push(bonus);
        self
    }

    pub fn with_bonuses(mut self, bonuses: impl IntoIterator<Item = Bonus>) -> Self {
        self.bonuses.extend(bonuses);
        self
    }

    pub fn set_level(&mut self, level: i32) {
        self.level = level;
    }
}

impl CheckDomain for FixedDomain {
    fn ability_score(&self, ability: Ability) -> i32 {
        self.scores[ability.index()]
    }

    fn level(&self) -> i32 {
        self.level
    }

    fn bonuses(&self) -> Vec<Bonus> {
        self.bonuses.clone()
    }
}

/// A rigged roller that will produce `faces` for its next die rolls.
pub fn rigged_roller(faces: &[i32]) -> Roller<StdRng> {
    Roller::seeded(TEST_SEED).with_rig(RigQueues::new().with_dice(faces.iter().copied()))
}

/// A rigged roller that will force `totals` for its next pool rolls.
pub fn rigged_pool_roller(totals: &[i32]) -> Roller<StdRng> {
    Roller::seeded(TEST_SEED).with_rig(RigQueues::new().with_pools(totals.iter().copied()))
}
