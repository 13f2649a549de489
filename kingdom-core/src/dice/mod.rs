//! Dice pools for kingdom checks.
//!
//! Supports signed composite notation (`2d20kh+1d4-2`), keep highest/lowest
//! sets, rigged rolls for tests and replays, and rebuilding a pool from a
//! recorded total.

pub mod distribute;
pub mod element;
pub mod notation;
pub mod rig;

pub use distribute::{distribute, distribute_across_dice, distribute_over, spread_evenly, Spread};
pub use element::{
    Die, DieSet, Element, Flat, Keep, Pool, Range, Sign, MAX_DICE, MAX_DIE_SIZE,
};
pub use notation::{parse, parse_with, ParseError, ParseOptions};
pub use rig::{RigQueues, RollMode, Roller};

/// Parse `notation` and roll it once.
pub fn roll<R: rand::Rng>(notation: &str, roller: &mut Roller<R>) -> Result<Pool, ParseError> {
    let mut pool = parse(notation)?;
    pool.roll(roller);
    Ok(pool)
}
