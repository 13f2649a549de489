//! Resolving a kingdom check end to end.
//!
//! The pipeline is:
//! 1. A [`BonusAggregator`] evaluates the roll context against the domain
//! 2. The directive and modifier become a notation like `2d20kh+7`
//! 3. The pool is rolled (or rebuilt from a recorded total) against the DC
//! 4. The degree of success is classified, then raised by an outcome boost

use crate::aggregator::{Advantage, BonusAggregator, CheckDomain, RollContext};
use crate::bonus::Bonus;
use crate::dice::{self, ParseError, ParseOptions, Pool, Roller, Spread};
use crate::outcome::{self, DegreeOfSuccess};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Everything a caller needs to report a resolved check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub context: RollContext,
    /// Notation that was rolled, e.g. `2d20kh+7`.
    pub notation: String,
    /// The rolled values, e.g. `17+7`.
    pub summary: String,
    pub total: i32,
    pub dc: i32,
    pub diff: i32,
    pub modifier: i32,
    pub advantage: Advantage,
    /// Degree before any outcome boost.
    pub rolled_degree: DegreeOfSuccess,
    pub degree: DegreeOfSuccess,
    pub boost: Option<Bonus>,
    pub used: Vec<Bonus>,
    pub unused: Vec<Bonus>,
    pub pool: Pool,
}

impl CheckResult {
    pub fn succeeded(&self) -> bool {
        self.degree.succeeded()
    }

    pub fn failed(&self) -> bool {
        self.degree.failed()
    }

    pub fn boosted(&self) -> bool {
        self.degree != self.rolled_degree
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) = {} vs DC {}: {}",
            self.notation, self.summary, self.total, self.dc, self.degree
        )
    }
}

/// Roll a check for `context` against `dc`.
pub fn resolve_check<D, R>(
    domain: &D,
    context: RollContext,
    dc: i32,
    roller: &mut Roller<R>,
) -> Result<CheckResult, ParseError>
where
    D: CheckDomain + ?Sized,
    R: Rng,
{
    let aggregator = BonusAggregator::new(domain, context);
    let mut pool = dice::parse_with(&aggregator.notation(), &ParseOptions::new().target(dc))?;
    let total = pool.roll(roller);
    Ok(finish(&aggregator, pool, total, dc))
}

/// Rebuild a previously rolled check from its recorded total.
///
/// No randomness is involved: the value distributor assigns the d20 faces,
/// so replaying the same total always yields the same result.
pub fn replay_check<D>(
    domain: &D,
    context: RollContext,
    dc: i32,
    recorded_total: i32,
) -> Result<CheckResult, ParseError>
where
    D: CheckDomain + ?Sized,
{
    let aggregator = BonusAggregator::new(domain, context);
    let mut pool = dice::parse_with(&aggregator.notation(), &ParseOptions::new().target(dc))?;
    let values = dice::distribute_over(pool.elements(), recorded_total);
    let total = values.iter().sum();
    pool.assign_each(&values, Spread::default());
    Ok(finish(&aggregator, pool, total, dc))
}

fn finish(aggregator: &BonusAggregator, pool: Pool, total: i32, dc: i32) -> CheckResult {
    let diff = total.saturating_sub(dc);
    let rolled_degree = outcome::classify(diff, &pool.critical_faces());
    let boost = aggregator.outcome_boost().cloned();
    let degree = if boost.is_some() {
        rolled_degree.shift(1)
    } else {
        rolled_degree
    };

    debug!(
        notation = %pool.description(),
        total,
        dc,
        rolled = %rolled_degree,
        degree = %degree,
        "check resolved"
    );

    CheckResult {
        context: aggregator.context().clone(),
        notation: pool.description(),
        summary: pool.summary(),
        total,
        dc,
        diff,
        modifier: aggregator.modifier(),
        advantage: aggregator.advantage(),
        rolled_degree,
        degree,
        boost,
        used: aggregator.all_used(),
        unused: aggregator.all_unused(),
        pool,
    }
}
