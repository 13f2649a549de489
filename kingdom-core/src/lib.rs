//! Kingdom check engine.
//!
//! This crate provides:
//! - Dice notation with signed composite terms and keep highest/lowest sets
//! - Rigged rolls and value reconstruction for reproducible tests and replays
//! - Four-step degree of success with natural 1/20 shifts
//! - Bonus aggregation with typed stacking, fortune/misfortune and unrest
//!
//! # Quick Start
//!
//! ```
//! use kingdom_core::testing::{rigged_roller, FixedDomain};
//! use kingdom_core::{resolve_check, Ability, Bonus, BonusType, DegreeOfSuccess, RollContext};
//!
//! let domain = FixedDomain::new(3)
//!     .with_score(Ability::Loyalty, 2)
//!     .with_bonus(Bonus::new("Town Hall", BonusType::Item, 1));
//! let context = RollContext::new(Ability::Loyalty).with_activity("Quell Unrest");
//!
//! let mut roller = rigged_roller(&[14]);
//! let result = resolve_check(&domain, context, 18, &mut roller).unwrap();
//!
//! assert_eq!(result.notation, "1d20+6");
//! assert_eq!(result.total, 20);
//! assert_eq!(result.degree, DegreeOfSuccess::Success);
//! ```

pub mod aggregator;
pub mod bonus;
pub mod check;
pub mod config;
pub mod dice;
pub mod outcome;
pub mod testing;

// Primary public API
pub use aggregator::{Advantage, BonusAggregator, CheckDomain, Partition, RollContext};
pub use bonus::{Ability, Bonus, BonusType, Scope, SourceId, Stacking};
pub use check::{replay_check, resolve_check, CheckResult};
pub use config::{ConfigError, RollConfig};
pub use dice::{parse, parse_with, Element, ParseError, ParseOptions, Pool, RigQueues, Roller};
pub use outcome::{classify, DegreeOfSuccess};
