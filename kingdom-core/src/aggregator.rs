//! Bonus aggregation for a single check.
//!
//! A [`BonusAggregator`] is built for one roll context, filters the domain's
//! bonuses down to those scoped to it, and partitions them by type into used
//! and unused candidates according to each type's stacking rule. Partitions
//! are computed on first access and cached for the aggregator's lifetime.

use crate::bonus::{Ability, Bonus, BonusType, SourceId, Stacking};
use crate::dice::Keep;
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use tracing::trace;

/// Everything about a roll that decides which bonuses apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollContext {
    pub ability: Ability,
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(default)]
    pub actor_type: Option<String>,
    #[serde(default)]
    pub option: Option<String>,
    #[serde(default)]
    pub unrest: u32,
}

impl RollContext {
    pub fn new(ability: Ability) -> Self {
        Self {
            ability,
            activity: None,
            actor_type: None,
            option: None,
            unrest: 0,
        }
    }

    pub fn with_activity(mut self, activity: impl Into<String>) -> Self {
        self.activity = Some(activity.into());
        self
    }

    pub fn with_actor_type(mut self, actor_type: impl Into<String>) -> Self {
        self.actor_type = Some(actor_type.into());
        self
    }

    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.option = Some(option.into());
        self
    }

    pub fn with_unrest(mut self, unrest: u32) -> Self {
        self.unrest = unrest;
        self
    }

    fn admits(&self, bonus: &Bonus) -> bool {
        bonus.applies_to(
            self.ability,
            self.activity.as_deref(),
            self.actor_type.as_deref(),
            self.option.as_deref(),
        )
    }
}

/// The state a check is rolled against.
pub trait CheckDomain {
    /// Current modifier for `ability`.
    fn ability_score(&self, ability: Ability) -> i32;

    fn level(&self) -> i32;

    /// Every bonus the domain currently grants, in a stable order.
    fn bonuses(&self) -> Vec<Bonus>;
}

/// Status penalty imposed by unrest. The highest threshold reached wins.
pub fn unrest_penalty(unrest: u32) -> Option<i32> {
    match unrest {
        15.. => Some(-4),
        10.. => Some(-3),
        5.. => Some(-2),
        1.. => Some(-1),
        0 => None,
    }
}

/// Roll-two-keep-one directive from fortune and misfortune effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Advantage {
    #[default]
    Normal,
    Fortune,
    Misfortune,
}

impl Advantage {
    /// Fortune wins only when it strictly outnumbers misfortune.
    pub fn from_counts(fortune: usize, misfortune: usize) -> Self {
        if fortune > misfortune {
            Advantage::Fortune
        } else if misfortune > 0 {
            Advantage::Misfortune
        } else {
            Advantage::Normal
        }
    }

    pub fn die_count(self) -> u32 {
        match self {
            Advantage::Normal => 1,
            Advantage::Fortune | Advantage::Misfortune => 2,
        }
    }

    pub fn keep(self) -> Keep {
        match self {
            Advantage::Normal => Keep::All,
            Advantage::Fortune => Keep::Highest,
            Advantage::Misfortune => Keep::Lowest,
        }
    }

    pub fn keep_suffix(self) -> &'static str {
        self.keep().suffix()
    }

    /// The d20 term to roll, e.g. `"1d20"` or `"2d20kh"`.
    pub fn d20_notation(self) -> String {
        format!("{}d20{}", self.die_count(), self.keep_suffix())
    }
}

/// Used and unused candidates of one bonus type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub used: Vec<Bonus>,
    pub unused: Vec<Bonus>,
    /// Sum of the used values; zero for types that do not add to the roll.
    pub modifier: i32,
}

impl Partition {
    fn compute(bonus_type: BonusType, candidates: Vec<&Bonus>) -> Self {
        let chosen: Vec<bool> = match bonus_type.stacking() {
            Stacking::Sum | Stacking::Count => vec![true; candidates.len()],
            Stacking::FirstOnly => (0..candidates.len()).map(|i| i == 0).collect(),
            Stacking::BestAndWorst => {
                // max_by_key keeps the last of equal maxima, min_by_key the first
                // of equal minima.
                let best = candidates
                    .iter()
                    .enumerate()
                    .filter(|(_, b)| b.value > 0)
                    .max_by_key(|(_, b)| b.value)
                    .map(|(i, _)| i);
                let worst = candidates
                    .iter()
                    .enumerate()
                    .filter(|(_, b)| b.value < 0)
                    .min_by_key(|(_, b)| b.value)
                    .map(|(i, _)| i);
                (0..candidates.len())
                    .map(|i| Some(i) == best || Some(i) == worst)
                    .collect()
            }
        };

        let mut partition = Partition::default();
        for (bonus, used) in candidates.into_iter().zip(chosen) {
            if used {
                partition.used.push(bonus.clone());
            } else {
                partition.unused.push(bonus.clone());
            }
        }
        if bonus_type.is_numeric() {
            partition.modifier = partition.used.iter().map(|b| b.value).sum();
        }

        trace!(
            bonus_type = bonus_type.name(),
            used = partition.used.len(),
            unused = partition.unused.len(),
            modifier = partition.modifier,
            "partitioned bonuses"
        );
        partition
    }
}

/// Bonus evaluation for one roll.
#[derive(Debug)]
pub struct BonusAggregator {
    context: RollContext,
    available: Vec<Bonus>,
    partitions: [OnceCell<Partition>; BonusType::COUNT],
}

impl BonusAggregator {
    pub fn new<D: CheckDomain + ?Sized>(domain: &D, context: RollContext) -> Self {
        let ability = context.ability;
        let derived = |name: &str, bonus_type, value| {
            Bonus::new(name, bonus_type, value).with_source(SourceId::engine())
        };
        let mut available = vec![
            derived(ability.name(), BonusType::Ability, domain.ability_score(ability)),
            derived("Level", BonusType::Level, domain.level()),
        ];
        available.extend(domain.bonuses().into_iter().filter(|b| context.admits(b)));
        if let Some(penalty) = unrest_penalty(context.unrest) {
            available.push(derived("Unrest", BonusType::Status, penalty));
        }

        Self {
            context,
            available,
            partitions: Default::default(),
        }
    }

    pub fn context(&self) -> &RollContext {
        &self.context
    }

    /// Every bonus scoped to this roll, including the synthesized ability,
    /// level and unrest entries.
    pub fn available(&self) -> &[Bonus] {
        &self.available
    }

    pub fn partition(&self, bonus_type: BonusType) -> &Partition {
        self.partitions[bonus_type.index()].get_or_init(|| {
            let candidates = self
                .available
                .iter()
                .filter(|b| b.bonus_type == bonus_type)
                .collect();
            Partition::compute(bonus_type, candidates)
        })
    }

    pub fn used(&self, bonus_type: BonusType) -> &[Bonus] {
        &self.partition(bonus_type).used
    }

    pub fn unused(&self, bonus_type: BonusType) -> &[Bonus] {
        &self.partition(bonus_type).unused
    }

    /// Ability + level + item + status + circumstance + untyped.
    pub fn modifier(&self) -> i32 {
        BonusType::all()
            .into_iter()
            .filter(|t| t.is_numeric())
            .map(|t| self.partition(t).modifier)
            .sum()
    }

    pub fn fortune_count(&self) -> usize {
        self.used(BonusType::Fortune).len()
    }

    pub fn misfortune_count(&self) -> usize {
        self.used(BonusType::Misfortune).len()
    }

    pub fn advantage(&self) -> Advantage {
        Advantage::from_counts(self.fortune_count(), self.misfortune_count())
    }

    pub fn die_count(&self) -> u32 {
        self.advantage().die_count()
    }

    pub fn keep_suffix(&self) -> &'static str {
        self.advantage().keep_suffix()
    }

    /// The outcome boost this roll consumes, if any.
    pub fn outcome_boost(&self) -> Option<&Bonus> {
        self.used(BonusType::OutcomeBoost).first()
    }

    /// Dice notation for the check, e.g. `"2d20kh+7"`.
    pub fn notation(&self) -> String {
        let dice = self.advantage().d20_notation();
        match self.modifier() {
            0 => dice,
            modifier => format!("{dice}{modifier:+}"),
        }
    }

    /// Used bonuses across every type, in type order.
    pub fn all_used(&self) -> Vec<Bonus> {
        BonusType::all()
            .into_iter()
            .flat_map(|t| self.used(t).iter().cloned())
            .collect()
    }

    pub fn all_unused(&self) -> Vec<Bonus> {
        BonusType::all()
            .into_iter()
            .flat_map(|t| self.unused(t).iter().cloned())
            .collect()
    }
}
