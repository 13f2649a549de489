//! Bonus records supplied by game content (feats, structures, leaders, ...).
//!
//! The check engine only reads these; it never mutates or stores them beyond
//! one evaluation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The four kingdom abilities checks are rolled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Ability {
    Culture,
    Economy,
    Loyalty,
    Stability,
}

impl Ability {
    pub fn name(&self) -> &'static str {
        match self {
            Ability::Culture => "Culture",
            Ability::Economy => "Economy",
            Ability::Loyalty => "Loyalty",
            Ability::Stability => "Stability",
        }
    }

    pub fn all() -> [Ability; 4] {
        [
            Ability::Culture,
            Ability::Economy,
            Ability::Loyalty,
            Ability::Stability,
        ]
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Ability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ability::all()
            .into_iter()
            .find(|ability| ability.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown ability: {s}"))
    }
}

/// Stacking category of a bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BonusType {
    Ability,
    Level,
    Item,
    Status,
    Circumstance,
    Untyped,
    Fortune,
    Misfortune,
    OutcomeBoost,
}

impl BonusType {
    pub const COUNT: usize = 9;

    pub fn all() -> [BonusType; Self::COUNT] {
        [
            BonusType::Ability,
            BonusType::Level,
            BonusType::Item,
            BonusType::Status,
            BonusType::Circumstance,
            BonusType::Untyped,
            BonusType::Fortune,
            BonusType::Misfortune,
            BonusType::OutcomeBoost,
        ]
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn stacking(self) -> Stacking {
        match self {
            BonusType::Ability | BonusType::Level | BonusType::Untyped => Stacking::Sum,
            BonusType::Item | BonusType::Status | BonusType::Circumstance => {
                Stacking::BestAndWorst
            }
            BonusType::Fortune | BonusType::Misfortune => Stacking::Count,
            BonusType::OutcomeBoost => Stacking::FirstOnly,
        }
    }

    /// Whether bonuses of this type add to the numeric modifier.
    pub fn is_numeric(self) -> bool {
        matches!(self.stacking(), Stacking::Sum | Stacking::BestAndWorst)
    }

    pub fn name(self) -> &'static str {
        match self {
            BonusType::Ability => "ability",
            BonusType::Level => "level",
            BonusType::Item => "item",
            BonusType::Status => "status",
            BonusType::Circumstance => "circumstance",
            BonusType::Untyped => "untyped",
            BonusType::Fortune => "fortune",
            BonusType::Misfortune => "misfortune",
            BonusType::OutcomeBoost => "outcomeBoost",
        }
    }
}

impl fmt::Display for BonusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How candidates of one type combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stacking {
    /// Every candidate applies.
    Sum,
    /// Only the best bonus and the worst penalty apply.
    BestAndWorst,
    /// Every candidate is used, but only their count matters.
    Count,
    /// The first candidate applies; the rest wait for a later roll.
    FirstOnly,
}

/// A scoping field: one accepted value or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scope<T> {
    One(T),
    AnyOf(Vec<T>),
}

impl<T: PartialEq> Scope<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Scope::One(accepted) => accepted == value,
            Scope::AnyOf(accepted) => accepted.contains(value),
        }
    }
}

/// Back-reference to whatever granted a bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(pub Uuid);

impl SourceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Source of the bonuses the engine derives itself (ability, level, unrest).
    pub const fn engine() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for SourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A candidate modifier for a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bonus {
    pub name: String,
    #[serde(rename = "type")]
    pub bonus_type: BonusType,
    #[serde(default)]
    pub value: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<Scope<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability: Option<Scope<Ability>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_type: Option<Scope<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
    #[serde(default)]
    pub source: SourceId,
}

impl Bonus {
    pub fn new(name: impl Into<String>, bonus_type: BonusType, value: i32) -> Self {
        Self {
            name: name.into(),
            bonus_type,
            value,
            activity: None,
            ability: None,
            actor_type: None,
            option: None,
            source: SourceId::new(),
        }
    }

    pub fn with_activity(mut self, activity: impl Into<String>) -> Self {
        self.activity = Some(Scope::One(activity.into()));
        self
    }

    pub fn with_activities<S: Into<String>>(
        mut self,
        activities: impl IntoIterator<Item = S>,
    ) -> Self {
        self.activity = Some(Scope::AnyOf(activities.into_iter().map(Into::into).collect()));
        self
    }

    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.ability = Some(Scope::One(ability));
        self
    }

    pub fn with_abilities(mut self, abilities: impl IntoIterator<Item = Ability>) -> Self {
        self.ability = Some(Scope::AnyOf(abilities.into_iter().collect()));
        self
    }

    pub fn with_actor_type(mut self, actor_type: impl Into<String>) -> Self {
        self.actor_type = Some(Scope::One(actor_type.into()));
        self
    }

    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.option = Some(option.into());
        self
    }

    pub fn with_source(mut self, source: SourceId) -> Self {
        self.source = source;
        self
    }

    /// Whether this bonus is scoped to a roll with these fields.
    ///
    /// Unset scope fields match anything. The option field is strict: a
    /// bonus that names an option never applies to a roll without one.
    pub fn applies_to(
        &self,
        ability: Ability,
        activity: Option<&str>,
        actor_type: Option<&str>,
        option: Option<&str>,
    ) -> bool {
        let ability_ok = self.ability.as_ref().map_or(true, |s| s.admits(&ability));
        let activity_ok = admits_str(&self.activity, activity);
        let actor_ok = admits_str(&self.actor_type, actor_type);
        let option_ok = match (option, self.option.as_deref()) {
            (_, None) => true,
            (Some(roll), Some(required)) => roll == required,
            (None, Some(_)) => false,
        };
        ability_ok && activity_ok && actor_ok && option_ok
    }
}

fn admits_str(scope: &Option<Scope<String>>, value: Option<&str>) -> bool {
    match (scope, value) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(Scope::One(accepted)), Some(value)) => accepted == value,
        (Some(Scope::AnyOf(accepted)), Some(value)) => accepted.iter().any(|a| a == value),
    }
}

impl fmt::Display for Bonus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bonus_type.stacking() {
            Stacking::Sum | Stacking::BestAndWorst => {
                write!(f, "{} {:+} ({})", self.name, self.value, self.bonus_type)
            }
            Stacking::Count | Stacking::FirstOnly => {
                write!(f, "{} ({})", self.name, self.bonus_type)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unscoped_bonus_applies_everywhere() {
        let bonus = Bonus::new("Granary", BonusType::Item, 1);
        assert!(bonus.applies_to(Ability::Economy, None, None, None));
        assert!(bonus.applies_to(
            Ability::Loyalty,
            Some("Quell Unrest"),
            Some("ruler"),
            Some("Waltz")
        ));
    }

    #[test]
    fn test_option_scoping_is_strict() {
        let bonus = Bonus::new("Dance Hall", BonusType::Circumstance, 2).with_option("Tango");
        assert!(bonus.applies_to(Ability::Culture, None, None, Some("Tango")));
        assert!(!bonus.applies_to(Ability::Culture, None, None, Some("Waltz")));
        assert!(!bonus.applies_to(Ability::Culture, None, None, None));
    }

    #[test]
    fn test_scope_lists() {
        let bonus = Bonus::new("Festival", BonusType::Status, 1)
            .with_activities(["Celebrate Holiday", "Quell Unrest"])
            .with_abilities([Ability::Culture, Ability::Loyalty]);
        assert!(bonus.applies_to(Ability::Loyalty, Some("Quell Unrest"), None, None));
        assert!(!bonus.applies_to(Ability::Economy, Some("Quell Unrest"), None, None));
        assert!(!bonus.applies_to(Ability::Loyalty, Some("Trade Agreement"), None, None));
        assert!(!bonus.applies_to(Ability::Loyalty, None, None, None));
    }

    #[test]
    fn test_actor_type_scope() {
        let bonus = Bonus::new("Counsel", BonusType::Circumstance, 1).with_actor_type("leader");
        assert!(bonus.applies_to(Ability::Stability, None, Some("leader"), None));
        assert!(!bonus.applies_to(Ability::Stability, None, Some("kingdom"), None));
    }

    #[test]
    fn test_bonus_record_from_json() {
        let json = r#"{
            "name": "Marketplace",
            "type": "item",
            "value": 1,
            "activity": ["Trade Agreement", "Establish Trade Route"],
            "ability": "economy",
            "actorType": "leader"
        }"#;
        let bonus: Bonus = serde_json::from_str(json).unwrap();
        assert_eq!(bonus.bonus_type, BonusType::Item);
        assert!(bonus.applies_to(Ability::Economy, Some("Trade Agreement"), Some("leader"), None));
        assert!(!bonus.applies_to(Ability::Culture, Some("Trade Agreement"), Some("leader"), None));
    }

    #[test]
    fn test_ability_from_str() {
        assert_eq!("loyalty".parse::<Ability>(), Ok(Ability::Loyalty));
        assert!("charisma".parse::<Ability>().is_err());
    }
}
