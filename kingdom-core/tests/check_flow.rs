//! Integration tests for the kingdom check pipeline.
//!
//! Run with: `cargo test -p kingdom-core --test check_flow`

use kingdom_core::dice::{
    self, distribute_across_dice, Die, Element, Keep, Pool, RigQueues, Roller, Sign,
};
use kingdom_core::testing::{rigged_pool_roller, rigged_roller, FixedDomain};
use kingdom_core::{
    classify, replay_check, resolve_check, Ability, Advantage, Bonus, BonusAggregator, BonusType,
    DegreeOfSuccess, RollContext,
};

// =============================================================================
// Notation
// =============================================================================

#[test]
fn test_two_d20_is_one_keep_all_set() {
    let pool = dice::parse("2d20").unwrap();
    match &pool.elements()[0] {
        Element::DieSet(set) => {
            assert_eq!((set.length(), set.size(), set.keep()), (2, 20, Keep::All));
        }
        other => panic!("expected die set, got {other:?}"),
    }
}

#[test]
fn test_negative_flat() {
    let pool = dice::parse("-5").unwrap();
    assert!(matches!(
        &pool.elements()[0],
        Element::Flat(flat) if flat.sign() == Sign::Minus && flat.value() == -5
    ));
}

#[test]
fn test_description_round_trips() {
    for notation in ["1d20+5", "2d20kh-1d4+2", "4d6kl", "-3+1d8", "d6 + 2d10 - 7"] {
        let pool = dice::parse(notation).unwrap();
        let reparsed = dice::parse(&pool.description()).unwrap();
        assert_eq!(pool, reparsed, "{notation}");
    }
}

#[test]
fn test_parse_error_surfaces_segment() {
    let err = dice::parse("1d20 + 2x4").unwrap_err();
    assert_eq!(err.to_string(), "Invalid dice term: \"2x4\"");
}

// =============================================================================
// Distribution
// =============================================================================

#[test]
fn test_front_loaded_die_set_distribution() {
    assert_eq!(distribute_across_dice(3, 6, 10), vec![6, 3, 1]);
}

// =============================================================================
// Degrees of success
// =============================================================================

#[test]
fn test_degree_edge_cases() {
    assert_eq!(classify(-15, &[]), DegreeOfSuccess::CriticalFailure);
    assert_eq!(classify(-15, &[1]), DegreeOfSuccess::CriticalFailure);
    assert_eq!(classify(3, &[20]), DegreeOfSuccess::CriticalSuccess);
}

#[test]
fn test_pool_with_several_d20s() {
    let pool = Pool::new(vec![
        Die::new(20).with_face(20).into(),
        Die::new(20).with_sign(Sign::Minus).with_face(1).into(),
    ])
    .with_target(Some(30));
    // Both naturals show: +1 and -1 cancel; diff -11 drops a step.
    assert_eq!(pool.diff(), Some(-11));
    assert_eq!(pool.outcome(), Some(DegreeOfSuccess::CriticalFailure));
}

// =============================================================================
// Bonus aggregation
// =============================================================================

#[test]
fn test_circumstance_stacking() {
    let domain = FixedDomain::new(0).with_bonuses([
        Bonus::new("Herald", BonusType::Circumstance, 1),
        Bonus::new("Envoy", BonusType::Circumstance, 2),
        Bonus::new("Rival", BonusType::Circumstance, -1),
    ]);
    let aggregator = BonusAggregator::new(&domain, RollContext::new(Ability::Culture));
    let partition = aggregator.partition(BonusType::Circumstance);

    let used: Vec<i32> = partition.used.iter().map(|b| b.value).collect();
    assert_eq!(used, vec![2, -1]);
    assert_eq!(partition.modifier, 1);
    assert_eq!(partition.unused.len(), 1);
    assert_eq!(partition.unused[0].name, "Herald");
}

#[test]
fn test_advantage_directive_counts() {
    let fortune = || Bonus::new("Fortune", BonusType::Fortune, 0);
    let misfortune = || Bonus::new("Misfortune", BonusType::Misfortune, 0);
    let advantage = |domain: FixedDomain| {
        BonusAggregator::new(&domain, RollContext::new(Ability::Economy)).advantage()
    };

    assert_eq!(
        advantage(FixedDomain::new(0).with_bonuses([fortune(), fortune(), misfortune()])),
        Advantage::Fortune
    );
    assert_eq!(
        advantage(FixedDomain::new(0).with_bonus(misfortune())),
        Advantage::Misfortune
    );
    assert_eq!(advantage(FixedDomain::new(0)), Advantage::Normal);
}

#[test]
fn test_option_scoped_bonus() {
    let domain = FixedDomain::new(0)
        .with_bonus(Bonus::new("Ballroom", BonusType::Circumstance, 2).with_option("Tango"));
    let available = |context: RollContext| {
        BonusAggregator::new(&domain, context)
            .available()
            .iter()
            .any(|b| b.name == "Ballroom")
    };

    let base = RollContext::new(Ability::Culture).with_activity("Celebrate Holiday");
    assert!(available(base.clone().with_option("Tango")));
    assert!(!available(base.clone().with_option("Waltz")));
    assert!(!available(base));
}

// =============================================================================
// Rigging
// =============================================================================

#[test]
fn test_rig_queue_is_fifo() {
    let mut rigged = Roller::seeded(1).with_rig(RigQueues::new().with_dice([1, 20]));
    let mut random = Roller::seeded(2);
    let mut d20 = Die::new(20);
    let mut d6 = Die::new(6);

    assert_eq!(d20.roll(&mut rigged), 1);
    d6.roll(&mut random);
    d6.roll(&mut random);
    assert_eq!(d20.roll(&mut rigged), 20);
}

#[test]
fn test_rigged_pool_total_is_clamped() {
    let mut pool = dice::parse("1d20+4").unwrap();
    let mut roller = rigged_pool_roller(&[2, 18]);
    assert_eq!(pool.roll(&mut roller), 5);
    assert_eq!(pool.roll(&mut roller), 18);
    // Queue exhausted: falls back to a random roll.
    let total = pool.roll(&mut roller);
    assert!((5..=24).contains(&total));
}

// =============================================================================
// End to end
// =============================================================================

#[test]
fn test_quell_unrest_check() {
    let domain = FixedDomain::new(5)
        .with_score(Ability::Loyalty, 3)
        .with_bonuses([
            Bonus::new("Guard Towers", BonusType::Item, 1).with_activity("Quell Unrest"),
            Bonus::new("Trade Fair", BonusType::Item, 2).with_activity("Trade Agreement"),
            Bonus::new("Beloved Ruler", BonusType::Status, 1).with_actor_type("ruler"),
            Bonus::new("Omens", BonusType::Misfortune, 0).with_ability(Ability::Loyalty),
        ]);
    let context = RollContext::new(Ability::Loyalty)
        .with_activity("Quell Unrest")
        .with_actor_type("ruler")
        .with_unrest(11);

    let mut roller = rigged_roller(&[17, 9]);
    let result = resolve_check(&domain, context, 20, &mut roller).unwrap();

    // 3 + 5 + 1 (item) + 1 - 3 (status) = 7, keep lowest of 17 and 9.
    assert_eq!(result.modifier, 7);
    assert_eq!(result.advantage, Advantage::Misfortune);
    assert_eq!(result.notation, "2d20kl+7");
    assert_eq!(result.total, 16);
    assert_eq!(result.degree, DegreeOfSuccess::Failure);
    assert!(result.used.iter().any(|b| b.name == "Beloved Ruler"));
    assert!(result.used.iter().any(|b| b.name == "Unrest" && b.value == -3));
    assert!(!result.used.iter().chain(&result.unused).any(|b| b.name == "Trade Fair"));
}

#[test]
fn test_replay_reproduces_rolled_check() {
    let domain = FixedDomain::new(2).with_score(Ability::Economy, 1);
    let context = RollContext::new(Ability::Economy).with_activity("Trade Agreement");

    let mut roller = rigged_roller(&[11]);
    let rolled = resolve_check(&domain, context.clone(), 14, &mut roller).unwrap();
    let replayed = replay_check(&domain, context, 14, rolled.total).unwrap();

    assert_eq!(replayed.total, rolled.total);
    assert_eq!(replayed.summary, rolled.summary);
    assert_eq!(replayed.degree, rolled.degree);
}
