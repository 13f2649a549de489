//! Roll a few expressions and a sample check.
//!
//! Rig the dice with e.g. `KINGDOM_RIG_DICE=1,20 cargo run --example roll_dice`.

use kingdom_core::dice;
use kingdom_core::testing::FixedDomain;
use kingdom_core::{resolve_check, Ability, Bonus, BonusType, RollConfig, RollContext};

fn main() {
    let config = match RollConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("CONFIG ERROR: {e}");
            return;
        }
    };
    let mut roller = config.into_roller();

    println!("=== Rolling dice ===\n");
    for notation in ["1d20", "2d6+3", "2d20kh+5", "2d20kl-1", "4d6kl+1d4", "1d20+x"] {
        print!("Rolling {notation}... ");
        match dice::roll(notation, &mut roller) {
            Ok(pool) => println!(
                "{} = {}",
                pool.summary(),
                pool.value().unwrap_or_default()
            ),
            Err(e) => println!("PARSE ERROR: {e}"),
        }
    }

    println!("\n=== Quell Unrest (DC 16) ===\n");
    let domain = FixedDomain::new(3)
        .with_score(Ability::Loyalty, 2)
        .with_bonus(Bonus::new("Garrison", BonusType::Item, 1))
        .with_bonus(Bonus::new("Bad Omens", BonusType::Misfortune, 0));
    let context = RollContext::new(Ability::Loyalty)
        .with_activity("Quell Unrest")
        .with_unrest(6);

    match resolve_check(&domain, context, 16, &mut roller) {
        Ok(result) => {
            println!("{result}");
            for bonus in &result.used {
                println!("  used:   {bonus}");
            }
            for bonus in &result.unused {
                println!("  unused: {bonus}");
            }
        }
        Err(e) => println!("CHECK ERROR: {e}"),
    }
}
