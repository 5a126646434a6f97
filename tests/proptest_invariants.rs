//! Property tests for health, shield and charge bounds

use std::sync::Arc;

use arena_clash::ability::AbilityCatalog;
use arena_clash::character::CharacterProfile;
use arena_clash::combat::DamageSource;
use arena_clash::core::{CombatConfig, Side};
use arena_clash::projectile::{charged_size, charged_speed};
use arena_clash::MatchSession;
use proptest::prelude::*;

fn duel() -> MatchSession {
    MatchSession::new(
        CombatConfig::default(),
        Arc::new(AbilityCatalog::standard()),
        vec![CharacterProfile::amber(), CharacterProfile::volt()],
        3,
    )
    .unwrap()
}

proptest! {
    #[test]
    fn health_stays_within_bounds(hits in prop::collection::vec(-50i32..400, 1..40)) {
        let mut s = duel();
        for amount in hits {
            s.take_damage(Side::One, amount, DamageSource::External).unwrap();
            let health = s.character(Side::One).health();
            prop_assert!((0..=900).contains(&health));
        }
    }

    #[test]
    fn held_shield_protects_health(hits in prop::collection::vec(0i32..120, 1..20)) {
        let mut s = duel();
        s.activate_shield(Side::One).unwrap();
        for amount in hits {
            let before = s.character(Side::One).health();
            let outcome = s.take_damage(Side::One, amount, DamageSource::External).unwrap();
            let level = s.character(Side::One).shield_level();
            prop_assert!((0.0..=1.0).contains(&level));
            if outcome.absorbed {
                prop_assert_eq!(s.character(Side::One).health(), before);
            }
        }
    }

    #[test]
    fn charge_curves_are_bounded_and_monotonic(a in 0u64..10_000, b in 0u64..10_000) {
        let config = CombatConfig::default();
        let (short, long) = if a <= b { (a, b) } else { (b, a) };

        let size = charged_size(long, &config);
        let speed = charged_speed(long, &config);
        prop_assert!(size >= config.projectile_min_size && size <= config.projectile_max_size);
        prop_assert!(speed >= config.projectile_min_speed && speed <= config.projectile_max_speed);

        prop_assert!(charged_size(short, &config) <= size);
        prop_assert!(charged_speed(short, &config) >= speed);
    }
}
