//! Ability execution
//!
//! Every timed directive follows capture, mutate, schedule-restore. A slot
//! that already has an outstanding reversion is refreshed: the pending
//! restore is cancelled and its captured base is put back before the new
//! capture, so stacked uses never drift the base value.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::ability::catalog::{AbilityCatalog, AbilityId};
use crate::ability::directive::{Directive, EffectTarget, HealAmount};
use crate::character::{Character, Stat, StatModifier, StatValue};
use crate::combat::{CombatEventKind, DamageSource, EventLog};
use crate::core::config::CombatConfig;
use crate::core::error::{CombatError, Rejection, Result};
use crate::core::types::{SimTime, Vec2};
use crate::scheduler::{ScheduledAction, Scheduler};

/// Session state an ability may touch
pub struct EffectContext<'a> {
    pub now: SimTime,
    pub config: &'a CombatConfig,
    pub scheduler: &'a mut Scheduler,
    pub rng: &'a mut ChaCha8Rng,
    pub events: &'a mut EventLog,
}

/// Summary of a successful activation
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    pub ability: AbilityId,
    pub name: String,
    pub cooldown_ms: u64,
    pub directives_applied: usize,
}

/// Run the user's ability against the opponent
pub fn execute_ability(
    catalog: &AbilityCatalog,
    user: &mut Character,
    opponent: &mut Character,
    ctx: &mut EffectContext<'_>,
) -> Result<Activation> {
    let Some(ability) = catalog.get(user.ability()) else {
        tracing::warn!(
            character = user.name(),
            ability = %user.ability(),
            "ability not in catalog"
        );
        return Err(CombatError::UnknownAbility(user.ability().clone()));
    };

    let remaining_ms = user.remaining_cooldown(ctx.now);
    if remaining_ms > 0 {
        return Err(CombatError::OnCooldown { remaining_ms });
    }
    if user.is_disabled() {
        return Err(CombatError::InvalidState(Rejection::Disabled));
    }
    if user.is_stunned() {
        return Err(CombatError::InvalidState(Rejection::Stunned));
    }

    // Cooldown first so nothing below can re-enter the same activation
    user.trigger_cooldown(ctx.now, ability.cooldown_ms);

    for directive in &ability.directives {
        apply_directive(directive, user, opponent, ctx);
    }

    tracing::info!(
        character = user.name(),
        ability = %ability.id,
        at = ctx.now,
        "ability used"
    );
    ctx.events.push(
        ctx.now,
        CombatEventKind::AbilityUsed {
            user: user.id(),
            name: ability.name.clone(),
        },
    );

    Ok(Activation {
        ability: ability.id.clone(),
        name: ability.name.clone(),
        cooldown_ms: ability.cooldown_ms,
        directives_applied: ability.directives.len(),
    })
}

/// Apply one directive. Also used for on-hit projectile effects.
pub fn apply_directive(
    directive: &Directive,
    user: &mut Character,
    opponent: &mut Character,
    ctx: &mut EffectContext<'_>,
) {
    match directive {
        Directive::StatBoost {
            target,
            stat,
            modifier,
            duration_ms,
        } => {
            let character = pick(*target, user, opponent);
            let modifier = *modifier;
            apply_timed(character, *stat, |base| base.modified(modifier), *duration_ms, ctx);
        }

        Directive::OpponentStun { duration_ms } => {
            if opponent.is_disabled() {
                return;
            }
            apply_timed(opponent, Stat::Stunned, |_| StatValue::Flag(true), *duration_ms, ctx);
            ctx.events.push(ctx.now, CombatEventKind::Stunned { target: opponent.id() });
        }

        Directive::DamageOverTime {
            per_tick,
            tick_count,
            interval_ms,
        } => {
            let source = DamageSource::Burn { source: user.id() };
            for step in 1..=u64::from(*tick_count) {
                ctx.scheduler.schedule(
                    ctx.now.saturating_add(step.saturating_mul(*interval_ms)),
                    ScheduledAction::DamageTick {
                        target: opponent.id(),
                        source,
                        amount: *per_tick,
                    },
                );
            }
        }

        Directive::Teleport => {
            let destination = random_arena_point(ctx);
            user.place_within(destination, ctx.config.arena());
        }

        Directive::GradualHeal {
            target,
            amount,
            duration_ms,
            steps,
        } => {
            if *steps == 0 {
                return;
            }
            let character = pick(*target, user, opponent);
            let total = match amount {
                HealAmount::Flat(points) => *points,
                HealAmount::FractionOfMax(fraction) => {
                    (character.max_health() as f32 * fraction) as i32
                }
            };
            let per_step = total / *steps as i32;
            let spacing = duration_ms / u64::from(*steps);
            for step in 1..=u64::from(*steps) {
                ctx.scheduler.schedule(
                    ctx.now.saturating_add(step.saturating_mul(spacing)),
                    ScheduledAction::HealTick {
                        target: character.id(),
                        amount: per_step,
                    },
                );
            }
        }

        Directive::Invisibility { duration_ms } => {
            apply_timed(user, Stat::Invisible, |_| StatValue::Flag(true), *duration_ms, ctx);
        }

        Directive::NextHitBonus {
            target,
            bonus,
            expires_after_ms,
        } => {
            let character = pick(*target, user, opponent);
            let delta = StatModifier::Delta(*bonus as f32);
            apply_timed(
                character,
                Stat::NextHitBonus,
                |base| base.modified(delta),
                *expires_after_ms,
                ctx,
            );
        }
    }
}

fn pick<'c>(
    target: EffectTarget,
    user: &'c mut Character,
    opponent: &'c mut Character,
) -> &'c mut Character {
    match target {
        EffectTarget::User => user,
        EffectTarget::Opponent => opponent,
    }
}

/// Capture, mutate and schedule the restore, refreshing an outstanding slot
fn apply_timed(
    character: &mut Character,
    stat: Stat,
    change: impl FnOnce(StatValue) -> StatValue,
    duration_ms: u64,
    ctx: &mut EffectContext<'_>,
) {
    let base = match ctx.scheduler.take_reversion(character.id(), stat) {
        Some(captured) => {
            character.set_stat(stat, captured);
            captured
        }
        None => character.stat_value(stat),
    };

    character.set_stat(stat, change(base));
    ctx.scheduler
        .schedule_reversion(ctx.now.saturating_add(duration_ms), character.id(), stat, base);
}

/// Random top-left corner keeping the whole hit box inside the margin
fn random_arena_point(ctx: &mut EffectContext<'_>) -> Vec2 {
    let config = ctx.config;
    let x = margin_draw(config.arena_width, config, &mut *ctx.rng);
    let y = margin_draw(config.arena_height, config, &mut *ctx.rng);
    Vec2::new(x, y)
}

fn margin_draw(extent: f32, config: &CombatConfig, rng: &mut ChaCha8Rng) -> f32 {
    let low = config.teleport_margin;
    let high = extent - config.teleport_margin - config.character_size;
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::CharacterProfile;
    use crate::core::types::Side;
    use rand::SeedableRng;

    struct Fixture {
        config: CombatConfig,
        scheduler: Scheduler,
        rng: ChaCha8Rng,
        events: EventLog,
        catalog: AbilityCatalog,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                config: CombatConfig::default(),
                scheduler: Scheduler::new(),
                rng: ChaCha8Rng::seed_from_u64(7),
                events: EventLog::new(),
                catalog: AbilityCatalog::standard(),
            }
        }

        fn pair(&self, user: CharacterProfile, opponent: CharacterProfile) -> (Character, Character) {
            (
                Character::new(user, Side::One, &self.config),
                Character::new(opponent, Side::Two, &self.config),
            )
        }

        fn cast(&mut self, user: &mut Character, opponent: &mut Character, now: SimTime) -> Result<Activation> {
            let mut ctx = EffectContext {
                now,
                config: &self.config,
                scheduler: &mut self.scheduler,
                rng: &mut self.rng,
                events: &mut self.events,
            };
            execute_ability(&self.catalog, user, opponent, &mut ctx)
        }
    }

    #[test]
    fn test_flame_rush_doubles_attack_and_schedules_restore() {
        let mut fx = Fixture::new();
        let (mut blaze, mut aqua) = fx.pair(CharacterProfile::blaze(), CharacterProfile::aqua());

        let activation = fx.cast(&mut blaze, &mut aqua, 1000).unwrap();
        assert_eq!(activation.name, "Flame Rush");
        assert_eq!(blaze.attack_power(), 136);
        assert!(fx.scheduler.has_reversion(blaze.id(), Stat::AttackPower));
        assert_eq!(fx.scheduler.next_due(), Some(7000));
        assert!(!blaze.can_use_special_ability(1000));
    }

    #[test]
    fn test_second_use_reports_remaining_cooldown() {
        let mut fx = Fixture::new();
        let (mut blaze, mut aqua) = fx.pair(CharacterProfile::blaze(), CharacterProfile::aqua());

        fx.cast(&mut blaze, &mut aqua, 0).unwrap();
        let second = fx.cast(&mut blaze, &mut aqua, 4000);
        assert!(matches!(second, Err(CombatError::OnCooldown { remaining_ms: 6000 })));
        assert_eq!(blaze.attack_power(), 136);
    }

    #[test]
    fn test_unknown_ability_applies_nothing() {
        let mut fx = Fixture::new();
        let profile = CharacterProfile::new("Nobody", 500, 50, 50, "does_not_exist");
        let (mut user, mut aqua) = fx.pair(profile, CharacterProfile::aqua());

        let result = fx.cast(&mut user, &mut aqua, 0);
        assert!(matches!(result, Err(CombatError::UnknownAbility(_))));
        assert!(user.can_use_special_ability(0));
        assert_eq!(fx.scheduler.pending_count(), 0);
        assert!(fx.events.is_empty());
    }

    #[test]
    fn test_stunned_user_cannot_cast() {
        let mut fx = Fixture::new();
        let (mut blaze, mut aqua) = fx.pair(CharacterProfile::blaze(), CharacterProfile::aqua());
        blaze.set_stunned(true);

        assert!(matches!(
            fx.cast(&mut blaze, &mut aqua, 0),
            Err(CombatError::InvalidState(Rejection::Stunned))
        ));
        // Rejected casts do not start the cooldown
        assert_eq!(blaze.remaining_cooldown(0), 0);
    }

    #[test]
    fn test_electric_burst_stuns_opponent() {
        let mut fx = Fixture::new();
        let (mut volt, mut amber) = fx.pair(CharacterProfile::volt(), CharacterProfile::amber());

        fx.cast(&mut volt, &mut amber, 0).unwrap();
        assert!(amber.is_stunned());
        // 93 * 1.1 = 102.3
        assert_eq!(volt.attack_power(), 102);
        assert!((volt.movement_speed() - 132.0).abs() < 0.01);
        assert!(fx.scheduler.has_reversion(amber.id(), Stat::Stunned));
    }

    #[test]
    fn test_refresh_restores_original_base() {
        let mut fx = Fixture::new();
        let (mut blaze, mut aqua) = fx.pair(CharacterProfile::blaze(), CharacterProfile::aqua());
        let mut ctx = EffectContext {
            now: 0,
            config: &fx.config,
            scheduler: &mut fx.scheduler,
            rng: &mut fx.rng,
            events: &mut fx.events,
        };
        let boost = Directive::StatBoost {
            target: EffectTarget::User,
            stat: Stat::AttackPower,
            modifier: StatModifier::Factor(2.0),
            duration_ms: 6000,
        };

        apply_directive(&boost, &mut blaze, &mut aqua, &mut ctx);
        ctx.now = 3000;
        apply_directive(&boost, &mut blaze, &mut aqua, &mut ctx);

        // Refreshed from the original 68, not compounded to 272
        assert_eq!(blaze.attack_power(), 136);
        assert_eq!(
            fx.scheduler.take_reversion(blaze.id(), Stat::AttackPower),
            Some(StatValue::Int(68))
        );
    }

    #[test]
    fn test_gradual_heal_schedules_steps() {
        let mut fx = Fixture::new();
        let (mut terra, mut volt) = fx.pair(CharacterProfile::terra(), CharacterProfile::volt());

        fx.cast(&mut terra, &mut volt, 0).unwrap();
        let fired = fx.scheduler.drain_due(10_000);
        assert_eq!(fired.len(), 10);
        // floor(1054 * 0.04) = 42, 4 per step
        assert!(fired.iter().all(|action| matches!(
            action,
            ScheduledAction::HealTick { amount: 4, .. }
        )));
    }

    #[test]
    fn test_damage_over_time_schedules_each_tick() {
        let mut fx = Fixture::new();
        let (mut blaze, mut aqua) = fx.pair(CharacterProfile::blaze(), CharacterProfile::aqua());
        let mut ctx = EffectContext {
            now: 500,
            config: &fx.config,
            scheduler: &mut fx.scheduler,
            rng: &mut fx.rng,
            events: &mut fx.events,
        };
        let burn = Directive::DamageOverTime {
            per_tick: 5,
            tick_count: 3,
            interval_ms: 1000,
        };
        apply_directive(&burn, &mut blaze, &mut aqua, &mut ctx);

        assert_eq!(fx.scheduler.next_due(), Some(1500));
        assert_eq!(fx.scheduler.drain_due(3500).len(), 3);
    }

    #[test]
    fn test_teleport_stays_inside_margin() {
        let mut fx = Fixture::new();
        let (mut shade, mut amber) = fx.pair(CharacterProfile::shade(), CharacterProfile::amber());

        fx.cast(&mut shade, &mut amber, 0).unwrap();
        let landed = shade.position();
        assert!((25.0..=545.0).contains(&landed.x));
        assert!((25.0..=345.0).contains(&landed.y));
        assert_eq!(shade.next_hit_bonus(), 15);
    }

    #[test]
    fn test_teleport_moves_on_both_axes() {
        let mut fx = Fixture::new();
        let (mut shade, mut amber) = fx.pair(CharacterProfile::shade(), CharacterProfile::amber());
        let start = shade.position();

        let mut heights = Vec::new();
        for cast in 0..8u64 {
            fx.cast(&mut shade, &mut amber, cast * 10_000).unwrap();
            heights.push(shade.position().y);
        }
        assert!(heights.iter().any(|y| *y != start.y));
        assert!(heights.windows(2).any(|pair| pair[0] != pair[1]));
    }

    #[test]
    fn test_shadow_strike_turns_invisible() {
        let mut fx = Fixture::new();
        let (mut night, mut amber) = fx.pair(CharacterProfile::night(), CharacterProfile::amber());

        fx.cast(&mut night, &mut amber, 0).unwrap();
        assert!(night.is_invisible());
        assert_eq!(night.next_hit_bonus(), 20);
        assert_eq!(fx.events.len(), 1);
    }
}
