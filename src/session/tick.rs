//! The fixed-step tick pipeline
//!
//! clock -> scheduled actions -> shields -> projectiles -> round check
//!
//! Scheduled actions are drained into a batch and applied here, at one
//! fixed point, so nothing ever mutates a character outside the tick.

use rand::Rng;

use crate::ability::{apply_directive, Directive, EffectContext};
use crate::character::{Stat, StatValue};
use crate::combat::{
    lifesteal_amount, projectile_damage, resolve_basic_attack, AttackRoll, CombatEventKind,
    DamageSource,
};
use crate::core::types::{CharacterId, Side};
use crate::projectile::{CharacterHit, HitTarget};
use crate::round::{RoundManager, RoundOutcome};
use crate::scheduler::ScheduledAction;
use crate::session::match_session::{pair_mut, MatchSession};

impl MatchSession {
    /// Advance the match by one fixed tick
    ///
    /// Returns the round outcome if a round ended during this tick. A
    /// finished match does not advance.
    pub fn tick(&mut self) -> Option<RoundOutcome> {
        if self.rounds.is_finished() {
            return None;
        }

        self.clock.advance();
        let timer_expired = self.rounds.tick_timer(self.clock.tick_ms());

        let now = self.clock.now();
        for action in self.scheduler.drain_due(now) {
            self.apply_action(action);
        }

        self.update_shields();
        self.update_projectiles();

        self.check_round_end(timer_expired)
    }

    /// Run ticks until the match ends or `max_ticks` have passed
    pub fn run_until_finished(&mut self, max_ticks: u64) -> u64 {
        let mut ticks = 0;
        while ticks < max_ticks && !self.is_finished() {
            self.tick();
            ticks += 1;
        }
        ticks
    }

    fn apply_action(&mut self, action: ScheduledAction) {
        let now = self.clock.now();
        let Some(side) = self.side_of(action.target()) else {
            return;
        };

        match action {
            ScheduledAction::RevertStat { target, stat, value } => {
                self.characters[side.index()].set_stat(stat, value);
                self.events
                    .push(now, CombatEventKind::EffectExpired { target, stat });
                if stat == Stat::Stunned && value == StatValue::Flag(false) {
                    self.events
                        .push(now, CombatEventKind::StunLifted { target });
                }
            }
            ScheduledAction::DamageTick { source, amount, .. } => {
                self.apply_damage(side, amount, source);
            }
            ScheduledAction::HealTick { target, amount } => {
                let healed = self.characters[side.index()].heal(amount);
                if healed > 0 {
                    self.events.push(
                        now,
                        CombatEventKind::Healed {
                            target,
                            amount: healed,
                        },
                    );
                }
            }
            ScheduledAction::ResolveAttack { sequence, .. } => {
                self.resolve_melee(side, sequence);
            }
            ScheduledAction::EndRecovery { sequence, .. } => {
                self.characters[side.index()].end_recovery(sequence);
            }
        }
    }

    /// Wind-up finished: roll the swing against the opponent
    fn resolve_melee(&mut self, side: Side, sequence: u64) {
        let now = self.clock.now();
        let (attacker, defender) = pair_mut(&mut self.characters, side);

        // Stale after a stun or a round reset
        let Some(recovery_ends) = attacker.land_attack(sequence, now, &self.config) else {
            return;
        };
        let attacker_id = attacker.id();
        self.scheduler.schedule(
            recovery_ends,
            ScheduledAction::EndRecovery {
                attacker: attacker_id,
                sequence,
            },
        );

        let in_range =
            attacker.center().distance(&defender.center()) <= self.config.melee_range;
        if !in_range || defender.is_disabled() {
            self.events.push(
                now,
                CombatEventKind::AttackWhiffed {
                    attacker: attacker_id,
                },
            );
            return;
        }

        let roll: f32 = self.rng.gen();
        if roll < self.config.miss_threshold {
            self.events.push(
                now,
                CombatEventKind::AttackWhiffed {
                    attacker: attacker_id,
                },
            );
            return;
        }

        // Bonus goes to the first swing that connects
        let bonus = attacker.consume_next_hit_bonus();
        if bonus > 0 {
            self.scheduler.take_reversion(attacker_id, Stat::NextHitBonus);
        }

        let result = resolve_basic_attack(
            attacker.attack_power() + bonus,
            defender.defense_power(),
            defender.defense_multiplier(),
            roll,
            &self.config,
        );
        if result.roll == AttackRoll::Critical {
            tracing::debug!(attacker = attacker.name(), damage = result.damage, "critical hit");
        }

        self.apply_damage(
            side.opponent(),
            result.damage,
            DamageSource::Melee {
                attacker: attacker_id,
            },
        );
    }

    fn update_shields(&mut self) {
        let now = self.clock.now();
        for character in &mut self.characters {
            if character.tick_shield(now, &self.config) {
                self.events.push(
                    now,
                    CombatEventKind::ShieldBroken {
                        character: character.id(),
                    },
                );
            }
        }
    }

    fn update_projectiles(&mut self) {
        let now = self.clock.now();
        self.projectiles.advance(self.config.tick_seconds());

        let mut retired = self.projectiles.retire_out_of_bounds(self.config.arena());
        retired.extend(self.projectiles.resolve_projectile_collisions());
        for (projectile, reason) in retired {
            self.events.push(
                now,
                CombatEventKind::ProjectileRetired {
                    projectile: projectile.id(),
                    reason,
                },
            );
        }

        let targets: Vec<HitTarget> = self
            .characters
            .iter()
            .map(|c| HitTarget {
                id: c.id(),
                hit_box: c.hit_box(),
                shield_active: c.is_shield_active(),
                disabled: c.is_disabled(),
            })
            .collect();
        for mut hit in self.projectiles.collect_character_hits(&targets, &self.config) {
            // An earlier hit this tick may have broken the shield
            if hit.blocked && !self.shield_up(hit.target) {
                hit.blocked = false;
            }
            self.events.push(
                now,
                CombatEventKind::ProjectileRetired {
                    projectile: hit.projectile.id(),
                    reason: hit.reason(),
                },
            );
            self.apply_projectile_hit(hit);
        }
    }

    fn shield_up(&self, id: CharacterId) -> bool {
        self.side_of(id)
            .is_some_and(|side| self.characters[side.index()].is_shield_active())
    }

    fn apply_projectile_hit(&mut self, hit: CharacterHit) {
        let (Some(target_side), Some(owner_side)) =
            (self.side_of(hit.target), self.side_of(hit.projectile.owner()))
        else {
            return;
        };
        let projectile = &hit.projectile;
        let source = DamageSource::Projectile {
            owner: projectile.owner(),
            projectile: projectile.id(),
        };

        if hit.blocked {
            // The bubble soaks the full power
            self.apply_damage(target_side, projectile.power(), source);
            return;
        }

        let target = &self.characters[target_side.index()];
        let damage = projectile_damage(
            projectile.power(),
            target.defense_power(),
            target.defense_multiplier(),
            &self.config,
        );
        let outcome = self.apply_damage(target_side, damage, source);
        if outcome.health_lost == 0 {
            return;
        }

        if projectile.is_burning() && !outcome.defeated {
            let burn = Directive::DamageOverTime {
                per_tick: self.config.burn_damage_per_tick,
                tick_count: self.config.burn_tick_count,
                interval_ms: self.config.burn_interval_ms,
            };
            let (owner, target) = pair_mut(&mut self.characters, owner_side);
            let mut ctx = EffectContext {
                now: self.clock.now(),
                config: &self.config,
                scheduler: &mut self.scheduler,
                rng: &mut self.rng,
                events: &mut self.events,
            };
            apply_directive(&burn, owner, target, &mut ctx);
        }

        if projectile.is_lifesteal() {
            let amount = lifesteal_amount(outcome.health_lost, &self.config);
            let owner = &mut self.characters[owner_side.index()];
            let healed = owner.heal(amount);
            if healed > 0 {
                let owner_id = owner.id();
                self.events.push(
                    self.clock.now(),
                    CombatEventKind::Healed {
                        target: owner_id,
                        amount: healed,
                    },
                );
            }
        }
    }

    /// Defeat ends a round before the timer does
    fn check_round_end(&mut self, timer_expired: bool) -> Option<RoundOutcome> {
        let down = [
            self.characters[0].is_disabled(),
            self.characters[1].is_disabled(),
        ];

        let winner = match down {
            [true, true] => None,
            [true, false] => Some(Side::Two),
            [false, true] => Some(Side::One),
            [false, false] if timer_expired => {
                RoundManager::determine_timeout_winner(&self.characters[0], &self.characters[1])
            }
            [false, false] => return None,
        };

        Some(self.finish_round(winner))
    }

    fn finish_round(&mut self, winner: Option<Side>) -> RoundOutcome {
        let now = self.clock.now();
        let round = self.rounds.current_round();
        self.events
            .push(now, CombatEventKind::RoundEnded { round, winner });

        let outcome = self.rounds.end_round(winner);
        match outcome {
            RoundOutcome::NextRound { round } => {
                self.reset_round();
                self.events.push(now, CombatEventKind::RoundStarted { round });
            }
            RoundOutcome::MatchOver { winner } => {
                // Nothing may fire after the match ends
                self.scheduler.clear();
                self.clear_projectiles();
                self.events.push(now, CombatEventKind::MatchEnded { winner });
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ability::AbilityCatalog;
    use crate::character::CharacterProfile;
    use crate::core::config::CombatConfig;
    use crate::core::types::Vec2;

    fn session_with(
        config: CombatConfig,
        one: CharacterProfile,
        two: CharacterProfile,
    ) -> MatchSession {
        MatchSession::new(config, Arc::new(AbilityCatalog::standard()), vec![one, two], 9).unwrap()
    }

    fn adjacent(config: &CombatConfig) -> CombatConfig {
        CombatConfig {
            start_positions: [Vec2::new(280.0, 200.0), Vec2::new(320.0, 200.0)],
            ..config.clone()
        }
    }

    #[test]
    fn test_clock_advances_one_step() {
        let mut s = session_with(
            CombatConfig::default(),
            CharacterProfile::volt(),
            CharacterProfile::amber(),
        );
        s.tick();
        s.tick();
        assert_eq!(s.now(), 32);
        assert_eq!(s.round_state().time_remaining_ms, 200_000 - 32);
    }

    #[test]
    fn test_out_of_range_swing_whiffs() {
        let mut s = session_with(
            CombatConfig::default(),
            CharacterProfile::volt(),
            CharacterProfile::amber(),
        );
        s.perform_attack(Side::One).unwrap();
        for _ in 0..13 {
            s.tick();
        }
        assert_eq!(s.character(Side::Two).health(), 900);
        assert!(s
            .drain_events()
            .iter()
            .any(|e| matches!(e.kind, CombatEventKind::AttackWhiffed { .. })));
    }

    #[test]
    fn test_swing_cycle_returns_to_idle() {
        let config = adjacent(&CombatConfig::default());
        let mut s = session_with(config, CharacterProfile::volt(), CharacterProfile::amber());
        s.perform_attack(Side::One).unwrap();

        // 200ms wind-up + 300ms end lag
        for _ in 0..40 {
            s.tick();
        }
        assert!(!s.character(Side::One).is_attacking());
        assert!(s.perform_attack(Side::One).is_ok());
    }

    #[test]
    fn test_stun_interrupts_windup_without_damage() {
        let config = adjacent(&CombatConfig::default());
        let mut s = session_with(config, CharacterProfile::volt(), CharacterProfile::amber());

        s.perform_attack(Side::Two).unwrap();
        // Volt's Electric Burst stuns Amber mid-swing
        s.perform_special_ability(Side::One).unwrap();
        for _ in 0..20 {
            s.tick();
        }
        assert_eq!(s.character(Side::One).health(), 624);
        assert!(s.character(Side::Two).is_stunned());
    }

    #[test]
    fn test_stun_lifts_after_duration() {
        let mut s = session_with(
            CombatConfig::default(),
            CharacterProfile::volt(),
            CharacterProfile::amber(),
        );
        s.perform_special_ability(Side::One).unwrap();
        while s.now() < 2000 {
            s.tick();
        }
        assert!(!s.character(Side::Two).is_stunned());
        assert!(s
            .drain_events()
            .iter()
            .any(|e| matches!(e.kind, CombatEventKind::StunLifted { .. })));
    }

    #[test]
    fn test_defeat_ends_round_and_resets() {
        let mut s = session_with(
            CombatConfig::default(),
            CharacterProfile::volt(),
            CharacterProfile::amber(),
        );
        s.take_damage(Side::Two, 10_000, DamageSource::External).unwrap();
        assert_eq!(s.tick(), Some(RoundOutcome::NextRound { round: 2 }));

        let state = s.round_state();
        assert_eq!(state.wins, [1, 0]);
        assert_eq!(s.character(Side::Two).health(), 900);
        assert!(!s.character(Side::Two).is_disabled());
    }

    #[test]
    fn test_timeout_awards_healthier_side() {
        let config = CombatConfig {
            round_duration_ms: 160,
            ..CombatConfig::default()
        };
        let mut s = session_with(config, CharacterProfile::volt(), CharacterProfile::amber());
        s.take_damage(Side::Two, 500, DamageSource::External).unwrap();

        let mut outcome = None;
        for _ in 0..10 {
            outcome = s.tick();
        }
        assert_eq!(outcome, Some(RoundOutcome::NextRound { round: 2 }));
        assert_eq!(s.round_state().wins, [1, 0]);
    }

    #[test]
    fn test_equal_health_timeout_is_a_draw() {
        let config = CombatConfig {
            round_duration_ms: 16,
            ..CombatConfig::default()
        };
        let mut s = session_with(config, CharacterProfile::amber(), CharacterProfile::amber());
        assert_eq!(s.tick(), Some(RoundOutcome::NextRound { round: 2 }));
        assert_eq!(s.round_state().wins, [0, 0]);
    }

    #[test]
    fn test_finished_match_stops_ticking() {
        let config = CombatConfig {
            total_rounds: 1,
            ..CombatConfig::default()
        };
        let mut s = session_with(config, CharacterProfile::volt(), CharacterProfile::amber());
        s.take_damage(Side::One, 10_000, DamageSource::External).unwrap();
        assert_eq!(
            s.tick(),
            Some(RoundOutcome::MatchOver {
                winner: Some(Side::Two)
            })
        );
        assert!(s.is_finished());
        assert_eq!(s.match_winner(), Some(Side::Two));

        let now = s.now();
        assert_eq!(s.tick(), None);
        assert_eq!(s.now(), now);
        assert!(s.perform_attack(Side::Two).is_err());
    }
}
