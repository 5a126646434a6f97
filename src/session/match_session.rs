//! Per-match world object
//!
//! Owns both characters, the scheduler, the projectile set, the round
//! manager and the event log. All mutation goes through `&mut self`, and
//! time only moves inside `tick()`.

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::ability::{execute_ability, AbilityCatalog, Activation, EffectContext};
use crate::character::{Character, CharacterProfile, CharacterView, DamageOutcome};
use crate::combat::{CombatEvent, CombatEventKind, DamageSource, EventLog};
use crate::core::clock::MatchClock;
use crate::core::config::CombatConfig;
use crate::core::error::{CombatError, Result};
use crate::core::types::{CharacterId, ProjectileId, Side, SimTime, Vec2};
use crate::projectile::{Launch, ProjectileEngine, ProjectileView, RetireReason};
use crate::round::{RoundManager, RoundState};
use crate::scheduler::{ScheduledAction, Scheduler};

pub struct MatchSession {
    pub(crate) config: CombatConfig,
    pub(crate) catalog: Arc<AbilityCatalog>,
    pub(crate) characters: [Character; 2],
    pub(crate) clock: MatchClock,
    pub(crate) scheduler: Scheduler,
    pub(crate) projectiles: ProjectileEngine,
    pub(crate) rounds: RoundManager,
    pub(crate) events: EventLog,
    pub(crate) rng: ChaCha8Rng,
}

impl MatchSession {
    /// Start a match between exactly two fighters, in side order
    pub fn new(
        config: CombatConfig,
        catalog: Arc<AbilityCatalog>,
        participants: Vec<CharacterProfile>,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;

        let count = participants.len();
        let [first, second]: [CharacterProfile; 2] = participants
            .try_into()
            .map_err(|_| CombatError::InvalidParticipants(count))?;

        let characters = [
            Character::new(first, Side::One, &config),
            Character::new(second, Side::Two, &config),
        ];
        let ids = [characters[0].id(), characters[1].id()];
        let rounds = RoundManager::new(config.total_rounds, &ids, config.round_duration_ms)?;

        for character in &characters {
            if !catalog.contains(character.ability()) {
                tracing::warn!(
                    character = character.name(),
                    ability = %character.ability(),
                    "fighter has no catalog ability"
                );
            }
        }

        tracing::info!(
            one = characters[0].name(),
            two = characters[1].name(),
            seed,
            total_rounds = config.total_rounds,
            "match created"
        );

        let mut session = Self {
            clock: MatchClock::new(config.tick_ms),
            config,
            catalog,
            characters,
            scheduler: Scheduler::new(),
            projectiles: ProjectileEngine::new(),
            rounds,
            events: EventLog::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        let round = session.rounds.start_new_round();
        session.events.push(0, CombatEventKind::RoundStarted { round });
        Ok(session)
    }

    // === COMMANDS ===

    /// Begin a basic attack. Returns when the swing lands.
    pub fn perform_attack(&mut self, side: Side) -> Result<SimTime> {
        self.ensure_running()?;
        let now = self.now();
        let attacker = &mut self.characters[side.index()];
        let (sequence, resolves_at) = attacker.begin_attack(now, &self.config)?;
        self.scheduler.schedule(
            resolves_at,
            ScheduledAction::ResolveAttack {
                attacker: attacker.id(),
                sequence,
            },
        );
        Ok(resolves_at)
    }

    pub fn perform_special_ability(&mut self, side: Side) -> Result<Activation> {
        self.ensure_running()?;
        let (user, opponent) = pair_mut(&mut self.characters, side);
        let mut ctx = EffectContext {
            now: self.clock.now(),
            config: &self.config,
            scheduler: &mut self.scheduler,
            rng: &mut self.rng,
            events: &mut self.events,
        };
        execute_ability(&self.catalog, user, opponent, &mut ctx)
    }

    /// Ok(true) if the shield went up, Ok(false) if it already was
    pub fn activate_shield(&mut self, side: Side) -> Result<bool> {
        self.ensure_running()?;
        let now = self.now();
        self.characters[side.index()].activate_shield(now)
    }

    pub fn release_shield(&mut self, side: Side) -> Result<()> {
        self.ensure_running()?;
        self.characters[side.index()].release_shield();
        Ok(())
    }

    /// Ok(true) if charging started, Ok(false) if already charging
    pub fn start_charging(&mut self, side: Side) -> Result<bool> {
        self.ensure_running()?;
        let now = self.now();
        self.characters[side.index()].start_charging(now)
    }

    /// Fire the held charge at the opponent
    pub fn release_charge(&mut self, side: Side) -> Result<ProjectileId> {
        self.ensure_running()?;
        let now = self.now();
        let (shooter, opponent) = pair_mut(&mut self.characters, side);
        let charge_ms = shooter.release_charge(now)?;

        let launch = Launch {
            owner: Some(shooter.id()),
            start: shooter.center(),
            target: opponent.center(),
            charge_ms,
            owner_attack: shooter.attack_power(),
            traits: shooter.traits(),
            facing: facing(side),
        };
        let id = self.projectiles.spawn(&launch, &self.config)?;
        self.events.push(
            now,
            CombatEventKind::ProjectileSpawned {
                projectile: id,
                owner: shooter.id(),
            },
        );
        Ok(id)
    }

    /// Move by an intent vector for one tick. Returns the new position.
    pub fn move_character(&mut self, side: Side, dx: f32, dy: f32) -> Result<Vec2> {
        self.ensure_running()?;
        let dt = self.config.tick_seconds();
        let arena = self.config.arena();
        self.characters[side.index()].move_by(dx, dy, dt, arena)
    }

    /// Apply damage from outside the simulation
    pub fn take_damage(
        &mut self,
        side: Side,
        amount: i32,
        source: DamageSource,
    ) -> Result<DamageOutcome> {
        self.ensure_running()?;
        Ok(self.apply_damage(side, amount, source))
    }

    // === QUERIES ===

    pub fn character(&self, side: Side) -> &Character {
        &self.characters[side.index()]
    }

    pub fn snapshot(&self, side: Side) -> CharacterView {
        CharacterView::capture(self.character(side), self.now())
    }

    pub fn projectiles(&self) -> Vec<ProjectileView> {
        self.projectiles.views()
    }

    pub fn round_state(&self) -> RoundState {
        self.rounds.state()
    }

    pub fn is_finished(&self) -> bool {
        self.rounds.is_finished()
    }

    /// `None` while in progress or after a drawn match
    pub fn match_winner(&self) -> Option<Side> {
        self.rounds.match_winner()
    }

    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    pub fn current_tick(&self) -> u64 {
        self.clock.current_tick()
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn catalog(&self) -> &AbilityCatalog {
        &self.catalog
    }

    /// Scheduled actions not yet fired
    pub fn pending_actions(&self) -> usize {
        self.scheduler.pending_count()
    }

    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        self.events.drain()
    }

    pub fn side_of(&self, id: CharacterId) -> Option<Side> {
        self.rounds.side_of(id)
    }

    // === INTERNALS ===

    fn ensure_running(&self) -> Result<()> {
        if self.rounds.is_finished() {
            return Err(CombatError::MatchFinished);
        }
        Ok(())
    }

    /// Single entry point for health changes caused by damage
    pub(crate) fn apply_damage(
        &mut self,
        side: Side,
        amount: i32,
        source: DamageSource,
    ) -> DamageOutcome {
        let now = self.clock.now();
        let target = &mut self.characters[side.index()];
        let outcome = target.take_damage(amount, now, &self.config);
        let id = target.id();

        if outcome.absorbed {
            self.events.push(
                now,
                CombatEventKind::DamageAbsorbed {
                    target: id,
                    amount,
                    source,
                },
            );
        } else if outcome.health_lost > 0 {
            self.events.push(
                now,
                CombatEventKind::DamageApplied {
                    target: id,
                    amount: outcome.health_lost,
                    source,
                },
            );
        }

        if outcome.shield_broken {
            self.events
                .push(now, CombatEventKind::ShieldBroken { character: id });
        }

        if outcome.defeated {
            let cancelled = self.scheduler.cancel_owned_by(id);
            tracing::info!(?side, cancelled, at = now, "character defeated");
            self.events
                .push(now, CombatEventKind::CharacterDefeated { character: id });
        }

        outcome
    }

    /// Restore both fighters and drop everything in flight
    pub(crate) fn reset_round(&mut self) {
        self.scheduler.clear();
        self.clear_projectiles();
        for character in &mut self.characters {
            character.reset_for_round(&self.config);
        }
    }

    /// Retire everything in flight, reporting each projectile as cleared
    pub(crate) fn clear_projectiles(&mut self) {
        let now = self.clock.now();
        for projectile in self.projectiles.clear() {
            self.events.push(
                now,
                CombatEventKind::ProjectileRetired {
                    projectile,
                    reason: RetireReason::Cleared,
                },
            );
        }
    }
}

/// Borrow the acting character and their opponent at once
pub(crate) fn pair_mut(
    characters: &mut [Character; 2],
    side: Side,
) -> (&mut Character, &mut Character) {
    let (first, second) = characters.split_at_mut(1);
    match side {
        Side::One => (&mut first[0], &mut second[0]),
        Side::Two => (&mut second[0], &mut first[0]),
    }
}

/// Default shot direction when the opponent is exactly on top of the shooter
fn facing(side: Side) -> Vec2 {
    match side {
        Side::One => Vec2::new(1.0, 0.0),
        Side::Two => Vec2::new(-1.0, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Rejection;

    fn session(one: CharacterProfile, two: CharacterProfile) -> MatchSession {
        MatchSession::new(
            CombatConfig::default(),
            Arc::new(AbilityCatalog::standard()),
            vec![one, two],
            42,
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_wrong_participant_count() {
        let result = MatchSession::new(
            CombatConfig::default(),
            Arc::new(AbilityCatalog::standard()),
            vec![CharacterProfile::volt()],
            1,
        );
        assert!(matches!(result, Err(CombatError::InvalidParticipants(1))));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = CombatConfig {
            tick_ms: 0,
            ..CombatConfig::default()
        };
        let result = MatchSession::new(
            config,
            Arc::new(AbilityCatalog::standard()),
            vec![CharacterProfile::volt(), CharacterProfile::amber()],
            1,
        );
        assert!(matches!(result, Err(CombatError::Config(_))));
    }

    #[test]
    fn test_attack_rejected_while_busy() {
        let mut s = session(CharacterProfile::volt(), CharacterProfile::amber());
        assert_eq!(s.perform_attack(Side::One).unwrap(), 200);
        assert!(matches!(
            s.perform_attack(Side::One),
            Err(CombatError::InvalidState(Rejection::Busy))
        ));
    }

    #[test]
    fn test_release_without_charge_spawns_nothing() {
        let mut s = session(CharacterProfile::volt(), CharacterProfile::amber());
        assert!(matches!(
            s.release_charge(Side::One),
            Err(CombatError::NotCharging)
        ));
        assert!(s.projectiles().is_empty());
    }

    #[test]
    fn test_release_charge_aims_at_opponent() {
        let mut s = session(CharacterProfile::volt(), CharacterProfile::amber());
        s.start_charging(Side::Two).unwrap();
        let id = s.release_charge(Side::Two).unwrap();

        let shot = s.projectiles.get(id).unwrap();
        assert_eq!(shot.direction(), Vec2::new(-1.0, 0.0));
        assert_eq!(shot.owner(), s.character(Side::Two).id());
    }

    #[test]
    fn test_external_damage_emits_event() {
        let mut s = session(CharacterProfile::volt(), CharacterProfile::amber());
        s.drain_events();
        let outcome = s
            .take_damage(Side::Two, 100, DamageSource::External)
            .unwrap();
        assert_eq!(outcome.health_lost, 100);
        assert_eq!(s.character(Side::Two).health(), 800);

        let events = s.drain_events();
        assert!(matches!(
            events[0].kind,
            CombatEventKind::DamageApplied { amount: 100, .. }
        ));
    }

    #[test]
    fn test_pair_mut_orders_by_side() {
        let mut s = session(CharacterProfile::volt(), CharacterProfile::amber());
        let (me, them) = pair_mut(&mut s.characters, Side::Two);
        assert_eq!(me.name(), "Amber");
        assert_eq!(them.name(), "Volt");
    }
}
