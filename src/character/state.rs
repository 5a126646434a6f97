//! Character combat state
//!
//! One owned record per fighter. Queries are public; every mutator is
//! crate-private so the session's command API is the only way in.

use serde::{Deserialize, Serialize};

use crate::ability::AbilityId;
use crate::character::attack::{AttackPhase, AttackState};
use crate::character::cooldown::Cooldown;
use crate::character::profile::{CharacterProfile, CharacterTraits};
use crate::character::shield::ShieldState;
use crate::character::stats::{Stat, StatValue};
use crate::core::config::CombatConfig;
use crate::core::error::{CombatError, Rejection, Result};
use crate::core::types::{CharacterId, Rect, Side, SimTime, Vec2};

/// What a single damage application did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Health actually removed
    pub health_lost: i32,
    /// The shield soaked the hit
    pub absorbed: bool,
    pub shield_broken: bool,
    /// This hit took health to zero
    pub defeated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    id: CharacterId,
    side: Side,
    profile: CharacterProfile,

    health: i32,
    attack_power: i32,
    defense_power: i32,
    defense_multiplier: f32,
    movement_multiplier: f32,
    attack_speed_multiplier: f32,
    next_hit_bonus: i32,

    /// Top-left corner of the hit box
    position: Vec2,
    size: f32,

    shield: ShieldState,
    attack: AttackState,
    cooldown: Cooldown,
    charge_started_at: Option<SimTime>,

    stunned: bool,
    /// Set on defeat, cleared at the next round
    disabled: bool,
    invisible: bool,
}

impl Character {
    pub fn new(profile: CharacterProfile, side: Side, config: &CombatConfig) -> Self {
        Self {
            id: CharacterId::new(),
            side,
            health: profile.max_health,
            attack_power: profile.attack_power,
            defense_power: profile.defense_power,
            defense_multiplier: 1.0,
            movement_multiplier: 1.0,
            attack_speed_multiplier: 1.0,
            next_hit_bonus: 0,
            position: config.start_positions[side.index()],
            size: config.character_size,
            shield: ShieldState::default(),
            attack: AttackState::new(),
            cooldown: Cooldown::default(),
            charge_started_at: None,
            stunned: false,
            disabled: false,
            invisible: false,
            profile,
        }
    }

    // === QUERIES ===

    pub fn id(&self) -> CharacterId {
        self.id
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn profile(&self) -> &CharacterProfile {
        &self.profile
    }

    pub fn traits(&self) -> CharacterTraits {
        self.profile.traits
    }

    pub fn ability(&self) -> &AbilityId {
        &self.profile.ability
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_health(&self) -> i32 {
        self.profile.max_health
    }

    /// Remaining health on a 0..=100 scale
    pub fn health_percentage(&self) -> f32 {
        if self.profile.max_health <= 0 {
            return 0.0;
        }
        self.health as f32 / self.profile.max_health as f32 * 100.0
    }

    pub fn attack_power(&self) -> i32 {
        self.attack_power
    }

    pub fn defense_power(&self) -> i32 {
        self.defense_power
    }

    pub fn defense_multiplier(&self) -> f32 {
        self.defense_multiplier
    }

    /// Effective speed in units per second
    pub fn movement_speed(&self) -> f32 {
        self.profile.movement_speed * self.movement_multiplier
    }

    pub fn attack_speed_multiplier(&self) -> f32 {
        self.attack_speed_multiplier
    }

    pub fn next_hit_bonus(&self) -> i32 {
        self.next_hit_bonus
    }

    pub fn shield_level(&self) -> f32 {
        self.shield.level()
    }

    pub fn is_shield_active(&self) -> bool {
        self.shield.is_active()
    }

    pub fn is_stunned(&self) -> bool {
        self.stunned
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_invisible(&self) -> bool {
        self.invisible
    }

    /// In wind-up or recovery
    pub fn is_attacking(&self) -> bool {
        !self.attack.is_idle()
    }

    pub fn attack_phase(&self) -> AttackPhase {
        self.attack.phase()
    }

    pub fn is_charging(&self) -> bool {
        self.charge_started_at.is_some()
    }

    pub fn can_use_special_ability(&self, now: SimTime) -> bool {
        !self.stunned && !self.disabled && self.cooldown.is_ready(now)
    }

    pub fn remaining_cooldown(&self, now: SimTime) -> u64 {
        self.cooldown.remaining(now)
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn center(&self) -> Vec2 {
        self.hit_box().center()
    }

    pub fn hit_box(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.size, self.size)
    }

    pub fn stat_value(&self, stat: Stat) -> StatValue {
        match stat {
            Stat::AttackPower => StatValue::Int(self.attack_power),
            Stat::DefensePower => StatValue::Int(self.defense_power),
            Stat::DefenseMultiplier => StatValue::Float(self.defense_multiplier),
            Stat::MovementSpeed => StatValue::Float(self.movement_multiplier),
            Stat::AttackSpeed => StatValue::Float(self.attack_speed_multiplier),
            Stat::Stunned => StatValue::Flag(self.stunned),
            Stat::Invisible => StatValue::Flag(self.invisible),
            Stat::NextHitBonus => StatValue::Int(self.next_hit_bonus),
        }
    }

    // === COMMANDS ===

    /// Write a stat. Mismatched value kinds are ignored.
    pub(crate) fn set_stat(&mut self, stat: Stat, value: StatValue) {
        match (stat, value) {
            (Stat::AttackPower, StatValue::Int(v)) => self.attack_power = v.max(0),
            (Stat::DefensePower, StatValue::Int(v)) => self.defense_power = v.max(0),
            (Stat::DefenseMultiplier, StatValue::Float(v)) => self.defense_multiplier = v.max(0.0),
            (Stat::MovementSpeed, StatValue::Float(v)) => self.movement_multiplier = v.max(0.0),
            // Zero would stall the attack timers
            (Stat::AttackSpeed, StatValue::Float(v)) => self.attack_speed_multiplier = v.max(0.1),
            (Stat::Stunned, StatValue::Flag(v)) => self.set_stunned(v),
            (Stat::Invisible, StatValue::Flag(v)) => self.invisible = v,
            (Stat::NextHitBonus, StatValue::Int(v)) => self.next_hit_bonus = v.max(0),
            _ => {}
        }
    }

    /// Stun interrupts a swing in wind-up and drops any charge
    pub(crate) fn set_stunned(&mut self, stunned: bool) {
        self.stunned = stunned;
        if stunned {
            self.attack.interrupt();
            self.charge_started_at = None;
        }
    }

    /// Apply damage, routing it into the shield when raised
    ///
    /// Health stays in [0, max]. A defeated character takes no further damage.
    pub(crate) fn take_damage(
        &mut self,
        amount: i32,
        now: SimTime,
        config: &CombatConfig,
    ) -> DamageOutcome {
        let amount = amount.max(0);
        if amount == 0 || self.disabled {
            return DamageOutcome::default();
        }

        if self.shield.is_active() {
            let cost = amount as f32 * config.shield_absorption_ratio;
            let broken = self.shield.absorb(cost, now, config.shield_break_cooldown_ms);
            return DamageOutcome {
                health_lost: 0,
                absorbed: true,
                shield_broken: broken,
                defeated: false,
            };
        }

        let before = self.health;
        self.health = (self.health - amount).clamp(0, self.profile.max_health);
        let defeated = self.health == 0;
        if defeated {
            self.defeat();
        }

        DamageOutcome {
            health_lost: before - self.health,
            absorbed: false,
            shield_broken: false,
            defeated,
        }
    }

    /// Returns the health actually restored
    pub(crate) fn heal(&mut self, amount: i32) -> i32 {
        if self.disabled || amount <= 0 {
            return 0;
        }
        let before = self.health;
        self.health = (self.health + amount).clamp(0, self.profile.max_health);
        self.health - before
    }

    fn defeat(&mut self) {
        self.disabled = true;
        self.stunned = false;
        self.invisible = false;
        self.charge_started_at = None;
        self.shield.release();
        self.attack.reset();
    }

    /// Start a swing. Returns the sequence number and when it lands.
    pub(crate) fn begin_attack(
        &mut self,
        now: SimTime,
        config: &CombatConfig,
    ) -> Result<(u64, SimTime)> {
        self.ensure_can_act()?;
        let windup = scaled_ms(config.attack_delay_ms, self.attack_speed_multiplier);
        self.attack
            .begin(now, windup)
            .map_err(CombatError::InvalidState)
    }

    /// Wind-up finished; returns when recovery ends, None for a stale swing
    pub(crate) fn land_attack(
        &mut self,
        sequence: u64,
        now: SimTime,
        config: &CombatConfig,
    ) -> Option<SimTime> {
        let end_lag = scaled_ms(config.end_lag_ms, self.attack_speed_multiplier);
        self.attack.land(sequence, now, end_lag)
    }

    pub(crate) fn end_recovery(&mut self, sequence: u64) -> bool {
        self.attack.recover(sequence)
    }

    /// Take the pending next-hit bonus, leaving zero behind
    pub(crate) fn consume_next_hit_bonus(&mut self) -> i32 {
        std::mem::take(&mut self.next_hit_bonus)
    }

    pub(crate) fn trigger_cooldown(&mut self, now: SimTime, duration_ms: u64) {
        self.cooldown.trigger(now, duration_ms);
    }

    /// Ok(true) if the shield went up, Ok(false) if it already was
    pub(crate) fn activate_shield(&mut self, now: SimTime) -> Result<bool> {
        self.ensure_can_act()?;
        self.shield.activate(now).map_err(CombatError::InvalidState)
    }

    pub(crate) fn release_shield(&mut self) {
        self.shield.release();
    }

    /// Drain or regenerate the shield. Returns true if it broke this tick.
    pub(crate) fn tick_shield(&mut self, now: SimTime, config: &CombatConfig) -> bool {
        let mut regen = config.shield_regen_per_tick;
        if self.profile.traits.rapid_shield_regen {
            regen *= config.rapid_regen_multiplier;
        }
        self.shield.tick(
            config.shield_depletion_per_tick,
            regen,
            now,
            config.shield_break_cooldown_ms,
        )
    }

    /// Ok(true) if charging started, Ok(false) if already charging
    pub(crate) fn start_charging(&mut self, now: SimTime) -> Result<bool> {
        self.ensure_can_act()?;
        if self.charge_started_at.is_some() {
            return Ok(false);
        }
        self.charge_started_at = Some(now);
        Ok(true)
    }

    /// End the charge and report how long it was held
    pub(crate) fn release_charge(&mut self, now: SimTime) -> Result<u64> {
        self.ensure_can_act()?;
        let started = self.charge_started_at.take().ok_or(CombatError::NotCharging)?;
        Ok(now.saturating_sub(started))
    }

    /// Move by an intent vector for one tick, clamped so the box stays in bounds
    pub(crate) fn move_by(&mut self, dx: f32, dy: f32, dt: f32, bounds: Rect) -> Result<Vec2> {
        self.ensure_can_act()?;
        let mut intent = Vec2::new(dx, dy);
        if intent.length() > 1.0 {
            intent = intent.normalize();
        }
        let step = intent * (self.movement_speed() * dt);
        self.place_within(self.position + step, bounds);
        Ok(self.position)
    }

    /// Put the hit box at `position`, clamped into bounds
    pub(crate) fn place_within(&mut self, position: Vec2, bounds: Rect) {
        let max_x = (bounds.right() - self.size).max(bounds.x);
        let max_y = (bounds.bottom() - self.size).max(bounds.y);
        self.position = Vec2::new(
            position.x.clamp(bounds.x, max_x),
            position.y.clamp(bounds.y, max_y),
        );
    }

    /// Full health, base stats, clear flags, start position, cooldown reset
    pub(crate) fn reset_for_round(&mut self, config: &CombatConfig) {
        self.health = self.profile.max_health;
        self.attack_power = self.profile.attack_power;
        self.defense_power = self.profile.defense_power;
        self.defense_multiplier = 1.0;
        self.movement_multiplier = 1.0;
        self.attack_speed_multiplier = 1.0;
        self.next_hit_bonus = 0;
        self.position = config.start_positions[self.side.index()];
        self.shield.reset();
        self.attack.reset();
        self.cooldown.reset();
        self.charge_started_at = None;
        self.stunned = false;
        self.disabled = false;
        self.invisible = false;
    }

    fn ensure_can_act(&self) -> Result<()> {
        if self.disabled {
            return Err(CombatError::InvalidState(Rejection::Disabled));
        }
        if self.stunned {
            return Err(CombatError::InvalidState(Rejection::Stunned));
        }
        Ok(())
    }
}

fn scaled_ms(base_ms: u64, speed_multiplier: f32) -> u64 {
    (base_ms as f32 / speed_multiplier.max(0.1)).round() as u64
}
