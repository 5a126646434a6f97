//! Shield resource
//!
//! Level stays in [0, 1]. Held up it drains every tick and soaks damage;
//! lowered it regenerates. Hitting zero breaks it and locks it out.

use serde::{Deserialize, Serialize};

use crate::core::error::Rejection;
use crate::core::types::SimTime;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldState {
    level: f32,
    active: bool,
    cooldown_until: SimTime,
}

impl Default for ShieldState {
    fn default() -> Self {
        Self {
            level: 1.0,
            active: false,
            cooldown_until: 0,
        }
    }
}

impl ShieldState {
    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn in_cooldown(&self, now: SimTime) -> bool {
        now < self.cooldown_until
    }

    /// Raise the shield. Ok(false) if it was already up.
    pub fn activate(&mut self, now: SimTime) -> Result<bool, Rejection> {
        if self.active {
            return Ok(false);
        }
        if self.in_cooldown(now) {
            return Err(Rejection::ShieldCooldown);
        }
        if self.level <= 0.0 {
            return Err(Rejection::ShieldDepleted);
        }
        self.active = true;
        Ok(true)
    }

    pub fn release(&mut self) {
        self.active = false;
    }

    /// Soak a hit while active. Returns true if the shield broke.
    pub fn absorb(&mut self, level_cost: f32, now: SimTime, break_cooldown_ms: u64) -> bool {
        self.level = (self.level - level_cost.max(0.0)).clamp(0.0, 1.0);
        self.break_if_empty(now, break_cooldown_ms)
    }

    /// Per-tick drain or regen. Returns true if the shield broke this tick.
    pub fn tick(
        &mut self,
        depletion: f32,
        regen: f32,
        now: SimTime,
        break_cooldown_ms: u64,
    ) -> bool {
        if self.active {
            self.level = (self.level - depletion).clamp(0.0, 1.0);
            self.break_if_empty(now, break_cooldown_ms)
        } else {
            if self.level < 1.0 {
                self.level = (self.level + regen).min(1.0);
            }
            false
        }
    }

    /// Full shield, lowered, no lockout
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn break_if_empty(&mut self, now: SimTime, break_cooldown_ms: u64) -> bool {
        if self.active && self.level <= 0.0 {
            self.level = 0.0;
            self.active = false;
            self.cooldown_until = now + break_cooldown_ms;
            true
        } else {
            false
        }
    }
}
