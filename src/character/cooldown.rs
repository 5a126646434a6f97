use serde::{Deserialize, Serialize};

use crate::core::types::SimTime;

/// Single cooldown window gating a special ability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldown {
    last_used: Option<SimTime>,
    duration_ms: u64,
}

impl Cooldown {
    /// Ready when `now - last_used >= duration`; never used means ready
    pub fn is_ready(&self, now: SimTime) -> bool {
        self.remaining(now) == 0
    }

    pub fn remaining(&self, now: SimTime) -> u64 {
        match self.last_used {
            Some(used) => (used + self.duration_ms).saturating_sub(now),
            None => 0,
        }
    }

    pub fn trigger(&mut self, now: SimTime, duration_ms: u64) {
        self.last_used = Some(now);
        self.duration_ms = duration_ms;
    }

    pub fn last_used(&self) -> Option<SimTime> {
        self.last_used
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
