//! Basic attack state machine
//!
//! Idle -> WindUp -> (damage applied) -> Recovery -> Idle.
//! Phase changes are driven by scheduled actions that carry the attack
//! sequence number, so an action from an interrupted swing is ignored.

use serde::{Deserialize, Serialize};

use crate::core::error::Rejection;
use crate::core::types::SimTime;

/// Exactly one phase is active at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttackPhase {
    #[default]
    Idle,
    WindUp { sequence: u64, resolves_at: SimTime },
    Recovery { sequence: u64, ends_at: SimTime },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttackState {
    phase: AttackPhase,
    next_sequence: u64,
}

impl AttackState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> AttackPhase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, AttackPhase::Idle)
    }

    /// Start a swing. Returns the sequence and when it lands.
    pub fn begin(&mut self, now: SimTime, windup_ms: u64) -> Result<(u64, SimTime), Rejection> {
        if !self.is_idle() {
            return Err(Rejection::Busy);
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let resolves_at = now + windup_ms;
        self.phase = AttackPhase::WindUp { sequence, resolves_at };
        Ok((sequence, resolves_at))
    }

    /// Wind-up elapsed. Returns when recovery ends, or None for a stale swing.
    pub fn land(&mut self, sequence: u64, now: SimTime, end_lag_ms: u64) -> Option<SimTime> {
        match self.phase {
            AttackPhase::WindUp { sequence: current, .. } if current == sequence => {
                let ends_at = now + end_lag_ms;
                self.phase = AttackPhase::Recovery { sequence, ends_at };
                Some(ends_at)
            }
            _ => None,
        }
    }

    pub fn recover(&mut self, sequence: u64) -> bool {
        match self.phase {
            AttackPhase::Recovery { sequence: current, .. } if current == sequence => {
                self.phase = AttackPhase::Idle;
                true
            }
            _ => false,
        }
    }

    /// Cancel a swing that has not landed yet
    pub fn interrupt(&mut self) -> bool {
        if matches!(self.phase, AttackPhase::WindUp { .. }) {
            self.phase = AttackPhase::Idle;
            true
        } else {
            false
        }
    }

    /// Back to idle; sequence numbers keep counting so old actions stay stale
    pub fn reset(&mut self) {
        self.phase = AttackPhase::Idle;
    }
}
