//! Observable combat events
//!
//! Every state change the UI might care about is pushed here and traced.
//! The session owns one log; callers drain it once per frame.

use serde::{Deserialize, Serialize};

use crate::character::Stat;
use crate::core::types::{CharacterId, ProjectileId, Side, SimTime};
use crate::projectile::RetireReason;

/// Who or what dealt damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSource {
    Melee { attacker: CharacterId },
    Projectile { owner: CharacterId, projectile: ProjectileId },
    /// Damage-over-time installment
    Burn { source: CharacterId },
    /// Caller-supplied damage with no in-match origin
    External,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEventKind {
    DamageApplied {
        target: CharacterId,
        amount: i32,
        source: DamageSource,
    },
    DamageAbsorbed {
        target: CharacterId,
        amount: i32,
        source: DamageSource,
    },
    AttackWhiffed { attacker: CharacterId },
    Healed { target: CharacterId, amount: i32 },
    AbilityUsed { user: CharacterId, name: String },
    EffectExpired { target: CharacterId, stat: Stat },
    Stunned { target: CharacterId },
    StunLifted { target: CharacterId },
    ShieldBroken { character: CharacterId },
    CharacterDefeated { character: CharacterId },
    ProjectileSpawned { projectile: ProjectileId, owner: CharacterId },
    ProjectileRetired { projectile: ProjectileId, reason: RetireReason },
    RoundStarted { round: u32 },
    RoundEnded { round: u32, winner: Option<Side> },
    MatchEnded { winner: Option<Side> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatEvent {
    pub at: SimTime,
    pub kind: CombatEventKind,
}

/// Buffer of events since the last drain
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<CombatEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, at: SimTime, kind: CombatEventKind) {
        tracing::debug!(at, event = ?kind, "combat event");
        self.events.push(CombatEvent { at, kind });
    }

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_log() {
        let mut log = EventLog::new();
        let who = CharacterId::new();
        log.push(16, CombatEventKind::ShieldBroken { character: who });
        log.push(32, CombatEventKind::StunLifted { target: who });
        assert_eq!(log.len(), 2);

        let drained = log.drain();
        assert_eq!(drained[0].at, 16);
        assert!(log.is_empty());
    }

    #[test]
    fn test_events_serialize() {
        let event = CombatEvent {
            at: 100,
            kind: CombatEventKind::RoundEnded {
                round: 1,
                winner: Some(Side::Two),
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("RoundEnded"));
    }
}
