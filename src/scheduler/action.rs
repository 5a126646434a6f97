//! Deferred actions carried by the scheduler

use serde::{Deserialize, Serialize};

use crate::character::{Stat, StatValue};
use crate::combat::DamageSource;
use crate::core::types::CharacterId;

/// Handle returned for every scheduled action
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// A fire-once action applied by the tick loop when it comes due
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScheduledAction {
    /// Restore a value captured before a timed effect
    RevertStat {
        target: CharacterId,
        stat: Stat,
        value: StatValue,
    },
    /// One installment of a damage-over-time effect
    DamageTick {
        target: CharacterId,
        source: DamageSource,
        amount: i32,
    },
    /// One installment of a gradual heal
    HealTick { target: CharacterId, amount: i32 },
    /// Wind-up finished: the swing lands (or whiffs)
    ResolveAttack { attacker: CharacterId, sequence: u64 },
    /// End lag finished: attacker returns to idle
    EndRecovery { attacker: CharacterId, sequence: u64 },
}

impl ScheduledAction {
    /// The character whose state this action mutates
    pub fn target(&self) -> CharacterId {
        match self {
            ScheduledAction::RevertStat { target, .. }
            | ScheduledAction::DamageTick { target, .. }
            | ScheduledAction::HealTick { target, .. } => *target,
            ScheduledAction::ResolveAttack { attacker, .. }
            | ScheduledAction::EndRecovery { attacker, .. } => *attacker,
        }
    }

    /// Reversion slot key, if this is a stat reversion
    pub fn reversion_slot(&self) -> Option<(CharacterId, Stat)> {
        match self {
            ScheduledAction::RevertStat { target, stat, .. } => Some((*target, *stat)),
            _ => None,
        }
    }
}
