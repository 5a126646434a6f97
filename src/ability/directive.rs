//! Effect directives
//!
//! An ability is an ordered list of these. Immediate directives act once;
//! timed ones capture the current value, mutate it and schedule a restore.

use serde::{Deserialize, Serialize};

use crate::character::{Stat, StatModifier};

/// Who a directive lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTarget {
    User,
    Opponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealAmount {
    Flat(i32),
    /// Share of the target's max health
    FractionOfMax(f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Directive {
    StatBoost {
        target: EffectTarget,
        stat: Stat,
        modifier: StatModifier,
        duration_ms: u64,
    },
    OpponentStun {
        duration_ms: u64,
    },
    /// Hits the opponent `tick_count` times, first after one interval
    DamageOverTime {
        per_tick: i32,
        tick_count: u32,
        interval_ms: u64,
    },
    /// User jumps to a random spot in the arena
    Teleport,
    GradualHeal {
        target: EffectTarget,
        amount: HealAmount,
        duration_ms: u64,
        steps: u32,
    },
    Invisibility {
        duration_ms: u64,
    },
    /// Added to the next connecting basic attack, lapses if unused
    NextHitBonus {
        target: EffectTarget,
        bonus: i32,
        expires_after_ms: u64,
    },
}

impl Directive {
    /// How long after activation this directive still has pending actions
    pub fn span_ms(&self) -> u64 {
        match self {
            Directive::StatBoost { duration_ms, .. }
            | Directive::OpponentStun { duration_ms }
            | Directive::GradualHeal { duration_ms, .. }
            | Directive::Invisibility { duration_ms } => *duration_ms,
            Directive::DamageOverTime {
                tick_count,
                interval_ms,
                ..
            } => u64::from(*tick_count).saturating_mul(*interval_ms),
            Directive::NextHitBonus {
                expires_after_ms, ..
            } => *expires_after_ms,
            Directive::Teleport => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_span_covers_every_tick() {
        let dot = Directive::DamageOverTime {
            per_tick: 5,
            tick_count: 3,
            interval_ms: 1000,
        };
        assert_eq!(dot.span_ms(), 3000);
        assert_eq!(Directive::Teleport.span_ms(), 0);
    }

    #[test]
    fn test_huge_dot_span_saturates() {
        let dot = Directive::DamageOverTime {
            per_tick: 1,
            tick_count: u32::MAX,
            interval_ms: u64::MAX / 2,
        };
        assert_eq!(dot.span_ms(), u64::MAX);
    }
}
