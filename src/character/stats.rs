//! Stats that timed effects capture, modify and restore

use serde::{Deserialize, Serialize};

/// A character field addressable by timed effects
///
/// Each variant is one reversion slot: at most one outstanding
/// reversion per (character, stat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    AttackPower,
    DefensePower,
    DefenseMultiplier,
    /// Movement speed multiplier, not the base speed
    MovementSpeed,
    /// Divides wind-up and end lag
    AttackSpeed,
    Stunned,
    Invisible,
    NextHitBonus,
}

impl Stat {
    /// Flag stats are toggled by dedicated directives, never boosted
    pub fn is_flag(self) -> bool {
        matches!(self, Stat::Stunned | Stat::Invisible)
    }
}

/// A captured stat value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StatValue {
    Int(i32),
    Float(f32),
    Flag(bool),
}

/// How a boost changes a stat
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatModifier {
    Factor(f32),
    Delta(f32),
}

impl StatValue {
    /// Apply a modifier. Integer stats truncate after scaling.
    pub fn modified(self, modifier: StatModifier) -> StatValue {
        match (self, modifier) {
            (StatValue::Int(v), StatModifier::Factor(f)) => StatValue::Int((v as f32 * f) as i32),
            (StatValue::Int(v), StatModifier::Delta(d)) => StatValue::Int(v + d.round() as i32),
            (StatValue::Float(v), StatModifier::Factor(f)) => StatValue::Float(v * f),
            (StatValue::Float(v), StatModifier::Delta(d)) => StatValue::Float(v + d),
            (StatValue::Flag(_), _) => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_factor_truncates() {
        // 68 * 1.15 = 78.2
        assert_eq!(
            StatValue::Int(68).modified(StatModifier::Factor(1.15)),
            StatValue::Int(78)
        );
        assert_eq!(
            StatValue::Int(68).modified(StatModifier::Factor(2.0)),
            StatValue::Int(136)
        );
    }

    #[test]
    fn test_delta_and_float_modifiers() {
        assert_eq!(
            StatValue::Int(60).modified(StatModifier::Delta(18.0)),
            StatValue::Int(78)
        );
        let StatValue::Float(boosted) = StatValue::Float(1.0).modified(StatModifier::Factor(1.2)) else {
            panic!("float stat changed kind");
        };
        assert!((boosted - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_flags_ignore_modifiers() {
        assert_eq!(
            StatValue::Flag(false).modified(StatModifier::Factor(3.0)),
            StatValue::Flag(false)
        );
        assert!(Stat::Stunned.is_flag());
        assert!(!Stat::AttackPower.is_flag());
    }
}
