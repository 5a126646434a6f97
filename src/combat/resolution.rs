//! Damage formulas
//!
//! Basic attacks roll once against the crit/miss table. Projectile power is
//! fixed at spawn; defense is applied when it lands.

use serde::{Deserialize, Serialize};

use crate::core::config::CombatConfig;

/// Branch taken by a basic attack roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackRoll {
    Critical,
    Miss,
    Normal,
}

/// Result of one basic attack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeleeResult {
    pub roll: AttackRoll,
    pub damage: i32,
}

/// Crit is checked before miss, so a table with overlapping ranges favours crits
pub fn classify_roll(roll: f32, config: &CombatConfig) -> AttackRoll {
    if roll > config.crit_threshold {
        AttackRoll::Critical
    } else if roll < config.miss_threshold {
        AttackRoll::Miss
    } else {
        AttackRoll::Normal
    }
}

/// Effective defense, floored
pub fn effective_defense(defense: i32, defense_multiplier: f32) -> i32 {
    (defense as f32 * defense_multiplier).floor() as i32
}

/// Resolve a basic attack for a roll in [0, 1)
///
/// * crit: `floor(base * crit_multiplier)`, defense ignored
/// * miss: 0
/// * otherwise: `max(minimum, base - floor(defense * multiplier))`
pub fn resolve_basic_attack(
    base: i32,
    defense: i32,
    defense_multiplier: f32,
    roll: f32,
    config: &CombatConfig,
) -> MeleeResult {
    let roll_kind = classify_roll(roll, config);
    let damage = match roll_kind {
        AttackRoll::Critical => (base as f32 * config.crit_multiplier).floor() as i32,
        AttackRoll::Miss => 0,
        AttackRoll::Normal => {
            (base - effective_defense(defense, defense_multiplier)).max(config.minimum_damage)
        }
    };

    MeleeResult {
        roll: roll_kind,
        damage,
    }
}

/// Pre-defense projectile power from its shape and the owner's attack power
pub fn projectile_power(size: f32, speed: f32, owner_attack: i32, config: &CombatConfig) -> i32 {
    let size_factor = size / config.projectile_base_size;
    let raw = owner_attack as f32 * config.projectile_attack_ratio * size_factor
        + speed / config.projectile_speed_divisor;
    raw.floor().max(0.0) as i32
}

/// Damage a projectile deals to an unshielded target
pub fn projectile_damage(
    power: i32,
    defense: i32,
    defense_multiplier: f32,
    config: &CombatConfig,
) -> i32 {
    let mitigation =
        (defense as f32 * defense_multiplier * config.projectile_defense_ratio).floor() as i32;
    (power - mitigation).max(config.minimum_damage)
}

/// Health returned to the owner of a lifesteal projectile
pub fn lifesteal_amount(health_damage: i32, config: &CombatConfig) -> i32 {
    (health_damage as f32 * config.lifesteal_ratio).floor() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_branch_subtracts_defense() {
        let config = CombatConfig::default();
        // Volt (93) into Blaze (68, x1.0)
        let result = resolve_basic_attack(93, 68, 1.0, 0.5, &config);
        assert_eq!(result.roll, AttackRoll::Normal);
        assert_eq!(result.damage, 25);
    }

    #[test]
    fn test_minimum_damage_floor() {
        let config = CombatConfig::default();
        // Boulder (35) into Aqua (74)
        let result = resolve_basic_attack(35, 74, 1.0, 0.5, &config);
        assert_eq!(result.damage, config.minimum_damage);
    }

    #[test]
    fn test_crit_ignores_defense() {
        let config = CombatConfig::default();
        let result = resolve_basic_attack(93, 68, 1.0, 0.95, &config);
        assert_eq!(result.roll, AttackRoll::Critical);
        assert_eq!(result.damage, 139);
    }

    #[test]
    fn test_miss_deals_nothing() {
        let config = CombatConfig::default();
        let result = resolve_basic_attack(93, 68, 1.0, 0.01, &config);
        assert_eq!(result.roll, AttackRoll::Miss);
        assert_eq!(result.damage, 0);
    }

    #[test]
    fn test_threshold_edges_are_normal() {
        let config = CombatConfig::default();
        assert_eq!(classify_roll(0.9, &config), AttackRoll::Normal);
        assert_eq!(classify_roll(0.05, &config), AttackRoll::Normal);
    }

    #[test]
    fn test_defense_multiplier_floors() {
        let config = CombatConfig::default();
        // floor(35 * 1.5) = 52
        let result = resolve_basic_attack(80, 35, 1.5, 0.5, &config);
        assert_eq!(result.damage, 28);
    }

    #[test]
    fn test_projectile_power_grows_with_size() {
        let config = CombatConfig::default();
        // 68 * 0.5 * 1 + 420 / 40 = 34 + 10.5
        assert_eq!(projectile_power(10.0, 420.0, 68, &config), 44);
        // 68 * 0.5 * 4 + 180 / 40 = 136 + 4.5
        assert_eq!(projectile_power(40.0, 180.0, 68, &config), 140);
    }

    #[test]
    fn test_projectile_damage_uses_half_defense() {
        let config = CombatConfig::default();
        assert_eq!(projectile_damage(44, 68, 1.0, &config), 10);
        assert_eq!(projectile_damage(20, 80, 1.0, &config), config.minimum_damage);
    }

    #[test]
    fn test_lifesteal_rounds_down() {
        let config = CombatConfig::default();
        assert_eq!(lifesteal_amount(41, &config), 10);
        assert_eq!(lifesteal_amount(0, &config), 0);
    }
}
