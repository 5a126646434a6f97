//! Combat configuration with documented constants
//!
//! Every tuning number lives here. A session receives its config at
//! construction and never mutates it afterwards.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{Rect, Vec2};

/// Errors raised while loading or validating a config
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration for the combat core
///
/// One consistent table for all characters. Values are per fixed tick
/// where the name says so, otherwise milliseconds or arena units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    // === TIMING ===
    /// Length of one simulation tick in milliseconds
    ///
    /// Shield depletion/regeneration are expressed per tick, so changing
    /// this changes how fast shields drain in wall-clock terms.
    pub tick_ms: u64,

    /// Length of a round before the timeout winner is decided
    pub round_duration_ms: u64,

    /// Rounds in a match. A side needs more than half of them to win.
    pub total_rounds: u32,

    // === ARENA ===
    pub arena_width: f32,
    pub arena_height: f32,

    /// Edge length of the square character hit box
    pub character_size: f32,

    /// Top-left corners where side one and side two start each round
    pub start_positions: [Vec2; 2],

    /// Distance kept from the arena edge when teleporting
    pub teleport_margin: f32,

    // === MELEE ===
    /// Wind-up between the attack command and damage application
    pub attack_delay_ms: u64,

    /// Forced idle period after an attack resolves
    pub end_lag_ms: u64,

    /// Maximum centre-to-centre distance for a swing to connect
    pub melee_range: f32,

    /// Rolls above this are critical hits
    pub crit_threshold: f32,

    pub crit_multiplier: f32,

    /// Rolls below this miss entirely
    pub miss_threshold: f32,

    /// Floor for any connecting, non-critical hit
    pub minimum_damage: i32,

    // === SHIELD ===
    /// Shield lost per tick while held up
    pub shield_depletion_per_tick: f32,

    /// Shield regained per tick while lowered
    pub shield_regen_per_tick: f32,

    /// Regen multiplier for characters with the rapid-regen trait
    pub rapid_regen_multiplier: f32,

    /// Shield level lost per point of absorbed damage
    ///
    /// At 0.005 a full shield soaks 200 damage before breaking.
    pub shield_absorption_ratio: f32,

    /// Lockout after the shield breaks
    pub shield_break_cooldown_ms: u64,

    /// Radius of the shield bubble around the character centre
    pub shield_radius: f32,

    // === PROJECTILES ===
    pub max_projectiles_per_owner: usize,

    /// Charge beyond this window is ignored
    pub max_charge_ms: u64,

    pub projectile_base_size: f32,
    pub projectile_min_size: f32,
    pub projectile_max_size: f32,

    /// Milliseconds of charge per unit of extra size
    pub size_scale_ms: f32,

    /// Speed of an uncharged projectile (units per second)
    pub projectile_base_speed: f32,
    pub projectile_min_speed: f32,
    pub projectile_max_speed: f32,

    /// Milliseconds of charge per unit of speed lost
    ///
    /// Longer charge gives a bigger, slower projectile.
    pub speed_scale_ms: f32,

    /// Share of owner attack power carried by a base-size projectile
    pub projectile_attack_ratio: f32,

    /// Speed divided by this is added to projectile power
    pub projectile_speed_divisor: f32,

    /// Share of the target's effective defense that applies against projectiles
    pub projectile_defense_ratio: f32,

    // === PROJECTILE TRAITS ===
    pub burn_damage_per_tick: i32,
    pub burn_tick_count: u32,
    pub burn_interval_ms: u64,

    /// Share of health damage returned to the owner of a lifesteal projectile
    pub lifesteal_ratio: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            // ~60 ticks per second, 200 second rounds, best of three
            tick_ms: 16,
            round_duration_ms: 200_000,
            total_rounds: 3,

            arena_width: 600.0,
            arena_height: 400.0,
            character_size: 30.0,
            start_positions: [Vec2::new(100.0, 200.0), Vec2::new(470.0, 200.0)],
            teleport_margin: 25.0,

            attack_delay_ms: 200,
            end_lag_ms: 300,
            melee_range: 60.0,
            crit_threshold: 0.9,
            crit_multiplier: 1.5,
            miss_threshold: 0.05,
            minimum_damage: 5,

            shield_depletion_per_tick: 0.004,
            shield_regen_per_tick: 0.002,
            rapid_regen_multiplier: 2.0,
            shield_absorption_ratio: 0.005,
            shield_break_cooldown_ms: 3000,
            shield_radius: 30.0,

            // Size reaches 40 and speed reaches 180 exactly at the 3s window
            max_projectiles_per_owner: 6,
            max_charge_ms: 3000,
            projectile_base_size: 10.0,
            projectile_min_size: 10.0,
            projectile_max_size: 40.0,
            size_scale_ms: 100.0,
            projectile_base_speed: 420.0,
            projectile_min_speed: 180.0,
            projectile_max_speed: 420.0,
            speed_scale_ms: 12.5,
            projectile_attack_ratio: 0.5,
            projectile_speed_divisor: 40.0,
            projectile_defense_ratio: 0.5,

            burn_damage_per_tick: 5,
            burn_tick_count: 3,
            burn_interval_ms: 1000,
            lifesteal_ratio: 0.25,
        }
    }
}

impl CombatConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// The arena as a rectangle anchored at the origin
    pub fn arena(&self) -> Rect {
        Rect::new(0.0, 0.0, self.arena_width, self.arena_height)
    }

    /// Tick length in seconds, for velocity integration
    pub fn tick_seconds(&self) -> f32 {
        self.tick_ms as f32 / 1000.0
    }

    /// Parse a config from TOML; missing keys fall back to defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: CombatConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file on disk
    pub fn load_from_toml(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::Invalid("tick_ms must be positive".into()));
        }

        if self.total_rounds == 0 {
            return Err(ConfigError::Invalid("total_rounds must be at least 1".into()));
        }

        if self.miss_threshold >= self.crit_threshold {
            return Err(ConfigError::Invalid(format!(
                "miss_threshold ({}) should be < crit_threshold ({})",
                self.miss_threshold, self.crit_threshold
            )));
        }

        if self.projectile_min_size > self.projectile_max_size
            || self.projectile_min_speed > self.projectile_max_speed
        {
            return Err(ConfigError::Invalid(
                "projectile min bounds must not exceed max bounds".into(),
            ));
        }

        if self.size_scale_ms <= 0.0 || self.speed_scale_ms <= 0.0 {
            return Err(ConfigError::Invalid("charge scales must be positive".into()));
        }

        if self.max_projectiles_per_owner == 0 {
            return Err(ConfigError::Invalid(
                "max_projectiles_per_owner must be at least 1".into(),
            ));
        }

        let arena = self.arena();
        for start in &self.start_positions {
            let corner = Vec2::new(start.x + self.character_size, start.y + self.character_size);
            if !arena.contains(*start) || !arena.contains(corner) {
                return Err(ConfigError::Invalid(format!(
                    "start position ({}, {}) lies outside the arena",
                    start.x, start.y
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(CombatConfig::default().validate().is_ok());
    }

    #[test]
    fn test_charge_window_reaches_caps() {
        let config = CombatConfig::default();
        let window = config.max_charge_ms as f32;
        let size = config.projectile_base_size + window / config.size_scale_ms;
        let speed = config.projectile_base_speed - window / config.speed_scale_ms;
        assert_eq!(size, config.projectile_max_size);
        assert_eq!(speed, config.projectile_min_speed);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CombatConfig::from_toml_str("total_rounds = 5\ntick_ms = 10\n").unwrap();
        assert_eq!(config.total_rounds, 5);
        assert_eq!(config.tick_ms, 10);
        assert_eq!(config.max_projectiles_per_owner, 6);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let result = CombatConfig::from_toml_str("miss_threshold = 0.95\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = CombatConfig::from_toml_str("total_rounds = \"three\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_start_outside_arena_rejected() {
        let mut config = CombatConfig::default();
        config.start_positions[1] = Vec2::new(590.0, 200.0);
        assert!(config.validate().is_err());
    }
}
