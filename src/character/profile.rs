//! Fighter profiles
//!
//! The base stat block a character is built from and reset to every round.

use serde::{Deserialize, Serialize};

use crate::ability::AbilityId;

/// Passive traits that change how a fighter's shots and shield behave
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterTraits {
    /// Projectiles set the target burning
    pub burning_shots: bool,
    /// Projectiles heal the owner for part of the damage dealt
    pub lifesteal_shots: bool,
    /// Shield regenerates faster while lowered
    pub rapid_shield_regen: bool,
}

/// Immutable base stats for a fighter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub name: String,
    pub max_health: i32,
    pub attack_power: i32,
    pub defense_power: i32,
    /// Units per second at multiplier 1.0
    pub movement_speed: f32,
    pub ability: AbilityId,
    #[serde(default)]
    pub traits: CharacterTraits,
}

/// Default walking speed for every roster fighter
pub const BASE_MOVEMENT_SPEED: f32 = 120.0;

impl CharacterProfile {
    pub fn new(
        name: &str,
        max_health: i32,
        attack_power: i32,
        defense_power: i32,
        ability: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            max_health,
            attack_power,
            defense_power,
            movement_speed: BASE_MOVEMENT_SPEED,
            ability: AbilityId::new(ability),
            traits: CharacterTraits::default(),
        }
    }

    pub fn with_traits(mut self, traits: CharacterTraits) -> Self {
        self.traits = traits;
        self
    }

    /// Burning projectiles
    pub fn blaze() -> Self {
        Self::new("Blaze", 800, 68, 68, "flame_rush").with_traits(CharacterTraits {
            burning_shots: true,
            ..Default::default()
        })
    }

    /// Defensive, fast shield recovery
    pub fn aqua() -> Self {
        Self::new("Aqua", 1093, 48, 74, "speed_surge").with_traits(CharacterTraits {
            rapid_shield_regen: true,
            ..Default::default()
        })
    }

    pub fn volt() -> Self {
        Self::new("Volt", 624, 93, 35, "electric_burst")
    }

    pub fn amber() -> Self {
        Self::new("Amber", 900, 60, 60, "blazing_punch")
    }

    pub fn shade() -> Self {
        Self::new("Shade", 687, 87, 40, "shadow_step")
    }

    pub fn terra() -> Self {
        Self::new("Terra", 1054, 40, 68, "natures_embrace").with_traits(CharacterTraits {
            rapid_shield_regen: true,
            ..Default::default()
        })
    }

    /// Lifesteal projectiles
    pub fn night() -> Self {
        Self::new("Night", 750, 80, 50, "shadow_strike").with_traits(CharacterTraits {
            lifesteal_shots: true,
            ..Default::default()
        })
    }

    pub fn boulder() -> Self {
        Self::new("Boulder", 1125, 35, 80, "earthquake")
    }

    /// All eight playable fighters
    pub fn roster() -> Vec<CharacterProfile> {
        vec![
            Self::blaze(),
            Self::aqua(),
            Self::volt(),
            Self::amber(),
            Self::shade(),
            Self::terra(),
            Self::night(),
            Self::boulder(),
        ]
    }

    /// Case-insensitive roster lookup
    pub fn by_name(name: &str) -> Option<CharacterProfile> {
        Self::roster()
            .into_iter()
            .find(|profile| profile.name.eq_ignore_ascii_case(name))
    }
}
