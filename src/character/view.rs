//! Read-only snapshot handed to rendering and UI layers

use serde::{Deserialize, Serialize};

use crate::character::state::Character;
use crate::core::types::{CharacterId, Side, SimTime, Vec2};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterView {
    pub id: CharacterId,
    pub side: Side,
    pub name: String,
    pub health: i32,
    pub max_health: i32,
    pub health_percentage: f32,
    pub shield_level: f32,
    pub shield_active: bool,
    pub stunned: bool,
    pub attacking: bool,
    pub charging: bool,
    pub invisible: bool,
    pub disabled: bool,
    pub can_use_special: bool,
    pub cooldown_remaining_ms: u64,
    pub position: Vec2,
}

impl CharacterView {
    pub fn capture(character: &Character, now: SimTime) -> Self {
        Self {
            id: character.id(),
            side: character.side(),
            name: character.name().to_string(),
            health: character.health(),
            max_health: character.max_health(),
            health_percentage: character.health_percentage(),
            shield_level: character.shield_level(),
            shield_active: character.is_shield_active(),
            stunned: character.is_stunned(),
            attacking: character.is_attacking(),
            charging: character.is_charging(),
            invisible: character.is_invisible(),
            disabled: character.is_disabled(),
            can_use_special: character.can_use_special_ability(now),
            cooldown_remaining_ms: character.remaining_cooldown(now),
            position: character.position(),
        }
    }
}
