//! A single charged shot
//!
//! Shape and power are fixed at launch. The owner is set once and cannot
//! change, so a projectile can never hit the character who fired it.

use serde::{Deserialize, Serialize};

use crate::character::CharacterTraits;
use crate::combat::projectile_power;
use crate::core::config::CombatConfig;
use crate::core::error::{CombatError, Result};
use crate::core::types::{CharacterId, ProjectileId, Vec2};

/// Everything needed to fire one projectile
#[derive(Debug, Clone, Copy)]
pub struct Launch {
    pub owner: Option<CharacterId>,
    /// Owner's centre
    pub start: Vec2,
    /// Opponent's centre at the moment of release
    pub target: Vec2,
    pub charge_ms: u64,
    pub owner_attack: i32,
    pub traits: CharacterTraits,
    /// Used when start and target coincide
    pub facing: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    id: ProjectileId,
    owner: CharacterId,
    /// Centre of the projectile
    position: Vec2,
    /// Unit vector, never re-aimed
    direction: Vec2,
    speed: f32,
    size: f32,
    power: i32,
    burning: bool,
    lifesteal: bool,
}

impl Projectile {
    /// Build a projectile. A launch without an owner is a construction error.
    pub fn launch(id: ProjectileId, launch: &Launch, config: &CombatConfig) -> Result<Self> {
        let owner = launch.owner.ok_or(CombatError::InvalidOwner)?;

        let size = charged_size(launch.charge_ms, config);
        let speed = charged_speed(launch.charge_ms, config);

        let aim = launch.target - launch.start;
        let direction = if aim.length() > f32::EPSILON {
            aim.normalize()
        } else {
            launch.facing.normalize()
        };

        Ok(Self {
            id,
            owner,
            position: launch.start,
            direction,
            speed,
            size,
            power: projectile_power(size, speed, launch.owner_attack, config),
            burning: launch.traits.burning_shots,
            lifesteal: launch.traits.lifesteal_shots,
        })
    }

    pub fn id(&self) -> ProjectileId {
        self.id
    }

    pub fn owner(&self) -> CharacterId {
        self.owner
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }

    pub fn power(&self) -> i32 {
        self.power
    }

    pub fn is_burning(&self) -> bool {
        self.burning
    }

    pub fn is_lifesteal(&self) -> bool {
        self.lifesteal
    }

    /// Move along the fixed direction for `dt` seconds
    pub(crate) fn advance(&mut self, dt: f32) {
        self.position = self.position + self.direction * (self.speed * dt);
    }

    pub fn overlaps(&self, other: &Projectile) -> bool {
        self.position.distance(&other.position) <= self.radius() + other.radius()
    }
}

/// Charge clamped to the configured window
pub fn clamp_charge(charge_ms: u64, config: &CombatConfig) -> u64 {
    charge_ms.min(config.max_charge_ms)
}

/// Size grows with charge: `clamp(base + charge / scale, min, max)`
pub fn charged_size(charge_ms: u64, config: &CombatConfig) -> f32 {
    let charge = clamp_charge(charge_ms, config) as f32;
    (config.projectile_base_size + charge / config.size_scale_ms)
        .clamp(config.projectile_min_size, config.projectile_max_size)
}

/// Speed falls with charge: `clamp(base - charge / scale, min, max)`
pub fn charged_speed(charge_ms: u64, config: &CombatConfig) -> f32 {
    let charge = clamp_charge(charge_ms, config) as f32;
    (config.projectile_base_speed - charge / config.speed_scale_ms)
        .clamp(config.projectile_min_speed, config.projectile_max_speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launch(charge_ms: u64) -> Launch {
        Launch {
            owner: Some(CharacterId::new()),
            start: Vec2::new(115.0, 215.0),
            target: Vec2::new(485.0, 215.0),
            charge_ms,
            owner_attack: 68,
            traits: CharacterTraits::default(),
            facing: Vec2::new(1.0, 0.0),
        }
    }

    #[test]
    fn test_missing_owner_is_rejected() {
        let config = CombatConfig::default();
        let mut orphan = launch(0);
        orphan.owner = None;
        assert!(matches!(
            Projectile::launch(ProjectileId(0), &orphan, &config),
            Err(CombatError::InvalidOwner)
        ));
    }

    #[test]
    fn test_charge_curves_are_monotonic_and_clamped() {
        let config = CombatConfig::default();
        assert_eq!(charged_size(0, &config), 10.0);
        assert_eq!(charged_size(1500, &config), 25.0);
        assert_eq!(charged_size(60_000, &config), 40.0);

        assert_eq!(charged_speed(0, &config), 420.0);
        assert_eq!(charged_speed(1500, &config), 300.0);
        assert_eq!(charged_speed(60_000, &config), 180.0);

        let mut last = (0.0, f32::MAX);
        for charge in (0..4000).step_by(250) {
            let size = charged_size(charge, &config);
            let speed = charged_speed(charge, &config);
            assert!(size >= last.0 && speed <= last.1);
            last = (size, speed);
        }
    }

    #[test]
    fn test_direction_is_unit_towards_target() {
        let config = CombatConfig::default();
        let shot = Projectile::launch(ProjectileId(1), &launch(0), &config).unwrap();
        assert_eq!(shot.direction(), Vec2::new(1.0, 0.0));
        assert_eq!(shot.power(), 44);
    }

    #[test]
    fn test_zero_aim_uses_facing() {
        let config = CombatConfig::default();
        let mut point_blank = launch(0);
        point_blank.target = point_blank.start;
        point_blank.facing = Vec2::new(-1.0, 0.0);
        let shot = Projectile::launch(ProjectileId(1), &point_blank, &config).unwrap();
        assert_eq!(shot.direction(), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_advance_moves_along_direction() {
        let config = CombatConfig::default();
        let mut shot = Projectile::launch(ProjectileId(1), &launch(0), &config).unwrap();
        shot.advance(0.5);
        assert!((shot.position().x - 325.0).abs() < 1e-3);
        assert_eq!(shot.position().y, 215.0);
    }
}
