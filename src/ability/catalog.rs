//! Ability definitions
//!
//! The catalog is immutable once built and shared read-only across sessions.
//! Every entry is validated: its cooldown must outlast every directive, so a
//! reuse can never overlap its own pending reversions.

use std::fmt;
use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ability::directive::{Directive, EffectTarget, HealAmount};
use crate::character::{Stat, StatModifier};

/// Lowercase ability key, e.g. `flame_rush`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AbilityId(String);

impl From<String> for AbilityId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<AbilityId> for String {
    fn from(id: AbilityId) -> Self {
        id.0
    }
}

impl AbilityId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    pub id: AbilityId,
    pub name: String,
    pub cooldown_ms: u64,
    /// Applied in order
    pub directives: Vec<Directive>,
}

impl Ability {
    pub fn new(id: &str, name: &str, cooldown_ms: u64, directives: Vec<Directive>) -> Self {
        Self {
            id: AbilityId::new(id),
            name: name.to_string(),
            cooldown_ms,
            directives,
        }
    }

    /// Check the cooldown and directive invariants
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.directives.is_empty() {
            return Err(CatalogError::NoDirectives(self.id.clone()));
        }

        for directive in &self.directives {
            let span = directive.span_ms();
            if span >= self.cooldown_ms {
                return Err(CatalogError::CooldownTooShort {
                    ability: self.id.clone(),
                    cooldown_ms: self.cooldown_ms,
                    span_ms: span,
                });
            }

            match directive {
                Directive::StatBoost { stat, .. } if stat.is_flag() => {
                    return Err(CatalogError::FlagBoost {
                        ability: self.id.clone(),
                        stat: *stat,
                    });
                }
                Directive::GradualHeal { steps: 0, .. }
                | Directive::DamageOverTime { tick_count: 0, .. } => {
                    return Err(CatalogError::ZeroSteps(self.id.clone()));
                }
                _ => {}
            }
        }

        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Ability {ability}: cooldown {cooldown_ms}ms does not outlast a {span_ms}ms effect")]
    CooldownTooShort {
        ability: AbilityId,
        cooldown_ms: u64,
        span_ms: u64,
    },

    #[error("Ability {ability}: {stat:?} is a flag and cannot be boosted")]
    FlagBoost { ability: AbilityId, stat: Stat },

    #[error("Ability {0}: stepped effect with zero steps")]
    ZeroSteps(AbilityId),

    #[error("Ability {0} has no directives")]
    NoDirectives(AbilityId),

    #[error("Duplicate ability: {0}")]
    Duplicate(AbilityId),
}

/// Id to ability lookup
#[derive(Debug, Clone, Default)]
pub struct AbilityCatalog {
    abilities: AHashMap<AbilityId, Ability>,
}

impl AbilityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The eight abilities of the standard roster
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for ability in standard_abilities() {
            // Standard entries are known to be valid and unique
            catalog.abilities.insert(ability.id.clone(), ability);
        }
        catalog
    }

    /// Add a validated ability
    pub fn insert(&mut self, ability: Ability) -> Result<(), CatalogError> {
        ability.validate()?;
        if self.abilities.contains_key(&ability.id) {
            return Err(CatalogError::Duplicate(ability.id));
        }
        self.abilities.insert(ability.id.clone(), ability);
        Ok(())
    }

    pub fn get(&self, id: &AbilityId) -> Option<&Ability> {
        self.abilities.get(id)
    }

    pub fn contains(&self, id: &AbilityId) -> bool {
        self.abilities.contains_key(id)
    }

    /// Ids in sorted order
    pub fn ids(&self) -> Vec<&AbilityId> {
        let mut ids: Vec<_> = self.abilities.keys().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }

    pub fn load_from_toml(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse `[[abilities]]` tables
    pub fn parse_toml(content: &str) -> Result<Self, CatalogError> {
        let data: TomlAbilities = toml::from_str(content)?;
        let mut catalog = Self::new();
        for ability in data.abilities {
            catalog.insert(ability)?;
        }
        Ok(catalog)
    }
}

#[derive(Debug, Deserialize)]
struct TomlAbilities {
    #[serde(default)]
    abilities: Vec<Ability>,
}

fn boost(stat: Stat, factor: f32, duration_ms: u64) -> Directive {
    Directive::StatBoost {
        target: EffectTarget::User,
        stat,
        modifier: StatModifier::Factor(factor),
        duration_ms,
    }
}

fn next_hit(bonus: i32) -> Directive {
    Directive::NextHitBonus {
        target: EffectTarget::User,
        bonus,
        expires_after_ms: 5000,
    }
}

fn standard_abilities() -> Vec<Ability> {
    vec![
        Ability::new(
            "flame_rush",
            "Flame Rush",
            10_000,
            vec![boost(Stat::AttackPower, 2.0, 6000)],
        ),
        Ability::new(
            "speed_surge",
            "Speed Surge",
            12_000,
            vec![
                boost(Stat::MovementSpeed, 1.2, 4000),
                boost(Stat::AttackSpeed, 1.2, 4000),
            ],
        ),
        Ability::new(
            "electric_burst",
            "Electric Burst",
            9000,
            vec![
                boost(Stat::AttackPower, 1.1, 5000),
                boost(Stat::MovementSpeed, 1.1, 5000),
                Directive::OpponentStun { duration_ms: 2000 },
            ],
        ),
        Ability::new("blazing_punch", "Blazing Punch", 9000, vec![next_hit(18)]),
        Ability::new(
            "shadow_step",
            "Shadow Step",
            10_000,
            vec![next_hit(15), Directive::Teleport],
        ),
        Ability::new(
            "natures_embrace",
            "Nature's Embrace",
            15_000,
            vec![Directive::GradualHeal {
                target: EffectTarget::User,
                amount: HealAmount::FractionOfMax(0.04),
                duration_ms: 10_000,
                steps: 10,
            }],
        ),
        Ability::new(
            "shadow_strike",
            "Shadow Strike",
            13_000,
            vec![next_hit(20), Directive::Invisibility { duration_ms: 5000 }],
        ),
        Ability::new(
            "earthquake",
            "Earthquake",
            16_000,
            vec![
                boost(Stat::AttackPower, 1.15, 5000),
                boost(Stat::MovementSpeed, 1.15, 5000),
                Directive::OpponentStun { duration_ms: 7000 },
            ],
        ),
    ]
}
