pub mod events;
pub mod resolution;

pub use events::{CombatEvent, CombatEventKind, DamageSource, EventLog};
pub use resolution::{
    classify_roll, effective_defense, lifesteal_amount, projectile_damage, projectile_power,
    resolve_basic_attack, AttackRoll, MeleeResult,
};
