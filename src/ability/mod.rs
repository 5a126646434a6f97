//! Ability catalog and executor

pub mod catalog;
pub mod directive;
pub mod executor;

pub use catalog::{Ability, AbilityCatalog, AbilityId, CatalogError};
pub use directive::{Directive, EffectTarget, HealAmount};
pub use executor::{apply_directive, execute_ability, Activation, EffectContext};
