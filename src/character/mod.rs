//! Character combat state
//!
//! Health, stats and the attack/shield/charge/stun machines for one fighter.

pub mod attack;
pub mod cooldown;
pub mod profile;
pub mod shield;
pub mod state;
pub mod stats;
pub mod view;

pub use attack::{AttackPhase, AttackState};
pub use cooldown::Cooldown;
pub use profile::{CharacterProfile, CharacterTraits, BASE_MOVEMENT_SPEED};
pub use shield::ShieldState;
pub use state::{Character, DamageOutcome};
pub use stats::{Stat, StatModifier, StatValue};
pub use view::CharacterView;
