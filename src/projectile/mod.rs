//! Projectile engine
//!
//! Charged shots: spawn with a per-owner cap, straight-line flight, and
//! retirement on bounds, projectile clashes, shields and characters.

pub mod engine;
pub mod launch;

pub use engine::{CharacterHit, HitTarget, ProjectileEngine, ProjectileView, RetireReason};
pub use launch::{charged_size, charged_speed, clamp_charge, Launch, Projectile};
