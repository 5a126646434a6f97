//! Arena Clash - real-time combat core for a two-player arena fighter

pub mod ability;
pub mod character;
pub mod combat;
pub mod core;
pub mod projectile;
pub mod round;
pub mod scheduler;
pub mod session;

pub use session::MatchSession;
