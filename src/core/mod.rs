pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::MatchClock;
pub use config::{CombatConfig, ConfigError};
pub use error::{CombatError, ErrorKind, Rejection, Result};
pub use types::{CharacterId, ProjectileId, Rect, Side, SimTime, Vec2};
