//! Round manager

pub mod manager;

pub use manager::{MatchPhase, RoundManager, RoundOutcome, RoundState};
