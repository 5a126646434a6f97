use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ability::AbilityId;
use crate::core::config::ConfigError;
use crate::core::types::CharacterId;

/// Why a command was turned down while the character is busy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    /// Attack wind-up or recovery in progress
    Busy,
    Stunned,
    Disabled,
    ShieldCooldown,
    ShieldDepleted,
}

#[derive(Error, Debug)]
pub enum CombatError {
    #[error("Command rejected: {0:?}")]
    InvalidState(Rejection),

    #[error("Release without a charge in progress")]
    NotCharging,

    #[error("Unknown ability: {0}")]
    UnknownAbility(AbilityId),

    #[error("Projectile constructed without an owner")]
    InvalidOwner,

    #[error("Projectile cap reached for {owner:?} ({cap} active)")]
    ProjectileCapReached { owner: CharacterId, cap: usize },

    #[error("Ability on cooldown: {remaining_ms}ms remaining")]
    OnCooldown { remaining_ms: u64 },

    #[error("A match requires exactly two participants, got {0}")]
    InvalidParticipants(usize),

    #[error("Match already finished")]
    MatchFinished,

    #[error("Invalid session config: {0}")]
    Config(#[from] ConfigError),
}

/// Error taxonomy used by callers to decide how to recover
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidState,
    UnknownAbility,
    InvalidOwner,
    CapacityExceeded,
    Construction,
}

impl ErrorKind {
    /// Only malformed construction may abort a match
    pub fn is_recoverable(self) -> bool {
        !matches!(self, ErrorKind::InvalidOwner | ErrorKind::Construction)
    }
}

impl CombatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CombatError::InvalidState(_) | CombatError::NotCharging | CombatError::MatchFinished => {
                ErrorKind::InvalidState
            }
            CombatError::UnknownAbility(_) => ErrorKind::UnknownAbility,
            CombatError::InvalidOwner => ErrorKind::InvalidOwner,
            CombatError::ProjectileCapReached { .. } | CombatError::OnCooldown { .. } => {
                ErrorKind::CapacityExceeded
            }
            CombatError::InvalidParticipants(_) | CombatError::Config(_) => {
                ErrorKind::Construction
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CombatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_mapping() {
        assert_eq!(
            CombatError::InvalidState(Rejection::Busy).kind(),
            ErrorKind::InvalidState
        );
        assert_eq!(
            CombatError::OnCooldown { remaining_ms: 10 }.kind(),
            ErrorKind::CapacityExceeded
        );
        assert_eq!(CombatError::InvalidOwner.kind(), ErrorKind::InvalidOwner);
    }

    #[test]
    fn test_only_construction_errors_are_fatal() {
        assert!(CombatError::NotCharging.kind().is_recoverable());
        assert!(CombatError::UnknownAbility(AbilityId::new("nope"))
            .kind()
            .is_recoverable());
        assert!(!CombatError::InvalidOwner.kind().is_recoverable());
        assert!(!CombatError::InvalidParticipants(3).kind().is_recoverable());
    }

    #[test]
    fn test_cooldown_message_reports_remaining() {
        let err = CombatError::OnCooldown { remaining_ms: 1500 };
        assert_eq!(err.to_string(), "Ability on cooldown: 1500ms remaining");
    }
}
