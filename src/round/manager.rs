//! Round sequencing
//!
//! Best-of-N: a side needs more than half of the rounds. The round timer
//! counts down in simulation milliseconds; when it runs out the healthier
//! side takes the round.

use serde::{Deserialize, Serialize};

use crate::character::Character;
use crate::core::error::{CombatError, Result};
use crate::core::types::{CharacterId, Side};

/// Match phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchPhase {
    #[default]
    InProgress,
    Finished {
        winner: Option<Side>,
    },
}

/// What happens after a round ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    NextRound { round: u32 },
    MatchOver { winner: Option<Side> },
}

/// Serializable snapshot for scoreboards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    pub round: u32,
    pub total_rounds: u32,
    pub wins: [u32; 2],
    pub time_remaining_ms: u64,
    pub phase: MatchPhase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundManager {
    participants: [CharacterId; 2],
    total_rounds: u32,
    round_duration_ms: u64,
    /// 1-based
    current_round: u32,
    wins: [u32; 2],
    time_remaining_ms: u64,
    phase: MatchPhase,
}

impl RoundManager {
    /// Exactly two participants, in side order
    pub fn new(
        total_rounds: u32,
        participants: &[CharacterId],
        round_duration_ms: u64,
    ) -> Result<Self> {
        let participants: [CharacterId; 2] = participants
            .try_into()
            .map_err(|_| CombatError::InvalidParticipants(participants.len()))?;

        Ok(Self {
            participants,
            total_rounds: total_rounds.max(1),
            round_duration_ms,
            current_round: 1,
            wins: [0; 2],
            time_remaining_ms: round_duration_ms,
            phase: MatchPhase::InProgress,
        })
    }

    /// Reset the timer for the current round and return its index
    pub fn start_new_round(&mut self) -> u32 {
        self.time_remaining_ms = self.round_duration_ms;
        tracing::info!(round = self.current_round, "round started");
        self.current_round
    }

    /// Record a round result. `None` is a drawn round; nobody scores.
    pub fn end_round(&mut self, winner: Option<Side>) -> RoundOutcome {
        if let MatchPhase::Finished { winner } = self.phase {
            return RoundOutcome::MatchOver { winner };
        }

        if let Some(side) = winner {
            self.wins[side.index()] += 1;
        }
        tracing::info!(
            round = self.current_round,
            ?winner,
            wins_one = self.wins[0],
            wins_two = self.wins[1],
            "round ended"
        );

        // Majority first, then the round limit
        let majority = self.total_rounds / 2;
        let decided = Side::both()
            .into_iter()
            .find(|side| self.wins[side.index()] > majority);

        let finished = match decided {
            Some(side) => Some(Some(side)),
            None if self.current_round >= self.total_rounds => Some(self.leader()),
            None => None,
        };

        match finished {
            Some(winner) => {
                self.phase = MatchPhase::Finished { winner };
                tracing::info!(?winner, "match finished");
                RoundOutcome::MatchOver { winner }
            }
            None => {
                self.current_round += 1;
                RoundOutcome::NextRound {
                    round: self.start_new_round(),
                }
            }
        }
    }

    /// Higher remaining health takes a timed-out round; equal health is a draw
    pub fn determine_timeout_winner(a: &Character, b: &Character) -> Option<Side> {
        match a.health().cmp(&b.health()) {
            std::cmp::Ordering::Greater => Some(a.side()),
            std::cmp::Ordering::Less => Some(b.side()),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Count the timer down. Returns true once it has run out.
    pub fn tick_timer(&mut self, elapsed_ms: u64) -> bool {
        self.time_remaining_ms = self.time_remaining_ms.saturating_sub(elapsed_ms);
        self.time_remaining_ms == 0
    }

    fn leader(&self) -> Option<Side> {
        match self.wins[0].cmp(&self.wins[1]) {
            std::cmp::Ordering::Greater => Some(Side::One),
            std::cmp::Ordering::Less => Some(Side::Two),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Which side a fighter plays on, if they are in this match
    pub fn side_of(&self, id: CharacterId) -> Option<Side> {
        Side::both()
            .into_iter()
            .find(|side| self.participants[side.index()] == id)
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn wins(&self, side: Side) -> u32 {
        self.wins[side.index()]
    }

    pub fn time_remaining(&self) -> u64 {
        self.time_remaining_ms
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, MatchPhase::Finished { .. })
    }

    /// Winner once finished; `None` while in progress or after a drawn match
    pub fn match_winner(&self) -> Option<Side> {
        match self.phase {
            MatchPhase::Finished { winner } => winner,
            MatchPhase::InProgress => None,
        }
    }

    pub fn state(&self) -> RoundState {
        RoundState {
            round: self.current_round,
            total_rounds: self.total_rounds,
            wins: self.wins,
            time_remaining_ms: self.time_remaining_ms,
            phase: self.phase,
        }
    }
}
