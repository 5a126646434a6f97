//! Match clock shared by the tick loop and the scheduler
//!
//! Time only moves when the tick loop advances it, so scheduled actions
//! and per-tick state always agree on "now".

use serde::{Deserialize, Serialize};

use crate::core::types::SimTime;

/// Fixed-step clock counting ticks and elapsed milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchClock {
    tick: u64,
    tick_ms: u64,
}

impl MatchClock {
    pub fn new(tick_ms: u64) -> Self {
        Self { tick: 0, tick_ms }
    }

    pub fn advance(&mut self) {
        self.tick += 1;
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn tick_ms(&self) -> u64 {
        self.tick_ms
    }

    /// Milliseconds elapsed since the clock started
    pub fn now(&self) -> SimTime {
        self.tick * self.tick_ms
    }
}
