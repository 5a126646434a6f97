//! Delayed-effect scheduler
//!
//! Cooldown expiry, buff reversion, DOT and heal installments, stun lift and
//! attack phase changes are all fire-once actions in one queue, drained by
//! the tick loop. Nothing runs on another thread.

pub mod action;
pub mod queue;

pub use action::{ScheduledAction, TimerId};
pub use queue::Scheduler;
