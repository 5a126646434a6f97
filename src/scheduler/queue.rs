//! Cooperative timer queue
//!
//! A min-heap of `(due, sequence)` keys plus a map of live entries.
//! Cancelling removes the live entry; its heap key is skipped when popped.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ahash::AHashMap;

use crate::character::{Stat, StatValue};
use crate::core::types::{CharacterId, SimTime};
use crate::scheduler::action::{ScheduledAction, TimerId};

#[derive(Debug, Clone)]
struct Entry {
    due: SimTime,
    action: ScheduledAction,
}

/// Fire-once scheduler advanced by the match clock
#[derive(Debug, Default)]
pub struct Scheduler {
    heap: BinaryHeap<Reverse<(SimTime, u64)>>,
    live: AHashMap<u64, Entry>,
    /// Outstanding reversion per (character, stat)
    slots: AHashMap<(CharacterId, Stat), TimerId>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action to fire at `due`
    pub fn schedule(&mut self, due: SimTime, action: ScheduledAction) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;

        if let Some(slot) = action.reversion_slot() {
            // Callers release the slot first; a stray duplicate is superseded
            if let Some(previous) = self.slots.insert(slot, TimerId(seq)) {
                self.live.remove(&previous.0);
            }
        }

        self.heap.push(Reverse((due, seq)));
        self.live.insert(seq, Entry { due, action });
        TimerId(seq)
    }

    /// Schedule the restoration of a captured value
    pub fn schedule_reversion(
        &mut self,
        due: SimTime,
        target: CharacterId,
        stat: Stat,
        value: StatValue,
    ) -> TimerId {
        self.schedule(due, ScheduledAction::RevertStat { target, stat, value })
    }

    /// Cancel the outstanding reversion for a slot, returning its captured value
    pub fn take_reversion(&mut self, target: CharacterId, stat: Stat) -> Option<StatValue> {
        let id = self.slots.remove(&(target, stat))?;
        match self.live.remove(&id.0)?.action {
            ScheduledAction::RevertStat { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn has_reversion(&self, target: CharacterId, stat: Stat) -> bool {
        self.slots.contains_key(&(target, stat))
    }

    /// Cancel every action that targets a character
    pub fn cancel_owned_by(&mut self, target: CharacterId) -> usize {
        let doomed: Vec<u64> = self
            .live
            .iter()
            .filter(|(_, entry)| entry.action.target() == target)
            .map(|(seq, _)| *seq)
            .collect();

        for seq in &doomed {
            self.live.remove(seq);
        }
        self.slots.retain(|(owner, _), _| *owner != target);
        doomed.len()
    }

    /// Drop everything, used at round boundaries
    pub fn clear(&mut self) {
        self.heap.clear();
        self.live.clear();
        self.slots.clear();
    }

    /// Remove and return every action due at or before `now`, in due order
    pub fn drain_due(&mut self, now: SimTime) -> Vec<ScheduledAction> {
        let mut due = Vec::new();

        while let Some(Reverse((at, seq))) = self.heap.peek().copied() {
            if at > now {
                break;
            }
            self.heap.pop();

            let Some(entry) = self.live.remove(&seq) else {
                continue; // cancelled
            };
            if let Some(slot) = entry.action.reversion_slot() {
                if self.slots.get(&slot) == Some(&TimerId(seq)) {
                    self.slots.remove(&slot);
                }
            }
            due.push(entry.action);
        }

        due
    }

    /// Number of live (not yet fired, not cancelled) actions
    pub fn pending_count(&self) -> usize {
        self.live.len()
    }

    /// Earliest due time among live actions
    pub fn next_due(&self) -> Option<SimTime> {
        self.live.values().map(|entry| entry.due).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heal(target: CharacterId, amount: i32) -> ScheduledAction {
        ScheduledAction::HealTick { target, amount }
    }

    #[test]
    fn test_drain_returns_due_actions_in_order() {
        let mut scheduler = Scheduler::new();
        let who = CharacterId::new();
        scheduler.schedule(300, heal(who, 3));
        scheduler.schedule(100, heal(who, 1));
        scheduler.schedule(200, heal(who, 2));

        let fired = scheduler.drain_due(250);
        assert_eq!(fired, vec![heal(who, 1), heal(who, 2)]);
        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(scheduler.next_due(), Some(300));
    }

    #[test]
    fn test_same_due_time_fires_in_registration_order() {
        let mut scheduler = Scheduler::new();
        let who = CharacterId::new();
        scheduler.schedule(100, heal(who, 1));
        scheduler.schedule(100, heal(who, 2));

        assert_eq!(scheduler.drain_due(100), vec![heal(who, 1), heal(who, 2)]);
    }

    #[test]
    fn test_take_reversion_returns_captured_value() {
        let mut scheduler = Scheduler::new();
        let who = CharacterId::new();
        scheduler.schedule_reversion(500, who, Stat::AttackPower, StatValue::Int(68));

        assert!(scheduler.has_reversion(who, Stat::AttackPower));
        assert_eq!(
            scheduler.take_reversion(who, Stat::AttackPower),
            Some(StatValue::Int(68))
        );
        assert!(!scheduler.has_reversion(who, Stat::AttackPower));
        assert!(scheduler.drain_due(1000).is_empty());
    }

    #[test]
    fn test_fired_reversion_releases_slot() {
        let mut scheduler = Scheduler::new();
        let who = CharacterId::new();
        scheduler.schedule_reversion(100, who, Stat::Stunned, StatValue::Flag(false));

        assert_eq!(scheduler.drain_due(100).len(), 1);
        assert!(!scheduler.has_reversion(who, Stat::Stunned));
    }

    #[test]
    fn test_cancel_owned_by_only_touches_that_character() {
        let mut scheduler = Scheduler::new();
        let a = CharacterId::new();
        let b = CharacterId::new();
        scheduler.schedule(100, heal(a, 1));
        scheduler.schedule_reversion(100, a, Stat::AttackPower, StatValue::Int(1));
        scheduler.schedule(100, heal(b, 2));

        assert_eq!(scheduler.cancel_owned_by(a), 2);
        assert!(!scheduler.has_reversion(a, Stat::AttackPower));
        assert_eq!(scheduler.drain_due(100), vec![heal(b, 2)]);
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut scheduler = Scheduler::new();
        let who = CharacterId::new();
        scheduler.schedule(10, heal(who, 1));
        scheduler.schedule_reversion(10, who, Stat::Invisible, StatValue::Flag(false));
        scheduler.clear();

        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(scheduler.next_due(), None);
        assert!(scheduler.drain_due(u64::MAX).is_empty());
    }
}
