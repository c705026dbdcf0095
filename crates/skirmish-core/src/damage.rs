//! Per-round damage tables.

use tracing::warn;

use crate::combatant::{AttackIntent, Target};
use crate::team::SQUAD_SIZE;

/// Attacks queued against one team during a round, grouped by target slot.
///
/// Filled by the attacking team's coordinator, handed to the match at the
/// round barrier, and consumed by the defending team's coordinator. Intents
/// for a slot keep the order in which they were recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DamageTable {
    slots: [Vec<AttackIntent>; SQUAD_SIZE],
}

impl DamageTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `intent` against `slot`.
    ///
    /// Out-of-range slots are dropped.
    pub fn push(&mut self, slot: usize, intent: AttackIntent) {
        debug_assert!(slot < SQUAD_SIZE, "damage slot {slot} out of range");
        match self.slots.get_mut(slot) {
            Some(queue) => queue.push(intent),
            None => warn!(slot, source = %intent.source, "dropping attack on invalid slot"),
        }
    }

    /// Queues `intent` against its target, or against every slot in `living`
    /// for area attacks.
    pub fn record(&mut self, intent: AttackIntent, living: &[usize]) {
        match intent.target {
            Target::Single(slot) => self.push(slot, intent),
            Target::Area => {
                for &slot in living {
                    self.push(slot, intent);
                }
            }
        }
    }

    /// Returns the intents queued against `slot`, in arrival order.
    #[must_use]
    pub fn intents(&self, slot: usize) -> &[AttackIntent] {
        self.slots.get(slot).map(Vec::as_slice).unwrap_or_default()
    }

    /// Iterates over `(slot, intents)` for slots with at least one intent.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[AttackIntent])> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, queue)| !queue.is_empty())
            .map(|(slot, queue)| (slot, queue.as_slice()))
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Vec::is_empty)
    }

    /// Total number of queued intents across all slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }
}
