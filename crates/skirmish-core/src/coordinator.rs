//! Per-team coordination: action counting, damage tables and resolution.
//!
//! A [`TeamCoordinator`] owns one squad. During a round it counts the
//! actions of its living combatants and records their attacks into a
//! [`DamageTable`] aimed at the enemy. When every living combatant has acted
//! the table is handed back to the caller (the match), which pairs it with
//! the enemy's table at the round barrier.
//!
//! At the barrier the coordinator resolves the enemy's table against its own
//! roster: each queued intent rolls a miss rate, then a miss check, and on a
//! hit subtracts damage. A combatant reduced to hp ≤ 0 leaves the roster
//! immediately and absorbs nothing else that round.

use std::fmt;
use std::mem;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::bus::{EventBus, ListenerId};
use crate::combatant::{Action, Combatant, CombatantId, CombatantSnapshot};
use crate::config::MatchConfig;
use crate::damage::DamageTable;
use crate::events::{CoordinatorChannel, CoordinatorEvent};
use crate::rng::GameRng;
use crate::team::{TeamId, SQUAD_SIZE};

/// Result of resolving one round's incoming damage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// The team that absorbed the damage.
    pub team: TeamId,
    /// Sum of landed damage.
    pub damage_taken: u32,
    /// Slots still alive afterwards, ascending.
    pub survivors: Vec<usize>,
    /// `true` if no one survived.
    pub beaten: bool,
}

/// Owns one squad and runs its half of the round protocol.
pub struct TeamCoordinator {
    team: TeamId,
    config: MatchConfig,
    roster: [Option<Combatant>; SQUAD_SIZE],
    /// Enemy slots this team may target, refreshed from the enemy's survivors.
    living_targets: Vec<usize>,
    pending_actions: usize,
    table: DamageTable,
    bus: EventBus<CoordinatorChannel, CoordinatorEvent>,
}

impl fmt::Debug for TeamCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeamCoordinator")
            .field("team", &self.team)
            .field("alive", &self.alive())
            .field("living_targets", &self.living_targets)
            .field("pending_actions", &self.pending_actions)
            .field("queued", &self.table.len())
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

impl TeamCoordinator {
    /// Creates a coordinator with a full, fresh squad.
    #[must_use]
    pub fn new(team: TeamId, config: &MatchConfig) -> Self {
        let mut coordinator = Self {
            team,
            config: config.clone(),
            roster: Default::default(),
            living_targets: Vec::with_capacity(SQUAD_SIZE),
            pending_actions: 0,
            table: DamageTable::new(),
            bus: EventBus::new(),
        };
        coordinator.reset();
        coordinator
    }

    /// Restores a fresh squad, an empty table and a full target list.
    ///
    /// Listeners stay registered.
    pub fn reset(&mut self) {
        let (team, hp) = (self.team, self.config.starting_hp);
        for (slot, entry) in self.roster.iter_mut().enumerate() {
            *entry = Some(Combatant::new(CombatantId::new(team, slot), hp));
        }
        self.living_targets = (0..SQUAD_SIZE).collect();
        self.pending_actions = 0;
        self.table = DamageTable::new();
    }

    /// Returns the team this coordinator owns.
    #[must_use]
    pub const fn team(&self) -> TeamId {
        self.team
    }

    // =========================================================================
    // Round Protocol
    // =========================================================================

    /// Lets the combatant in `slot` act and records its action.
    ///
    /// Returns the completed table once this was the last action the team
    /// owes this round. Defeated or out-of-range slots are skipped.
    pub fn act<R: RngCore + ?Sized>(&mut self, slot: usize, rng: &mut R) -> Option<DamageTable> {
        let targets = &self.living_targets;
        let Some(combatant) = self.roster.get_mut(slot).and_then(Option::as_mut) else {
            debug!(team = %self.team, slot, "no living combatant in slot");
            return None;
        };
        let action = combatant.act(targets, rng);
        self.receive(action)
    }

    /// Counts `action` toward the team's quota and queues it if it is an
    /// attack.
    ///
    /// When the count reaches the number of living combatants the counter
    /// resets and the filled table is returned, leaving a fresh one behind.
    pub fn receive(&mut self, action: Action) -> Option<DamageTable> {
        if action.source().team != self.team {
            warn!(team = %self.team, source = %action.source(), "ignoring action from another team");
            return None;
        }

        self.pending_actions += 1;
        if let Action::Attack(intent) = action {
            self.table.record(intent, &self.living_targets);
        }
        self.publish(CoordinatorEvent::ActionTaken(action));

        if self.pending_actions < self.required_actions() {
            return None;
        }
        self.pending_actions = 0;
        debug!(team = %self.team, queued = self.table.len(), "damage table complete");
        Some(mem::take(&mut self.table))
    }

    /// Applies the enemy's `table` to this team's roster.
    ///
    /// Slots are processed in order. For each intent against a living slot
    /// the miss rate is drawn from the attack kind's range, then
    /// `random_boolean(rate, 100 - rate)` decides a miss.
    pub fn resolve<R: RngCore + ?Sized>(&mut self, table: &DamageTable, rng: &mut R) -> Resolution {
        let mut damage_taken = 0u32;

        for (slot, intents) in table.iter() {
            for intent in intents {
                let Some(combatant) = self.roster.get_mut(slot).and_then(Option::as_mut) else {
                    break;
                };
                let target = combatant.id();

                let range = self.config.miss_range(intent);
                let miss_rate = rng.random_integer(range.low, range.high);
                if rng.random_boolean(miss_rate, 100 - miss_rate) {
                    debug!(attacker = %intent.source, %target, miss_rate, "dodged");
                    self.publish(CoordinatorEvent::Miss {
                        intent: *intent,
                        target,
                        miss_rate,
                    });
                    continue;
                }

                let defeated = combatant.take_hit(intent.damage);
                let remaining_hp = combatant.hp();
                damage_taken = damage_taken.saturating_add(intent.damage);
                debug!(attacker = %intent.source, %target, damage = intent.damage, remaining_hp, "hit");
                self.publish(CoordinatorEvent::Hit {
                    intent: *intent,
                    target,
                    remaining_hp,
                });

                if defeated {
                    info!(attacker = %intent.source, %target, "defeated");
                    self.roster[slot] = None;
                    self.publish(CoordinatorEvent::Defeated {
                        by: intent.source,
                        target,
                        final_hp: remaining_hp,
                    });
                    break;
                }
            }
        }

        let survivors = self.survivors();
        let resolution = Resolution {
            team: self.team,
            damage_taken,
            beaten: survivors.is_empty(),
            survivors,
        };
        if resolution.beaten {
            info!(team = %self.team, "team beaten");
        }
        self.publish(CoordinatorEvent::Resolved(resolution.clone()));
        resolution
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Enemy slots this team may currently target.
    #[must_use]
    pub fn living_targets(&self) -> &[usize] {
        &self.living_targets
    }

    /// Replaces the target list with the enemy's latest survivors.
    pub fn set_living_targets(&mut self, targets: Vec<usize>) {
        self.living_targets = targets;
    }

    /// Number of living combatants.
    #[must_use]
    pub fn alive(&self) -> usize {
        self.roster.iter().flatten().count()
    }

    /// Actions the team owes per round (one per living combatant).
    #[must_use]
    pub fn required_actions(&self) -> usize {
        self.alive()
    }

    /// Actions counted so far this round.
    #[must_use]
    pub const fn pending_actions(&self) -> usize {
        self.pending_actions
    }

    /// The table being filled this round.
    #[must_use]
    pub const fn pending_table(&self) -> &DamageTable {
        &self.table
    }

    /// Slots of living combatants, ascending.
    #[must_use]
    pub fn survivors(&self) -> Vec<usize> {
        self.roster
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| entry.as_ref().map(|_| slot))
            .collect()
    }

    /// The full roster; defeated slots are `None`.
    #[must_use]
    pub const fn roster(&self) -> &[Option<Combatant>; SQUAD_SIZE] {
        &self.roster
    }

    /// The living combatant in `slot`, if any.
    #[must_use]
    pub fn combatant(&self, slot: usize) -> Option<&Combatant> {
        self.roster.get(slot).and_then(Option::as_ref)
    }

    /// Mutable access to the living combatant in `slot`, if any.
    pub fn combatant_mut(&mut self, slot: usize) -> Option<&mut Combatant> {
        self.roster.get_mut(slot).and_then(Option::as_mut)
    }

    /// Snapshots of every living combatant.
    #[must_use]
    pub fn snapshots(&self) -> Vec<CombatantSnapshot> {
        self.roster.iter().flatten().map(Combatant::snapshot).collect()
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Subscribes to one of this coordinator's channels.
    pub fn on<F>(&mut self, channel: CoordinatorChannel, handler: F) -> ListenerId
    where
        F: FnMut(&CoordinatorEvent) + Send + 'static,
    {
        self.bus.on(channel, handler)
    }

    /// Unsubscribes one listener, or all listeners on `channel` when `listener` is `None`.
    pub fn off(&mut self, channel: CoordinatorChannel, listener: Option<ListenerId>) -> usize {
        self.bus.off(channel, listener)
    }

    fn publish(&mut self, event: CoordinatorEvent) {
        self.bus.trigger(event.channel(), &event);
    }
}
