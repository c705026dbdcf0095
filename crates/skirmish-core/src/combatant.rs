//! Combatants and the attacks they emit.
//!
//! A [`Combatant`] holds one fighter's hp and cooldown and decides what to do
//! each round. Its decision is returned as an [`Action`] for the owning
//! [`TeamCoordinator`](crate::coordinator::TeamCoordinator) to record; the
//! combatant never touches enemy state directly.
//!
//! # Action Policy
//!
//! On its turn a combatant either skips (cooldown pending) or attacks:
//!
//! | attack | chance | damage | cooldown |
//! |---|---|---|---|
//! | single target | 4 in 5, or forced with one target left | 10–15 | damage |
//! | area | 1 in 5 | 5–10 | 2 × damage |

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::rng::GameRng;
use crate::team::TeamId;

// =============================================================================
// Rule Constants
// =============================================================================

/// Default hp of a fresh combatant.
pub const STARTING_HP: i32 = 100;

/// Inclusive damage range of a single-target attack.
pub const SINGLE_TARGET_DAMAGE: (u32, u32) = (10, 15);

/// Inclusive damage range of an area attack.
pub const AREA_DAMAGE: (u32, u32) = (5, 10);

/// Weight of choosing a single-target attack.
pub const SINGLE_TARGET_WEIGHT: u32 = 4;

/// Weight of choosing an area attack.
pub const AREA_WEIGHT: u32 = 1;

/// Area attacks cost this many cooldown rounds per point of damage.
pub const AREA_COOLDOWN_FACTOR: u32 = 2;

// =============================================================================
// Identity
// =============================================================================

/// Identity of a combatant: its team and roster slot.
///
/// Displays as the team letter followed by the slot, e.g. `A0` or `B4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatantId {
    /// Owning team.
    pub team: TeamId,
    /// Roster slot, `0..SQUAD_SIZE`.
    pub slot: usize,
}

impl CombatantId {
    /// Creates a combatant identity.
    #[must_use]
    pub const fn new(team: TeamId, slot: usize) -> Self {
        Self { team, slot }
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.team, self.slot)
    }
}

// =============================================================================
// Attacks
// =============================================================================

/// What an attack is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// One enemy roster slot.
    Single(usize),
    /// Every enemy slot that is targetable when the attack is recorded.
    Area,
}

/// One attack, queued in a [`DamageTable`](crate::damage::DamageTable) until
/// the round barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttackIntent {
    /// Who attacked.
    pub source: CombatantId,
    /// Damage dealt if the attack lands.
    pub damage: u32,
    /// What the attack is aimed at.
    pub target: Target,
}

impl AttackIntent {
    /// Returns `true` for area attacks.
    #[must_use]
    pub const fn is_area(&self) -> bool {
        matches!(self.target, Target::Area)
    }

    /// Returns the targeted slot, or `None` for area attacks.
    #[must_use]
    pub const fn target_slot(&self) -> Option<usize> {
        match self.target {
            Target::Single(slot) => Some(slot),
            Target::Area => None,
        }
    }
}

/// A combatant's decision for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// The combatant attacked.
    Attack(AttackIntent),
    /// The combatant was on cooldown (or had nothing to target).
    Skip {
        /// Who skipped.
        source: CombatantId,
    },
}

impl Action {
    /// Returns the combatant that produced this action.
    #[must_use]
    pub const fn source(&self) -> CombatantId {
        match self {
            Self::Attack(intent) => intent.source,
            Self::Skip { source } => *source,
        }
    }
}

// =============================================================================
// Combatant
// =============================================================================

/// One fighter's mutable state.
///
/// hp may go negative on the killing blow; the owning coordinator removes the
/// combatant from its roster as soon as hp reaches 0 or below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    id: CombatantId,
    hp: i32,
    cooldown: u32,
}

impl Combatant {
    /// Creates a combatant with the given hp and no cooldown.
    #[must_use]
    pub const fn new(id: CombatantId, hp: i32) -> Self {
        Self {
            id,
            hp,
            cooldown: 0,
        }
    }

    /// Returns a copy with `hp` replaced.
    #[must_use]
    pub const fn with_hp(mut self, hp: i32) -> Self {
        self.hp = hp;
        self
    }

    /// Returns a copy with `cooldown` replaced.
    #[must_use]
    pub const fn with_cooldown(mut self, cooldown: u32) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Returns the combatant's identity.
    #[must_use]
    pub const fn id(&self) -> CombatantId {
        self.id
    }

    /// Returns current hp.
    #[must_use]
    pub const fn hp(&self) -> i32 {
        self.hp
    }

    /// Returns the remaining cooldown in rounds.
    #[must_use]
    pub const fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Returns `true` while hp is above 0.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Chooses this round's action against the enemy's `targets` slots.
    ///
    /// Draw order is load-bearing for reproducibility: the single/area choice
    /// (skipped when one target remains), then damage, then the target index.
    pub fn act<R: GameRng + ?Sized>(&mut self, targets: &[usize], rng: &mut R) -> Action {
        let source = self.id;

        if self.cooldown > 0 {
            self.cooldown -= 1;
            trace!(combatant = %source, cooldown = self.cooldown, "on cooldown");
            return Action::Skip { source };
        }

        if targets.is_empty() {
            debug!(combatant = %source, "no living targets");
            return Action::Skip { source };
        }

        if targets.len() == 1 || rng.random_boolean(SINGLE_TARGET_WEIGHT, AREA_WEIGHT) {
            let damage = rng.random_integer(SINGLE_TARGET_DAMAGE.0, SINGLE_TARGET_DAMAGE.1);
            self.cooldown = damage;
            let Some(&slot) = rng.pick(targets) else {
                return Action::Skip { source };
            };
            debug!(combatant = %source, damage, target = slot, "single-target attack");
            Action::Attack(AttackIntent {
                source,
                damage,
                target: Target::Single(slot),
            })
        } else {
            let damage = rng.random_integer(AREA_DAMAGE.0, AREA_DAMAGE.1);
            self.cooldown = damage * AREA_COOLDOWN_FACTOR;
            debug!(combatant = %source, damage, "area attack");
            Action::Attack(AttackIntent {
                source,
                damage,
                target: Target::Area,
            })
        }
    }

    /// Applies a landed hit. Returns `true` if this hit defeated the combatant.
    pub fn take_hit(&mut self, damage: u32) -> bool {
        self.hp = self.hp.saturating_sub_unsigned(damage);
        !self.is_alive()
    }

    /// Returns a serializable view of this combatant.
    #[must_use]
    pub fn snapshot(&self) -> CombatantSnapshot {
        CombatantSnapshot {
            name: self.id.to_string(),
            team: self.id.team,
            slot: self.id.slot,
            hp: self.hp.max(0),
            cooldown: self.cooldown,
        }
    }
}

/// Serializable view of a combatant, with hp clamped at 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    /// Display name (`A0`…`B4`).
    pub name: String,
    /// Owning team.
    pub team: TeamId,
    /// Roster slot.
    pub slot: usize,
    /// Current hp, never below 0.
    pub hp: i32,
    /// Remaining cooldown.
    pub cooldown: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::helpers::ScriptedRng;

    const ALL_SLOTS: [usize; 5] = [0, 1, 2, 3, 4];

    fn a0() -> Combatant {
        Combatant::new(CombatantId::new(TeamId::A, 0), STARTING_HP)
    }

    mod identity_tests {
        use super::*;

        #[test]
        fn display_name_is_team_letter_and_slot() {
            assert_eq!(CombatantId::new(TeamId::A, 0).to_string(), "A0");
            assert_eq!(CombatantId::new(TeamId::B, 4).to_string(), "B4");
        }

        #[test]
        fn target_slot_is_none_for_area() {
            let intent = AttackIntent {
                source: CombatantId::new(TeamId::A, 1),
                damage: 7,
                target: Target::Area,
            };
            assert!(intent.is_area());
            assert_eq!(intent.target_slot(), None);
        }
    }

    mod act_tests {
        use super::*;

        #[test]
        fn cooldown_skips_and_decrements_without_drawing() {
            let mut combatant = a0().with_cooldown(3);
            let mut rng = ScriptedRng::new(&[]);

            let action = combatant.act(&ALL_SLOTS, &mut rng);

            assert_eq!(action, Action::Skip { source: combatant.id() });
            assert_eq!(combatant.cooldown(), 2);
            assert_eq!(rng.draws(), 0);
        }

        #[test]
        fn single_target_attack_sets_cooldown_to_damage() {
            let mut combatant = a0();
            // bool: 0 % 5 < 4, damage: 10 + 2 % 6, target index: 3 % 5
            let mut rng = ScriptedRng::new(&[0, 2, 3]);

            let action = combatant.act(&ALL_SLOTS, &mut rng);

            let Action::Attack(intent) = action else {
                panic!("expected attack, got {action:?}");
            };
            assert_eq!(intent.damage, 12);
            assert_eq!(intent.target, Target::Single(3));
            assert_eq!(combatant.cooldown(), 12);
            assert_eq!(rng.draws(), 3);
        }

        #[test]
        fn area_attack_doubles_cooldown() {
            let mut combatant = a0();
            // bool: 4 % 5 = 4, not < 4 -> area; damage: 5 + 3 % 6
            let mut rng = ScriptedRng::new(&[4, 3]);

            let action = combatant.act(&ALL_SLOTS, &mut rng);

            let Action::Attack(intent) = action else {
                panic!("expected attack, got {action:?}");
            };
            assert_eq!(intent.damage, 8);
            assert!(intent.is_area());
            assert_eq!(combatant.cooldown(), 16);
        }

        #[test]
        fn last_target_forces_single_attack_without_choice_draw() {
            let mut combatant = a0();
            // damage: 10 + 5 % 6, target: 0 % 1
            let mut rng = ScriptedRng::new(&[5, 9]);

            let action = combatant.act(&[2], &mut rng);

            assert_eq!(
                action,
                Action::Attack(AttackIntent {
                    source: combatant.id(),
                    damage: 15,
                    target: Target::Single(2),
                })
            );
            assert_eq!(rng.draws(), 2);
        }

        #[test]
        fn target_index_maps_into_living_list() {
            let mut combatant = a0();
            // bool true, damage 10, index 1 % 3 -> living[1]
            let mut rng = ScriptedRng::new(&[0, 0, 1]);

            let action = combatant.act(&[0, 3, 4], &mut rng);

            assert_eq!(action.source(), combatant.id());
            let Action::Attack(intent) = action else {
                panic!("expected attack");
            };
            assert_eq!(intent.target_slot(), Some(3));
        }

        #[test]
        fn no_targets_skips_without_cooldown_change() {
            let mut combatant = a0();
            let mut rng = ScriptedRng::new(&[]);

            let action = combatant.act(&[], &mut rng);

            assert!(matches!(action, Action::Skip { .. }));
            assert_eq!(combatant.cooldown(), 0);
            assert_eq!(rng.draws(), 0);
        }
    }

    mod hit_tests {
        use super::*;

        #[test]
        fn hit_reduces_hp() {
            let mut combatant = a0();
            assert!(!combatant.take_hit(12));
            assert_eq!(combatant.hp(), 88);
        }

        #[test]
        fn lethal_hit_reports_defeat_and_keeps_negative_hp() {
            let mut combatant = a0().with_hp(5);
            assert!(combatant.take_hit(10));
            assert_eq!(combatant.hp(), -5);
            assert!(!combatant.is_alive());
        }

        #[test]
        fn exact_lethal_hit_defeats() {
            let mut combatant = a0().with_hp(10);
            assert!(combatant.take_hit(10));
        }

        #[test]
        fn snapshot_clamps_hp() {
            let mut combatant = a0().with_hp(3);
            combatant.take_hit(10);
            let snapshot = combatant.snapshot();
            assert_eq!(snapshot.hp, 0);
            assert_eq!(snapshot.name, "A0");
        }
    }
}
