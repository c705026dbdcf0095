//! # Skirmish Core
//!
//! Deterministic two-team squad battle simulation.
//!
//! Two squads of five combatants fight in rounds. Every living combatant acts
//! once per round, but no damage lands until both teams have finished acting:
//! each team's attacks are frozen into a damage table, the tables are
//! exchanged at a barrier, and both sides resolve simultaneously. The match
//! ends when a squad is emptied, or in a draw when both are emptied in the
//! same round.
//!
//! ## Architecture
//!
//! - [`rng`]: MT19937 generator and the `random_integer` / `random_boolean`
//!   helpers every rule draws from
//! - [`bus`]: synchronous publish/subscribe used for outward notifications
//! - [`combatant`]: one fighter's hp, cooldown and action policy
//! - [`coordinator`]: one team's action quota, damage table and resolution
//! - [`simulation`]: the [`Match`] state machine and round barrier
//! - [`batch`]: parallel runs over many seeds
//!
//! ## Usage
//!
//! ```
//! use skirmish_core::{Match, MatchChannel, MatchConfig, MatchEvent};
//!
//! let mut game = Match::new(MatchConfig::seeded(7)).unwrap();
//! game.on(MatchChannel::MatchOver, |event| {
//!     if let MatchEvent::MatchOver { outcome, .. } = event {
//!         println!("{outcome}");
//!     }
//! });
//!
//! let outcome = game.run_to_completion();
//! assert!(outcome.is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod batch;
pub mod bus;
pub mod combatant;
pub mod config;
pub mod coordinator;
pub mod damage;
pub mod error;
pub mod events;
pub mod rng;
pub mod simulation;
pub mod team;

pub use batch::{run_batch, BatchReport, BatchSummary, MatchResult};
pub use combatant::{Action, AttackIntent, Combatant, CombatantId, CombatantSnapshot, Target};
pub use config::{MatchConfig, MissRange, TurnOrder};
pub use coordinator::{Resolution, TeamCoordinator};
pub use damage::DamageTable;
pub use error::ConfigError;
pub use events::{
    CoordinatorChannel, CoordinatorEvent, MatchChannel, MatchEvent, Outcome, RoundReport,
    TeamReport,
};
pub use rng::{GameRng, MersenneTwister};
pub use simulation::{Match, MatchState, RoundStatus};
pub use team::{TeamFlags, TeamId, SQUAD_SIZE};

#[cfg(test)]
mod tests;
