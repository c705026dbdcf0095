//! The match orchestrator and its round barrier.
//!
//! A [`Match`] owns both [`TeamCoordinator`]s and the RNG. Each round runs
//! synchronously inside [`Match::request_next_round`]:
//!
//! 1. **ACT**: every living combatant acts, team A slot i then team B slot i
//!    (see [`TurnOrder`] for the alternative).
//! 2. **BARRIER**: each coordinator hands over its damage table once its
//!    quota is met. The first table waits in the pending exchange until the
//!    other team's arrives.
//! 3. **RESOLVE**: each coordinator resolves the *other* team's table
//!    against its own roster.
//! 4. **READY**: each side reports its survivors to the opponent's target
//!    list. Once both are ready the round is finished and either the next
//!    round may be requested or the match is over.
//!
//! # Determinism
//!
//! Every random decision draws from the match's single RNG in a fixed order,
//! so two matches built from the same config and seed produce identical event
//! streams.
//!
//! # Example
//!
//! ```
//! use skirmish_core::config::MatchConfig;
//! use skirmish_core::simulation::{Match, MatchState};
//!
//! let mut game = Match::new(MatchConfig::seeded(42)).unwrap();
//! let outcome = game.run_to_completion().unwrap();
//!
//! assert_eq!(game.state(), MatchState::MatchOver);
//! assert_eq!(game.outcome(), Some(outcome));
//! assert!(game.round() > 0);
//! ```

use std::fmt;
use std::thread;
use std::time::Duration;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::bus::{EventBus, ListenerId};
use crate::config::{MatchConfig, TurnOrder};
use crate::coordinator::{Resolution, TeamCoordinator};
use crate::damage::DamageTable;
use crate::error::ConfigError;
use crate::events::{MatchChannel, MatchEvent, Outcome, RoundReport, TeamReport};
use crate::rng::{GameRng, MersenneTwister};
use crate::team::{TeamFlags, TeamId, SQUAD_SIZE};

// =============================================================================
// State
// =============================================================================

/// Where a match is in its round cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchState {
    /// No round has been played since the last reset.
    AwaitingRound,
    /// A round started and at least one team has not reported ready.
    RoundInFlight,
    /// The last round is resolved and the next may be requested.
    RoundResolved,
    /// A team was emptied. Terminal.
    MatchOver,
}

/// What a call to [`Match::request_next_round`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundStatus {
    /// Round `n` was started (and, in the normal flow, fully resolved).
    Started(u32),
    /// A round is still in flight; nothing happened.
    NotReady,
    /// The match is over; nothing happened.
    Over(Outcome),
}

// =============================================================================
// Match
// =============================================================================

/// Two squads, one RNG and the round barrier between them.
///
/// `R` defaults to [`MersenneTwister`]; any [`RngCore`] works via
/// [`Match::with_rng`].
pub struct Match<R = MersenneTwister> {
    config: MatchConfig,
    rng: R,
    round: u32,
    coordinators: [TeamCoordinator; 2],
    /// The first table submitted this round, waiting for its pair.
    pending_exchange: Option<(TeamId, DamageTable)>,
    ready: TeamFlags,
    defeated: TeamFlags,
    outcome: Option<Outcome>,
    reports: [Option<TeamReport>; 2],
    bus: EventBus<MatchChannel, MatchEvent>,
}

impl<R> fmt::Debug for Match<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match")
            .field("round", &self.round)
            .field("state", &self.state())
            .field("ready", &self.ready)
            .field("defeated", &self.defeated)
            .field("pending_exchange", &self.pending_exchange.as_ref().map(|(team, _)| team))
            .field("coordinators", &self.coordinators)
            .finish_non_exhaustive()
    }
}

impl Match<MersenneTwister> {
    /// Creates a match driven by a [`MersenneTwister`].
    ///
    /// Uses `config.seed`, or an entropy seed when it is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config fails validation.
    pub fn new(config: MatchConfig) -> Result<Self, ConfigError> {
        let rng = config
            .seed
            .map_or_else(MersenneTwister::from_entropy, MersenneTwister::new);
        Self::with_rng(config, rng)
    }

    /// The seed the match's generator was created with.
    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.rng.seed()
    }
}

impl<R: RngCore> Match<R> {
    /// Creates a match driven by `rng`. `config.seed` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config fails validation.
    pub fn with_rng(config: MatchConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let coordinators = TeamId::BOTH.map(|team| TeamCoordinator::new(team, &config));
        Ok(Self {
            config,
            rng,
            round: 0,
            coordinators,
            pending_exchange: None,
            ready: TeamFlags::all(),
            defeated: TeamFlags::empty(),
            outcome: None,
            reports: [None, None],
            bus: EventBus::new(),
        })
    }

    // =========================================================================
    // Control
    // =========================================================================

    /// Resets the match and starts round 1.
    ///
    /// Both squads are restored in place, so listeners on the match and on
    /// either coordinator stay registered. The RNG is not reseeded:
    /// consecutive matches continue the same stream.
    pub fn start(&mut self) -> RoundStatus {
        self.round = 0;
        for coordinator in &mut self.coordinators {
            coordinator.reset();
        }
        self.pending_exchange = None;
        self.ready = TeamFlags::all();
        self.defeated = TeamFlags::empty();
        self.outcome = None;
        self.reports = [None, None];
        info!("match started");
        self.request_next_round()
    }

    /// Plays the next round if both teams are ready.
    ///
    /// Ignored (with the reason returned) while a round is in flight or
    /// after the match is over, so repeated calls never double-advance.
    pub fn request_next_round(&mut self) -> RoundStatus {
        if let Some(outcome) = self.outcome {
            debug!(%outcome, "round requested after match over");
            return RoundStatus::Over(outcome);
        }
        if !self.ready.is_all() {
            debug!(round = self.round, "round requested while in flight");
            return RoundStatus::NotReady;
        }

        let round = self.open_round();

        let lead = match self.config.turn_order {
            TurnOrder::Interleaved => TeamId::A,
            TurnOrder::RandomLead => {
                if self.rng.random_integer(0, 1) == 0 {
                    TeamId::A
                } else {
                    TeamId::B
                }
            }
        };

        for slot in 0..SQUAD_SIZE {
            for team in [lead, lead.opponent()] {
                let coordinator = &mut self.coordinators[team.index()];
                if coordinator.combatant(slot).is_none() {
                    continue;
                }
                if let Some(table) = coordinator.act(slot, &mut self.rng) {
                    self.report_damage(team, table);
                }
            }
        }

        RoundStatus::Started(round)
    }

    /// Clears the ready flags and announces the next round without acting.
    pub(crate) fn open_round(&mut self) -> u32 {
        self.ready = TeamFlags::empty();
        self.reports = [None, None];
        self.round += 1;
        let round = self.round;
        info!(round, "round started");
        self.publish(MatchEvent::RoundStarted { round });
        round
    }

    /// Submits `team`'s filled table (damage aimed at the opponent).
    ///
    /// The first table of a round is held until the opponent's arrives; then
    /// the opponent resolves the arriving table and `team` resolves the held
    /// one. A second report from the team whose table is already held is
    /// ignored, as is any report from a team that is not in a round (its
    /// ready flag is set, or the match is over).
    pub fn report_damage(&mut self, team: TeamId, table: DamageTable) {
        if self.outcome.is_some() || self.ready.has(team) {
            debug!(%team, state = ?self.state(), "damage report outside a round ignored");
            return;
        }
        match self.pending_exchange.take() {
            None => {
                debug!(%team, queued = table.len(), "damage table held for exchange");
                self.pending_exchange = Some((team, table));
            }
            Some((held_team, held)) if held_team == team => {
                warn!(%team, "duplicate damage report ignored");
                self.pending_exchange = Some((held_team, held));
            }
            Some((_, held)) => {
                let opponent = team.opponent();
                let first = self.coordinators[opponent.index()].resolve(&table, &mut self.rng);
                let second = self.coordinators[team.index()].resolve(&held, &mut self.rng);
                self.apply_resolution(first);
                self.apply_resolution(second);
            }
        }
    }

    /// Records that `team` has resolved the round with `survivors` alive.
    ///
    /// The survivors become the opponent's target list. When both teams are
    /// ready the round is finished.
    pub(crate) fn team_ready(&mut self, team: TeamId, survivors: Vec<usize>) {
        if self.ready.has(team) {
            debug!(%team, "team already ready");
            return;
        }
        self.coordinators[team.opponent().index()].set_living_targets(survivors);
        self.ready.insert(team.into());
        if self.ready.is_all() {
            self.finish_round();
        }
    }

    /// Records that `team` has no combatants left.
    ///
    /// Only honoured while `team` is still resolving its round.
    pub(crate) fn team_beaten(&mut self, team: TeamId) {
        if self.ready.has(team) {
            debug!(%team, "defeat outside a round ignored");
            return;
        }
        info!(%team, "team beaten");
        self.defeated.insert(team.into());
    }

    /// Plays rounds until the match is over.
    ///
    /// Returns `None` only if a round was left in flight, which the public
    /// API cannot do.
    pub fn run_to_completion(&mut self) -> Option<Outcome> {
        loop {
            match self.request_next_round() {
                RoundStatus::Started(_) => {}
                RoundStatus::Over(outcome) => return Some(outcome),
                RoundStatus::NotReady => return None,
            }
        }
    }

    /// Plays rounds with `interval` between them until the match is over.
    pub fn run_auto(&mut self, interval: Duration) -> Option<Outcome> {
        loop {
            match self.request_next_round() {
                RoundStatus::Started(_) => {
                    if let Some(outcome) = self.outcome {
                        return Some(outcome);
                    }
                    thread::sleep(interval);
                }
                RoundStatus::Over(outcome) => return Some(outcome),
                RoundStatus::NotReady => return None,
            }
        }
    }

    fn apply_resolution(&mut self, resolution: Resolution) {
        let team = resolution.team;
        self.reports[team.index()] = Some(TeamReport::from(&resolution));
        if resolution.beaten {
            self.team_beaten(team);
        }
        self.team_ready(team, resolution.survivors);
    }

    fn finish_round(&mut self) {
        let round = self.round;
        let teams = TeamId::BOTH.map(|team| {
            self.reports[team.index()].take().unwrap_or_else(|| TeamReport {
                team,
                damage_taken: 0,
                survivors: self.coordinators[team.index()].survivors(),
            })
        });
        self.publish(MatchEvent::RoundFinished(RoundReport { round, teams }));

        if self.outcome.is_none() {
            if let Some(outcome) = Outcome::from_defeated(self.defeated) {
                self.outcome = Some(outcome);
                info!(round, %outcome, "match over");
                let survivors = outcome
                    .winner()
                    .map(|team| self.coordinators[team.index()].snapshots());
                self.publish(MatchEvent::MatchOver { outcome, survivors });
                return;
            }
        }

        debug!(round, "ready for next round");
        self.publish(MatchEvent::ReadyForNextRound { round });
    }
}

impl<R> Match<R> {
    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current state of the round cycle.
    #[must_use]
    pub fn state(&self) -> MatchState {
        if self.outcome.is_some() {
            MatchState::MatchOver
        } else if !self.ready.is_all() {
            MatchState::RoundInFlight
        } else if self.round == 0 {
            MatchState::AwaitingRound
        } else {
            MatchState::RoundResolved
        }
    }

    /// Number of rounds started since the last reset.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Final result, once the match is over.
    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// The config the match was built with.
    #[must_use]
    pub const fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// The coordinator for `team`.
    #[must_use]
    pub fn coordinator(&self, team: TeamId) -> &TeamCoordinator {
        &self.coordinators[team.index()]
    }

    /// Mutable access to `team`'s coordinator, e.g. to subscribe to it.
    pub fn coordinator_mut(&mut self, team: TeamId) -> &mut TeamCoordinator {
        &mut self.coordinators[team.index()]
    }

    /// Returns `true` while one team's table is waiting for its pair.
    #[must_use]
    pub const fn is_exchange_pending(&self) -> bool {
        self.pending_exchange.is_some()
    }

    /// Teams that have reported ready this round.
    #[must_use]
    pub const fn ready_flags(&self) -> TeamFlags {
        self.ready
    }

    /// Teams that have been emptied.
    #[must_use]
    pub const fn defeated_flags(&self) -> TeamFlags {
        self.defeated
    }

    /// The match's generator.
    #[must_use]
    pub const fn rng(&self) -> &R {
        &self.rng
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Subscribes to one of the match's channels.
    pub fn on<F>(&mut self, channel: MatchChannel, handler: F) -> ListenerId
    where
        F: FnMut(&MatchEvent) + Send + 'static,
    {
        self.bus.on(channel, handler)
    }

    /// Unsubscribes one listener, or all listeners on `channel` when `listener` is `None`.
    pub fn off(&mut self, channel: MatchChannel, listener: Option<ListenerId>) -> usize {
        self.bus.off(channel, listener)
    }

    fn publish(&mut self, event: MatchEvent) {
        self.bus.trigger(event.channel(), &event);
    }
}
