//! Events published by coordinators and matches.
//!
//! Coordinators and matches each own an [`EventBus`](crate::bus::EventBus)
//! keyed by a channel enum. Every event knows its own channel, so publishers
//! call `bus.trigger(event.channel(), &event)` and subscribers register on the
//! channel they care about.
//!
//! # Channels
//!
//! | bus | channel | fired |
//! |---|---|---|
//! | coordinator | [`CoordinatorChannel::ActionTaken`] | each attack or skip by an own combatant |
//! | coordinator | [`CoordinatorChannel::Hit`] | each landed hit on an own combatant |
//! | coordinator | [`CoordinatorChannel::Miss`] | each dodged attack |
//! | coordinator | [`CoordinatorChannel::Defeated`] | an own combatant reaches hp ≤ 0 |
//! | coordinator | [`CoordinatorChannel::Resolved`] | once per resolve |
//! | match | [`MatchChannel::RoundStarted`] | a round begins |
//! | match | [`MatchChannel::RoundFinished`] | both teams resolved the round |
//! | match | [`MatchChannel::ReadyForNextRound`] | the next round may be requested |
//! | match | [`MatchChannel::MatchOver`] | once, when a team is emptied |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combatant::{Action, AttackIntent, CombatantId, CombatantSnapshot};
use crate::coordinator::Resolution;
use crate::team::{TeamFlags, TeamId};

// =============================================================================
// Coordinator Events
// =============================================================================

/// Channels on a coordinator's bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CoordinatorChannel {
    /// An own combatant attacked or skipped.
    ActionTaken,
    /// An incoming attack landed.
    Hit,
    /// An incoming attack was dodged.
    Miss,
    /// An own combatant was defeated.
    Defeated,
    /// The coordinator finished resolving a round.
    Resolved,
}

/// Observation published by a [`TeamCoordinator`](crate::coordinator::TeamCoordinator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinatorEvent {
    /// An own combatant chose its action for the round.
    ActionTaken(Action),
    /// `intent` landed on `target`.
    Hit {
        /// The landed attack.
        intent: AttackIntent,
        /// Who was hit.
        target: CombatantId,
        /// Target hp after the hit.
        remaining_hp: i32,
    },
    /// `intent` was dodged by `target`.
    Miss {
        /// The dodged attack.
        intent: AttackIntent,
        /// Who dodged.
        target: CombatantId,
        /// Miss rate rolled for this attack, in percent.
        miss_rate: u32,
    },
    /// `target` was defeated by `by`.
    Defeated {
        /// The combatant whose hit was lethal.
        by: CombatantId,
        /// The defeated combatant.
        target: CombatantId,
        /// Final hp, possibly negative.
        final_hp: i32,
    },
    /// Round resolution summary.
    Resolved(Resolution),
}

impl CoordinatorEvent {
    /// Returns the channel this event is published on.
    #[must_use]
    pub const fn channel(&self) -> CoordinatorChannel {
        match self {
            Self::ActionTaken(_) => CoordinatorChannel::ActionTaken,
            Self::Hit { .. } => CoordinatorChannel::Hit,
            Self::Miss { .. } => CoordinatorChannel::Miss,
            Self::Defeated { .. } => CoordinatorChannel::Defeated,
            Self::Resolved(_) => CoordinatorChannel::Resolved,
        }
    }
}

// =============================================================================
// Match Events
// =============================================================================

/// Channels on a match's bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchChannel {
    /// A round began.
    RoundStarted,
    /// Both teams resolved the round.
    RoundFinished,
    /// The next round may be requested.
    ReadyForNextRound,
    /// The match ended.
    MatchOver,
}

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Both teams were emptied in the same round.
    Draw,
    /// Team B was emptied.
    TeamAWins,
    /// Team A was emptied.
    TeamBWins,
}

impl Outcome {
    /// Derives the outcome from the set of defeated teams.
    ///
    /// Returns `None` while neither team is defeated.
    #[must_use]
    pub fn from_defeated(defeated: TeamFlags) -> Option<Self> {
        match (defeated.has(TeamId::A), defeated.has(TeamId::B)) {
            (false, false) => None,
            (true, true) => Some(Self::Draw),
            (false, true) => Some(Self::TeamAWins),
            (true, false) => Some(Self::TeamBWins),
        }
    }

    /// Returns the winning team, or `None` on a draw.
    #[must_use]
    pub const fn winner(self) -> Option<TeamId> {
        match self {
            Self::Draw => None,
            Self::TeamAWins => Some(TeamId::A),
            Self::TeamBWins => Some(TeamId::B),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.winner() {
            Some(team) => write!(f, "team {team} wins"),
            None => f.write_str("draw"),
        }
    }
}

/// One team's share of a [`RoundReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamReport {
    /// Reporting team.
    pub team: TeamId,
    /// Total damage the team absorbed this round.
    pub damage_taken: u32,
    /// Slots still alive after the round.
    pub survivors: Vec<usize>,
}

impl From<&Resolution> for TeamReport {
    fn from(resolution: &Resolution) -> Self {
        Self {
            team: resolution.team,
            damage_taken: resolution.damage_taken,
            survivors: resolution.survivors.clone(),
        }
    }
}

/// Summary of one finished round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    /// Round number, starting at 1.
    pub round: u32,
    /// Per-team results, indexed by [`TeamId::index`].
    pub teams: [TeamReport; 2],
}

impl RoundReport {
    /// Returns the report for `team`.
    #[must_use]
    pub fn team(&self, team: TeamId) -> &TeamReport {
        &self.teams[team.index()]
    }
}

/// Lifecycle notification published by a [`Match`](crate::simulation::Match).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchEvent {
    /// Round `round` began.
    RoundStarted {
        /// The new round number.
        round: u32,
    },
    /// Both teams resolved a round.
    RoundFinished(RoundReport),
    /// Round `round` is resolved and the next one may be requested.
    ReadyForNextRound {
        /// The round just resolved.
        round: u32,
    },
    /// The match ended.
    MatchOver {
        /// Final result.
        outcome: Outcome,
        /// The winner's living combatants, absent on a draw.
        survivors: Option<Vec<CombatantSnapshot>>,
    },
}

impl MatchEvent {
    /// Returns the channel this event is published on.
    #[must_use]
    pub const fn channel(&self) -> MatchChannel {
        match self {
            Self::RoundStarted { .. } => MatchChannel::RoundStarted,
            Self::RoundFinished(_) => MatchChannel::RoundFinished,
            Self::ReadyForNextRound { .. } => MatchChannel::ReadyForNextRound,
            Self::MatchOver { .. } => MatchChannel::MatchOver,
        }
    }
}
