//! Team identity and two-team bit sets.
//!
//! A match always has exactly two squads of [`SQUAD_SIZE`] combatants.
//! [`TeamId`] names a squad and [`TeamFlags`] is the two-bit set the match
//! uses for its round-ready and defeat bookkeeping.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Number of combatants in each squad.
pub const SQUAD_SIZE: usize = 5;

/// One of the two squads in a match.
///
/// Team A is index 0 and moves first within each slot pair under the default
/// turn order.
///
/// # Example
///
/// ```
/// use skirmish_core::team::TeamId;
///
/// assert_eq!(TeamId::A.opponent(), TeamId::B);
/// assert_eq!(TeamId::B.index(), 1);
/// assert_eq!(TeamId::A.to_string(), "A");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TeamId {
    /// First squad (index 0).
    A,
    /// Second squad (index 1).
    B,
}

impl TeamId {
    /// Both teams, in index order.
    pub const BOTH: [Self; 2] = [Self::A, Self::B];

    /// Returns the team's index (0 or 1).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }

    /// Returns the team for an index, if it is 0 or 1.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::A),
            1 => Some(Self::B),
            _ => None,
        }
    }

    /// Returns the opposing team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// Returns the letter used in combatant names.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
        }
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

bitflags! {
    /// Set of teams, used for the round-ready and defeat flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct TeamFlags: u8 {
        /// Team A is in the set.
        const A = 1 << 0;
        /// Team B is in the set.
        const B = 1 << 1;
    }
}

impl TeamFlags {
    /// Returns `true` if `team` is in the set.
    #[must_use]
    pub fn has(self, team: TeamId) -> bool {
        self.contains(Self::from(team))
    }
}

impl From<TeamId> for TeamFlags {
    fn from(team: TeamId) -> Self {
        match team {
            TeamId::A => Self::A,
            TeamId::B => Self::B,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponent_is_involution() {
        for team in TeamId::BOTH {
            assert_eq!(team.opponent().opponent(), team);
            assert_ne!(team.opponent(), team);
        }
    }

    #[test]
    fn index_round_trips() {
        for team in TeamId::BOTH {
            assert_eq!(TeamId::from_index(team.index()), Some(team));
        }
        assert_eq!(TeamId::from_index(2), None);
    }

    #[test]
    fn flags_track_both_teams() {
        let mut flags = TeamFlags::empty();
        flags.insert(TeamId::B.into());
        assert!(flags.has(TeamId::B));
        assert!(!flags.has(TeamId::A));
        assert!(!flags.is_all());

        flags.insert(TeamId::A.into());
        assert!(flags.is_all());
    }
}
