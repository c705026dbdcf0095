//! Test helper functions for scripting matches and capturing events.
//!
//! This module provides a scripted random stream, setup utilities for
//! holding combatants on cooldown, and listeners that record events into
//! shared vectors.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use rand::RngCore;

use crate::combatant::CombatantId;
use crate::config::{MatchConfig, MissRange};
use crate::coordinator::TeamCoordinator;
use crate::events::{CoordinatorChannel, CoordinatorEvent, MatchChannel, MatchEvent};
use crate::simulation::Match;
use crate::team::{TeamId, SQUAD_SIZE};

// =============================================================================
// Scripted RNG
// =============================================================================

/// A random stream that replays a fixed list of words.
///
/// Panics when the script runs out, so a test fails loudly if the code under
/// test draws more than expected.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    script: VecDeque<u32>,
    draws: usize,
}

impl ScriptedRng {
    /// Creates a stream that yields `words` in order.
    pub fn new(words: &[u32]) -> Self {
        Self {
            script: words.iter().copied().collect(),
            draws: 0,
        }
    }

    /// Number of words drawn so far.
    pub fn draws(&self) -> usize {
        self.draws
    }

    /// Number of scripted words not yet drawn.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        let Some(word) = self.script.pop_front() else {
            panic!("scripted rng exhausted after {} draws", self.draws);
        };
        self.draws += 1;
        word
    }

    fn next_u64(&mut self) -> u64 {
        let low = u64::from(self.next_u32());
        let high = u64::from(self.next_u32());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

// =============================================================================
// Match Setup
// =============================================================================

/// A config whose attacks never miss.
///
/// Each resolved intent still consumes two draws (rate, then roll).
pub fn sure_hit_config() -> MatchConfig {
    MatchConfig::seeded(0).with_miss(MissRange::NEVER)
}

/// Builds a match driven by `script`.
pub fn scripted_match(config: MatchConfig, script: &[u32]) -> Match<ScriptedRng> {
    Match::with_rng(config, ScriptedRng::new(script)).unwrap()
}

/// Puts every combatant except `active` on `cooldown`, so they skip without
/// drawing.
pub fn hold_all_except<R>(game: &mut Match<R>, active: &[CombatantId], cooldown: u32) {
    for team in TeamId::BOTH {
        for slot in 0..SQUAD_SIZE {
            if active.contains(&CombatantId::new(team, slot)) {
                continue;
            }
            if let Some(combatant) = game.coordinator_mut(team).combatant_mut(slot) {
                *combatant = combatant.clone().with_cooldown(cooldown);
            }
        }
    }
}

/// Overwrites the hp of one combatant.
pub fn set_hp<R>(game: &mut Match<R>, id: CombatantId, hp: i32) {
    let combatant = game
        .coordinator_mut(id.team)
        .combatant_mut(id.slot)
        .unwrap();
    *combatant = combatant.clone().with_hp(hp);
}

/// Current hp of a living combatant, or `None` once defeated.
pub fn hp_of<R>(game: &Match<R>, id: CombatantId) -> Option<i32> {
    game.coordinator(id.team).combatant(id.slot).map(|c| c.hp())
}

// =============================================================================
// Event Capture
// =============================================================================

/// Records every event published on `channel` of `coordinator`.
pub fn event_log(
    coordinator: &mut TeamCoordinator,
    channel: CoordinatorChannel,
) -> Arc<Mutex<Vec<CoordinatorEvent>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    coordinator.on(channel, move |event| sink.lock().unwrap().push(event.clone()));
    log
}

/// Records every event on the given match channels into one ordered log.
pub fn match_log<R>(game: &mut Match<R>, channels: &[MatchChannel]) -> Arc<Mutex<Vec<MatchEvent>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    for &channel in channels {
        let sink = Arc::clone(&log);
        game.on(channel, move |event| sink.lock().unwrap().push(event.clone()));
    }
    log
}

/// Every match channel.
pub const ALL_MATCH_CHANNELS: [MatchChannel; 4] = [
    MatchChannel::RoundStarted,
    MatchChannel::RoundFinished,
    MatchChannel::ReadyForNextRound,
    MatchChannel::MatchOver,
];

/// Every coordinator channel.
pub const ALL_COORDINATOR_CHANNELS: [CoordinatorChannel; 5] = [
    CoordinatorChannel::ActionTaken,
    CoordinatorChannel::Hit,
    CoordinatorChannel::Miss,
    CoordinatorChannel::Defeated,
    CoordinatorChannel::Resolved,
];

/// Records every coordinator event from both teams, plus every match event,
/// into one ordered log of debug strings.
pub fn full_transcript<R>(game: &mut Match<R>) -> Arc<Mutex<Vec<String>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    for team in TeamId::BOTH {
        for channel in ALL_COORDINATOR_CHANNELS {
            let sink = Arc::clone(&log);
            game.coordinator_mut(team).on(channel, move |event| {
                sink.lock().unwrap().push(format!("{team}: {event:?}"));
            });
        }
    }
    for channel in ALL_MATCH_CHANNELS {
        let sink = Arc::clone(&log);
        game.on(channel, move |event| sink.lock().unwrap().push(format!("{event:?}")));
    }
    log
}
