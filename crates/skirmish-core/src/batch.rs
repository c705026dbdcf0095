//! Parallel runs of many independently seeded matches.
//!
//! Each seed gets its own [`Match`] on a rayon worker; nothing is shared
//! between matches, so results depend only on the config and the seed list,
//! never on scheduling.
//!
//! # Example
//!
//! ```
//! use skirmish_core::batch::{run_batch, seed_range};
//! use skirmish_core::config::MatchConfig;
//!
//! let batch = run_batch(&MatchConfig::default(), &seed_range(100, 8)).unwrap();
//! assert_eq!(batch.results.len(), 8);
//! assert_eq!(batch.summary.finished(), 8);
//! ```

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::MatchConfig;
use crate::error::ConfigError;
use crate::events::Outcome;
use crate::simulation::Match;

/// Result of one match in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Seed the match ran with.
    pub seed: u32,
    /// Final result; `None` if the match stalled.
    pub outcome: Option<Outcome>,
    /// Rounds played.
    pub rounds: u32,
}

/// Tally over a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Matches won by team A.
    pub team_a_wins: usize,
    /// Matches won by team B.
    pub team_b_wins: usize,
    /// Matches ending in a draw.
    pub draws: usize,
    /// Matches that never reached an outcome.
    pub unfinished: usize,
    /// Mean rounds per finished match.
    pub mean_rounds: f64,
}

impl BatchSummary {
    /// Tallies `results`.
    #[must_use]
    pub fn from_results(results: &[MatchResult]) -> Self {
        let mut summary = Self::default();
        let mut total_rounds = 0u64;

        for result in results {
            match result.outcome {
                Some(Outcome::TeamAWins) => summary.team_a_wins += 1,
                Some(Outcome::TeamBWins) => summary.team_b_wins += 1,
                Some(Outcome::Draw) => summary.draws += 1,
                None => {
                    summary.unfinished += 1;
                    continue;
                }
            }
            total_rounds += u64::from(result.rounds);
        }

        let finished = summary.finished();
        if finished > 0 {
            // Precision loss only matters past 2^52 rounds
            #[allow(clippy::cast_precision_loss)]
            let mean = total_rounds as f64 / finished as f64;
            summary.mean_rounds = mean;
        }
        summary
    }

    /// Matches that reached an outcome.
    #[must_use]
    pub const fn finished(&self) -> usize {
        self.team_a_wins + self.team_b_wins + self.draws
    }
}

/// Per-seed results in seed order, plus their tally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// One entry per seed, in the order given.
    pub results: Vec<MatchResult>,
    /// Tally over `results`.
    pub summary: BatchSummary,
}

/// Returns `count` consecutive seeds starting at `start`, wrapping at `u32::MAX`.
#[must_use]
pub fn seed_range(start: u32, count: u32) -> Vec<u32> {
    (0..count).map(|offset| start.wrapping_add(offset)).collect()
}

/// Plays one match per seed in parallel.
///
/// `config.seed` is replaced by each seed in turn.
///
/// # Errors
///
/// Returns [`ConfigError`] if `config` fails validation.
pub fn run_batch(config: &MatchConfig, seeds: &[u32]) -> Result<BatchReport, ConfigError> {
    config.validate()?;

    let results = seeds
        .par_iter()
        .map(|&seed| -> Result<MatchResult, ConfigError> {
            let config = MatchConfig {
                seed: Some(seed),
                ..config.clone()
            };
            let mut game = Match::new(config)?;
            let outcome = game.run_to_completion();
            Ok(MatchResult {
                seed,
                outcome,
                rounds: game.round(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let summary = BatchSummary::from_results(&results);
    info!(
        matches = results.len(),
        team_a_wins = summary.team_a_wins,
        team_b_wins = summary.team_b_wins,
        draws = summary.draws,
        "batch complete"
    );
    Ok(BatchReport { results, summary })
}
