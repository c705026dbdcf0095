//! Terminal driver for the squad battle simulation.
//!
//! Plays one match round by round (Enter to advance), on an auto-advance
//! timer, or as fast as possible, and can run seeded batches in parallel.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use skirmish_core::batch::{run_batch, seed_range};
use skirmish_core::{
    CoordinatorChannel, CoordinatorEvent, Match, MatchChannel, MatchConfig, MatchEvent, Outcome,
    RoundStatus, TeamId,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "skirmish=info,skirmish_core=warn";

#[derive(Parser)]
#[command(version, about = "Simulate a five-on-five squad battle with simultaneous rounds")]
struct Cli {
    /// RNG seed; overrides the config file. Random when omitted.
    #[arg(long)]
    seed: Option<u32>,
    /// JSON match config.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Advance automatically every N milliseconds.
    #[arg(long, value_name = "MS", conflicts_with = "fast")]
    auto: Option<u64>,
    /// Play every round without waiting.
    #[arg(long)]
    fast: bool,
    /// Run N matches seeded seed..seed+N and print the tally.
    #[arg(long, value_name = "N")]
    batch: Option<u32>,
    /// Print the final result as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    match cli.batch {
        Some(count) => handle_batch(config, count, cli.json),
        None => handle_match(config, &cli),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<MatchConfig> {
    let Some(path) = path else {
        return Ok(MatchConfig::default());
    };
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    MatchConfig::from_json(&data).with_context(|| format!("invalid config {}", path.display()))
}

fn handle_batch(config: MatchConfig, count: u32, json: bool) -> Result<()> {
    let start = config.seed.unwrap_or_else(rand::random);
    let report = run_batch(&config, &seed_range(start, count))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let summary = &report.summary;
    println!("{count} matches from seed {start}");
    println!("  team A wins: {}", summary.team_a_wins);
    println!("  team B wins: {}", summary.team_b_wins);
    println!("  draws:       {}", summary.draws);
    if summary.unfinished > 0 {
        println!("  unfinished:  {}", summary.unfinished);
    }
    println!("  mean rounds: {:.1}", summary.mean_rounds);
    Ok(())
}

fn handle_match(config: MatchConfig, cli: &Cli) -> Result<()> {
    let mut game = Match::new(config)?;
    info!(seed = game.seed(), "new match");
    attach_combat_log(&mut game);

    let outcome = if cli.fast {
        game.start();
        game.run_to_completion()
    } else if let Some(ms) = cli.auto {
        game.start();
        game.run_auto(Duration::from_millis(ms))
    } else {
        play_interactive(&mut game)?
    };

    let Some(outcome) = outcome else {
        warn!("match stopped before an outcome");
        return Ok(());
    };

    if cli.json {
        let survivors = outcome
            .winner()
            .map(|team| game.coordinator(team).snapshots())
            .unwrap_or_default();
        let summary = serde_json::json!({
            "seed": game.seed(),
            "outcome": outcome,
            "rounds": game.round(),
            "survivors": survivors,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

/// One round per Enter press; `q` quits.
fn play_interactive(game: &mut Match) -> Result<Option<Outcome>> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    game.start();
    loop {
        if let Some(outcome) = game.outcome() {
            return Ok(Some(outcome));
        }
        eprint!("[Enter] next round, [q] quit > ");
        io::stderr().flush().context("failed to flush prompt")?;

        let Some(line) = lines.next() else {
            return Ok(None);
        };
        if line.context("failed to read stdin")?.trim() == "q" {
            return Ok(None);
        }
        if let RoundStatus::Over(outcome) = game.request_next_round() {
            return Ok(Some(outcome));
        }
    }
}

/// Renders coordinator and match events as a plain-text combat log.
fn attach_combat_log(game: &mut Match) {
    for team in TeamId::BOTH {
        let coordinator = game.coordinator_mut(team);
        coordinator.on(CoordinatorChannel::Hit, |event| {
            if let CoordinatorEvent::Hit {
                intent,
                target,
                remaining_hp,
            } = event
            {
                let kind = if intent.is_area() { "blasts" } else { "hits" };
                info!(
                    "{} {kind} {target} for {}, {target} has {} hp left",
                    intent.source,
                    intent.damage,
                    (*remaining_hp).max(0)
                );
            }
        });
        coordinator.on(CoordinatorChannel::Miss, |event| {
            if let CoordinatorEvent::Miss { intent, target, .. } = event {
                info!("{} attacks {target}, but {target} dodges", intent.source);
            }
        });
        coordinator.on(CoordinatorChannel::Defeated, |event| {
            if let CoordinatorEvent::Defeated { by, target, .. } = event {
                info!("{by} defeats {target}");
            }
        });
    }

    game.on(MatchChannel::RoundStarted, |event| {
        if let MatchEvent::RoundStarted { round } = event {
            info!("--- ROUND {round} ---");
        }
    });
    game.on(MatchChannel::RoundFinished, |event| {
        if let MatchEvent::RoundFinished(report) = event {
            for team in TeamId::BOTH {
                let side = report.team(team);
                info!(
                    "team {team} took {} damage, {} standing",
                    side.damage_taken,
                    side.survivors.len()
                );
            }
        }
    });
    game.on(MatchChannel::MatchOver, |event| {
        if let MatchEvent::MatchOver { outcome, survivors } = event {
            info!("match over: {outcome}");
            for snapshot in survivors.iter().flatten() {
                info!("  {} hp {} cooldown {}", snapshot.name, snapshot.hp, snapshot.cooldown);
            }
        }
    });
}
