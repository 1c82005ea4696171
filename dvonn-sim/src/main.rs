//! Dvonn Playout Driver
//!
//! Plays seeded random games through the rules engine, checking board
//! invariants after every move, and reports aggregate statistics.
//!
//! Usage: playout [--games N] [--seed S] [--max-moves M] [--log-interval SECS]

mod playout;
mod stats;

use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::playout::play_random_game;
use crate::stats::PlayoutStats;

/// Command line settings.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Options {
    games: u64,
    seed: u64,
    max_moves: u32,
    log_interval_secs: u64,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            games: 1000,
            seed: 0,
            max_moves: 1000,
            log_interval_secs: 5,
        }
    }
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .with_context(|| format!("missing value for {}", flag))?;
        let bad_value = || format!("invalid value {:?} for {}", value, flag);
        match flag.as_str() {
            "--games" => options.games = value.parse().with_context(bad_value)?,
            "--seed" => options.seed = value.parse().with_context(bad_value)?,
            "--max-moves" => options.max_moves = value.parse().with_context(bad_value)?,
            "--log-interval" => options.log_interval_secs = value.parse().with_context(bad_value)?,
            _ => bail!("unknown flag {}", flag),
        }
    }

    Ok(options)
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_args(&args)?;

    println!("Dvonn Playout");
    println!("=============");
    println!("Games: {}", options.games);
    println!("Seed: {}", options.seed);
    println!("Move cap: {}", options.max_moves);
    println!("Log interval: {}s\n", options.log_interval_secs);

    // Set up SIGINT handler so an interrupted run still prints its summary
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        println!("\n\nInterrupt received, stopping after the current game...");
        r.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl-C handler")?;

    let mut stats = PlayoutStats::new();
    let start = Instant::now();

    for game in 0..options.games {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        // Each game gets its own stream so any single game can be replayed by seed
        let seed = options.seed.wrapping_add(game);
        let mut rng = StdRng::seed_from_u64(seed);
        let record = play_random_game(&mut rng, options.max_moves)
            .with_context(|| format!("game {} (seed {}) broke a board invariant", game, seed))?;
        stats.record_game(&record);

        if stats.should_log(options.log_interval_secs) {
            stats.log_progress();
        }
    }

    println!("\n=============");
    println!("Playout complete!");
    println!("=============");
    println!("Time: {:.2}s", start.elapsed().as_secs_f64());
    println!();
    stats.print_summary();

    Ok(())
}
