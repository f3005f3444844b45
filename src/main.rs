//! Merge Drop headless runner
//!
//! Plays a session on the sandbox world: a pseudo-random pointer drops the
//! queued rank every few frames until the drops run out or a ball reaches
//! the hazard strip.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use merge_drop::consts::SIM_DT;
use merge_drop::sim::{ArenaSession, SandboxWorld};
use merge_drop::{Settings, logging};

/// Keeps the pointer's random stream apart from the spawn controller's
const POINTER_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Parser, Debug)]
#[command(name = "merge-drop", about = "Run a headless merge-drop session")]
struct Args {
    /// JSON settings file; defaults are used when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed (overrides the settings file)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of drops to attempt
    #[arg(long, default_value_t = 60)]
    drops: u32,

    /// Simulation frames between drops
    #[arg(long, default_value_t = 90)]
    frames_per_drop: u32,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let mut settings = match &args.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    let seed = settings.seed.unwrap_or_else(rand::random);
    log::info!("Merge Drop (headless) starting with seed: {seed}");

    let world = SandboxWorld::new(Vec2::new(0.0, settings.gravity));
    let mut session = ArenaSession::new(world, settings.clone(), seed)
        .context("starting session")?;
    let mut pointer = Pcg32::seed_from_u64(seed ^ POINTER_STREAM);

    let mut dropped = 0u32;
    let mut merges = 0usize;
    let mut highest = 0usize;

    'drops: for _ in 0..args.drops {
        let queued = session.next_rank();
        let x = pointer.random_range(0.0..settings.arena_width);
        if session.on_drop(settings.drop_point(x, queued.radius)).is_some() {
            dropped += 1;
        }

        for _ in 0..args.frames_per_drop {
            let report = session.advance(SIM_DT);
            merges += report.merges.len();
            highest = report
                .merges
                .iter()
                .map(|m| m.rank)
                .fold(highest, usize::max);
            if report.game_over {
                break 'drops;
            }
        }
    }

    log::info!(
        "Finished: {dropped} drops, {merges} merges, highest merged rank {highest}, {} balls left, game over: {}",
        session.ball_count(),
        session.is_game_over()
    );

    session.teardown();
    Ok(())
}
