#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots and autoplays a Trio Tiles session.

mod autoplay;
mod config;
mod session;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use trio_tiles_core::Event;
use trio_tiles_system_bootstrap::Bootstrap;
use trio_tiles_world::query;

use crate::session::Session;

/// Headless Trio Tiles session driven by a scripted player.
#[derive(Debug, Parser)]
#[command(name = "trio-tiles", version, about)]
struct CliArgs {
    /// Path to a TOML session configuration; built-in defaults are used when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Overrides the seed of the spawn color shuffle.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated frame length in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Upper bound on simulated frames.
    #[arg(long, default_value_t = 10_000)]
    max_frames: u32,
    /// Prints the effective configuration as TOML and exits.
    #[arg(long)]
    print_config: bool,
}

/// Entry point for the Trio Tiles command-line interface.
fn main() -> Result<()> {
    init_tracing();
    run(CliArgs::parse())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(args: CliArgs) -> Result<()> {
    let mut game_config = config::load(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        game_config.spawn.seed = seed;
    }

    if args.print_config {
        print!("{}", config::render(&game_config)?);
        return Ok(());
    }

    let mut session = Session::start(&game_config)?;
    println!("{}", Bootstrap.welcome_banner(session.world()));
    println!("{}", query::board(session.world()).render_matrix());

    let dt = Duration::from_millis(args.frame_ms);
    let mut frames = 0_u32;
    let mut removed = 0_usize;
    while frames < args.max_frames {
        if !session.is_moving() {
            let Some(point) = autoplay::next_click(&query::character_view(session.world()))
            else {
                break;
            };
            let events = session.click(point);
            if let Some(Event::SelectionRejected { character, reason }) = events
                .iter()
                .find(|event| matches!(event, Event::SelectionRejected { .. }))
            {
                warn!(character = character.get(), ?reason, "autoplay stopped");
                break;
            }
        }

        let events = session.frame(dt);
        frames += 1;
        removed += events
            .iter()
            .filter(|event| matches!(event, Event::CharacterRemoved { .. }))
            .count();
    }

    let remaining = query::character_view(session.world()).len();
    info!(frames, removed, remaining, "session finished");
    println!("{}", query::board(session.world()).render_matrix());
    println!("frames: {frames}, removed: {removed}, remaining: {remaining}");
    for (color, count) in session.matching().tally().iter() {
        println!(
            "tally #{:02x}{:02x}{:02x}: {count}",
            color.red(),
            color.green(),
            color.blue()
        );
    }
    Ok(())
}
