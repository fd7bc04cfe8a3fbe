#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Dungeonmania dungeon headlessly.

mod action;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dungeonmania_core::DungeonConfig;
use dungeonmania_engine::{loader, Dungeon};
use tracing::info;
use tracing_subscriber::EnvFilter;

use action::Action;

/// Loads a dungeon, replays a list of actions and prints the final state as JSON.
#[derive(Parser, Debug)]
#[command(name = "dungeonmania")]
struct Args {
    /// Dungeon definition file.
    #[arg(long)]
    dungeon: PathBuf,

    /// Configuration file. Built-in defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the configured random seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Pretty-print the resulting snapshot.
    #[arg(long)]
    pretty: bool,

    /// Actions to replay: up, down, left, right, interact:<id>, build:<kind>, use:<id>.
    actions: Vec<Action>,
}

/// Entry point for the Dungeonmania command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dungeonmania=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let definition = loader::load_dungeon(&args.dungeon)
        .with_context(|| format!("failed to load dungeon {}", args.dungeon.display()))?;
    let mut config = match &args.config {
        Some(path) => loader::load_config(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => DungeonConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let name = args
        .dungeon
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("dungeon");
    let mut game = Dungeon::new_game(name, &definition, config);

    let mut snapshot = game.snapshot();
    for (index, action) in args.actions.iter().enumerate() {
        snapshot = match *action {
            Action::Move(direction) => Ok(game.tick(direction)),
            Action::Interact(entity) => game.interact(entity),
            Action::Build(kind) => game.build(kind),
            Action::Use(item) => game.tick_item(item),
        }
        .with_context(|| format!("action #{} ({action:?}) failed", index + 1))?;
    }
    info!(
        tick = snapshot.tick,
        goals = %snapshot.goals,
        "replay finished"
    );

    let output = if args.pretty {
        serde_json::to_string_pretty(&snapshot)?
    } else {
        serde_json::to_string(&snapshot)?
    };
    println!("{output}");
    Ok(())
}
