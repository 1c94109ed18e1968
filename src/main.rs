//! Puzzle Arena - terminal minigame portal.

#![warn(missing_docs)]

mod cli;
mod tui;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use puzzle_arena::{CoachClient, CoachConfig, GameRegistry, JsonFileStorage, ProgressStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            data_dir,
            coach_config,
        } => run_portal(&data_dir, &coach_config).await,
        Command::List { data_dir } => run_list(&data_dir),
        Command::Reset { data_dir, yes } => run_reset(&data_dir, yes),
    }
}

/// Run the portal TUI.
async fn run_portal(data_dir: &Path, coach_config: &Path) -> Result<()> {
    let store = open_store(data_dir);
    let registry = GameRegistry::standard();
    let config = if coach_config.exists() {
        match CoachConfig::from_file(coach_config) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Ignoring unusable coach config: {e}");
                CoachConfig::from_env()
            }
        }
    } else {
        CoachConfig::from_env()
    };
    let coach = CoachClient::new(config);
    tui::run_portal(registry, store, coach).await
}

/// List games with their saved progress.
fn run_list(data_dir: &Path) -> Result<()> {
    init_tracing();
    let store = open_store(data_dir);
    let registry = GameRegistry::standard();
    for (category, games) in registry.grouped() {
        println!("{category}");
        for def in games {
            let progress = store.get(def.id());
            println!(
                "  {:<18} level {:>2}/20  best {:>6}  - {}",
                def.name(),
                progress.unlocked_levels,
                progress.high_score,
                def.description()
            );
        }
    }
    Ok(())
}

/// Wipe all saved progress, guarded behind an explicit flag.
fn run_reset(data_dir: &Path, yes: bool) -> Result<()> {
    init_tracing();
    if !yes {
        warn!("Reset requested without --yes");
        eprintln!("This wipes every level and high score. Re-run with --yes to confirm.");
        return Ok(());
    }
    let store = open_store(data_dir);
    store.reset_all();
    info!("Progress wiped");
    println!("All progress wiped.");
    Ok(())
}

fn open_store(data_dir: &Path) -> ProgressStore {
    let storage = JsonFileStorage::new(data_dir.join("progress.json"));
    ProgressStore::open(Box::new(storage))
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}
