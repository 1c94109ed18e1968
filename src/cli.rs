//! Command-line interface for puzzle_arena.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Puzzle Arena - a terminal minigame portal
#[derive(Parser, Debug)]
#[command(name = "puzzle_arena")]
#[command(about = "Terminal minigame portal with persistent progress", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the portal TUI
    Play {
        /// Directory holding the progress snapshot (created if missing)
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Path to the coach configuration file
        #[arg(long, default_value = "coach.toml")]
        coach_config: PathBuf,
    },

    /// List the registered games and current progress
    List {
        /// Directory holding the progress snapshot
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },

    /// Wipe all saved progress
    Reset {
        /// Directory holding the progress snapshot
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Confirm the wipe; without this flag nothing is deleted
        #[arg(long)]
        yes: bool,
    },
}
