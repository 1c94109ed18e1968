//! Terminal UI for Puzzle Arena.

#![warn(missing_docs)]

mod controller;
mod screen;
mod screens;

use std::collections::HashSet;
use std::io;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, info};

use controller::PortalController;
use puzzle_arena::{CoachClient, GameRegistry, ProgressStore};

/// Shared services every screen can reach.
#[derive(Debug)]
pub struct PortalContext {
    /// The static game catalog.
    pub registry: GameRegistry,
    /// Persistent per-game progress.
    pub progress: ProgressStore,
    /// AI coach for advice and trivia.
    pub coach: CoachClient,
    /// Session RNG feeding every puzzle generator.
    pub rng: StdRng,
    /// Game ids whose briefing was shown this session.
    pub briefed: HashSet<&'static str>,
}

/// Run the portal TUI until the player quits.
pub async fn run_portal(
    registry: GameRegistry,
    progress: ProgressStore,
    coach: CoachClient,
) -> Result<()> {
    // Log to file to avoid interfering with the TUI.
    let log_file = std::fs::File::create("puzzle_arena.log")?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init(); // Don't panic if already initialized

    info!("Starting Puzzle Arena TUI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut ctx = PortalContext {
        registry,
        progress,
        coach,
        rng: StdRng::from_os_rng(),
        briefed: HashSet::new(),
    };

    let mut controller = PortalController::new(&ctx);
    let res = controller.run(&mut terminal, &mut ctx).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "Portal loop error");
        eprintln!("Error: {err:?}");
    }

    res
}
