//! Portal controller - the state machine driving the two-screen TUI.

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{Terminal, backend::Backend};
use tokio::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::tui::PortalContext;
use crate::tui::screen::{Screen, ScreenTransition};
use crate::tui::screens::{ArenaScreen, PortalScreen};

/// Active screen in the portal state machine.
#[derive(Debug)]
enum ActiveScreen {
    Portal(PortalScreen),
    Arena(ArenaScreen),
}

/// Controller that drives the portal state machine.
///
/// Call [`PortalController::run`] to start the event loop.
#[derive(Debug)]
pub struct PortalController {
    screen: ActiveScreen,
}

impl PortalController {
    /// Creates a controller starting on the game selection screen.
    #[instrument(skip(ctx))]
    pub fn new(ctx: &PortalContext) -> Self {
        info!("Creating PortalController");
        Self {
            screen: ActiveScreen::Portal(PortalScreen::new(ctx)),
        }
    }

    /// Runs the portal event loop until the player quits.
    ///
    /// Drives screen transitions and pumps the arena's timers and async
    /// deliveries between input polls.
    #[instrument(skip(self, terminal, ctx))]
    pub async fn run<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        ctx: &mut PortalContext,
    ) -> anyhow::Result<()> {
        info!("Starting portal event loop");

        // Observer keeps a log trail of every progress mutation while the
        // TUI owns the screen.
        let subscription = ctx
            .progress
            .subscribe(|| debug!("Progress record changed"));

        loop {
            if let ActiveScreen::Arena(arena) = &mut self.screen {
                arena.pump(ctx);
            }

            terminal.draw(|f| match &self.screen {
                ActiveScreen::Portal(s) => s.render(f, ctx),
                ActiveScreen::Arena(s) => s.render(f, ctx),
            })?;

            // Poll for input with a short timeout to keep timers live.
            if event::poll(Duration::from_millis(50))?
                && let Event::Key(key) = event::read()?
            {
                // Skip key release events (crossterm fires both press and release).
                if key.kind == KeyEventKind::Release {
                    continue;
                }

                let transition = match &mut self.screen {
                    ActiveScreen::Portal(s) => s.handle_key(key, ctx),
                    ActiveScreen::Arena(s) => s.handle_key(key, ctx),
                };

                match transition {
                    ScreenTransition::Stay => {}
                    ScreenTransition::GoToPortal => {
                        debug!("Returning to portal");
                        self.screen = ActiveScreen::Portal(PortalScreen::new(ctx));
                    }
                    ScreenTransition::GoToArena { game_id, level } => {
                        match ArenaScreen::mount(game_id, level, ctx) {
                            Some(arena) => self.screen = ActiveScreen::Arena(arena),
                            None => warn!(game_id, "Unknown game id, staying on portal"),
                        }
                    }
                    ScreenTransition::Quit => {
                        info!("Player quit");
                        break;
                    }
                }
            }
        }

        ctx.progress.unsubscribe(subscription);
        Ok(())
    }
}
