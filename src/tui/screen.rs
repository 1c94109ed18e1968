//! Screen trait and transition type for the portal state machine.

use crossterm::event::KeyEvent;
use ratatui::Frame;

use crate::tui::PortalContext;

/// The result of handling an input event on a screen.
///
/// Screens return this from [`Screen::handle_key`] to drive the portal
/// state machine.
#[derive(Debug, Clone)]
pub enum ScreenTransition {
    /// Stay on the current screen - no state change.
    Stay,
    /// Navigate back to the game selection screen.
    GoToPortal,
    /// Mount the selected game in the arena.
    GoToArena {
        /// Identifier of the selected game.
        game_id: &'static str,
        /// Level to attempt.
        level: u32,
    },
    /// Exit the portal cleanly.
    Quit,
}

/// Trait implemented by each screen in the portal state machine.
///
/// Each screen owns its own state, renders its UI, and handles key events.
/// The controller calls these methods in the event loop.
pub trait Screen {
    /// Renders the screen into the provided [`Frame`].
    fn render(&self, frame: &mut Frame, ctx: &PortalContext);

    /// Handles a key event and returns the resulting [`ScreenTransition`].
    fn handle_key(&mut self, key: KeyEvent, ctx: &mut PortalContext) -> ScreenTransition;
}
