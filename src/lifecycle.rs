//! The shared attempt lifecycle hosting every minigame.

use rand::RngCore;
use tracing::{debug, info, instrument, warn};

use crate::games::{GameView, InputResult, Minigame, PlayerInput, TICKS_PER_SECOND};
use crate::registry::GameDefinition;

/// Terminal result of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptOutcome {
    /// Score earned by the attempt. Never negative by construction.
    pub score: u32,
    /// Whether the level was cleared.
    pub success: bool,
}

impl AttemptOutcome {
    /// A successful outcome with the given score.
    pub fn win(score: u32) -> Self {
        Self {
            score,
            success: true,
        }
    }

    /// A failed outcome with the given (consolation) score.
    pub fn loss(score: u32) -> Self {
        Self {
            score,
            success: false,
        }
    }
}

/// Phase of the hosted attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaPhase {
    /// One-time instructions shown before the first attempt at a game.
    Briefing,
    /// The attempt is live and accepting input.
    Active,
    /// The attempt ended in success.
    Won,
    /// The attempt ended in failure or give-up.
    Lost,
}

/// Host for one selected game: owns the minigame instance, the attempt
/// phase machine, and the attempt clock.
///
/// The arena enforces the exactly-once outcome rule: however many input
/// events arrive, at most one [`AttemptOutcome`] is produced per attempt,
/// and input after the terminal transition is dropped.
#[derive(Debug)]
pub struct Arena {
    definition: GameDefinition,
    game: Box<dyn Minigame>,
    level: u32,
    phase: ArenaPhase,
    clock_ticks: u64,
    outcome: Option<AttemptOutcome>,
    feedback: Option<String>,
}

impl Arena {
    /// Mounts a game at the given level.
    ///
    /// When `briefing` is set (first visit with no prior progress) the arena
    /// starts in [`ArenaPhase::Briefing`] and the clock is held until
    /// [`Arena::begin`].
    #[instrument(skip(definition, rng), fields(game_id = definition.id(), level))]
    pub fn new(definition: &GameDefinition, level: u32, briefing: bool, rng: &mut dyn RngCore) -> Self {
        info!("Mounting game");
        let mut game = definition.build();
        game.reset(level, rng);
        Self {
            definition: definition.clone(),
            game,
            level,
            phase: if briefing {
                ArenaPhase::Briefing
            } else {
                ArenaPhase::Active
            },
            clock_ticks: 0,
            outcome: None,
            feedback: None,
        }
    }

    /// The hosted game's definition.
    pub fn definition(&self) -> &GameDefinition {
        &self.definition
    }

    /// The level being attempted.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Current phase.
    pub fn phase(&self) -> ArenaPhase {
        self.phase
    }

    /// Seconds elapsed in the current attempt.
    pub fn elapsed_seconds(&self) -> u64 {
        self.clock_ticks / TICKS_PER_SECOND
    }

    /// The outcome of the finished attempt, if any.
    pub fn outcome(&self) -> Option<AttemptOutcome> {
        self.outcome
    }

    /// Inline feedback from the last rejected input, if any.
    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    /// The game's briefing text.
    pub fn briefing_text(&self) -> &'static str {
        self.game.briefing()
    }

    /// The current display state of the hosted game.
    pub fn view(&self) -> GameView {
        self.game.view()
    }

    /// The registered solution explanation, when the game provides one.
    pub fn solution(&self) -> Option<String> {
        self.game.solution()
    }

    /// Leaves the briefing and starts the attempt clock.
    #[instrument(skip(self))]
    pub fn begin(&mut self) {
        if self.phase == ArenaPhase::Briefing {
            info!(game_id = self.definition.id(), "Briefing acknowledged");
            self.phase = ArenaPhase::Active;
        }
    }

    /// Forwards one user input event to the hosted game.
    ///
    /// Returns the attempt outcome when this event ended the attempt.
    /// Events arriving outside [`ArenaPhase::Active`] are dropped.
    #[instrument(skip(self, rng))]
    pub fn input(&mut self, input: PlayerInput, rng: &mut dyn RngCore) -> Option<AttemptOutcome> {
        if self.phase != ArenaPhase::Active {
            debug!(phase = ?self.phase, "Dropping input outside active phase");
            return None;
        }
        self.feedback = None;
        match self.game.handle(input, rng) {
            InputResult::Continue => None,
            InputResult::Rejected(message) => {
                debug!(message = %message, "Input rejected");
                self.feedback = Some(message);
                None
            }
            InputResult::Finished(outcome) => Some(self.finish(outcome)),
        }
    }

    /// Advances the attempt clock by one tick and forwards it to the game.
    ///
    /// Returns the attempt outcome when a countdown expiring (or a reveal
    /// completing into a loss) ended the attempt.
    #[instrument(skip(self, rng))]
    pub fn tick(&mut self, rng: &mut dyn RngCore) -> Option<AttemptOutcome> {
        if self.phase != ArenaPhase::Active {
            return None;
        }
        self.clock_ticks += 1;
        match self.game.handle(PlayerInput::Tick, rng) {
            InputResult::Finished(outcome) => Some(self.finish(outcome)),
            _ => None,
        }
    }

    /// Explicit give-up: treated identically to a loss with zero score.
    ///
    /// Returns `None` when no attempt is live.
    #[instrument(skip(self))]
    pub fn give_up(&mut self) -> Option<AttemptOutcome> {
        match self.phase {
            ArenaPhase::Active | ArenaPhase::Briefing => {
                info!(game_id = self.definition.id(), "Player gave up");
                Some(self.finish(AttemptOutcome::loss(0)))
            }
            _ => {
                warn!("Give-up ignored, attempt already over");
                None
            }
        }
    }

    /// Regenerates the same level for another attempt.
    #[instrument(skip(self, rng))]
    pub fn retry(&mut self, rng: &mut dyn RngCore) {
        info!(game_id = self.definition.id(), level = self.level, "Retrying level");
        self.restart(self.level, rng);
    }

    /// Starts a fresh attempt at the given level (host checks the frontier).
    #[instrument(skip(self, rng))]
    pub fn advance(&mut self, level: u32, rng: &mut dyn RngCore) {
        info!(game_id = self.definition.id(), level, "Advancing to level");
        self.restart(level, rng);
    }

    fn restart(&mut self, level: u32, rng: &mut dyn RngCore) {
        self.level = level;
        self.game = self.definition.build();
        self.game.reset(level, rng);
        self.phase = ArenaPhase::Active;
        self.clock_ticks = 0;
        self.outcome = None;
        self.feedback = None;
    }

    fn finish(&mut self, outcome: AttemptOutcome) -> AttemptOutcome {
        info!(
            game_id = self.definition.id(),
            level = self.level,
            score = outcome.score,
            success = outcome.success,
            seconds = self.elapsed_seconds(),
            "Attempt finished"
        );
        self.phase = if outcome.success {
            ArenaPhase::Won
        } else {
            ArenaPhase::Lost
        };
        self.outcome = Some(outcome);
        self.feedback = None;
        outcome
    }
}
