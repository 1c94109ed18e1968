//! The minigame contract and the games implementing it.
//!
//! Each game owns its puzzle generation and win condition behind the shared
//! [`Minigame`] trait. Games are pure state machines: randomness comes in
//! through the caller's RNG, time comes in as [`PlayerInput::Tick`] events,
//! and external data (trivia questions) arrives as [`PlayerInput::Oracle`].

mod arithmetic_streak;
mod bid_duel;
mod block_exit;
mod dice_trail;
mod equation_duel;
mod formula_shot;
mod match_pairs;
mod pattern_matrix;
mod prime_rush;
mod sequence_gap;
mod signal_sweep;
mod sum_pyramid;
mod trivia;

pub(crate) use arithmetic_streak::ArithmeticStreak;
pub(crate) use bid_duel::BidDuel;
pub(crate) use block_exit::BlockExit;
pub(crate) use dice_trail::DiceTrail;
pub(crate) use equation_duel::EquationDuel;
pub(crate) use formula_shot::FormulaShot;
pub(crate) use match_pairs::MatchPairs;
pub(crate) use pattern_matrix::PatternMatrix;
pub(crate) use prime_rush::PrimeRush;
pub(crate) use sequence_gap::SequenceGap;
pub(crate) use signal_sweep::SignalSweep;
pub(crate) use sum_pyramid::SumPyramid;
pub(crate) use trivia::NebulaTrivia;

use rand::RngCore;

use crate::coach::TriviaQuestion;
use crate::lifecycle::AttemptOutcome;

/// Number of attempt ticks per second. Ticks are the only clock games see,
/// which keeps reveal sequences and countdowns deterministic in tests.
pub(crate) const TICKS_PER_SECOND: u64 = 10;

/// A movement direction on a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Up one row.
    Up,
    /// Down one row.
    Down,
    /// Left one column.
    Left,
    /// Right one column.
    Right,
}

/// One user input event, delivered to the active game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerInput {
    /// A typed answer submitted with Enter.
    Submit(String),
    /// Selection of a listed choice or grid cell by index.
    Choose(usize),
    /// A movement key.
    Move(Direction),
    /// One clock tick (see [`TICKS_PER_SECOND`]).
    Tick,
    /// An externally fetched trivia question arriving.
    Oracle(TriviaQuestion),
}

/// Result of handling one input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
    /// The attempt continues.
    Continue,
    /// The input was invalid; inline feedback for the player, no state
    /// change beyond the message.
    Rejected(String),
    /// The attempt ended. Emitted exactly once per attempt.
    Finished(AttemptOutcome),
}

/// How the host should collect input for the current view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Free text entry submitted with Enter.
    Text,
    /// Pick one of N listed choices.
    Choices(usize),
    /// Move a cursor over a grid and confirm a cell.
    Grid {
        /// Grid width in cells.
        width: usize,
        /// Grid height in cells.
        height: usize,
    },
    /// Arrow-key movement only.
    Moves,
    /// No input accepted (reveal or animation in progress).
    Locked,
}

/// Visual emphasis for one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellAccent {
    /// Ordinary cell.
    Normal,
    /// Currently highlighted (reveal flash, player piece).
    Active,
    /// Positive state (goal, matched, correct).
    Good,
    /// Negative state (trap, mismatch, wrong).
    Bad,
    /// De-emphasized (wall, spent, disabled).
    Dim,
}

/// One cell of a grid view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    /// Short label rendered in the cell.
    pub label: String,
    /// Emphasis applied by the renderer.
    pub accent: CellAccent,
}

impl GridCell {
    /// Creates a cell with the given label and accent.
    pub fn new(label: impl Into<String>, accent: CellAccent) -> Self {
        Self {
            label: label.into(),
            accent,
        }
    }

    /// An unlabeled, unaccented cell.
    pub fn blank() -> Self {
        Self::new(" ", CellAccent::Normal)
    }
}

/// The body of a game view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewBody {
    /// Pre-rendered text lines.
    Lines(Vec<String>),
    /// A uniform grid of cells, row-major.
    Grid {
        /// Grid width in cells.
        width: usize,
        /// Cells in row-major order.
        cells: Vec<GridCell>,
    },
}

/// Display-ready representation of the current puzzle state.
///
/// Games produce this; the host renders it. Keeping the model small means
/// one generic renderer serves every game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameView {
    /// Status line (instructions, progress, feedback).
    pub status: String,
    /// Main content.
    pub body: ViewBody,
    /// Labeled choices, when `input` is [`InputMode::Choices`].
    pub choices: Vec<String>,
    /// How input should be collected.
    pub input: InputMode,
}

impl GameView {
    /// A text view collecting a typed answer.
    pub fn text_entry(status: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            status: status.into(),
            body: ViewBody::Lines(lines),
            choices: Vec::new(),
            input: InputMode::Text,
        }
    }

    /// A text view offering the given choices.
    pub fn with_choices(
        status: impl Into<String>,
        lines: Vec<String>,
        choices: Vec<String>,
    ) -> Self {
        let input = InputMode::Choices(choices.len());
        Self {
            status: status.into(),
            body: ViewBody::Lines(lines),
            choices,
            input,
        }
    }
}

/// Contract every hosted minigame satisfies.
///
/// The host drives the lifecycle: `reset` generates a fresh puzzle instance
/// for a level, `handle` consumes input events until it returns
/// [`InputResult::Finished`], after which further input is ignored by the
/// arena. Implementations must guarantee every generated instance is
/// solvable.
pub trait Minigame: std::fmt::Debug + Send {
    /// Generates a fresh puzzle instance for the given level, discarding any
    /// previous state.
    fn reset(&mut self, level: u32, rng: &mut dyn RngCore);

    /// One-time instructional text shown before the first attempt.
    fn briefing(&self) -> &'static str;

    /// The current display state.
    fn view(&self) -> GameView;

    /// The registered solution explanation for the current instance, when
    /// the game provides one.
    fn solution(&self) -> Option<String> {
        None
    }

    /// Handles one input event against the current instance.
    fn handle(&mut self, input: PlayerInput, rng: &mut dyn RngCore) -> InputResult;
}

/// Uniform random integer in `min..=max`.
pub(crate) fn roll(rng: &mut dyn RngCore, min: i64, max: i64) -> i64 {
    use rand::Rng;
    rng.random_range(min..=max)
}

/// Fisher-Yates shuffle via the caller's RNG.
pub(crate) fn shuffle<T>(rng: &mut dyn RngCore, items: &mut [T]) {
    use rand::seq::SliceRandom;
    items.shuffle(rng);
}
