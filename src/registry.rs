//! Static game catalog.
//!
//! Every game registers one [`GameDefinition`] here at process start.
//! Dispatch is by identifier lookup over this registry, never by
//! inheritance; the definition carries a builder for the game's
//! [`Minigame`] component.

use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::{debug, info, instrument};

use crate::games::{
    ArithmeticStreak, BidDuel, BlockExit, DiceTrail, EquationDuel, FormulaShot, MatchPairs,
    Minigame, NebulaTrivia, PatternMatrix, PrimeRush, SequenceGap, SignalSweep, SumPyramid,
};

/// Difficulty tier a game is sorted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Category {
    /// Reaction and simple memory.
    Easy,
    /// Logic and pattern recognition.
    Intermediate,
    /// Complex strategy and multi-step play.
    Advanced,
}

/// Static metadata for one registered game.
///
/// Immutable once registered: created from the static registry at process
/// start, never mutated or destroyed.
#[derive(Debug, Clone)]
pub struct GameDefinition {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: Category,
    build: fn() -> Box<dyn Minigame>,
}

impl GameDefinition {
    /// Unique identifier, stable across sessions.
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// One-line description shown in the sidebar.
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Difficulty tier.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Builds a fresh instance of the game's component.
    #[instrument(skip(self), fields(game_id = self.id))]
    pub fn build(&self) -> Box<dyn Minigame> {
        debug!("Building game component");
        (self.build)()
    }
}

/// The catalog of registered games.
#[derive(Debug, Clone)]
pub struct GameRegistry {
    games: Vec<GameDefinition>,
}

impl GameRegistry {
    /// Builds the standard registry with every shipped game.
    #[instrument]
    pub fn standard() -> Self {
        let games = vec![
            // Easy - reaction and simple memory
            GameDefinition {
                id: "pattern_matrix",
                name: "Pattern Matrix",
                description: "High-speed grid memory challenge",
                category: Category::Easy,
                build: || Box::new(PatternMatrix::new()),
            },
            GameDefinition {
                id: "nebula_trivia",
                name: "Nebula Trivia",
                description: "General knowledge database access",
                category: Category::Easy,
                build: || Box::new(NebulaTrivia::new()),
            },
            GameDefinition {
                id: "arithmetic_streak",
                name: "Arithmetic Streak",
                description: "Arithmetic endurance test",
                category: Category::Easy,
                build: || Box::new(ArithmeticStreak::new()),
            },
            GameDefinition {
                id: "equation_duel",
                name: "Equation Duel",
                description: "Rapid expression comparison",
                category: Category::Easy,
                build: || Box::new(EquationDuel::new()),
            },
            GameDefinition {
                id: "match_pairs",
                name: "Match Pairs",
                description: "Equation pairing protocol",
                category: Category::Easy,
                build: || Box::new(MatchPairs::new()),
            },
            GameDefinition {
                id: "dice_trail",
                name: "Dice Trail",
                description: "Rolling cube geometry",
                category: Category::Easy,
                build: || Box::new(DiceTrail::new()),
            },
            // Intermediate - logic and pattern recognition
            GameDefinition {
                id: "formula_shot",
                name: "Formula Shot",
                description: "Precision variable isolation",
                category: Category::Intermediate,
                build: || Box::new(FormulaShot::new()),
            },
            GameDefinition {
                id: "sequence_gap",
                name: "Sequence Gap",
                description: "Pattern identification",
                category: Category::Intermediate,
                build: || Box::new(SequenceGap::new()),
            },
            GameDefinition {
                id: "signal_sweep",
                name: "Signal Sweep",
                description: "Triangulation via proximity",
                category: Category::Intermediate,
                build: || Box::new(SignalSweep::new()),
            },
            GameDefinition {
                id: "prime_rush",
                name: "Prime Rush",
                description: "Speed number theory",
                category: Category::Intermediate,
                build: || Box::new(PrimeRush::new()),
            },
            // Advanced - strategy and multi-step play
            GameDefinition {
                id: "block_exit",
                name: "Block Exit",
                description: "Walled grid extraction",
                category: Category::Advanced,
                build: || Box::new(BlockExit::new()),
            },
            GameDefinition {
                id: "sum_pyramid",
                name: "Sum Pyramid",
                description: "Structural integrity calculation",
                category: Category::Advanced,
                build: || Box::new(SumPyramid::new()),
            },
            GameDefinition {
                id: "bid_duel",
                name: "Bid Duel",
                description: "Game theory and resource management",
                category: Category::Advanced,
                build: || Box::new(BidDuel::new()),
            },
        ];
        info!(count = games.len(), "Registry built");
        Self { games }
    }

    /// Looks a game up by identifier.
    #[instrument(skip(self))]
    pub fn get(&self, id: &str) -> Option<&GameDefinition> {
        self.games.iter().find(|g| g.id == id)
    }

    /// All games in the given tier, in registration order.
    #[instrument(skip(self))]
    pub fn by_category(&self, category: Category) -> Vec<&GameDefinition> {
        self.games
            .iter()
            .filter(|g| g.category == category)
            .collect()
    }

    /// Iterates games grouped by tier, in tier order.
    pub fn grouped(&self) -> Vec<(Category, Vec<&GameDefinition>)> {
        Category::iter()
            .map(|cat| (cat, self.by_category(cat)))
            .collect()
    }

    /// All registered games in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &GameDefinition> {
        self.games.iter()
    }

    /// Number of registered games.
    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}
