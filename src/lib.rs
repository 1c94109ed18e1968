//! Puzzle Arena library - a terminal minigame portal.
//!
//! # Architecture
//!
//! - **Registry**: static catalog of minigames grouped into difficulty tiers
//! - **Arena**: the shared attempt lifecycle (briefing, play, win/lose, retry)
//! - **Games**: self-contained puzzle generators and interaction handlers
//! - **Progress**: persisted per-game level/high-score store with observers
//! - **Coach**: LLM-backed hint and trivia service with offline fallbacks
//!
//! # Example
//!
//! ```no_run
//! use puzzle_arena::{GameRegistry, MemoryStorage, ProgressStore};
//!
//! let registry = GameRegistry::standard();
//! let store = ProgressStore::open(Box::new(MemoryStorage::new()));
//! let def = registry.get("pattern_matrix").expect("registered game");
//! let progress = store.get(def.id());
//! assert_eq!(progress.unlocked_levels, 1);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod coach;
mod games;
mod lifecycle;
mod progress;
mod registry;
mod storage;
mod timer;

// Crate-level exports - Coach service
pub use coach::{CoachClient, CoachConfig, CoachError, OutcomeTag, Topic, TriviaQuestion};

// Crate-level exports - Game contract
pub use games::{
    CellAccent, Direction, GameView, GridCell, InputMode, InputResult, Minigame, PlayerInput,
    ViewBody,
};

// Crate-level exports - Attempt lifecycle
pub use lifecycle::{Arena, ArenaPhase, AttemptOutcome};

// Crate-level exports - Progress tracking
pub use progress::{GameProgress, MAX_TIER, ProgressStore, SubscriptionId};

// Crate-level exports - Registry
pub use registry::{Category, GameDefinition, GameRegistry};

// Crate-level exports - Persistence
pub use storage::{
    JsonFileStorage, MemoryStorage, ProgressSnapshot, ProgressStorage, SNAPSHOT_VERSION,
    StorageError,
};

// Crate-level exports - Timers
pub use timer::AttemptTimer;
