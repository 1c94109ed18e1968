//! Per-game progress tracking with persistence and observers.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::storage::{ProgressSnapshot, ProgressStorage};

/// Highest level any game can unlock.
pub const MAX_TIER: u32 = 20;

/// Identifier returned by [`ProgressStore::subscribe`].
pub type SubscriptionId = u64;

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Persisted per-game record.
///
/// `unlocked_levels` is the frontier: the highest level the player may
/// attempt. Both fields are monotonically non-decreasing; they only move
/// through [`ProgressStore::complete_level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameProgress {
    /// Highest unlocked level, 1 through [`MAX_TIER`].
    pub unlocked_levels: u32,
    /// Best score ever recorded for this game.
    pub high_score: u32,
}

impl Default for GameProgress {
    fn default() -> Self {
        Self {
            unlocked_levels: 1,
            high_score: 0,
        }
    }
}

struct StoreInner {
    records: BTreeMap<String, GameProgress>,
    storage: Box<dyn ProgressStorage>,
    subscribers: Vec<(SubscriptionId, Callback)>,
    next_subscription: SubscriptionId,
}

impl std::fmt::Debug for StoreInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreInner")
            .field("records", &self.records)
            .field("storage", &self.storage)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Single-writer, multi-observer progress store.
///
/// Constructed once at startup with an injected [`ProgressStorage`] backend
/// and passed by reference (it is cheap to clone) to every consumer.
/// Observers registered via [`ProgressStore::subscribe`] fire synchronously
/// after each mutation has been applied and persisted.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl ProgressStore {
    /// Opens the store, loading any persisted snapshot.
    ///
    /// A missing, corrupt, or unreadable snapshot yields an empty store -
    /// loss of the record is never fatal.
    #[instrument(skip(storage))]
    pub fn open(storage: Box<dyn ProgressStorage>) -> Self {
        let records = match storage.load() {
            Ok(Some(snapshot)) => {
                info!(games = snapshot.games.len(), "Loaded progress snapshot");
                snapshot.games
            }
            Ok(None) => {
                info!("No saved progress, starting fresh");
                BTreeMap::new()
            }
            Err(e) => {
                warn!(error = %e, "Progress snapshot unreadable, starting fresh");
                BTreeMap::new()
            }
        };
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                records,
                storage,
                subscribers: Vec::new(),
                next_subscription: 0,
            })),
        }
    }

    /// Returns the record for a game, creating the default `{1, 0}` lazily.
    #[instrument(skip(self))]
    pub fn get(&self, game_id: &str) -> GameProgress {
        let mut inner = self.lock();
        *inner
            .records
            .entry(game_id.to_string())
            .or_insert_with(GameProgress::default)
    }

    /// Records a completed level.
    ///
    /// The frontier advances by exactly one only when `level_played` equals
    /// the current frontier and the frontier is below [`MAX_TIER`]; replays
    /// of cleared levels never advance it. The high score rises to `score`
    /// when that exceeds the stored value and never decreases.
    #[instrument(skip(self))]
    pub fn complete_level(&self, game_id: &str, level_played: u32, score: u32) {
        {
            let mut inner = self.lock();
            let record = inner
                .records
                .entry(game_id.to_string())
                .or_insert_with(GameProgress::default);

            if level_played == record.unlocked_levels && record.unlocked_levels < MAX_TIER {
                record.unlocked_levels += 1;
                debug!(
                    game_id,
                    frontier = record.unlocked_levels,
                    "Frontier advanced"
                );
            }
            if score > record.high_score {
                record.high_score = score;
                debug!(game_id, score, "New high score");
            }
            info!(game_id, level_played, score, "Level completion recorded");
            Self::persist(&mut inner);
        }
        self.notify();
    }

    /// Wipes every record for every game. Destructive and irreversible -
    /// callers must confirm with the player before invoking this.
    #[instrument(skip(self))]
    pub fn reset_all(&self) {
        {
            let mut inner = self.lock();
            inner.records.clear();
            if let Err(e) = inner.storage.clear() {
                warn!(error = %e, "Failed to clear persisted progress");
            }
            info!("All progress reset");
        }
        self.notify();
    }

    /// Registers an observer fired once after every mutating operation.
    ///
    /// Observers are called synchronously, in unspecified order, after the
    /// mutation has been applied and persisted. Returns an id for
    /// [`ProgressStore::unsubscribe`].
    #[instrument(skip(self, callback))]
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        let mut inner = self.lock();
        let id = inner.next_subscription;
        inner.next_subscription += 1;
        inner.subscribers.push((id, Arc::new(callback)));
        debug!(id, "Subscriber registered");
        id
    }

    /// Removes a previously registered observer. Unknown ids are ignored.
    #[instrument(skip(self))]
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut inner = self.lock();
        inner.subscribers.retain(|(sub_id, _)| *sub_id != id);
        debug!(id, "Subscriber removed");
    }

    fn persist(inner: &mut StoreInner) {
        let snapshot = ProgressSnapshot::now(inner.records.clone());
        if let Err(e) = inner.storage.save(&snapshot) {
            warn!(error = %e, "Failed to persist progress");
        }
    }

    /// Calls subscribers outside the lock so observers may read the store.
    fn notify(&self) {
        let callbacks: Vec<Callback> = {
            let inner = self.lock();
            inner.subscribers.iter().map(|(_, cb)| cb.clone()).collect()
        };
        for callback in callbacks {
            callback();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
