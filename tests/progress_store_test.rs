//! Integration tests for the progress store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use puzzle_arena::{GameProgress, JsonFileStorage, MAX_TIER, MemoryStorage, ProgressStore};

fn memory_store() -> ProgressStore {
    ProgressStore::open(Box::new(MemoryStorage::new()))
}

#[test]
fn unknown_game_gets_default_record() {
    let store = memory_store();
    assert_eq!(
        store.get("pattern_matrix"),
        GameProgress {
            unlocked_levels: 1,
            high_score: 0
        }
    );
}

#[test]
fn clearing_the_frontier_advances_by_one() {
    let store = memory_store();
    store.complete_level("pattern_matrix", 1, 500);
    let progress = store.get("pattern_matrix");
    assert_eq!(progress.unlocked_levels, 2);
    assert_eq!(progress.high_score, 500);
}

#[test]
fn replaying_a_cleared_level_never_advances() {
    let store = memory_store();
    store.complete_level("pattern_matrix", 1, 500);
    store.complete_level("pattern_matrix", 1, 800);
    let progress = store.get("pattern_matrix");
    assert_eq!(progress.unlocked_levels, 2);
    // High score still rises on a replay.
    assert_eq!(progress.high_score, 800);
}

#[test]
fn skipping_ahead_never_advances() {
    let store = memory_store();
    store.complete_level("pattern_matrix", 5, 2500);
    assert_eq!(store.get("pattern_matrix").unlocked_levels, 1);
}

#[test]
fn high_score_never_decreases() {
    let store = memory_store();
    store.complete_level("dice_trail", 1, 900);
    store.complete_level("dice_trail", 2, 300);
    assert_eq!(store.get("dice_trail").high_score, 900);
}

#[test]
fn frontier_is_capped() {
    let store = memory_store();
    for level in 1..=MAX_TIER + 5 {
        store.complete_level("prime_rush", level, 100);
    }
    assert_eq!(store.get("prime_rush").unlocked_levels, MAX_TIER);
}

#[test]
fn progress_is_tracked_per_game() {
    let store = memory_store();
    store.complete_level("pattern_matrix", 1, 500);
    assert_eq!(store.get("pattern_matrix").unlocked_levels, 2);
    assert_eq!(store.get("bid_duel").unlocked_levels, 1);
}

#[test]
fn reset_wipes_everything() {
    let store = memory_store();
    store.complete_level("pattern_matrix", 1, 500);
    store.complete_level("bid_duel", 1, 400);
    store.reset_all();
    assert_eq!(store.get("pattern_matrix"), GameProgress::default());
    assert_eq!(store.get("bid_duel"), GameProgress::default());
}

#[test]
fn subscribers_fire_once_per_mutation() {
    let store = memory_store();
    let calls = Arc::new(AtomicUsize::new(0));
    let observed = calls.clone();
    let id = store.subscribe(move || {
        observed.fetch_add(1, Ordering::SeqCst);
    });

    store.complete_level("pattern_matrix", 1, 500);
    store.reset_all();
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    store.unsubscribe(id);
    store.complete_level("pattern_matrix", 1, 500);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn subscribers_may_read_the_store() {
    let store = memory_store();
    let reader = store.clone();
    let seen = Arc::new(AtomicUsize::new(0));
    let observed = seen.clone();
    store.subscribe(move || {
        let progress = reader.get("pattern_matrix");
        observed.store(progress.unlocked_levels as usize, Ordering::SeqCst);
    });
    store.complete_level("pattern_matrix", 1, 500);
    // The callback observed the state after the mutation, without deadlock.
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

#[test]
fn progress_survives_reopen() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("progress.json");

    {
        let store = ProgressStore::open(Box::new(JsonFileStorage::new(path.clone())));
        store.complete_level("sum_pyramid", 1, 300);
        store.complete_level("sum_pyramid", 2, 600);
    }

    let store = ProgressStore::open(Box::new(JsonFileStorage::new(path)));
    let progress = store.get("sum_pyramid");
    assert_eq!(progress.unlocked_levels, 3);
    assert_eq!(progress.high_score, 600);
}

#[test]
fn corrupt_snapshot_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("progress.json");
    std::fs::write(&path, "not json at all").expect("write");

    let store = ProgressStore::open(Box::new(JsonFileStorage::new(path)));
    assert_eq!(store.get("pattern_matrix"), GameProgress::default());
}
