//! Integration tests for the attempt lifecycle.

use rand::SeedableRng;
use rand::rngs::StdRng;

use puzzle_arena::{Arena, ArenaPhase, GameRegistry, PlayerInput};

fn mount(game_id: &str, level: u32, briefing: bool, rng: &mut StdRng) -> Arena {
    let registry = GameRegistry::standard();
    let def = registry.get(game_id).expect("registered game");
    Arena::new(def, level, briefing, rng)
}

#[test]
fn briefing_holds_the_clock_until_begin() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut arena = mount("formula_shot", 1, true, &mut rng);
    assert_eq!(arena.phase(), ArenaPhase::Briefing);

    for _ in 0..30 {
        assert!(arena.tick(&mut rng).is_none());
    }
    assert_eq!(arena.elapsed_seconds(), 0);

    arena.begin();
    assert_eq!(arena.phase(), ArenaPhase::Active);
    for _ in 0..30 {
        arena.tick(&mut rng);
    }
    assert_eq!(arena.elapsed_seconds(), 3);
}

#[test]
fn input_during_briefing_is_dropped() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut arena = mount("formula_shot", 1, true, &mut rng);
    let outcome = arena.input(PlayerInput::Submit("42".to_string()), &mut rng);
    assert!(outcome.is_none());
    assert_eq!(arena.phase(), ArenaPhase::Briefing);
}

#[test]
fn wrong_submission_ends_the_attempt() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut arena = mount("formula_shot", 1, false, &mut rng);
    // No integer solution is this large.
    let outcome = arena
        .input(PlayerInput::Submit("999999999".to_string()), &mut rng)
        .expect("attempt ends");
    assert!(!outcome.success);
    assert_eq!(arena.phase(), ArenaPhase::Lost);
    assert_eq!(arena.outcome(), Some(outcome));
}

#[test]
fn outcome_is_produced_exactly_once() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut arena = mount("formula_shot", 1, false, &mut rng);
    arena
        .input(PlayerInput::Submit("999999999".to_string()), &mut rng)
        .expect("attempt ends");

    // Every further event is dropped without a second outcome.
    assert!(arena.input(PlayerInput::Submit("1".to_string()), &mut rng).is_none());
    assert!(arena.tick(&mut rng).is_none());
    assert!(arena.give_up().is_none());
    assert_eq!(arena.phase(), ArenaPhase::Lost);
}

#[test]
fn give_up_is_a_zero_score_loss() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut arena = mount("block_exit", 3, false, &mut rng);
    let outcome = arena.give_up().expect("live attempt");
    assert!(!outcome.success);
    assert_eq!(outcome.score, 0);
    assert_eq!(arena.phase(), ArenaPhase::Lost);
}

#[test]
fn give_up_works_from_the_briefing() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut arena = mount("block_exit", 1, true, &mut rng);
    let outcome = arena.give_up().expect("live attempt");
    assert!(!outcome.success);
}

#[test]
fn rejected_input_leaves_feedback_without_ending() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut arena = mount("formula_shot", 1, false, &mut rng);
    assert!(
        arena
            .input(PlayerInput::Submit("not a number".to_string()), &mut rng)
            .is_none()
    );
    assert!(arena.feedback().is_some());
    assert_eq!(arena.phase(), ArenaPhase::Active);
}

#[test]
fn retry_regenerates_the_same_level() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut arena = mount("formula_shot", 4, false, &mut rng);
    arena.give_up();

    arena.retry(&mut rng);
    assert_eq!(arena.phase(), ArenaPhase::Active);
    assert_eq!(arena.level(), 4);
    assert!(arena.outcome().is_none());
    assert_eq!(arena.elapsed_seconds(), 0);
}

#[test]
fn advance_mounts_the_next_level() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut arena = mount("formula_shot", 4, false, &mut rng);
    arena.give_up();

    arena.advance(5, &mut rng);
    assert_eq!(arena.phase(), ArenaPhase::Active);
    assert_eq!(arena.level(), 5);
    assert!(arena.outcome().is_none());
}

#[test]
fn solution_is_available_for_registered_games() {
    let mut rng = StdRng::seed_from_u64(1);
    let arena = mount("formula_shot", 1, false, &mut rng);
    let solution = arena.solution().expect("formula shot registers a solution");
    assert!(solution.contains("x ="));
}
