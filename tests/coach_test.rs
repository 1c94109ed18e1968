//! Integration tests for coach configuration and fallbacks.

use puzzle_arena::{CoachClient, CoachConfig, OutcomeTag, Topic, TriviaQuestion};

#[test]
fn config_file_round_trip_with_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("coach.toml");
    std::fs::write(&path, "model = \"test-model\"\n").expect("write");

    let config = CoachConfig::from_file(&path).expect("parse");
    assert_eq!(config.model(), "test-model");
    // Unspecified fields fall back to defaults.
    assert_eq!(*config.max_tokens(), 150);
    assert_eq!(config.failure_advice(), "The stars are not aligned. Try again.");
}

#[test]
fn malformed_config_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("coach.toml");
    std::fs::write(&path, "model = [this is not toml").expect("write");

    assert!(CoachConfig::from_file(&path).is_err());
}

#[test]
fn missing_config_is_an_error() {
    assert!(CoachConfig::from_file("/nonexistent/coach.toml").is_err());
}

#[tokio::test]
async fn keyless_client_always_answers() {
    let client = CoachClient::new(CoachConfig::default());

    let advice = client.advice("Block Exit", 7, OutcomeTag::Win).await;
    assert_eq!(advice, "Focus on your breathing. Try again.");

    let question = client.trivia(Topic::History, 3).await;
    assert_eq!(question, TriviaQuestion::fallback());
    assert!(question.is_well_formed());
}
