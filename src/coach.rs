//! AI coach client - free-text advice and generated trivia questions.
//!
//! Every call degrades to a static fallback on missing credentials, network
//! failure, timeout, or malformed responses. The coach is never allowed to
//! surface an error to the player.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumIter};
use tracing::{debug, error, info, instrument, warn};

/// Environment variable holding the coach API key.
pub const API_KEY_VAR: &str = "COACH_API_KEY";

/// Advice returned when no API key is configured.
const OFFLINE_ADVICE: &str = "Focus on your breathing. Try again.";

/// Advice returned when the coach request fails.
const FAILURE_ADVICE: &str = "The stars are not aligned. Try again.";

/// Coach error with location tracking.
///
/// Internal only - public entry points swallow this and fall back.
#[derive(Debug, Clone, Display, Error)]
#[display("Coach error: {} at {}:{}", message, file, line)]
pub struct CoachError {
    /// Error message.
    pub message: String,
    /// Line number where the error occurred.
    pub line: u32,
    /// Source file where the error occurred.
    pub file: &'static str,
}

impl CoachError {
    /// Creates a new coach error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<reqwest::Error> for CoachError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::new(format!("Request failed: {}", err))
    }
}

impl From<serde_json::Error> for CoachError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Malformed response: {}", err))
    }
}

/// Trivia subject, enumerated rather than free text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    /// Computing and engineering.
    Technology,
    /// World history.
    History,
    /// Astronomy and spaceflight.
    Space,
    /// Art and culture.
    Art,
    /// Physical sciences.
    Physics,
}

/// How the attempt being coached ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OutcomeTag {
    /// The player cleared the level.
    Win,
    /// The player failed or gave up.
    Loss,
}

/// A four-option trivia question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriviaQuestion {
    /// Question text.
    pub question: String,
    /// Exactly four answer options.
    pub options: [String; 4],
    /// Index (0-3) of the correct option.
    pub correct_index: usize,
}

impl TriviaQuestion {
    /// The static question used when the service is unreachable.
    #[instrument]
    pub fn fallback() -> Self {
        Self {
            question:
                "The connection to the question service was interrupted. Which protocol is best \
                 for retrying?"
                    .to_string(),
            options: [
                "TCP".to_string(),
                "UDP".to_string(),
                "The Coach Protocol".to_string(),
                "Carrier Pigeon".to_string(),
            ],
            correct_index: 2,
        }
    }

    /// Builds a question from static text, used for offline banks.
    pub fn offline(question: &str, options: [&str; 4], correct_index: usize) -> Self {
        Self {
            question: question.to_string(),
            options: options.map(str::to_string),
            correct_index,
        }
    }

    /// Returns `true` when the option layout is usable.
    #[instrument(skip(self))]
    pub fn is_well_formed(&self) -> bool {
        self.correct_index < 4 && self.options.iter().all(|o| !o.is_empty())
    }
}

/// Configuration for the coach client.
#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
pub struct CoachConfig {
    /// API key. Usually absent from the file and supplied via
    /// [`API_KEY_VAR`]; without it every call uses the offline fallback.
    #[serde(default)]
    #[getter(skip)]
    api_key: Option<String>,

    /// Model name requested from the service.
    #[serde(default = "default_model")]
    model: String,

    /// Maximum tokens for coach responses.
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,

    /// Advice shown when the request fails or times out.
    #[serde(default = "default_failure_advice")]
    failure_advice: String,
}

fn default_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_max_tokens() -> u32 {
    150
}

fn default_timeout_secs() -> u64 {
    8
}

fn default_failure_advice() -> String {
    FAILURE_ADVICE.to_string()
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            failure_advice: default_failure_advice(),
        }
    }
}

impl CoachConfig {
    /// Loads configuration from a TOML file, then overlays the API key from
    /// the environment when present.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoachError> {
        debug!("Loading coach config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CoachError::new(format!("Failed to read config file: {}", e)))?;
        let mut config: Self = toml::from_str(&content)
            .map_err(|e| CoachError::new(format!("Failed to parse config: {}", e)))?;
        config.overlay_env();
        info!(model = %config.model, has_key = config.api_key.is_some(), "Coach config loaded");
        Ok(config)
    }

    /// Builds a config from defaults plus the environment.
    #[instrument]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.overlay_env();
        debug!(has_key = config.api_key.is_some(), "Coach config from env");
        config
    }

    fn overlay_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_VAR)
            && !key.is_empty()
        {
            self.api_key = Some(key);
        }
    }

    /// Whether a key is configured at all.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Client for the coach service.
#[derive(Debug, Clone)]
pub struct CoachClient {
    config: CoachConfig,
    http: reqwest::Client,
}

impl CoachClient {
    /// Creates a new coach client.
    #[instrument(skip(config), fields(model = %config.model, has_key = config.api_key.is_some()))]
    pub fn new(config: CoachConfig) -> Self {
        info!("Creating coach client");
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { config, http }
    }

    /// Returns a short gaming tip for the given game, level, and outcome.
    ///
    /// Never fails: without an API key this returns the offline fallback,
    /// and any request or parse failure returns the configured failure
    /// advice.
    #[instrument(skip(self))]
    pub async fn advice(&self, game_name: &str, level: u32, outcome: OutcomeTag) -> String {
        if !self.config.has_api_key() {
            debug!("No API key, returning offline advice");
            return OFFLINE_ADVICE.to_string();
        }
        let prompt = format!(
            "I am playing \"{}\" at level {} and just experienced a {}. Give me a short, \
             cryptic, but encouraging gaming tip. Max 20 words.",
            game_name, level, outcome
        );
        match self.generate(&prompt).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "Coach advice failed, using fallback");
                self.config.failure_advice.clone()
            }
        }
    }

    /// Returns a trivia question for the given topic and difficulty.
    ///
    /// Never fails: any problem yields [`TriviaQuestion::fallback`].
    #[instrument(skip(self))]
    pub async fn trivia(&self, topic: Topic, difficulty: u32) -> TriviaQuestion {
        if !self.config.has_api_key() {
            debug!("No API key, returning fallback question");
            return TriviaQuestion::fallback();
        }
        let prompt = format!(
            "Generate a trivia question about \"{}\" suitable for difficulty level {} (1-20). \
             Respond with only a JSON object with keys 'question', 'options' (array of 4 \
             strings), and 'correct_index' (0-3 number).",
            topic, difficulty
        );
        match self.generate(&prompt).await.and_then(|text| {
            let question: TriviaQuestion = serde_json::from_str(text.trim())?;
            if question.is_well_formed() {
                Ok(question)
            } else {
                Err(CoachError::new("Malformed trivia question"))
            }
        }) {
            Ok(question) => question,
            Err(e) => {
                warn!(error = %e, "Trivia request failed, using fallback");
                TriviaQuestion::fallback()
            }
        }
    }

    /// Sends one completion request and extracts the text content.
    #[instrument(skip(self, prompt))]
    async fn generate(&self, prompt: &str) -> Result<String, CoachError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| CoachError::new("No API key configured"))?;

        debug!("Building coach API request");
        let request_body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        debug!("Sending coach request");
        let response = self
            .http
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Coach API request failed");
                CoachError::new(format!("Coach API request failed: {}", e))
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read coach response");
            CoachError::new(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %response_text, "Coach API error");
            return Err(CoachError::new(format!(
                "Coach API error {}: {}",
                status, response_text
            )));
        }

        let parsed: serde_json::Value = serde_json::from_str(&response_text)?;
        let text = parsed["content"][0]["text"]
            .as_str()
            .ok_or_else(|| CoachError::new("Response missing text content"))?;

        debug!(chars = text.len(), "Coach response received");
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_question_is_well_formed() {
        let question = TriviaQuestion::fallback();
        assert!(question.is_well_formed());
        assert_eq!(question.correct_index, 2);
    }

    #[tokio::test]
    async fn advice_without_key_is_offline_fallback() {
        let client = CoachClient::new(CoachConfig::default());
        let advice = client.advice("Pattern Matrix", 3, OutcomeTag::Loss).await;
        assert_eq!(advice, OFFLINE_ADVICE);
    }

    #[tokio::test]
    async fn trivia_without_key_is_fallback_question() {
        let client = CoachClient::new(CoachConfig::default());
        let question = client.trivia(Topic::Space, 5).await;
        assert_eq!(question, TriviaQuestion::fallback());
    }
}
