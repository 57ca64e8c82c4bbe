//! The AI gateway.
//!
//! Every generative capability the studio needs goes through the [`Studio`]
//! trait: writing challenges, sentence validation, illustrations, covers and
//! the three generator panels. [`GeminiStudio`] is the production
//! implementation; [`crate::testing::MockStudio`] replays scripted answers.

mod gemini;
pub mod prompts;
mod types;

pub use gemini::{GeminiStudio, StudioConfig};
pub use prompts::{StoryStep, STORY_STEPS};
pub use types::{Challenge, ChallengeResult, CharacterProfile, GameIdea, Stats, WorldLore};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors from gateway calls.
#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Gemini API error: {0}")]
    Api(#[from] ::gemini::Error),

    #[error("The model returned an empty response")]
    EmptyResponse,

    #[error("Malformed structured response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A generative backend for the studio.
///
/// Image operations return a `data:` URI, or an empty string when the model
/// answered without image data.
#[async_trait]
pub trait Studio: Send + Sync {
    /// Writing prompt for a 1-based level; the story step is `(level - 1) mod 6`.
    async fn request_challenge(
        &self,
        level: usize,
        character: &str,
        title: &str,
    ) -> Result<Challenge, StudioError>;

    /// Judge whether `sentence` is a full past-tense sentence for `challenge`.
    async fn validate_sentence(
        &self,
        challenge: &Challenge,
        sentence: &str,
    ) -> Result<ChallengeResult, StudioError>;

    async fn request_illustration(
        &self,
        sentence: &str,
        style: &str,
        character: &str,
    ) -> Result<String, StudioError>;

    async fn request_cover_illustration(
        &self,
        title: &str,
        character: &str,
    ) -> Result<String, StudioError>;

    async fn request_character_profile(
        &self,
        archetype: &str,
        traits: &str,
    ) -> Result<CharacterProfile, StudioError>;

    async fn request_game_idea(
        &self,
        genre: &str,
        theme: &str,
        style: &str,
    ) -> Result<GameIdea, StudioError>;

    async fn request_world_lore(&self, setting: &str, tone: &str) -> Result<WorldLore, StudioError>;
}

/// Parse a structured answer, tolerating surrounding whitespace and a
/// markdown code fence.
pub fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T, StudioError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(StudioError::EmptyResponse);
    }

    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed);

    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let result: ChallengeResult =
            parse_structured(r#" {"isCorrect": true, "feedback": "Great job!"} "#).unwrap();
        assert!(result.is_correct);
        assert_eq!(result.feedback, "Great job!");
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = "```json\n{\"isCorrect\": false, \"feedback\": \"Use past tense!\"}\n```";
        let result: ChallengeResult = parse_structured(text).unwrap();
        assert!(!result.is_correct);
    }

    #[test]
    fn test_parse_empty_is_error() {
        let err = parse_structured::<ChallengeResult>("  \n").unwrap_err();
        assert!(matches!(err, StudioError::EmptyResponse));
    }

    #[test]
    fn test_parse_missing_field_is_malformed() {
        let err = parse_structured::<Challenge>(r#"{"topic": "Home"}"#).unwrap_err();
        assert!(matches!(err, StudioError::Malformed(_)));
    }
}
